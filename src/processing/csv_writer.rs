use crate::models::solution::Solution;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// Writes equal-length columns under the given headers.
pub fn write_columns<P: AsRef<Path>>(
    path: P,
    headers: &[String],
    columns: &[Vec<f64>],
) -> io::Result<()> {
    if headers.len() != columns.len() {
        return Err(invalid_input(format!(
            "Headers count ({}) doesn't match data columns ({})",
            headers.len(),
            columns.len()
        )));
    }
    let n_rows = columns.first().map_or(0, Vec::len);
    if let Some(bad) = columns.iter().position(|col| col.len() != n_rows) {
        return Err(invalid_input(format!(
            "Column {} has {} rows, expected {}",
            headers[bad],
            columns[bad].len(),
            n_rows
        )));
    }

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{}", headers.join(","))?;
    for i in 0..n_rows {
        let row: Vec<String> = columns.iter().map(|col| format!("{:.10e}", col[i])).collect();
        writeln!(file, "{}", row.join(","))?;
    }
    file.flush()
}

/// Write x-y data pairs
pub fn write_xy<P: AsRef<Path>>(
    path: P,
    x_header: &str,
    y_header: &str,
    x_data: &[f64],
    y_data: &[f64],
) -> io::Result<()> {
    if x_data.len() != y_data.len() {
        return Err(invalid_input(format!(
            "X and Y data lengths don't match ({} vs {})",
            x_data.len(),
            y_data.len()
        )));
    }
    write_columns(
        path,
        &[x_header.to_string(), y_header.to_string()],
        &[x_data.to_vec(), y_data.to_vec()],
    )
}

/// Depth column `x_m` followed by one temperature column per requested time
/// index, headed `T_<time>s`.
pub fn write_temperature_table<P: AsRef<Path>>(
    path: P,
    solution: &Solution,
    time_indices: &[usize],
) -> io::Result<()> {
    let sample = &solution.sample;
    let mut headers = vec!["x_m".to_string()];
    let mut columns = vec![sample.space_mesh.iter().copied().collect::<Vec<f64>>()];

    for &index in time_indices {
        let profile = solution
            .temperatures_at(index)
            .ok_or_else(|| invalid_input(format!("time index {index} is past the end of the run")))?;
        headers.push(format!("T_{:.3}s", sample.temporal_mesh[index]));
        columns.push(profile.iter().copied().collect());
    }

    write_columns(path, &headers, &columns)
}

/// Surface and back-face temperature over the whole run.
pub fn write_boundary_history<P: AsRef<Path>>(path: P, solution: &Solution) -> io::Result<()> {
    let sample = &solution.sample;
    let last = sample.num_nodes() - 1;
    let headers = ["t_s", "T_surface_K", "T_back_K"].map(String::from);
    let columns: [Vec<f64>; 3] = [
        sample.temporal_mesh.iter().copied().collect(),
        sample.temperatures.row(0).iter().copied().collect(),
        sample.temperatures.row(last).iter().copied().collect(),
    ];
    write_columns(path, &headers, &columns)
}
