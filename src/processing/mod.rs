pub mod analytical;
pub mod csv_writer;
pub mod summary;
