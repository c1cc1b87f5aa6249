use nalgebra::DVector;

/// Weight of the explicit stability limit used to pick the time step.
pub const STABILITY_FACTOR: f64 = 1.0 / 6.0;

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> DVector<f64> {
    match n {
        0 => DVector::zeros(0),
        1 => DVector::from_element(1, start),
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            DVector::from_fn(n, |i, _| {
                if i == n - 1 {
                    end
                } else {
                    start + i as f64 * step
                }
            })
        }
    }
}

/// Values `start + k * step` strictly below `end`.
///
/// The length is `ceil((end - start) / step)`, so the last point is the
/// final time at which a solution column exists.
pub fn arange(start: f64, end: f64, step: f64) -> DVector<f64> {
    let n = arange_len(start, end, step);
    DVector::from_fn(n, |k, _| start + k as f64 * step)
}

/// Length of [`arange`] for the same arguments.
pub fn arange_len(start: f64, end: f64, step: f64) -> usize {
    if step <= 0.0 || end <= start {
        return 0;
    }
    ((end - start) / step).ceil() as usize
}

/// Time step from the explicit stability limit `dx^2 / alpha`.
pub fn stable_time_step(dx: f64, diffusivity: f64) -> f64 {
    STABILITY_FACTOR * dx * dx / diffusivity
}
