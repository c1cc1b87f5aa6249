use nalgebra::{DMatrix, DVector};

/// Pivots below this magnitude are treated as zero.
const PIVOT_EPS: f64 = 1e-300;

/// Square tridiagonal matrix stored by diagonals.
///
/// Row `i` reads `lower[i] * x[i-1] + diag[i] * x[i] + upper[i] * x[i+1]`;
/// `lower[0]` and `upper[n-1]` are unused and kept at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Tridiagonal {
    pub lower: Vec<f64>,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Tridiagonal {
    pub fn zeros(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Overwrites row `i` with the given band entries.
    #[inline]
    pub fn set_row(&mut self, i: usize, lower: f64, diag: f64, upper: f64) {
        let n = self.len();
        self.lower[i] = if i > 0 { lower } else { 0.0 };
        self.diag[i] = diag;
        self.upper[i] = if i + 1 < n { upper } else { 0.0 };
    }

    /// `self * x`.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        let n = self.len();
        debug_assert_eq!(x.len(), n);
        DVector::from_fn(n, |i, _| {
            let mut acc = self.diag[i] * x[i];
            if i > 0 {
                acc += self.lower[i] * x[i - 1];
            }
            if i + 1 < n {
                acc += self.upper[i] * x[i + 1];
            }
            acc
        })
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut m = DMatrix::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = self.diag[i];
            if i > 0 {
                m[(i, i - 1)] = self.lower[i];
            }
            if i + 1 < n {
                m[(i, i + 1)] = self.upper[i];
            }
        }
        m
    }

    /// Thomas algorithm. Returns the row of the first zero pivot on failure.
    pub fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, usize> {
        let n = self.len();
        debug_assert_eq!(rhs.len(), n);
        if n == 0 {
            return Ok(DVector::zeros(0));
        }

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        // Forward sweep
        let mut pivot = self.diag[0];
        if pivot.abs() < PIVOT_EPS || !pivot.is_finite() {
            return Err(0);
        }
        c_prime[0] = self.upper[0] / pivot;
        d_prime[0] = rhs[0] / pivot;
        for i in 1..n {
            pivot = self.diag[i] - self.lower[i] * c_prime[i - 1];
            if pivot.abs() < PIVOT_EPS || !pivot.is_finite() {
                return Err(i);
            }
            c_prime[i] = self.upper[i] / pivot;
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / pivot;
        }

        // Back substitution
        let mut x = DVector::zeros(n);
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }
        Ok(x)
    }
}
