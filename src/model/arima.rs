//! ARIMA(p, d, 0) fitting and forecasting.
//!
//! The series is differenced `d` times and an AR(p) model without constant is
//! fitted to the result by conditional least squares. A small ridge term keeps
//! the normal equations solvable for perfectly regular inputs (a constant-rate
//! decline makes every lag column identical).

use crate::model::trend::TrendError;

/// Ridge penalty relative to the mean diagonal of the normal matrix.
const RIDGE_PENALTY: f64 = 1e-6;
/// Pivots smaller than this (relative to the largest diagonal) count as singular.
const PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct FittedArima {
    p: usize,
    d: usize,
    /// AR coefficients, `coefficients[k]` multiplies lag `k + 1`.
    coefficients: Vec<f64>,
    /// Last value of every differencing level, level 0 being the input series.
    level_tails: Vec<f64>,
    /// Last `p` values of the fully differenced series, oldest first.
    recent: Vec<f64>,
}

impl FittedArima {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, 0)
    }

    /// Forecasts `steps` values past the end of the fitted series.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut history = self.recent.clone();
        let mut differenced = Vec::with_capacity(steps);
        for _ in 0..steps {
            let next: f64 = self
                .coefficients
                .iter()
                .zip(history.iter().rev())
                .map(|(phi, value)| phi * value)
                .sum();
            history.push(next);
            differenced.push(next);
        }

        // Undo the differencing one level at a time.
        let mut level = differenced;
        for &tail in self.level_tails.iter().rev().skip(1) {
            let mut acc = tail;
            level = level
                .into_iter()
                .map(|delta| {
                    acc += delta;
                    acc
                })
                .collect();
        }
        level
    }
}

/// Fits an ARIMA(p, d, 0) model to `series`.
///
/// # Errors
///
/// * [`TrendError::NonFiniteInput`] if any value is NaN or infinite.
/// * [`TrendError::InsufficientHistory`] if fewer than `p + 1` regression rows
///   remain after differencing and lagging.
/// * [`TrendError::Singular`] if the normal equations cannot be solved.
pub fn fit_arima(series: &[f64], p: usize, d: usize) -> Result<FittedArima, TrendError> {
    if let Some(index) = series.iter().position(|v| !v.is_finite()) {
        return Err(TrendError::NonFiniteInput { index });
    }

    let needed = 2 * p + d + 1;
    if series.len() < needed {
        return Err(TrendError::InsufficientHistory {
            needed,
            available: series.len(),
        });
    }

    let mut levels: Vec<Vec<f64>> = vec![series.to_vec()];
    for _ in 0..d {
        let previous = &levels[levels.len() - 1];
        let next: Vec<f64> = previous.windows(2).map(|w| w[1] - w[0]).collect();
        levels.push(next);
    }
    let level_tails: Vec<f64> = levels
        .iter()
        .map(|level| level.last().copied().unwrap_or(0.0))
        .collect();
    let z = &levels[d];

    let coefficients = if p == 0 {
        Vec::new()
    } else {
        let (mut xtx, mut xty) = normal_equations(z, p);
        let trace: f64 = (0..p).map(|i| xtx[i][i]).sum();
        if trace == 0.0 {
            // Perfectly flat after differencing: nothing to regress on.
            vec![0.0; p]
        } else {
            let ridge = RIDGE_PENALTY * trace / p as f64;
            for (i, row) in xtx.iter_mut().enumerate() {
                row[i] += ridge;
            }
            solve_linear_system(&mut xtx, &mut xty)?
        }
    };

    let recent = z[z.len() - p..].to_vec();
    Ok(FittedArima {
        p,
        d,
        coefficients,
        level_tails,
        recent,
    })
}

/// Builds `XᵀX` and `Xᵀy` for the lagged regression `z[t] ~ z[t-1..=t-p]`.
fn normal_equations(z: &[f64], p: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    for t in p..z.len() {
        for i in 0..p {
            let xi = z[t - 1 - i];
            xty[i] += xi * z[t];
            for j in 0..p {
                xtx[i][j] += xi * z[t - 1 - j];
            }
        }
    }
    (xtx, xty)
}

/// Gaussian elimination with partial pivoting. Consumes the system in place.
fn solve_linear_system(a: &mut [Vec<f64>], b: &mut [f64]) -> Result<Vec<f64>, TrendError> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0_f64, f64::max);
    let tolerance = PIVOT_TOLERANCE * scale.max(f64::MIN_POSITIVE);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() <= tolerance {
            return Err(TrendError::Singular);
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(TrendError::Singular)
    }
}
