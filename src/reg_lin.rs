use nalgebra::DVector;

use crate::dataset::Dataset;
use crate::error::DegenerateDataError;

/// Ordinary least squares line `y = intercept + slope * x`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// Closed form fit on centered data.
    pub fn fit(dataset: &Dataset) -> Result<Self, DegenerateDataError> {
        let n = dataset.len();
        if n < 2 {
            return Err(DegenerateDataError::TooFewPoints { count: n });
        }

        let x = dataset.x();
        let y = dataset.y();

        if x.iter().all(|&v| v == x[0]) {
            return Err(DegenerateDataError::ConstantPredictor { x: x[0] });
        }

        let x_mean = x.mean();
        let y_mean = y.mean();

        let dx = x.add_scalar(-x_mean);
        let dy = y.add_scalar(-y_mean);

        let slope = dx.dot(&dy) / dx.dot(&dx);
        let intercept = y_mean - slope * x_mean;

        Ok(Self { intercept, slope })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    pub fn predict_all(&self, dataset: &Dataset) -> DVector<f64> {
        dataset.x().map(|x| self.predict(x))
    }

    /// Legend text, coefficients rounded to two decimals.
    pub fn equation(&self) -> String {
        format!("y = {:.2} + {:.2}x", self.intercept, self.slope)
    }
}
