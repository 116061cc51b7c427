use nalgebra::DMatrix;

use covsteer_types::{is_symmetric, CovSteerError, Result};

/// Confidence ellipse of a 2x2 covariance matrix.
///
/// Only the planar case is supported; callers with higher-dimensional
/// states project or skip ellipse output.
#[derive(Debug, Clone, Copy)]
pub struct Ellipse {
    /// Semi-axis along the first eigenvector
    semi_a: f64,
    /// Semi-axis along the second eigenvector
    semi_b: f64,
    /// Rotation of the first eigenvector from the x axis
    theta: f64,
}

impl Ellipse {
    /// Derive the ellipse from Sigma = V D V^T: semi-axes are
    /// scale * sqrt(eigenvalue), rotation comes from the first
    /// eigenvector. Eigenvalues are clamped at zero so a Sigma that is
    /// PSD up to rounding still yields a (possibly degenerate) ellipse.
    pub fn from_covariance(sigma: &DMatrix<f64>, scale: f64) -> Result<Self> {
        if sigma.nrows() != 2 || sigma.ncols() != 2 {
            return Err(CovSteerError::Dimension(format!(
                "ellipse requires a 2x2 covariance, got {}x{}",
                sigma.nrows(),
                sigma.ncols()
            )));
        }
        if !is_symmetric(sigma, 1e-9) {
            return Err(CovSteerError::Dimension(
                "ellipse covariance must be symmetric".to_string(),
            ));
        }

        let eigen = sigma.clone().symmetric_eigen();
        let theta = eigen.eigenvectors[(1, 0)].atan2(eigen.eigenvectors[(0, 0)]);

        Ok(Ellipse {
            semi_a: scale * eigen.eigenvalues[0].max(0.0).sqrt(),
            semi_b: scale * eigen.eigenvalues[1].max(0.0).sqrt(),
            theta,
        })
    }

    pub fn semi_axes(&self) -> (f64, f64) {
        (self.semi_a, self.semi_b)
    }

    pub fn rotation(&self) -> f64 {
        self.theta
    }

    /// Closed boundary walk: `segments + 1` points at equally spaced
    /// angles, the last identical to the first. The iterator is finite
    /// and deterministic; calling `points` again restarts it.
    pub fn points(&self, segments: usize) -> EllipsePoints {
        EllipsePoints {
            ellipse: *self,
            segments,
            index: 0,
        }
    }
}

/// Lazy boundary point iterator, see [`Ellipse::points`]
#[derive(Debug, Clone)]
pub struct EllipsePoints {
    ellipse: Ellipse,
    segments: usize,
    index: usize,
}

impl Iterator for EllipsePoints {
    type Item = [f64; 2];

    fn next(&mut self) -> Option<[f64; 2]> {
        if self.index > self.segments {
            return None;
        }
        // Wrap the final angle to zero so the boundary closes exactly
        let t = std::f64::consts::TAU * (self.index % self.segments.max(1)) as f64
            / self.segments.max(1) as f64;
        self.index += 1;

        let (a, b) = (self.ellipse.semi_a, self.ellipse.semi_b);
        let (sin_theta, cos_theta) = self.ellipse.theta.sin_cos();
        let (sin_t, cos_t) = t.sin_cos();

        Some([
            a * cos_t * cos_theta - b * sin_t * sin_theta,
            a * cos_t * sin_theta + b * sin_t * cos_theta,
        ])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.segments + 1 - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EllipsePoints {}
