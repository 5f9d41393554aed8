//! Radial (distance) integrand and its analytic breakpoints.
//!
//! The per-detector amplitude likelihood collapses, for one lattice node in
//! polarization and inclination, to a one-dimensional integral over
//! luminosity distance. In the integration variable `x = ln r` and with
//! `y = 1/r`, the log-likelihood is the quadratic `A y² + B y` with
//! `A < 0`, `B ≥ 0`. The integrand pre-subtracts the peak value
//! `L = −B²/(4A)` so its maximum is O(1); the caller restores `L` after
//! integrating.

use std::str::FromStr;

use smallvec::{smallvec, SmallVec};

use crate::skyloc_errors::SkyLocError;

/// Prior density on luminosity distance, marginalized by the radial
/// integral.
///
/// The set of priors is closed and small, so the choice is a plain enum
/// dispatched inside the integrand rather than anything polymorphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistancePrior {
    /// p(r) dr ∝ d(ln r): every logarithmic distance decade carries the
    /// same prior mass.
    UniformInLogDistance,
    /// p(r) dr ∝ r² dr: sources uniform in Euclidean volume; adds an
    /// `e^{3x}` Jacobian to the integrand.
    UniformInVolume,
}

impl FromStr for DistancePrior {
    type Err = SkyLocError;

    /// Parse a configuration-level prior name.
    ///
    /// This is the one place an out-of-set prior can enter the typed API;
    /// anything unrecognized fails with [`SkyLocError::UnrecognizedPrior`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform-in-log-distance" => Ok(DistancePrior::UniformInLogDistance),
            "uniform-in-volume" => Ok(DistancePrior::UniformInVolume),
            other => Err(SkyLocError::UnrecognizedPrior(other.to_string())),
        }
    }
}

/// One radial integrand, fixed for a single `(cos ι, 2ψ)` lattice node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RadialIntegrand {
    /// Quadratic coefficient in `y = 1/r`; strictly negative.
    a: f64,
    /// Linear coefficient in `y = 1/r`; non-negative.
    b: f64,
    /// Peak value `−B²/(4A)` of the exponent, pre-subtracted for stability.
    log_offset: f64,
    prior: DistancePrior,
}

impl RadialIntegrand {
    pub(crate) fn new(a: f64, b: f64, prior: DistancePrior) -> Self {
        debug_assert!(a < 0.0);
        debug_assert!(b >= 0.0);
        Self {
            a,
            b,
            log_offset: -b * b / (4.0 * a),
            prior,
        }
    }

    /// The stabilizing log-offset, to be added back to the logarithm of the
    /// integral.
    pub(crate) fn log_offset(&self) -> f64 {
        self.log_offset
    }

    /// Evaluate the integrand at `x = ln r`.
    #[inline]
    pub(crate) fn eval(&self, x: f64) -> f64 {
        // One exp gives both 1/r and 1/r².
        let onebyr = (-x).exp();
        let base = (self.a * onebyr * onebyr + self.b * onebyr - self.log_offset).exp();
        match self.prior {
            DistancePrior::UniformInLogDistance => base,
            DistancePrior::UniformInVolume => base * (3.0 * x).exp(),
        }
    }

    /// Integration breakpoints in `x = ln r`, bracketing the likelihood
    /// peak.
    ///
    /// The exponent `A y² + B y` peaks at `y* = −B/(2A)` and falls to
    /// `eta` times its peak height at `y* ± sqrt(ln eta / A)`. Up to five
    /// sorted abscissae are returned: the integration bounds always, and
    /// whichever of the three peak markers lie strictly inside them
    /// (markers with `y ≤ 0` have no preimage in `x` and are dropped).
    pub(crate) fn breakpoints(&self, eta: f64, xmin: f64, xmax: f64) -> SmallVec<[f64; 5]> {
        let mut pts: SmallVec<[f64; 5]> = smallvec![xmin];

        let y_peak = -self.b / (2.0 * self.a);
        // ln eta < 0 and a < 0, so the ratio is positive
        let half_width = (eta.ln() / self.a).sqrt();

        // Descending y maps to ascending x = -ln y.
        for y in [y_peak + half_width, y_peak, y_peak - half_width] {
            if y > 0.0 {
                let x = -y.ln();
                if x > xmin && x < xmax && x > *pts.last().unwrap() {
                    pts.push(x);
                }
            }
        }

        pts.push(xmax);
        pts
    }
}
