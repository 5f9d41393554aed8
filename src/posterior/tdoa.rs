//! Time-difference-of-arrival log-posterior.
//!
//! With Gaussian arrival-time measurements, the common (absolute) event
//! time marginalizes analytically: what remains per pixel is the weighted
//! total sum of squares of the expected arrival-time residuals about their
//! weighted mean. One detector therefore carries no direction information
//! at all, two constrain a ring, three or more intersect rings.

use itertools::izip;

use crate::constants::Gmst;
use crate::detector::{line_of_sight, travel_time_delay, DetectorTrigger};
use crate::healpix::ring_to_angles;

/// Fill `map` with the un-normalized TDOA-only log-posterior.
///
/// Arguments
/// ---------
/// * `map`: output buffer of length `12 * nside²`, overwritten.
/// * `nside`: lateral pixel resolution (already validated).
/// * `gmst`: Greenwich mean sidereal time (rad).
/// * `detectors`: per-detector triggers; only `location`, `toa` and
///   `s2_toa` participate here.
///
/// The zeroth detector's arrival time is subtracted from every other for
/// numerical conditioning; the weighted variance is invariant under that
/// common shift, so the output does not depend on detector order.
pub(crate) fn tdoa_log_posterior(
    map: &mut [f64],
    nside: usize,
    gmst: Gmst,
    detectors: &[DetectorTrigger],
) {
    let t0 = detectors[0].toa;
    let toas: Vec<f64> = detectors.iter().map(|d| d.toa - t0).collect();
    let weights: Vec<f64> = detectors.iter().map(|d| 1.0 / d.s2_toa).collect();
    let wsum: f64 = weights.iter().sum();

    let mut residuals = vec![0.0; detectors.len()];

    for (ipix, p) in map.iter_mut().enumerate() {
        let (theta, phi) = ring_to_angles(nside, ipix);
        let n_hat = line_of_sight(theta, phi, gmst);

        // Expected arrival-time residual per detector.
        for (r, det, &t) in izip!(&mut residuals, detectors, &toas) {
            *r = t + travel_time_delay(&det.location, &n_hat);
        }

        // Weighted total sum of squares about the weighted mean.
        let mut wmean = 0.0;
        for (&w, &dt) in izip!(&weights, &residuals) {
            wmean += w * dt;
        }
        wmean /= wsum;

        let mut wtss = 0.0;
        for (&w, &dt) in izip!(&weights, &residuals) {
            wtss += w * (dt - wmean) * (dt - wmean);
        }

        *p = -0.5 * wtss;
    }
}
