//! # Sky map assembly pipeline
//!
//! The two public localizers live here, together with the normalization
//! and credible-region helpers they share.
//!
//! [`sky_map_tdoa`] evaluates arrival times alone: cheap, and the
//! prefilter for everything else. [`sky_map_tdoa_snr`] is the full
//! product: it runs the TDOA pass, keeps the smallest pixel set covering
//! (by default) 99.99% of the TDOA-only posterior mass, evaluates the
//! expensive amplitude marginalization in parallel on that set only, and
//! normalizes the joint posterior.
//!
//! The returned map is a probability per pixel in ring order, an external
//! contract for downstream consumers; it is never reordered.
//!
//! ## Pipeline
//!
//! 1. validate pixel count and distance bounds, rescale horizons so the
//!    largest is 1,
//! 2. TDOA log-posterior over all pixels,
//! 3. sort a pixel permutation by descending log-posterior,
//! 4. prune everything outside the leading mass fraction to −∞,
//! 5. amplitude log-posterior on the survivors (rayon, one workspace per
//!    worker, one result slot per pixel),
//! 6. surface the first per-pixel failure in permutation order, or
//!    exponentiate and normalize.

use itertools::izip;
use log::debug;
use rayon::prelude::*;

use crate::constants::{Gmst, Mpc};
use crate::detector::DetectorTrigger;
use crate::healpix::{pixel_area, resolution_from_npix};
use crate::posterior::amplitude::{amplitude_log_posterior, AmplitudeContext};
use crate::posterior::radial::DistancePrior;
use crate::posterior::tdoa::tdoa_log_posterior;
use crate::posterior::SkyMapParams;
use crate::quadrature::QuadWorkspace;
use crate::skyloc_errors::SkyLocError;

/// Sky localization from times of arrival alone.
///
/// Arguments
/// ---------
/// * `npix`: pixel count, must be of the form `12 N²`.
/// * `gmst`: Greenwich mean sidereal time (rad).
/// * `detectors`: one trigger per detector; only `location`, `toa` and
///   `s2_toa` are read here.
///
/// Return
/// ------
/// * Normalized probability map in ring order, summing to 1.
pub fn sky_map_tdoa(
    npix: usize,
    gmst: Gmst,
    detectors: &[DetectorTrigger],
) -> Result<Vec<f64>, SkyLocError> {
    let nside = resolution_from_npix(npix)?;
    if detectors.is_empty() {
        return Err(SkyLocError::NoDetectors);
    }

    let mut map = try_zeroed(npix)?;
    tdoa_log_posterior(&mut map, nside, gmst, detectors);
    exp_normalize(&mut map)?;
    Ok(map)
}

/// Full sky localization from times of arrival and matched-filter
/// amplitudes.
///
/// Arguments
/// ---------
/// * `npix`: pixel count, must be of the form `12 N²`.
/// * `gmst`: Greenwich mean sidereal time (rad).
/// * `detectors`: one trigger per detector. The first detector's arrival
///   time is the internal zero point; the output is invariant under a
///   common shift of all arrival times and under detector reordering.
/// * `min_distance`, `max_distance`: distance prior support, in the same
///   unit as the detector horizons; `0 < min < max` is required.
/// * `prior`: distance prior marginalized by the radial integration.
/// * `params`: tuning knobs, see [`SkyMapParams`].
///
/// Return
/// ------
/// * Normalized probability map in ring order, or the first error
///   recorded during evaluation (the map is discarded on failure).
pub fn sky_map_tdoa_snr(
    npix: usize,
    gmst: Gmst,
    detectors: &[DetectorTrigger],
    min_distance: Mpc,
    max_distance: Mpc,
    prior: DistancePrior,
    params: &SkyMapParams,
) -> Result<Vec<f64>, SkyLocError> {
    let nside = resolution_from_npix(npix)?;
    if detectors.is_empty() {
        return Err(SkyLocError::NoDetectors);
    }
    if !(min_distance > 0.0 && max_distance > min_distance && max_distance.is_finite()) {
        return Err(SkyLocError::InvalidDistanceBounds(min_distance, max_distance));
    }
    for det in detectors {
        if !(det.horizon > 0.0 && det.horizon.is_finite()) {
            return Err(SkyLocError::InvalidParameter(format!(
                "horizon distances must be positive and finite, got {}",
                det.horizon
            )));
        }
    }

    // Rescale so the largest horizon is 1; only these units reach the
    // integrand, which makes the output invariant under a joint rescaling
    // of horizons and distance bounds.
    let d1max = detectors
        .iter()
        .map(|d| d.horizon)
        .fold(f64::NEG_INFINITY, f64::max);
    let scaled_horizons: Vec<f64> = detectors.iter().map(|d| d.horizon / d1max).collect();
    let xmin = (min_distance / d1max).ln();
    let xmax = (max_distance / d1max).ln();

    let mut map = try_zeroed(npix)?;
    tdoa_log_posterior(&mut map, nside, gmst, detectors);

    let perm = descending_permutation(&map)?;

    // Smallest leading pixel set covering the requested fraction of the
    // TDOA-only posterior mass. The maximum is shifted out before
    // exponentiating; the cut is invariant under that shift.
    let max_log = map[perm[0]];
    let total: f64 = perm.iter().rev().map(|&i| (map[i] - max_log).exp()).sum();
    let mut accum = 0.0;
    let mut maxpix = 0;
    while maxpix < npix && accum <= params.tdoa_mass_fraction * total {
        accum += (map[perm[maxpix]] - max_log).exp();
        maxpix += 1;
    }
    debug!("amplitude phase covers {maxpix} of {npix} pixels");

    // Pixels that missed the cut are out of the posterior for good.
    for &ipix in &perm[maxpix..] {
        map[ipix] = f64::NEG_INFINITY;
    }

    let ctx = AmplitudeContext::new(
        nside,
        gmst,
        detectors,
        scaled_horizons,
        xmin,
        xmax,
        prior,
        params,
    );

    // Parallel amplitude phase: shared inputs are immutable, every worker
    // owns its quadrature workspace, and each retained pixel gets exactly
    // one result slot.
    let amplitudes: Vec<Result<f64, SkyLocError>> = perm[..maxpix]
        .par_iter()
        .map_init(
            || QuadWorkspace::try_new(params.subdivision_limit),
            |workspace, &ipix| match workspace {
                Ok(ws) => amplitude_log_posterior(&ctx, ipix, ws),
                Err(e) => Err(SkyLocError::AllocationFailed(e.clone())),
            },
        )
        .collect();

    // First recorded failure wins, scanned in descending-posterior order;
    // on failure the partially evaluated map dies with this call frame.
    for (&ipix, amplitude) in izip!(&perm[..maxpix], amplitudes) {
        map[ipix] += amplitude?;
    }

    exp_normalize(&mut map)?;
    Ok(map)
}

/// Exponentiate and normalize a log-probability map in place.
///
/// The maximum log-value is shifted out before exponentiating, and the
/// sum runs over ascending values (the descending permutation traversed
/// in reverse) to limit cancellation. Entries of −∞ map to probability
/// zero; a map with no finite entry cannot be normalized and fails.
pub fn exp_normalize(map: &mut [f64]) -> Result<(), SkyLocError> {
    if map.is_empty() {
        return Ok(());
    }

    let perm = descending_permutation(map)?;
    let max_log = map[perm[0]];
    if !max_log.is_finite() {
        return Err(SkyLocError::DegenerateAmplitude(
            "sky map carries no probability mass".into(),
        ));
    }

    for p in map.iter_mut() {
        *p = (*p - max_log).exp();
    }
    let sum: f64 = perm.iter().rev().map(|&i| map[i]).sum();
    for p in map.iter_mut() {
        *p /= sum;
    }
    Ok(())
}

/// Number of pixels in the smallest set reaching the given cumulative
/// probability, greedily by descending probability.
///
/// Expects a normalized map (as returned by the localizers).
pub fn credible_region_npix(map: &[f64], credibility: f64) -> Result<usize, SkyLocError> {
    if !(0.0..=1.0).contains(&credibility) {
        return Err(SkyLocError::InvalidParameter(format!(
            "credibility must lie in [0, 1], got {credibility}"
        )));
    }

    let perm = descending_permutation(map)?;
    let mut accum = 0.0;
    let mut count = 0;
    for &ipix in &perm {
        if accum >= credibility {
            break;
        }
        accum += map[ipix];
        count += 1;
    }
    Ok(count)
}

/// Solid angle (steradians) of the credible region of
/// [`credible_region_npix`].
pub fn credible_region_area(map: &[f64], credibility: f64) -> Result<f64, SkyLocError> {
    // Validates that the map length is a legal pixelization.
    resolution_from_npix(map.len())?;
    Ok(credible_region_npix(map, credibility)? as f64 * pixel_area(map.len()))
}

/// Zero-filled buffer with a fallible allocation, so an out-of-memory
/// condition surfaces as a status instead of aborting.
fn try_zeroed(len: usize) -> Result<Vec<f64>, SkyLocError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, 0.0);
    Ok(v)
}

/// Pixel indices sorted by descending value.
fn descending_permutation(values: &[f64]) -> Result<Vec<usize>, SkyLocError> {
    let mut perm = Vec::new();
    perm.try_reserve_exact(values.len())?;
    perm.extend(0..values.len());
    perm.sort_unstable_by(|&i, &j| values[j].total_cmp(&values[i]));
    Ok(perm)
}
