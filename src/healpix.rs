//! Ring-indexed HEALPix (Hierarchical Equal Area isoLatitude Pixelisation).
//!
//! Only the ring scheme is implemented: pixels are ordered by increasing
//! co-latitude and, within each isolatitude ring, by increasing longitude.
//! Downstream consumers persist sky maps one table row per pixel in exactly
//! this order, so the indexing convention is part of the output contract.
//!
//! The sphere splits into three zones:
//! - north polar cap: rings 1..nside-1, ring `i` holding `4i` pixels,
//! - equatorial belt: rings nside..3*nside, `4*nside` pixels each,
//! - south polar cap, mirroring the north.

use std::f64::consts::PI;

use crate::constants::Radian;
use crate::skyloc_errors::SkyLocError;

/// Lateral resolution `nside` for a pixel count of the form `12 * nside^2`.
///
/// Arguments
/// ---------
/// * `npix`: total number of pixels of the map.
///
/// Return
/// ------
/// * `nside` such that `npix == 12 * nside^2`, or
///   [`SkyLocError::InvalidPixelCount`] when no such integer exists.
pub fn resolution_from_npix(npix: usize) -> Result<usize, SkyLocError> {
    let nside = ((npix as f64 / 12.0).sqrt()).round() as usize;
    if nside == 0 || 12 * nside * nside != npix {
        return Err(SkyLocError::InvalidPixelCount(npix));
    }
    Ok(nside)
}

/// Total number of pixels for a given lateral resolution.
pub fn npix_from_resolution(nside: usize) -> usize {
    12 * nside * nside
}

/// Solid angle (steradians) of one pixel of an `npix`-pixel map.
pub fn pixel_area(npix: usize) -> f64 {
    4.0 * PI / npix as f64
}

/// Center of a ring-indexed pixel in spherical coordinates.
///
/// Arguments
/// ---------
/// * `nside`: lateral resolution (validated by [`resolution_from_npix`]).
/// * `ipix`: pixel index in `[0, 12 * nside^2)`, ring ordering.
///
/// Return
/// ------
/// * `(theta, phi)` with co-latitude `theta` in `[0, π]` and longitude
///   `phi` in `[0, 2π)`.
///
/// Deterministic and O(1); the caller is responsible for the index bound.
pub fn ring_to_angles(nside: usize, ipix: usize) -> (Radian, Radian) {
    let npix = npix_from_resolution(nside);
    debug_assert!(ipix < npix);

    let n = nside as f64;
    // pixels strictly inside the north polar cap
    let ncap = 2 * nside * (nside - 1);
    // 1-based index, matching the classical ring formulas
    let p1 = ipix + 1;

    if p1 <= ncap {
        // North polar cap. Invert p1 = 2 i (i - 1) + j for the ring index i
        // counted from the pole and the in-ring index j in [1, 4i].
        let hip = p1 as f64 / 2.0;
        let i = (hip - hip.floor().sqrt()).sqrt().floor() as usize + 1;
        let j = p1 - 2 * i * (i - 1);
        let ring = i as f64;
        let z = 1.0 - ring * ring / (3.0 * n * n);
        let phi = (j as f64 - 0.5) * PI / (2.0 * ring);
        (z.acos(), phi)
    } else if p1 <= 2 * nside * (5 * nside + 1) {
        // Equatorial belt: rings of constant length 4 nside, alternately
        // staggered by half a pixel width.
        let ip = ipix - ncap;
        let i = ip / (4 * nside) + nside;
        let j = ip % (4 * nside) + 1;
        // 1 when i + nside is odd, 1/2 otherwise
        let fodd = 0.5 * (1 + (i + nside) % 2) as f64;
        let z = (2.0 * n - i as f64) / (1.5 * n);
        let phi = (j as f64 - fodd) * PI / (2.0 * n);
        (z.acos(), phi)
    } else {
        // South polar cap, mirrored from the north.
        let ip = npix - ipix;
        let hip = ip as f64 / 2.0;
        let i = (hip - hip.floor().sqrt()).sqrt().floor() as usize + 1;
        let j = 4 * i + 1 - (ip - 2 * i * (i - 1));
        let ring = i as f64;
        let z = -1.0 + ring * ring / (3.0 * n * n);
        let phi = (j as f64 - 0.5) * PI / (2.0 * ring);
        (z.acos(), phi)
    }
}
