//! Detector trigger records and interferometer geometry.
//!
//! A [`DetectorTrigger`] bundles everything one detector contributes to a
//! localization: where the instrument sits, how it responds to the two
//! gravitational-wave polarizations, and what its matched filter measured.
//! The record is immutable for the duration of one evaluation.

use nalgebra::{Matrix3, Vector3};
use num_complex::Complex64;

use crate::constants::{Mpc, Radian, Seconds, VLIGHT};

/// One detector's contribution to a localization.
///
/// Fields
/// ------
/// * `response`: 3×3 detector response tensor `D = (X⊗X − Y⊗Y)/2` built from
///   the arm direction vectors, in single precision as catalogued.
/// * `location`: geocentric Cartesian position of the detector vertex (m).
/// * `horizon`: distance at which a reference source would produce SNR = 1
///   in this detector, same unit for every detector (conventionally Mpc).
/// * `toa`: time of arrival of the trigger (s). Any epoch; only differences
///   between detectors matter.
/// * `snr`: complex matched-filter SNR at the trigger time. The current
///   algorithm uses only the magnitude; the phase is carried for interface
///   stability.
/// * `s2_toa`: measurement variance of the time of arrival (s²).
#[derive(Debug, Clone)]
pub struct DetectorTrigger {
    pub response: Matrix3<f32>,
    pub location: Vector3<f64>,
    pub horizon: Mpc,
    pub toa: Seconds,
    pub snr: Complex64,
    pub s2_toa: f64,
}

/// Antenna pattern (F+, F×) of a detector for a given source geometry.
///
/// Evaluates the standard long-wavelength plane-wave response: the
/// polarization basis vectors X, Y of the wave frame are contracted with
/// the detector response tensor,
/// `F+ = XᵀDX − YᵀDY`, `F× = XᵀDY + YᵀDX`.
///
/// Arguments
/// ---------
/// * `response`: 3×3 detector response tensor.
/// * `ra`: source right ascension (rad).
/// * `dec`: source declination (rad).
/// * `psi`: polarization angle (rad).
/// * `gmst`: Greenwich mean sidereal time (rad), rotating the equatorial
///   frame onto the Earth-fixed frame.
///
/// Return
/// ------
/// * `(f_plus, f_cross)`, both dimensionless in [-1, 1].
pub fn antenna_response(
    response: &Matrix3<f32>,
    ra: Radian,
    dec: Radian,
    psi: Radian,
    gmst: Radian,
) -> (f64, f64) {
    // Greenwich hour angle of the source
    let gha = gmst - ra;

    let (singha, cosgha) = gha.sin_cos();
    let (sindec, cosdec) = dec.sin_cos();
    let (sinpsi, cospsi) = psi.sin_cos();

    let x = Vector3::new(
        -cospsi * singha - sinpsi * cosgha * sindec,
        -cospsi * cosgha + sinpsi * singha * sindec,
        sinpsi * cosdec,
    );
    let y = Vector3::new(
        sinpsi * singha - cospsi * cosgha * sindec,
        sinpsi * cosgha + cospsi * singha * sindec,
        cospsi * cosdec,
    );

    let d: Matrix3<f64> = response.cast();
    let dx = d * x;
    let dy = d * y;

    (x.dot(&dx) - y.dot(&dy), x.dot(&dy) + y.dot(&dx))
}

/// Light propagation delay from the geocenter to a detector.
///
/// `n_hat` is the unit vector toward the source expressed in the
/// Earth-fixed frame; the wavefront reaches the detector `n̂·loc/c` before
/// it reaches the geocenter, so adding the returned value to a measured
/// arrival time refers it to the geocenter.
#[inline]
pub fn travel_time_delay(location: &Vector3<f64>, n_hat: &Vector3<f64>) -> Seconds {
    n_hat.dot(location) / VLIGHT
}

/// Unit vector toward a sky direction `(theta, phi)` in the Earth-fixed
/// frame, where `phi` is equatorial longitude and `gmst` rotates it to
/// geographic longitude.
#[inline]
pub fn line_of_sight(theta: Radian, phi: Radian, gmst: Radian) -> Vector3<f64> {
    let lon = phi - gmst;
    let (sintheta, costheta) = theta.sin_cos();
    let (sinlon, coslon) = lon.sin_cos();
    Vector3::new(sintheta * coslon, sintheta * sinlon, costheta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    /// Response tensor of an ideal L-shaped detector with arms along the
    /// geographic x and y axes: D = (x̂⊗x̂ − ŷ⊗ŷ)/2.
    fn xy_arms_response() -> Matrix3<f32> {
        Matrix3::new(0.5, 0.0, 0.0, 0.0, -0.5, 0.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn overhead_source_sees_full_plus_response() {
        // Source at the geographic north pole is orthogonal to both arms
        // of the x/y detector: |F+| = 1, F× = 0 for psi = 0.
        let d = xy_arms_response();
        let (fp, fx) = antenna_response(&d, 0.0, FRAC_PI_2, 0.0, 0.0);
        assert_relative_eq!(fp.abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(fx, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn polarization_angle_rotates_the_pattern() {
        // (F+, F×) rotates by 2ψ in the polarization plane:
        // F+(ψ) = F+ cos2ψ + F× sin2ψ, F×(ψ) = −F+ sin2ψ + F× cos2ψ.
        let d = xy_arms_response();
        let (ra, dec, gmst) = (1.1, -0.4, 2.3);
        let (fp0, fx0) = antenna_response(&d, ra, dec, 0.0, gmst);
        for psi in [0.3, FRAC_PI_4, 1.9] {
            let (fp, fx) = antenna_response(&d, ra, dec, psi, gmst);
            let (s, c) = (2.0 * psi).sin_cos();
            assert_relative_eq!(fp, fp0 * c + fx0 * s, epsilon = 1e-12);
            assert_relative_eq!(fx, -fp0 * s + fx0 * c, epsilon = 1e-12);
        }
    }

    #[test]
    fn pattern_magnitude_is_psi_invariant() {
        let d = xy_arms_response();
        let (fp0, fx0) = antenna_response(&d, 0.7, 0.2, 0.0, 4.0);
        let (fp1, fx1) = antenna_response(&d, 0.7, 0.2, 1.234, 4.0);
        assert_relative_eq!(
            fp0 * fp0 + fx0 * fx0,
            fp1 * fp1 + fx1 * fx1,
            epsilon = 1e-12
        );
    }

    #[test]
    fn gmst_shift_equals_ra_shift() {
        // The pattern depends on ra and gmst only through the hour angle.
        let d = xy_arms_response();
        let shift = 0.83;
        let (fp0, fx0) = antenna_response(&d, 0.5, 0.3, 0.1, 2.0);
        let (fp1, fx1) = antenna_response(&d, 0.5 + shift, 0.3, 0.1, 2.0 + shift);
        assert_relative_eq!(fp0, fp1, epsilon = 1e-12);
        assert_relative_eq!(fx0, fx1, epsilon = 1e-12);
    }

    #[test]
    fn delay_extremes_along_the_detector_axis() {
        let loc = Vector3::new(6.4e6, 0.0, 0.0);
        // Source along +x: wavefront hits the detector first.
        let n = line_of_sight(FRAC_PI_2, 0.0, 0.0);
        assert_relative_eq!(travel_time_delay(&loc, &n), 6.4e6 / VLIGHT, epsilon = 1e-12);
        // Opposite direction flips the sign.
        let n = line_of_sight(FRAC_PI_2, PI, 0.0);
        assert_relative_eq!(
            travel_time_delay(&loc, &n),
            -6.4e6 / VLIGHT,
            epsilon = 1e-12
        );
        // Orthogonal direction: no delay.
        let n = line_of_sight(0.0, 0.0, 0.0);
        assert_relative_eq!(travel_time_delay(&loc, &n), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn line_of_sight_is_unit_length() {
        for theta in [0.0, 0.4, FRAC_PI_2, 2.8, PI] {
            for phi in [0.0, 1.0, 3.5, 6.0] {
                let n = line_of_sight(theta, phi, 1.7);
                assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
            }
        }
    }
}
