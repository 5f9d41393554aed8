//! Per-pixel amplitude marginalization.
//!
//! The matched-filter amplitudes constrain sky position through the
//! detector antenna patterns: a direction is favored when one set of
//! (distance, inclination, polarization) values makes every detector's
//! predicted amplitude agree with what was measured. Per pixel this means
//! a regular lattice in `(u = cos ι, 2ψ)`, an adaptive quadrature over
//! `ln r` at every lattice node, and a log-sum-exp reduction of the node
//! contributions.
//!
//! Everything here runs inside the parallel phase of the pipeline: the
//! context is shared immutably, the quadrature workspace is per worker,
//! and failures are reported through the per-pixel `Result` rather than
//! any global state.

use std::f64::consts::FRAC_PI_2;

use itertools::izip;
use smallvec::SmallVec;

use crate::constants::{Gmst, DPI};
use crate::detector::{antenna_response, DetectorTrigger};
use crate::healpix::ring_to_angles;
use crate::posterior::radial::{DistancePrior, RadialIntegrand};
use crate::posterior::SkyMapParams;
use crate::quadrature::{integrate_with_breakpoints, QuadWorkspace};
use crate::skyloc_errors::SkyLocError;

/// Node tables of the `(cos ι, 2ψ)` lattice, precomputed once per call and
/// shared read-only by every pixel.
///
/// The inclination enters the per-detector amplitude only through
/// `1 + 6u² + u⁴` (circular part) and `(1 − u²)²` (linear part), so those
/// polynomials are tabulated instead of `u` itself.
#[derive(Debug)]
pub(crate) struct PolarizationLattice {
    u_plus: Vec<f64>,
    u_cross: Vec<f64>,
    cos_2psi: Vec<f64>,
    sin_2psi: Vec<f64>,
}

impl PolarizationLattice {
    pub(crate) fn new(params: &SkyMapParams) -> Self {
        let mut u_plus = Vec::with_capacity(params.nu + 1);
        let mut u_cross = Vec::with_capacity(params.nu + 1);
        // u >= 0 suffices by symmetry; the u = 0 boundary is included.
        for j in 0..=params.nu {
            let u = j as f64 / params.nu as f64;
            let u2 = u * u;
            let u4 = u2 * u2;
            u_plus.push(1.0 + 6.0 * u2 + u4);
            u_cross.push((1.0 - u2) * (1.0 - u2));
        }

        let mut cos_2psi = Vec::with_capacity(params.npsi);
        let mut sin_2psi = Vec::with_capacity(params.npsi);
        for k in 0..params.npsi {
            let (s, c) = (DPI * k as f64 / params.npsi as f64).sin_cos();
            cos_2psi.push(c);
            sin_2psi.push(s);
        }

        Self {
            u_plus,
            u_cross,
            cos_2psi,
            sin_2psi,
        }
    }
}

/// Read-only inputs of the parallel amplitude phase.
#[derive(Debug)]
pub(crate) struct AmplitudeContext<'a> {
    pub(crate) nside: usize,
    pub(crate) gmst: Gmst,
    pub(crate) detectors: &'a [DetectorTrigger],
    /// Horizon distances rescaled so the largest is 1.
    pub(crate) scaled_horizons: Vec<f64>,
    /// Matched-filter amplitudes `|ρ̂|`; the SNR phase is unused.
    pub(crate) abs_snrs: Vec<f64>,
    /// `ln` of the rescaled distance bounds.
    pub(crate) xmin: f64,
    pub(crate) xmax: f64,
    pub(crate) prior: DistancePrior,
    pub(crate) params: &'a SkyMapParams,
    pub(crate) lattice: PolarizationLattice,
}

impl<'a> AmplitudeContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        nside: usize,
        gmst: Gmst,
        detectors: &'a [DetectorTrigger],
        scaled_horizons: Vec<f64>,
        xmin: f64,
        xmax: f64,
        prior: DistancePrior,
        params: &'a SkyMapParams,
    ) -> Self {
        let abs_snrs = detectors.iter().map(|d| d.snr.norm()).collect();
        Self {
            nside,
            gmst,
            detectors,
            scaled_horizons,
            abs_snrs,
            xmin,
            xmax,
            prior,
            params,
            lattice: PolarizationLattice::new(params),
        }
    }
}

/// Amplitude log-posterior of one pixel, marginalized over distance,
/// inclination and polarization.
///
/// Per lattice node the per-detector amplitude collapses to the quadratic
/// coefficients of the radial integrand:
/// `ρ²r² = ⅛ [(F+² + F×²)(1 + 6u² + u⁴)
///            + (1 − u²)² ((F+² − F×²) cos 2ψ + 2 F+ F× sin 2ψ)]`,
/// `A = −½ Σ_j ρ²r²_j`, `B = Σ_j ρr_j |ρ̂_j|`.
///
/// A failed radial integration, or a node with `A ≥ 0` (possible only when
/// every antenna factor vanishes), aborts this pixel with the failure that
/// the pipeline will surface; sibling pixels are unaffected.
pub(crate) fn amplitude_log_posterior(
    ctx: &AmplitudeContext<'_>,
    ipix: usize,
    workspace: &mut QuadWorkspace,
) -> Result<f64, SkyLocError> {
    let (theta, phi) = ring_to_angles(ctx.nside, ipix);

    // Antenna factors at psi = 0, scaled by the rescaled horizons so they
    // carry units of SNR per unit inverse distance.
    let mut factors: SmallVec<[(f64, f64); 8]> = SmallVec::new();
    for (det, &d1) in izip!(ctx.detectors, &ctx.scaled_horizons) {
        let (fp, fx) =
            antenna_response(&det.response, phi, FRAC_PI_2 - theta, 0.0, ctx.gmst);
        factors.push((fp * d1, fx * d1));
    }

    let mut accum = f64::NEG_INFINITY;

    for (&u_plus, &u_cross) in izip!(&ctx.lattice.u_plus, &ctx.lattice.u_cross) {
        for (&cos_2psi, &sin_2psi) in izip!(&ctx.lattice.cos_2psi, &ctx.lattice.sin_2psi) {
            let mut sum_rho2r2 = 0.0;
            let mut b = 0.0;
            for (&(fp, fx), &abs_snr) in izip!(&factors, &ctx.abs_snrs) {
                let fp2 = fp * fp;
                let fx2 = fx * fx;
                // Nonnegative analytically; rounding can push a vanishing
                // amplitude a hair negative, hence the clamp.
                let rho2r2 = (0.125
                    * ((fp2 + fx2) * u_plus
                        + u_cross * ((fp2 - fx2) * cos_2psi + 2.0 * fp * fx * sin_2psi)))
                    .max(0.0);
                sum_rho2r2 += rho2r2;
                b += rho2r2.sqrt() * abs_snr;
            }
            let a = -0.5 * sum_rho2r2;

            if a >= 0.0 {
                return Err(SkyLocError::DegenerateAmplitude(format!(
                    "pixel {ipix}: antenna response vanishes for every detector"
                )));
            }

            let integrand = RadialIntegrand::new(a, b, ctx.prior);
            let breakpoints = integrand.breakpoints(ctx.params.eta, ctx.xmin, ctx.xmax);
            let value = integrate_with_breakpoints(
                |x| integrand.eval(x),
                &breakpoints,
                f64::MIN_POSITIVE,
                ctx.params.quadrature_epsrel,
                ctx.params.subdivision_limit,
                workspace,
            )?;

            // Restore the stabilizing offset; a zero integral contributes
            // nothing rather than poisoning the reduction.
            let log_contrib = value.ln() + integrand.log_offset();
            if log_contrib > f64::NEG_INFINITY {
                accum = log_add_exp(accum, log_contrib);
            }
        }
    }

    Ok(accum)
}

/// `ln(e^x + e^y)` without overflow.
#[inline]
fn log_add_exp(x: f64, y: f64) -> f64 {
    let m = x.max(y);
    if m == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    ((x - m).exp() + (y - m).exp()).ln() + m
}
