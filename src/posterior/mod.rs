//! # Sky map posterior evaluation
//!
//! This module hosts the numerical heart of the crate: the TDOA-only
//! log-posterior ([`tdoa`]), the per-pixel amplitude marginalization over
//! polarization, inclination and distance ([`amplitude`]), and the radial
//! integrand with its analytic breakpoints ([`radial`]).
//!
//! [`SkyMapParams`] centralizes the tuning knobs of the evaluation. The
//! defaults reproduce the values the pipeline has been validated with;
//! none of them is derived from first principles, so treat them as tuned
//! constants rather than physics.
//!
//! ## Example
//!
//! ```rust,no_run
//! use skyloc::SkyMapParams;
//!
//! let params = SkyMapParams::builder()
//!     .lattice_nodes(24, 24)
//!     .quadrature_epsrel(0.01)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;

use crate::skyloc_errors::SkyLocError;

pub mod amplitude;
pub mod radial;
pub mod tdoa;

/// Tuning parameters for the sky map posterior evaluation.
///
/// Fields
/// ------
/// * `nu`: number of lattice steps in `u = cos ι`; the lattice has `nu + 1`
///   nodes on `[0, 1]` (only non-negative `u` is needed by symmetry).
/// * `npsi`: number of lattice nodes in `2ψ`, uniform on `[0, 2π)`.
/// * `eta`: fraction of the radial likelihood peak height enclosed by the
///   analytic integration breakpoints.
/// * `quadrature_epsrel`: relative tolerance of the adaptive radial
///   quadrature (absolute tolerance is pinned to `f64::MIN_POSITIVE`).
/// * `subdivision_limit`: maximum number of subintervals the adaptive
///   quadrature may hold; exceeding it is a convergence failure.
/// * `tdoa_mass_fraction`: fraction of the TDOA-only posterior mass the
///   retained top pixels must cover before the amplitude phase runs.
///
/// Defaults
/// --------
/// `nu = npsi = 16`, `eta = 0.01`, `quadrature_epsrel = 0.05`,
/// `subdivision_limit = 64`, `tdoa_mass_fraction = 0.9999`. The lattice
/// densities and `eta` are tuned, not derived; raising them buys accuracy
/// linearly in run time.
#[derive(Debug, Clone)]
pub struct SkyMapParams {
    pub nu: usize,
    pub npsi: usize,
    pub eta: f64,
    pub quadrature_epsrel: f64,
    pub subdivision_limit: usize,
    pub tdoa_mass_fraction: f64,
}

impl SkyMapParams {
    /// Equivalent to [`SkyMapParams::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent builder over the defaults, validated by
    /// [`SkyMapParamsBuilder::build`].
    pub fn builder() -> SkyMapParamsBuilder {
        SkyMapParamsBuilder::new()
    }
}

impl Default for SkyMapParams {
    fn default() -> Self {
        SkyMapParams {
            nu: 16,
            npsi: 16,
            eta: 0.01,
            quadrature_epsrel: 0.05,
            subdivision_limit: 64,
            tdoa_mass_fraction: 0.9999,
        }
    }
}

/// Builder for [`SkyMapParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct SkyMapParamsBuilder {
    params: SkyMapParams,
}

impl SkyMapParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: SkyMapParams::default(),
        }
    }

    /// Lattice density in `(cos ι, 2ψ)`.
    pub fn lattice_nodes(mut self, nu: usize, npsi: usize) -> Self {
        self.params.nu = nu;
        self.params.npsi = npsi;
        self
    }
    pub fn eta(mut self, v: f64) -> Self {
        self.params.eta = v;
        self
    }
    pub fn quadrature_epsrel(mut self, v: f64) -> Self {
        self.params.quadrature_epsrel = v;
        self
    }
    pub fn subdivision_limit(mut self, v: usize) -> Self {
        self.params.subdivision_limit = v;
        self
    }
    pub fn tdoa_mass_fraction(mut self, v: f64) -> Self {
        self.params.tdoa_mass_fraction = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// ----------------
    /// * `nu >= 1`, `npsi >= 1`,
    /// * `0 < eta < 1`,
    /// * `quadrature_epsrel > 0`,
    /// * `subdivision_limit >= 1`,
    /// * `0 < tdoa_mass_fraction <= 1`.
    ///
    /// NaN fails every comparison and is therefore rejected wherever a
    /// bound applies.
    pub fn build(self) -> Result<SkyMapParams, SkyLocError> {
        let p = &self.params;

        if p.nu == 0 || p.npsi == 0 {
            return Err(SkyLocError::InvalidParameter(
                "lattice densities must be >= 1".into(),
            ));
        }
        if !(p.eta > 0.0 && p.eta < 1.0) {
            return Err(SkyLocError::InvalidParameter(
                "eta must lie strictly inside (0, 1)".into(),
            ));
        }
        if !(p.quadrature_epsrel > 0.0) {
            return Err(SkyLocError::InvalidParameter(
                "quadrature_epsrel must be > 0".into(),
            ));
        }
        if p.subdivision_limit == 0 {
            return Err(SkyLocError::InvalidParameter(
                "subdivision_limit must be >= 1".into(),
            ));
        }
        if !(p.tdoa_mass_fraction > 0.0 && p.tdoa_mass_fraction <= 1.0) {
            return Err(SkyLocError::InvalidParameter(
                "tdoa_mass_fraction must lie in (0, 1]".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for SkyMapParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Sky map posterior parameters")?;
            writeln!(f, "----------------------------")?;
            writeln!(f, "  nu                 = {:<8} # cos(inclination) lattice steps", self.nu)?;
            writeln!(f, "  npsi               = {:<8} # 2*psi lattice nodes", self.npsi)?;
            writeln!(f, "  eta                = {:<8} # peak enclosure fraction", self.eta)?;
            writeln!(
                f,
                "  quadrature_epsrel  = {:<8} # radial integration tolerance",
                self.quadrature_epsrel
            )?;
            writeln!(
                f,
                "  subdivision_limit  = {:<8} # adaptive quadrature budget",
                self.subdivision_limit
            )?;
            writeln!(
                f,
                "  tdoa_mass_fraction = {:<8} # TDOA mass kept for the amplitude phase",
                self.tdoa_mass_fraction
            )
        } else {
            write!(
                f,
                "SkyMapParams(nu={}, npsi={}, eta={}, epsrel={}, limit={}, tdoa_mass={})",
                self.nu,
                self.npsi,
                self.eta,
                self.quadrature_epsrel,
                self.subdivision_limit,
                self.tdoa_mass_fraction
            )
        }
    }
}
