//! # skyloc
//!
//! Rapid Bayesian sky localization of compact binary inspiral candidates.
//!
//! Given a handful of detector triggers (arrival times, complex
//! matched-filter SNRs, response tensors, locations, horizon distances),
//! the crate evaluates the posterior probability of the source direction
//! on a ring-indexed equal-area pixelization of the sphere, marginalizing
//! luminosity distance, inclination and polarization.
//!
//! Two entry points are exposed: [`sky_map_tdoa`] localizes from arrival
//! times alone, [`sky_map_tdoa_snr`] folds in the amplitude information
//! and is the primary product. Both return a normalized probability per
//! pixel in ring order.
//!
//! ```rust,no_run
//! use skyloc::{sky_map_tdoa_snr, DetectorTrigger, DistancePrior, SkyMapParams};
//!
//! # let detectors: Vec<DetectorTrigger> = unimplemented!();
//! let params = SkyMapParams::default();
//! let map = sky_map_tdoa_snr(
//!     3072,
//!     1.234,
//!     &detectors,
//!     1.0,
//!     1000.0,
//!     DistancePrior::UniformInVolume,
//!     &params,
//! )?;
//! assert_eq!(map.len(), 3072);
//! # Ok::<(), skyloc::SkyLocError>(())
//! ```

pub mod constants;
pub mod detector;
pub mod healpix;
pub mod posterior;
pub mod quadrature;
pub mod sky_map;
pub mod skyloc_errors;

pub use detector::DetectorTrigger;
pub use posterior::radial::DistancePrior;
pub use posterior::{SkyMapParams, SkyMapParamsBuilder};
pub use sky_map::{
    credible_region_area, credible_region_npix, exp_normalize, sky_map_tdoa, sky_map_tdoa_snr,
};
pub use skyloc_errors::SkyLocError;
