//! Shared fixtures: the three standard interferometer sites and trigger
//! builders used across the integration suite.

use nalgebra::{Matrix3, Vector3};
use num_complex::Complex64;

use skyloc::detector::{line_of_sight, travel_time_delay};
use skyloc::DetectorTrigger;

/// Static geometry of one interferometer site.
pub struct Site {
    pub response: Matrix3<f32>,
    pub location: Vector3<f64>,
}

/// LIGO Hanford.
pub fn hanford() -> Site {
    Site {
        response: Matrix3::new(
            -0.392_614_1,
            -0.077_613_0,
            -0.247_388_6,
            -0.077_613_0,
            0.319_524_4,
            0.227_998_1,
            -0.247_388_6,
            0.227_998_1,
            0.073_090_3,
        ),
        location: Vector3::new(-2.161_414_926_36e6, -3.834_695_178_89e6, 4.600_350_226_64e6),
    }
}

/// LIGO Livingston.
pub fn livingston() -> Site {
    Site {
        response: Matrix3::new(
            0.411_280_9,
            0.140_209_7,
            0.247_294_3,
            0.140_209_7,
            -0.109_005_6,
            -0.181_615_7,
            0.247_294_3,
            -0.181_615_7,
            -0.302_275_5,
        ),
        location: Vector3::new(-7.427_604_472_38e4, -5.496_283_719_71e6, 3.224_257_017_44e6),
    }
}

/// Virgo.
pub fn virgo() -> Site {
    Site {
        response: Matrix3::new(
            0.243_874_0,
            -0.099_083_8,
            -0.232_576_2,
            -0.099_083_8,
            -0.447_825_8,
            0.187_833_1,
            -0.232_576_2,
            0.187_833_1,
            0.203_951_8,
        ),
        location: Vector3::new(4.546_374_099e6, 8.429_896_976_26e5, 4.378_576_962_41e6),
    }
}

/// Trigger record for a site with explicit measurements.
pub fn trigger(site: &Site, toa: f64, snr: Complex64, s2_toa: f64, horizon: f64) -> DetectorTrigger {
    DetectorTrigger {
        response: site.response,
        location: site.location,
        horizon,
        toa,
        snr,
        s2_toa,
    }
}

/// Arrival time at a site for a wavefront from `(theta, phi)` crossing the
/// geocenter at t = 0.
pub fn toa_from_direction(site: &Site, theta: f64, phi: f64, gmst: f64) -> f64 {
    let n_hat = line_of_sight(theta, phi, gmst);
    -travel_time_delay(&site.location, &n_hat)
}

/// Great-circle separation between two `(theta, phi)` directions.
pub fn angular_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let na = line_of_sight(a.0, a.1, 0.0);
    let nb = line_of_sight(b.0, b.1, 0.0);
    na.dot(&nb).clamp(-1.0, 1.0).acos()
}

/// Index of the largest map entry.
pub fn argmax(map: &[f64]) -> usize {
    map.iter()
        .enumerate()
        .max_by(|(_, x), (_, y)| x.total_cmp(y))
        .map(|(i, _)| i)
        .unwrap()
}
