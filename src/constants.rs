use std::f64::consts::PI;

pub const DPI: f64 = 2. * PI;

/// Speed of light (m/s)
pub const VLIGHT: f64 = 2.99792458e8;

/// Square degrees per steradian
pub const DEG2_PER_STERAD: f64 = (180.0 / PI) * (180.0 / PI);

// type def
pub type Radian = f64;
pub type Seconds = f64;
/// Luminosity distance, same unit as the detector horizons (conventionally Mpc)
pub type Mpc = f64;
/// Greenwich mean sidereal time in radians
pub type Gmst = f64;
