pub mod formulas;

pub use formulas::{
    bd09_to_gcj02, bd09_to_wgs84, gcj02_to_bd09, gcj02_to_wgs84, out_of_china, wgs84_to_bd09,
    wgs84_to_gcj02,
};

use crate::models::CoordinateSystem;

/// Convert a (lon, lat) pair between any two systems.
///
/// Identical systems return the input unchanged.
pub fn transform(lon: f64, lat: f64, from: CoordinateSystem, to: CoordinateSystem) -> (f64, f64) {
    use CoordinateSystem::*;

    match (from, to) {
        (Bd09, Bd09) | (Gcj02, Gcj02) | (Wgs84, Wgs84) => (lon, lat),
        (Bd09, Gcj02) => bd09_to_gcj02(lon, lat),
        (Bd09, Wgs84) => bd09_to_wgs84(lon, lat),
        (Gcj02, Bd09) => gcj02_to_bd09(lon, lat),
        (Gcj02, Wgs84) => gcj02_to_wgs84(lon, lat),
        (Wgs84, Bd09) => wgs84_to_bd09(lon, lat),
        (Wgs84, Gcj02) => wgs84_to_gcj02(lon, lat),
    }
}
