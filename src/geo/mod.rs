//! Geodetic coordinates and the conversions between the datums used by Chinese map providers.

mod geodetic;

pub use geodetic::GeodeticPoint;
