use std::f64::consts::PI;
use std::fmt;

/// Semi-major axis of the Krasovsky 1940 ellipsoid, in metres.
const A: f64 = 6378245.0;
/// Eccentricity squared of the same ellipsoid.
const EE: f64 = 0.006_693_421_622_965_943;
const X_PI: f64 = PI * 3000.0 / 180.0;

/// A latitude/longitude pair in decimal degrees.
///
/// The conversions move a point between WGS-84 (what GPS receivers and Exif record), GCJ-02 (the
/// obfuscated datum mandated for maps of mainland China) and BD-09 (Baidu's offset of GCJ-02).
/// The GCJ-02 offset only applies inside a bounding box around China; elsewhere WGS-84 and
/// GCJ-02 coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPoint {
    latitude: f64,
    longitude: f64,
}

impl GeodeticPoint {
    /// Create a point. Southern latitudes and western longitudes are negative.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    fn outside_china(&self) -> bool {
        !(0.8293..=55.8271).contains(&self.latitude)
            || !(72.004..=137.8347).contains(&self.longitude)
    }

    /// WGS-84 to GCJ-02.
    pub fn from_wgs84_to_gcj02(&self) -> Self {
        if self.outside_china() {
            return *self;
        }
        let x = self.longitude - 105.0;
        let y = self.latitude - 35.0;
        let rad_lat = self.latitude / 180.0 * PI;
        let magic = 1.0 - EE * rad_lat.sin().powi(2);
        let sqrt_magic = magic.sqrt();

        let d_lat = (transform_lat(x, y) * 180.0) / ((A * (1.0 - EE)) / (magic * sqrt_magic) * PI);
        let d_lon = (transform_lon(x, y) * 180.0) / (A / sqrt_magic * rad_lat.cos() * PI);
        Self::new(self.latitude + d_lat, self.longitude + d_lon)
    }

    /// GCJ-02 to WGS-84, by reflecting the forward offset. Accurate to a few metres.
    pub fn from_gcj02_to_wgs84(&self) -> Self {
        let shifted = self.from_wgs84_to_gcj02();
        Self::new(
            self.latitude * 2.0 - shifted.latitude,
            self.longitude * 2.0 - shifted.longitude,
        )
    }

    /// GCJ-02 to BD-09.
    pub fn from_gcj02_to_bd09(&self) -> Self {
        let (lat, lon) = (self.latitude, self.longitude);
        let z = lat.hypot(lon) + 0.00002 * (lat * X_PI).sin();
        let theta = lat.atan2(lon) + 0.000003 * (lon * X_PI).cos();
        Self::new(z * theta.sin() + 0.006, z * theta.cos() + 0.0065)
    }

    /// BD-09 to GCJ-02.
    pub fn from_bd09_to_gcj02(&self) -> Self {
        let lat = self.latitude - 0.006;
        let lon = self.longitude - 0.0065;
        let z = lat.hypot(lon) - 0.00002 * (lat * X_PI).sin();
        let theta = lat.atan2(lon) - 0.000003 * (lon * X_PI).cos();
        Self::new(z * theta.sin(), z * theta.cos())
    }
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Longitude first, as map APIs expect.
impl fmt::Display for GeodeticPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.longitude, self.latitude)
    }
}
