/// Mean Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub struct GeodesyHelper;

impl GeodesyHelper {
    /// Great-circle distance between two points, in nautical miles.
    pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lon = (lon2 - lon1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_NM * c
    }

    /// Sixteen-point compass label for a heading.
    pub fn cardinal(heading_deg: f64) -> &'static str {
        let normalized = heading_deg.rem_euclid(360.0);
        let index = (normalized / 22.5).round() as usize % CARDINALS.len();
        CARDINALS[index]
    }

    /// Half-extent of a square bounding box covering `radius_nm` around a
    /// latitude, as (lat degrees, lon degrees).
    pub fn bounding_extent(lat: f64, radius_nm: f64) -> (f64, f64) {
        let lat_deg = radius_nm / 60.0;
        let lon_deg = radius_nm / (60.0 * lat.to_radians().cos().max(1e-6));
        (lat_deg, lon_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_sixty_nm() {
        let distance = GeodesyHelper::haversine_nm(0.0, 0.0, 1.0, 0.0);
        assert!((distance - 60.04).abs() < 0.05);
        assert_eq!(GeodesyHelper::haversine_nm(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn cardinal_wraps_around() {
        assert_eq!(GeodesyHelper::cardinal(0.0), "N");
        assert_eq!(GeodesyHelper::cardinal(359.0), "N");
        assert_eq!(GeodesyHelper::cardinal(-90.0), "W");
        assert_eq!(GeodesyHelper::cardinal(135.0), "SE");
    }
}
