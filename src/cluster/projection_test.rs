#[cfg(test)]
mod tests {
    use crate::cluster::projection::{MAX_LATITUDE, lat_y, lng_x, wrap_lng};

    #[test]
    fn test_lng_x() {
        assert_eq!(lng_x(-180.0), 0.0);
        assert_eq!(lng_x(0.0), 0.5);
        assert_eq!(lng_x(180.0), 1.0);
    }

    #[test]
    fn test_lat_y() {
        assert_eq!(lat_y(0.0), 0.5);
        assert!(lat_y(37.4316) < 0.5);
        assert!(lat_y(-37.4316) > 0.5);
        assert!((lat_y(85.0511287798)).abs() < 1e-9);
        assert!((lat_y(-85.0511287798) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_lat_y_near_poles() {
        // past the Mercator limit latitudes stay apart and ordered
        assert!(lat_y(86.0) < 0.0);
        assert!(lat_y(89.0) < lat_y(86.0) - 0.1);
        assert!(lat_y(-88.0) > 1.0);

        // the poles themselves are capped and finite
        assert!(lat_y(90.0).is_finite());
        assert!(lat_y(-90.0).is_finite());
        assert_eq!(lat_y(90.0), lat_y(MAX_LATITUDE));
        assert_eq!(lat_y(-90.0), lat_y(-MAX_LATITUDE));
    }

    #[test]
    fn test_wrap_lng() {
        assert_eq!(wrap_lng(0.0), 0.0);
        assert_eq!(wrap_lng(-180.0), -180.0);
        assert_eq!(wrap_lng(180.0), -180.0);
        assert_eq!(wrap_lng(190.0), -170.0);
        assert_eq!(wrap_lng(-190.0), 170.0);
        assert_eq!(wrap_lng(540.0), -180.0);
    }
}
