#[cfg(test)]
mod tests {
    use crate::cluster::{BoundingBox, Region};

    #[test]
    fn test_region_bbox() {
        let region = Region::new(37.4316, -78.6569, 5.0, 4.0).unwrap();
        let bbox = region.bbox();
        assert!((bbox.west + 80.6569).abs() < 1e-9);
        assert!((bbox.east + 76.6569).abs() < 1e-9);
        assert!((bbox.south - 34.9316).abs() < 1e-9);
        assert!((bbox.north - 39.9316).abs() < 1e-9);
    }

    #[test]
    fn test_region_zoom() {
        let zoom = |delta: f64| Region::new(0.0, 0.0, delta, delta).unwrap().zoom();
        assert_eq!(zoom(360.0), -1);
        assert_eq!(zoom(180.0), 0);
        assert_eq!(zoom(5.0), 5);
        assert_eq!(zoom(0.01), 14);
    }

    #[test]
    fn test_region_parse() {
        let region: Region = "37.4316,-78.6569,5,5".parse().unwrap();
        assert_eq!(region.longitude_delta, 5.0);
        assert!("37.4316,-78.6569,0,5".parse::<Region>().is_err());
        assert!("37.4316,-78.6569,5".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_across_antimeridian() {
        let bbox = Region::new(0.0, 179.0, 10.0, 10.0).unwrap().bbox();
        assert_eq!(bbox, BoundingBox::new(174.0, -5.0, 184.0, 5.0));
    }
}
