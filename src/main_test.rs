#[cfg(test)]
mod tests {
    use crate::{Args, Columns, node_record, query, read_points};
    use clap::Parser;
    use geocluster::cluster::{ClusterNode, ClusterOptions, Point, SpatialClusterIndex};
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).expect("Failed to create test CSV");
        path
    }

    #[test]
    fn test_main_program() {
        let test_csv = "id,name,latitude,longitude
1,Barboursville Vineyards,38.1557,-78.2108
2,Keswick Vineyards,38.0712,-78.3586
3,King Family Vineyards,38.0302,-78.7449
4,Breaux Vineyards,39.2227,-77.6949
5,Chatham Vineyards,37.4955,-75.8975
6,Somewhere Else,not-a-number,-78.0";

        let test_file = write_temp("geocluster_test_points.csv", test_csv);
        let points = read_points(&test_file).expect("Failed to read CSV");
        fs::remove_file(&test_file).ok();

        assert_eq!(points.len(), 5);
        assert_eq!(
            points[0],
            Point::new("1", 38.1557, -78.2108, "Barboursville Vineyards")
        );

        let index = SpatialClusterIndex::build(&points, ClusterOptions::default()).unwrap();
        let args = Args::parse_from(["geocluster", "--zoom", "0"]);
        let (header, records) = query(&index, &args).unwrap();

        assert_eq!(header[0], "kind");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][0], "cluster");
        assert_eq!(records[0][4], "5");

        let cluster_id = records[0][1].clone();
        let args = Args::parse_from(["geocluster", "--leaves", cluster_id.as_str(), "--limit", "2"]);
        let (_, leaves) = query(&index, &args).unwrap();
        assert_eq!(leaves.len(), 2);
        assert!(leaves.iter().all(|r| r[0] == "point" && r[4] == "1"));

        let args = Args::parse_from(["geocluster", "--expansion-zoom", cluster_id.as_str()]);
        let (header, rows) = query(&index, &args).unwrap();
        assert_eq!(header, vec!["cluster_id", "expansion_zoom"]);
        assert_eq!(rows[0][0], cluster_id);
    }

    #[test]
    fn test_read_points_without_header() {
        let test_csv = "40.7128,-74.0060
40.7130,-74.0062,nyc-2,Second
40.7132";

        let test_file = write_temp("geocluster_test_no_header.csv", test_csv);
        let points = read_points(&test_file).expect("Failed to read CSV");
        fs::remove_file(&test_file).ok();

        assert_eq!(
            points,
            vec![
                Point::new("0", 40.7128, -74.0060, ""),
                Point::new("nyc-2", 40.7130, -74.0062, "Second"),
            ]
        );
    }

    #[test]
    fn test_columns_from_header() {
        let header: Vec<String> = ["Name", "Lng", "Lat"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            Columns::from_header(&header).unwrap(),
            Columns {
                latitude: 2,
                longitude: 1,
                id: None,
                label: Some(0),
            }
        );

        let header = vec!["name".to_string(), "address".to_string()];
        assert!(Columns::from_header(&header).is_err());
    }

    #[test]
    fn test_region_query() {
        let points = vec![
            Point::new("a", 37.4316, -78.6569, ""),
            Point::new("b", 37.5, -78.5, ""),
            Point::new("c", 10.0, 10.0, ""),
        ];
        let index = SpatialClusterIndex::build(&points, ClusterOptions::default()).unwrap();

        // the initial map view: Virginia with 5 degree spans, zoom 5
        let args = Args::parse_from(["geocluster", "--region", "37.4316,-78.6569,5,5"]);
        let (_, records) = query(&index, &args).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][4], "2");

        let args = Args::parse_from(["geocluster", "--bbox", "-180,-90,180,90", "-z", "16"]);
        let (_, records) = query(&index, &args).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_node_record() {
        let leaf = ClusterNode::Leaf(Point::new("7", 1.5, -2.25, "Winery"));
        assert_eq!(node_record(&leaf), vec!["point", "7", "1.5", "-2.25", "1", "Winery"]);
    }

    #[test]
    fn test_unknown_cluster_is_an_error() {
        let index = SpatialClusterIndex::build(&[], ClusterOptions::default()).unwrap();
        let args = Args::parse_from(["geocluster", "--children", "3"]);
        assert!(query(&index, &args).is_err());
    }
}
