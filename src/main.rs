//! Geo point clustering tool for map markers
//!
//! Reads geographic points from a CSV file, builds a hierarchical cluster
//! index, and prints the markers visible in a viewport or the contents of a
//! single cluster.

use clap::Parser;
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, warn};
use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use geocluster::cluster::{
    BoundingBox, ClusterNode, ClusterOptions, Point, PointList, Region, SpatialClusterIndex,
};

#[cfg(test)]
mod main_test;

#[derive(Parser)]
#[command(name = "geocluster")]
#[command(about = "Hierarchical geo point clustering for map markers", long_about = None)]
struct Args {
    /// Input CSV file with latitude,longitude[,id[,label]] columns
    #[arg(short, long, default_value = "points.csv")]
    input: PathBuf,

    /// Output CSV file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Cluster radius in pixels
    #[arg(short, long, default_value_t = 40.0)]
    radius: f64,

    /// Tile extent the radius is measured against
    #[arg(long, default_value_t = 512.0)]
    extent: f64,

    /// Minimum number of points to form a cluster
    #[arg(short = 'm', long, default_value_t = 2)]
    min_points: usize,

    #[arg(long, default_value_t = 0)]
    min_zoom: i32,

    #[arg(long, default_value_t = 16)]
    max_zoom: i32,

    /// KD-tree bucket size
    #[arg(long, default_value_t = 64)]
    node_size: usize,

    /// Zoom level to query
    #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
    zoom: i32,

    /// Viewport as west,south,east,north (default: whole world)
    #[arg(short, long, allow_hyphen_values = true, conflicts_with = "region")]
    bbox: Option<BoundingBox>,

    /// Viewport as latitude,longitude,latitude_delta,longitude_delta; sets the zoom too
    #[arg(long, allow_hyphen_values = true)]
    region: Option<Region>,

    /// Print the points of this cluster instead of a viewport
    #[arg(long, conflicts_with_all = ["children", "expansion_zoom"])]
    leaves: Option<usize>,

    /// Maximum number of leaves to print
    #[arg(long, requires = "leaves")]
    limit: Option<usize>,

    /// Number of leaves to skip
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Print the nodes merged into this cluster
    #[arg(long, conflicts_with = "expansion_zoom")]
    children: Option<usize>,

    /// Print the zoom level at which this cluster splits
    #[arg(long)]
    expansion_zoom: Option<usize>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            radius: self.radius,
            extent: self.extent,
            min_points: self.min_points,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            node_size: self.node_size,
        }
    }
}

fn main() {
    let args = Args::parse();

    let env = env_logger::Env::default().default_filter_or("warn");
    let mut logger = env_logger::Builder::from_env(env);
    if args.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let points = read_points(&args.input)?;
    debug!("Read {} points from {:?}", points.len(), args.input);

    let index = SpatialClusterIndex::build(&points, args.cluster_options())?;
    if index.is_empty() {
        warn!("No points found in {:?}", args.input);
    }

    let (header, records) = query(&index, args)?;
    debug!("Writing {} records", records.len());

    match &args.output {
        None => write_records(io::stdout().lock(), &header, &records)?,
        Some(output_file) => {
            write_records(File::create(output_file)?, &header, &records)?;
            debug!("Output written to {:?}", output_file);
        }
    }
    Ok(())
}

/// CSV records type alias for readability
type CsvRecords = Vec<Vec<String>>;

const NODE_HEADER: [&str; 6] = ["kind", "id", "latitude", "longitude", "point_count", "label"];

/// Runs the query selected by the command line against the index
///
/// Returns the header and the records to print.
fn query(
    index: &SpatialClusterIndex,
    args: &Args,
) -> Result<(Vec<String>, CsvRecords), Box<dyn Error>> {
    let node_header = || -> Vec<String> { NODE_HEADER.iter().map(|s| s.to_string()).collect() };

    if let Some(id) = args.leaves {
        let leaves = index.get_leaves_page(id, args.limit.unwrap_or(usize::MAX), args.offset)?;
        let records = leaves
            .into_iter()
            .map(|p| node_record(&ClusterNode::Leaf(p)))
            .collect();
        return Ok((node_header(), records));
    }

    if let Some(id) = args.children {
        let records = index.get_children(id)?.iter().map(node_record).collect();
        return Ok((node_header(), records));
    }

    if let Some(id) = args.expansion_zoom {
        let zoom = index.get_cluster_expansion_zoom(id)?;
        let header = vec!["cluster_id".to_string(), "expansion_zoom".to_string()];
        return Ok((header, vec![vec![id.to_string(), zoom.to_string()]]));
    }

    let (bbox, zoom) = match args.region {
        Some(region) => (region.bbox(), region.zoom()),
        None => (args.bbox.unwrap_or(BoundingBox::WORLD), args.zoom),
    };
    debug!("Querying {:?} at zoom {}", bbox, zoom);

    let records = index
        .get_clusters(&bbox, zoom)
        .iter()
        .map(node_record)
        .collect();
    Ok((node_header(), records))
}

/// Formats a node as `kind,id,latitude,longitude,point_count,label`
fn node_record(node: &ClusterNode) -> Vec<String> {
    let pos = node.position();
    let (kind, id, label) = match node {
        ClusterNode::Leaf(p) => ("point", p.id.clone(), p.label.clone()),
        ClusterNode::Cluster(c) => ("cluster", c.id.to_string(), String::new()),
    };
    vec![
        kind.to_string(),
        id,
        pos.lat.to_string(),
        pos.lon.to_string(),
        node.point_count().to_string(),
        label,
    ]
}

/// Positions of the point fields within a CSV row
#[derive(Debug, PartialEq)]
struct Columns {
    latitude: usize,
    longitude: usize,
    id: Option<usize>,
    label: Option<usize>,
}

impl Columns {
    /// Layout of files without a header row
    const POSITIONAL: Columns = Columns {
        latitude: 0,
        longitude: 1,
        id: Some(2),
        label: Some(3),
    };

    /// Locates the point fields by column name
    fn from_header(header: &[String]) -> Result<Columns, Box<dyn Error>> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        let latitude = find(&["latitude", "lat"]).ok_or("no latitude column in header")?;
        let longitude =
            find(&["longitude", "lon", "lng"]).ok_or("no longitude column in header")?;

        Ok(Columns {
            latitude,
            longitude,
            id: find(&["id"]),
            label: find(&["label", "name"]),
        })
    }
}

/// Reads points from a CSV file
///
/// The header row is optional. With a header, columns are located by name;
/// without one, the layout is `latitude,longitude[,id[,label]]`. Rows that do
/// not parse are skipped. Missing ids default to the row number.
fn read_points(filename: &PathBuf) -> Result<PointList, Box<dyn Error>> {
    let file = File::open(filename)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let record_vec: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        records.push(record_vec);
    }

    let mut points = PointList::new();
    if records.is_empty() {
        return Ok(points);
    }

    // Determine if first row is header
    let has_header = records[0][0].trim().parse::<f64>().is_err();
    let (columns, start_idx) = if has_header {
        (Columns::from_header(&records[0])?, 1)
    } else {
        (Columns::POSITIONAL, 0)
    };

    for (row, record) in records.iter().skip(start_idx).enumerate() {
        let field = move |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
        };

        let lat = field(Some(columns.latitude)).map(str::parse::<f64>);
        let lon = field(Some(columns.longitude)).map(str::parse::<f64>);
        let (Some(Ok(lat)), Some(Ok(lon))) = (lat, lon) else {
            warn!("Skipping row {}: no valid latitude/longitude", row + start_idx + 1);
            continue;
        };

        let id = field(columns.id).map_or_else(|| row.to_string(), str::to_string);
        let label = field(columns.label).unwrap_or_default();
        points.push(Point::new(id, lat, lon, label));
    }

    Ok(points)
}

/// Writes records as CSV, header first
fn write_records<W: Write>(
    out: W,
    header: &[String],
    records: &[Vec<String>],
) -> Result<(), Box<dyn Error>> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(header)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}
