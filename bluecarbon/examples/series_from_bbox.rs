/// Example: MODIS NDVI/EVI series for a bounding box over the Sundarbans
/// Needs EE_SERVICE_ACCOUNT_KEY, or EE_ACCESS_TOKEN and EE_PROJECT
use anyhow::Result;
use bluecarbon::{
    BoundingBox, EarthEngineCollect, IndexSeriesRequest, Session, Variant, VegetationSeries,
};

fn main() -> Result<()> {
    println!("=== Example: NDVI/EVI series from a bounding box ===\n");

    let session = Session::from_env()?;
    let series = VegetationSeries::new(EarthEngineCollect::new(session), Variant::Bbox);

    let bbox = BoundingBox::new(88.7, 21.5, 89.0, 22.0);
    println!("Bounding box:");
    println!("  - Longitude: {} to {}", bbox.min_x, bbox.max_x);
    println!("  - Latitude: {} to {}", bbox.min_y, bbox.max_y);
    println!("  - Area: Sundarbans mangroves");
    println!("  - Dates: 2023-01-01 to 2023-01-31\n");

    let request = IndexSeriesRequest::from_bbox(bbox, "2023-01-01", "2023-01-31");
    let points = series.run(&request)?;

    println!("Received {} data points", points.len());
    for point in &points {
        println!(
            "  {}  NDVI={:?}  EVI={:?}",
            point.date, point.ndvi, point.evi
        );
    }

    Ok(())
}
