/// Example: Sentinel-2 NDVI/EVI series for a polygon, printed as JSON
/// Needs EE_SERVICE_ACCOUNT_KEY, or EE_ACCESS_TOKEN and EE_PROJECT
use anyhow::Result;
use bluecarbon::indices::dataset::SENTINEL2_SR_HARMONIZED;
use bluecarbon::{EarthEngineCollect, IndexSeriesRequest, Session, Variant, VegetationSeries};

fn main() -> Result<()> {
    let session = Session::from_env()?;
    let series = VegetationSeries::new(EarthEngineCollect::new(session), Variant::Polygon);

    let coords = vec![vec![
        vec![88.7, 21.5],
        vec![89.0, 21.5],
        vec![89.0, 22.0],
        vec![88.7, 22.0],
        vec![88.7, 21.5],
    ]];
    let request = IndexSeriesRequest::from_coords(coords, "2023-01-01", "2023-01-31")
        .with_dataset(SENTINEL2_SR_HARMONIZED);

    let points = series.run(&request)?;
    println!("{}", serde_json::to_string_pretty(&points)?);

    Ok(())
}
