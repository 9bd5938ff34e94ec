use tracing::{debug, info};

use super::dataset::DatasetFamily;
use super::series::SeriesPoint;
use crate::collect::platform::RemotePlatform;
use crate::error::Result;
use crate::request::{IndexSeriesRequest, Variant};

/// NDVI/EVI time series orchestrator
///
/// Runs validation, region building, strategy selection, the remote query
/// and series assembly for one request at a time. Holds no per-request
/// state, so a single instance can serve concurrent requests.
pub struct VegetationSeries<P: RemotePlatform> {
    platform: P,
    variant: Variant,
}

impl<P: RemotePlatform> VegetationSeries<P> {
    pub fn new(platform: P, variant: Variant) -> Self {
        VegetationSeries { platform, variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Compute the series for one request
    ///
    /// An empty collection yields an empty series. Remote failures are not retried.
    pub fn run(&self, request: &IndexSeriesRequest) -> Result<Vec<SeriesPoint>> {
        let validated = request.validate(self.variant)?;
        let region = validated.geometry.to_region();
        let family = DatasetFamily::lookup(&validated.dataset)?;

        info!(
            dataset = family.id(),
            start_date = %validated.start_date,
            end_date = %validated.end_date,
            "Processing NDVI/EVI request"
        );
        debug!(rings = ?region.rings(), "Query region");

        let expression = family.build_query(&region, &validated.start_date, &validated.end_date);
        let result = self.platform.compute(&expression)?;
        let series = family.extract_series(result)?;

        info!(points = series.len(), "Series assembled");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geo_core::BoundingBox;
    use crate::indices::dataset::{PRECOMPUTED_INDEX_ID, SENTINEL2_SR_HARMONIZED};
    use crate::test_utils::FakePlatform;
    use serde_json::json;

    fn sundarbans_bbox() -> IndexSeriesRequest {
        IndexSeriesRequest::from_bbox(
            BoundingBox::new(88.7, 21.5, 89.0, 22.0),
            "2023-01-01",
            "2023-01-31",
        )
    }

    fn sundarbans_coords() -> IndexSeriesRequest {
        IndexSeriesRequest::from_coords(
            vec![vec![
                vec![88.7, 21.5],
                vec![89.0, 21.5],
                vec![89.0, 22.0],
                vec![88.7, 22.0],
                vec![88.7, 21.5],
            ]],
            "2023-01-01",
            "2023-01-31",
        )
    }

    fn modis_answer() -> serde_json::Value {
        json!({
            "dates": [1672531200000i64, 1673913600000i64],
            "ndvi": [5000, null],
            "evi": [3000, 0]
        })
    }

    #[test]
    fn test_bbox_default_dataset() {
        let orchestrator =
            VegetationSeries::new(FakePlatform::answering(modis_answer()), Variant::Bbox);
        let series = orchestrator.run(&sundarbans_bbox()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "2023-01-01");
        assert_eq!(series[1].date, "2023-01-17");
        assert!((series[0].ndvi.unwrap() - 0.5).abs() < 1e-12);
        assert!((series[0].evi.unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(series[1].ndvi, None);
        assert_eq!(series[1].evi, None);

        for point in &series {
            for value in [point.ndvi, point.evi].into_iter().flatten() {
                assert!((-1.0..=1.0).contains(&value));
            }
        }

        let sent = orchestrator.platform().received.lock()[0].to_json().to_string();
        assert!(sent.contains(PRECOMPUTED_INDEX_ID));
    }

    #[test]
    fn test_polygon_raw_band_not_rescaled() {
        let platform = FakePlatform::answering(json!({
            "dates": [1672531200000i64],
            "ndvi": [0.42],
            "evi": [0.0]
        }));
        let orchestrator = VegetationSeries::new(platform, Variant::Polygon);
        let request = sundarbans_coords().with_dataset(SENTINEL2_SR_HARMONIZED);
        let series = orchestrator.run(&request).unwrap();

        assert_eq!(series[0].ndvi, Some(0.42));
        assert_eq!(series[0].evi, None);

        let sent = orchestrator.platform().received.lock()[0].to_json().to_string();
        assert!(sent.contains("CLOUDY_PIXEL_PERCENTAGE"));
    }

    #[test]
    fn test_epoch_millis_dates_reach_platform() {
        let orchestrator =
            VegetationSeries::new(FakePlatform::answering(modis_answer()), Variant::Bbox);
        let request: IndexSeriesRequest = serde_json::from_value(json!({
            "min_lon": 88.7, "max_lon": 89.0, "min_lat": 21.5, "max_lat": 22.0,
            "start_date": 1672531200000i64, "end_date": 1675209600000i64
        }))
        .unwrap();
        orchestrator.run(&request).unwrap();

        let sent = orchestrator.platform().received.lock()[0].to_json().to_string();
        assert!(sent.contains("{\"constantValue\":1672531200000}"));
        assert!(sent.contains("{\"constantValue\":1675209600000}"));
    }

    #[test]
    fn test_empty_collection_is_empty_series() {
        let platform = FakePlatform::answering(json!({ "dates": [], "ndvi": [], "evi": [] }));
        let orchestrator = VegetationSeries::new(platform, Variant::Polygon);
        assert!(orchestrator.run(&sundarbans_coords()).unwrap().is_empty());
    }

    #[test]
    fn test_validation_failure_skips_platform() {
        let orchestrator =
            VegetationSeries::new(FakePlatform::answering(modis_answer()), Variant::Polygon);
        let err = orchestrator.run(&IndexSeriesRequest::default()).unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(orchestrator.platform().calls(), 0);
    }

    #[test]
    fn test_unsupported_dataset_names_id() {
        let orchestrator =
            VegetationSeries::new(FakePlatform::answering(modis_answer()), Variant::Polygon);
        let request = sundarbans_coords().with_dataset("LANDSAT/LC08/C02/T1_L2");
        let err = orchestrator.run(&request).unwrap_err();

        assert!(err.is_client_error());
        assert!(err.to_string().contains("LANDSAT/LC08/C02/T1_L2"));
        assert_eq!(orchestrator.platform().calls(), 0);
    }

    #[test]
    fn test_remote_failure_propagates() {
        let orchestrator = VegetationSeries::new(
            FakePlatform::failing("User memory limit exceeded."),
            Variant::Bbox,
        );
        match orchestrator.run(&sundarbans_bbox()) {
            Err(Error::RemoteComputation(message)) => {
                assert_eq!(message, "User memory limit exceeded.")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(orchestrator.platform().calls(), 1);
    }

    #[test]
    fn test_misaligned_arrays_fail_whole_request() {
        let platform = FakePlatform::answering(json!({
            "dates": [1672531200000i64, 1673913600000i64],
            "ndvi": [5000],
            "evi": [3000, 2000]
        }));
        let orchestrator = VegetationSeries::new(platform, Variant::Bbox);
        let err = orchestrator.run(&sundarbans_bbox()).unwrap_err();
        assert!(matches!(err, Error::MisalignedSeries { .. }));
        assert!(!err.is_client_error());
    }
}
