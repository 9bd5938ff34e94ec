use serde::{Deserialize, Serialize};

use crate::commons::basic_functions::format_epoch_millis;
use crate::error::{Error, Result};

/// One image of the time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// UTC acquisition date, `YYYY-MM-DD`
    pub date: String,
    #[serde(rename = "NDVI")]
    pub ndvi: Option<f64>,
    #[serde(rename = "EVI")]
    pub evi: Option<f64>,
}

/// The three arrays extracted from the mapped collection
///
/// Position `i` of each array refers to the same image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// `system:time_start` in epoch milliseconds
    pub dates: Vec<f64>,
    pub ndvi: Vec<Option<f64>>,
    pub evi: Vec<Option<f64>>,
}

/// How raw readings that carry no data are recognised
///
/// `ZeroIsMissing` treats a reading of exactly 0 like an absent one, so a
/// real zero NDVI/EVI is reported as null.
///
/// Nulls rarely reach this point: `aggregate_array` drops images whose
/// property is null instead of returning a null entry. A fully masked image
/// therefore shortens one array and fails the request in
/// [`RawSeries::assemble`] rather than producing a null reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingReadingPolicy {
    #[default]
    ZeroIsMissing,
}

impl MissingReadingPolicy {
    /// Scale a raw reading, or return `None` when the policy treats it as missing
    pub fn apply(self, raw: Option<f64>, scale_factor: f64) -> Option<f64> {
        match (self, raw) {
            (MissingReadingPolicy::ZeroIsMissing, Some(value)) if value != 0.0 => {
                Some(value * scale_factor)
            }
            (MissingReadingPolicy::ZeroIsMissing, _) => None,
        }
    }
}

impl RawSeries {
    /// Zip the arrays into ordered points, scaling every reading
    ///
    /// Arrays of different lengths are an error: nothing is truncated.
    /// This is the outcome when the platform skipped an image with no
    /// valid pixels in the region.
    pub fn assemble(
        &self,
        scale_factor: f64,
        policy: MissingReadingPolicy,
    ) -> Result<Vec<SeriesPoint>> {
        if self.ndvi.len() != self.dates.len() || self.evi.len() != self.dates.len() {
            return Err(Error::MisalignedSeries {
                dates: self.dates.len(),
                ndvi: self.ndvi.len(),
                evi: self.evi.len(),
            });
        }

        self.dates
            .iter()
            .zip(&self.ndvi)
            .zip(&self.evi)
            .map(|((timestamp, ndvi), evi)| {
                Ok(SeriesPoint {
                    date: format_epoch_millis(timestamp.floor() as i64)?,
                    ndvi: policy.apply(*ndvi, scale_factor),
                    evi: policy.apply(*evi, scale_factor),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JAN_1: f64 = 1672531200000.0;
    const JAN_17: f64 = 1673913600000.0;
    const FEB_2: f64 = 1675296000000.0;

    fn assert_close(actual: Option<f64>, expected: Option<f64>) {
        match (actual, expected) {
            (Some(a), Some(e)) => assert!((a - e).abs() < 1e-12, "{} != {}", a, e),
            (a, e) => assert_eq!(a, e),
        }
    }

    #[test]
    fn test_precomputed_scale_and_missing() {
        let raw = RawSeries {
            dates: vec![JAN_1, JAN_17, FEB_2],
            ndvi: vec![Some(5000.0), Some(0.0), None],
            evi: vec![Some(3000.0), None, Some(0.0)],
        };
        let series = raw.assemble(0.0001, MissingReadingPolicy::ZeroIsMissing).unwrap();
        assert_eq!(series.len(), 3);
        assert_close(series[0].ndvi, Some(0.5));
        assert_close(series[0].evi, Some(0.3));
        assert_eq!(series[1].ndvi, None);
        assert_eq!(series[2].ndvi, None);
        assert_eq!(series[1].evi, None);
        assert_eq!(series[2].evi, None);
    }

    #[test]
    fn test_raw_band_values_unscaled() {
        let raw = RawSeries {
            dates: vec![JAN_1, JAN_17, FEB_2],
            ndvi: vec![Some(0.42), Some(0.0), None],
            evi: vec![Some(0.31), Some(0.12), None],
        };
        let series = raw.assemble(1.0, MissingReadingPolicy::default()).unwrap();
        let ndvi: Vec<Option<f64>> = series.iter().map(|p| p.ndvi).collect();
        assert_eq!(ndvi, vec![Some(0.42), None, None]);
    }

    #[test]
    fn test_dates_keep_platform_order() {
        let raw = RawSeries {
            dates: vec![FEB_2, JAN_1],
            ndvi: vec![Some(0.1), Some(0.2)],
            evi: vec![Some(0.1), Some(0.2)],
        };
        let dates: Vec<String> = raw
            .assemble(1.0, MissingReadingPolicy::ZeroIsMissing)
            .unwrap()
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec!["2023-02-02", "2023-01-01"]);
    }

    #[test]
    fn test_misaligned_arrays_are_rejected() {
        // A masked image dropped from the ndvi array only
        let raw = RawSeries {
            dates: vec![JAN_1, JAN_17],
            ndvi: vec![Some(5000.0)],
            evi: vec![Some(3000.0), Some(2000.0)],
        };
        match raw.assemble(0.0001, MissingReadingPolicy::ZeroIsMissing) {
            Err(Error::MisalignedSeries { dates, ndvi, evi }) => {
                assert_eq!((dates, ndvi, evi), (2, 1, 2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_series() {
        let raw = RawSeries::default();
        assert_eq!(
            raw.assemble(0.0001, MissingReadingPolicy::ZeroIsMissing).unwrap(),
            Vec::<SeriesPoint>::new()
        );
    }

    #[test]
    fn test_series_point_json_keys() {
        let point = SeriesPoint {
            date: "2023-01-01".into(),
            ndvi: Some(0.5),
            evi: None,
        };
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({ "date": "2023-01-01", "NDVI": 0.5, "EVI": null })
        );
    }
}
