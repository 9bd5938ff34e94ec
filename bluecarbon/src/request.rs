use geojson::PolygonType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::geo_core::{BoundingBox, Region};
use crate::indices::dataset::PRECOMPUTED_INDEX_ID;

const BBOX_REQUIRED: &str = "min_lon, max_lon, min_lat, max_lat, start_date, end_date are required";
const POLYGON_REQUIRED: &str = "coords, start_date, and end_date are required";

/// Which request shape the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// `min_lon/max_lon/min_lat/max_lat`, MOD13Q1 only
    Bbox,
    /// `coords` rings, both dataset families
    #[default]
    Polygon,
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bbox" => Ok(Variant::Bbox),
            "polygon" => Ok(Variant::Polygon),
            other => Err(format!("unknown variant '{}' (expected bbox or polygon)", other)),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bbox => write!(f, "bbox"),
            Variant::Polygon => write!(f, "polygon"),
        }
    }
}

/// Date bound as sent by the caller, handed to the platform's `Date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    /// Epoch milliseconds
    Millis(i64),
    /// Date string, e.g. `2023-01-01`
    Text(String),
}

impl DateValue {
    fn is_empty(&self) -> bool {
        matches!(self, DateValue::Text(text) if text.is_empty())
    }
}

impl From<&str> for DateValue {
    fn from(text: &str) -> Self {
        DateValue::Text(text.to_string())
    }
}

impl From<&DateValue> for Value {
    fn from(date: &DateValue) -> Self {
        match date {
            DateValue::Millis(millis) => Value::from(*millis),
            DateValue::Text(text) => Value::from(text.as_str()),
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Millis(millis) => write!(f, "{}", millis),
            DateValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Body of `POST /get_ndvi_evi`, as parsed from JSON
///
/// Every field is optional here; presence is checked by [`IndexSeriesRequest::validate`].
/// A geometry or date field holding a value of the wrong type is read as absent,
/// so keys the active variant does not use never reject a body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSeriesRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub min_lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub min_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub coords: Option<PolygonType>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_date: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_date: Option<DateValue>,
    pub dataset: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Geometry as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum RequestGeometry {
    BoundingBox(BoundingBox),
    Rings(PolygonType),
}

impl RequestGeometry {
    pub fn to_region(&self) -> Region {
        match self {
            RequestGeometry::BoundingBox(bbox) => Region::from_bbox(bbox),
            RequestGeometry::Rings(rings) => Region::from_rings(rings.clone()),
        }
    }
}

/// Request whose required fields are known to be present
///
/// Dates are kept as received: they are interpreted by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub geometry: RequestGeometry,
    pub start_date: DateValue,
    pub end_date: DateValue,
    pub dataset: String,
}

impl IndexSeriesRequest {
    pub fn from_bbox(bbox: BoundingBox, start_date: &str, end_date: &str) -> Self {
        IndexSeriesRequest {
            min_lon: Some(bbox.min_x),
            max_lon: Some(bbox.max_x),
            min_lat: Some(bbox.min_y),
            max_lat: Some(bbox.max_y),
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
            ..Default::default()
        }
    }

    pub fn from_coords(coords: PolygonType, start_date: &str, end_date: &str) -> Self {
        IndexSeriesRequest {
            coords: Some(coords),
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
            ..Default::default()
        }
    }

    pub fn with_dataset(mut self, dataset: &str) -> Self {
        self.dataset = Some(dataset.to_string());
        self
    }

    /// Dataset id, defaulting to MOD13Q1 when absent
    pub fn dataset_id(&self) -> &str {
        self.dataset.as_deref().unwrap_or(PRECOMPUTED_INDEX_ID)
    }

    /// Check required fields for the given variant
    /// No range or order checks are made on coordinates or dates.
    pub fn validate(&self, variant: Variant) -> Result<ValidatedRequest> {
        match variant {
            Variant::Bbox => self.validate_bbox(),
            Variant::Polygon => self.validate_polygon(),
        }
    }

    fn validate_bbox(&self) -> Result<ValidatedRequest> {
        let dataset = self.dataset_id();
        if dataset != PRECOMPUTED_INDEX_ID {
            return Err(Error::UnsupportedDataset(dataset.to_string()));
        }

        match (
            self.min_lon,
            self.max_lon,
            self.min_lat,
            self.max_lat,
            self.start_date.as_ref(),
            self.end_date.as_ref(),
        ) {
            (Some(min_lon), Some(max_lon), Some(min_lat), Some(max_lat), Some(start), Some(end)) => {
                Ok(ValidatedRequest {
                    geometry: RequestGeometry::BoundingBox(BoundingBox::new(
                        min_lon, min_lat, max_lon, max_lat,
                    )),
                    start_date: start.clone(),
                    end_date: end.clone(),
                    dataset: dataset.to_string(),
                })
            }
            _ => Err(Error::Validation(BBOX_REQUIRED.to_string())),
        }
    }

    /// Empty coordinate lists and empty date strings count as missing
    fn validate_polygon(&self) -> Result<ValidatedRequest> {
        let coords = self.coords.as_ref().filter(|c| !c.is_empty());
        let start = self.start_date.as_ref().filter(|d| !d.is_empty());
        let end = self.end_date.as_ref().filter(|d| !d.is_empty());

        match (coords, start, end) {
            (Some(coords), Some(start), Some(end)) => Ok(ValidatedRequest {
                geometry: RequestGeometry::Rings(coords.clone()),
                start_date: start.clone(),
                end_date: end.clone(),
                dataset: self.dataset_id().to_string(),
            }),
            _ => Err(Error::Validation(POLYGON_REQUIRED.to_string())),
        }
    }
}
