use serde::Serialize;
use serde_json::Value;

use super::series::{MissingReadingPolicy, RawSeries, SeriesPoint};
use crate::collect::earth_engine::algorithms::{
    add, add_bands, aggregate_array, constant_image, dictionary_get, divide, filter_bounds,
    filter_date, filter_less_than, get, image_collection, map, multiply, normalized_difference,
    reduce_region_mean, rename, select, set, subtract,
};
use crate::collect::earth_engine::{Expression, Node};
use crate::collect::global_variables::{MEAN_EVI, MEAN_NDVI, TIME_START};
use crate::error::{Error, Result};
use crate::geo_core::Region;

/// MODIS Terra vegetation indices, 16-day composites
pub const PRECOMPUTED_INDEX_ID: &str = "MODIS/006/MOD13Q1";
/// Any Sentinel-2 collection
pub const RAW_BAND_PREFIX: &str = "COPERNICUS/S2";
pub const SENTINEL2_SR_HARMONIZED: &str = "COPERNICUS/S2_SR_HARMONIZED";

const CLOUD_PROPERTY: &str = "CLOUDY_PIXEL_PERCENTAGE";
const CLOUD_THRESHOLD: f64 = 20.0;

const NIR: &str = "B8";
const RED: &str = "B4";
const BLUE: &str = "B2";

const MAPPING_VAR: &str = "_MAPPING_VAR_0_0";

/// Query strategy for a family of image collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetFamily {
    /// Collections shipping `NDVI` and `EVI` bands, stored multiplied by 10000
    PrecomputedIndex { id: String },
    /// Collections of reflectance bands; indices are computed per image
    RawBand { id: String },
}

/// Catalog entry listed by the root endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub family: &'static str,
    pub resolution_m: f64,
    pub scale_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cloud_percentage: Option<f64>,
}

/// Datasets advertised by the service
pub fn catalog() -> Vec<DatasetInfo> {
    vec![
        DatasetInfo {
            id: PRECOMPUTED_INDEX_ID,
            name: "MODIS Terra NDVI/EVI (MOD13Q1), 16-day composites",
            family: "precomputed-index",
            resolution_m: 250.0,
            scale_factor: 0.0001,
            max_cloud_percentage: None,
        },
        DatasetInfo {
            id: SENTINEL2_SR_HARMONIZED,
            name: "Sentinel-2 surface reflectance (harmonized)",
            family: "raw-band",
            resolution_m: 10.0,
            scale_factor: 1.0,
            max_cloud_percentage: Some(CLOUD_THRESHOLD),
        },
    ]
}

impl DatasetFamily {
    /// Resolve a dataset id to its strategy
    pub fn lookup(id: &str) -> Result<Self> {
        if id == PRECOMPUTED_INDEX_ID {
            Ok(DatasetFamily::PrecomputedIndex { id: id.to_string() })
        } else if id.starts_with(RAW_BAND_PREFIX) {
            Ok(DatasetFamily::RawBand { id: id.to_string() })
        } else {
            Err(Error::UnsupportedDataset(id.to_string()))
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DatasetFamily::PrecomputedIndex { id } | DatasetFamily::RawBand { id } => id,
        }
    }

    /// Nominal scale of the spatial reduction, in metres
    pub fn resolution(&self) -> f64 {
        match self {
            DatasetFamily::PrecomputedIndex { .. } => 250.0,
            DatasetFamily::RawBand { .. } => 10.0,
        }
    }

    /// Factor turning a reduced value into natural units
    pub fn scale_factor(&self) -> f64 {
        match self {
            DatasetFamily::PrecomputedIndex { .. } => 0.0001,
            DatasetFamily::RawBand { .. } => 1.0,
        }
    }

    pub fn cloud_threshold(&self) -> Option<f64> {
        match self {
            DatasetFamily::PrecomputedIndex { .. } => None,
            DatasetFamily::RawBand { .. } => Some(CLOUD_THRESHOLD),
        }
    }

    /// Build the expression returning `{dates, ndvi, evi}` for the region and date range
    pub fn build_query(
        &self,
        region: &Region,
        start_date: impl Into<Value>,
        end_date: impl Into<Value>,
    ) -> Expression {
        let geometry = region.to_node();

        let mut collection = filter_date(image_collection(self.id()), start_date, end_date);
        collection = filter_bounds(collection, geometry.clone());
        if let Some(threshold) = self.cloud_threshold() {
            collection = filter_less_than(collection, CLOUD_PROPERTY, threshold);
        }

        let image = Node::argument(MAPPING_VAR);
        let indices = match self {
            DatasetFamily::PrecomputedIndex { .. } => select(image.clone(), &["NDVI", "EVI"]),
            DatasetFamily::RawBand { .. } => computed_indices(&image),
        };
        let means = reduce_region_mean(indices, geometry, self.resolution());
        let stats = map(collection, MAPPING_VAR, annotate(image, means));

        Expression::new(Node::dictionary([
            ("dates", aggregate_array(stats.clone(), TIME_START)),
            ("ndvi", aggregate_array(stats.clone(), MEAN_NDVI)),
            ("evi", aggregate_array(stats, MEAN_EVI)),
        ]))
    }

    /// Turn the value computed for [`DatasetFamily::build_query`] into a series
    pub fn extract_series(&self, result: Value) -> Result<Vec<SeriesPoint>> {
        let raw: RawSeries = serde_json::from_value(result)
            .map_err(|e| Error::RemoteComputation(format!("Unexpected series payload: {e}")))?;
        raw.assemble(self.scale_factor(), MissingReadingPolicy::ZeroIsMissing)
    }
}

/// NDVI = (NIR - RED) / (NIR + RED)
/// EVI = 2.5 * (NIR - RED) / (NIR + 6 * RED - 7.5 * BLUE + 1)
fn computed_indices(image: &Node) -> Node {
    let band = |name: &str| select(image.clone(), &[name]);

    let ndvi = rename(normalized_difference(image.clone(), NIR, RED), "NDVI");

    let numerator = subtract(band(NIR), band(RED));
    let denominator = add(
        subtract(
            add(band(NIR), multiply(constant_image(6.0), band(RED))),
            multiply(constant_image(7.5), band(BLUE)),
        ),
        constant_image(1.0),
    );
    let evi = rename(
        multiply(constant_image(2.5), divide(numerator, denominator)),
        "EVI",
    );

    add_bands(ndvi, evi)
}

/// Copy the reduced means and the acquisition time onto the image
fn annotate(image: Node, means: Node) -> Node {
    let with_ndvi = set(image.clone(), MEAN_NDVI, dictionary_get(means.clone(), "NDVI"));
    let with_evi = set(with_ndvi, MEAN_EVI, dictionary_get(means, "EVI"));
    set(with_evi, TIME_START, get(image, TIME_START))
}
