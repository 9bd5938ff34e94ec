//! NDVI/EVI time series for a region and date range, computed on Google Earth Engine.
//!
//! The crate validates a request, builds the query region, selects the
//! query strategy for the dataset family, evaluates the query remotely and
//! assembles the three extracted arrays into an ordered series.

pub mod collect;
pub mod commons;
pub mod error;
pub mod geo_core;
pub mod health;
pub mod indices;
pub mod request;
#[cfg(test)]
pub mod test_utils;

pub use collect::earth_engine::{Credentials, EarthEngineCollect, Session};
pub use collect::platform::RemotePlatform;
pub use error::{Error, Result};
pub use geo_core::{BoundingBox, Region};
pub use indices::{DatasetFamily, SeriesPoint, VegetationSeries};
pub use request::{IndexSeriesRequest, Variant};
