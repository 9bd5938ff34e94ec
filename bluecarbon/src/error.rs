//! Crate-level error type and `Result` alias for the index series orchestration.
//! Client-side failures (validation, unsupported dataset) are kept apart from
//! failures surfaced by the remote platform so the transport can map them.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or null required request fields
    #[error("{0}")]
    Validation(String),

    #[error("Dataset '{0}' not supported")]
    UnsupportedDataset(String),

    /// Anything reported by Earth Engine: auth, quota, malformed geometry, transport
    #[error("{0}")]
    RemoteComputation(String),

    #[error("Series arrays are not aligned: {dates} dates, {ndvi} NDVI values, {evi} EVI values")]
    MisalignedSeries {
        dates: usize,
        ndvi: usize,
        evi: usize,
    },

    #[error("Timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn remote<E: std::fmt::Display>(e: E) -> Self {
        Error::RemoteComputation(e.to_string())
    }

    /// True for errors caused by the request itself (reported as 400)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::UnsupportedDataset(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_kinds() {
        assert!(Error::Validation("coords are required".into()).is_client_error());
        assert!(Error::UnsupportedDataset("LANDSAT/LC08".into()).is_client_error());
        assert!(!Error::RemoteComputation("quota exceeded".into()).is_client_error());
        assert!(!Error::MisalignedSeries {
            dates: 3,
            ndvi: 2,
            evi: 3
        }
        .is_client_error());
    }

    #[test]
    fn test_unsupported_dataset_names_id() {
        let err = Error::UnsupportedDataset("LANDSAT/LC08/C02/T1_L2".into());
        assert_eq!(err.to_string(), "Dataset 'LANDSAT/LC08/C02/T1_L2' not supported");
    }
}
