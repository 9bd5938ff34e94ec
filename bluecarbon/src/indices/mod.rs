pub mod dataset;
pub mod series;
pub mod vegetation;

pub use dataset::DatasetFamily;
pub use series::{MissingReadingPolicy, RawSeries, SeriesPoint};
pub use vegetation::VegetationSeries;
