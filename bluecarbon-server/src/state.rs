use bluecarbon::{RemotePlatform, Variant, VegetationSeries};
use std::sync::Arc;

/// Shared, read-only handler state
pub struct AppState {
    pub series: VegetationSeries<Arc<dyn RemotePlatform>>,
}

impl AppState {
    pub fn new(platform: Arc<dyn RemotePlatform>, variant: Variant) -> Self {
        AppState {
            series: VegetationSeries::new(platform, variant),
        }
    }

    pub fn variant(&self) -> Variant {
        self.series.variant()
    }
}
