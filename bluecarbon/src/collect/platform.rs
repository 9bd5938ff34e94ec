use serde_json::Value;

use crate::collect::earth_engine::expression::Expression;
use crate::error::Result;

/// Remote geospatial computation platform
///
/// Evaluates an expression graph synchronously and returns its value as
/// JSON. Implementations block until the platform answers; no retries.
pub trait RemotePlatform: Send + Sync {
    fn compute(&self, expression: &Expression) -> Result<Value>;
}

impl<T: RemotePlatform + ?Sized> RemotePlatform for std::sync::Arc<T> {
    fn compute(&self, expression: &Expression) -> Result<Value> {
        (**self).compute(expression)
    }
}
