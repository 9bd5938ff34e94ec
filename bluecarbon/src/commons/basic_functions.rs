use chrono::DateTime;

use crate::error::{Error, Result};

/// Format an epoch-millisecond timestamp as a UTC `YYYY-MM-DD` date
/// Sub-second parts are floored, including for timestamps before 1970.
pub fn format_epoch_millis(timestamp_ms: i64) -> Result<String> {
    let seconds = timestamp_ms.div_euclid(1000);
    let datetime =
        DateTime::from_timestamp(seconds, 0).ok_or(Error::InvalidTimestamp(timestamp_ms))?;
    Ok(datetime.format("%Y-%m-%d").to_string())
}
