use url::Url;

use crate::error::{Error, Result};

/// Earth Engine REST endpoint used when `EE_API_URL` is not set
pub const EE_API_URL: &str = "https://earthengine.googleapis.com";

/// OAuth scope required by `value:compute`
pub const EE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Environment variables holding credentials
pub const ENV_SERVICE_ACCOUNT_KEY: &str = "EE_SERVICE_ACCOUNT_KEY";
pub const ENV_ACCESS_TOKEN: &str = "EE_ACCESS_TOKEN";
pub const ENV_PROJECT: &str = "EE_PROJECT";
pub const ENV_API_URL: &str = "EE_API_URL";

/// Image property holding the acquisition time (epoch ms)
pub const TIME_START: &str = "system:time_start";
pub const MEAN_NDVI: &str = "meanNDVI";
pub const MEAN_EVI: &str = "meanEVI";

/// Build the `value:compute` URL for a cloud project
pub fn compute_url(base: &str, project: &str) -> Result<Url> {
    let base = Url::parse(base).map_err(|e| Error::Internal(format!("Invalid API URL {base}: {e}")))?;
    base.join(&format!("v1/projects/{project}/value:compute"))
        .map_err(|e| Error::Internal(format!("Invalid project {project}: {e}")))
}
