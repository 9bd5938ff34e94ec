use serde::Deserialize;
use serde_json::{json, Value};

use super::expression::Expression;
use super::session::Session;
use crate::collect::platform::RemotePlatform;
use crate::error::{Error, Result};

/// Successful `value:compute` answer
#[derive(Debug, Deserialize)]
struct ComputeResponse {
    result: Value,
}

/// Error body returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Earth Engine REST client
/// Sends expression graphs to `projects/{project}/value:compute` with the session's token
pub struct EarthEngineCollect {
    session: Session,
}

impl EarthEngineCollect {
    pub fn new(session: Session) -> Self {
        EarthEngineCollect { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl RemotePlatform for EarthEngineCollect {
    fn compute(&self, expression: &Expression) -> Result<Value> {
        send_compute(&self.session, expression)
    }
}

/// POST the expression to `value:compute` and return its `result`
pub(crate) fn send_compute(session: &Session, expression: &Expression) -> Result<Value> {
    let token = session.bearer_token()?;
    let url = session.compute_url().clone();

    tracing::debug!(%url, "Sending Earth Engine compute request");

    let response = session
        .http()
        .post(url)
        .bearer_auth(token)
        .json(&json!({ "expression": expression }))
        .send()
        .map_err(|e| Error::RemoteComputation(format!("Earth Engine request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| Error::RemoteComputation(format!("Failed to read Earth Engine response: {e}")))?;

    if !status.is_success() {
        tracing::warn!(%status, "Earth Engine returned an error");
        return Err(Error::RemoteComputation(error_message(status.as_u16(), &body)));
    }

    parse_result(&body)
}

/// Prefer the platform's own message over the raw body
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => format!("Earth Engine returned error {}: {}", status, body),
    }
}

fn parse_result(body: &str) -> Result<Value> {
    let parsed: ComputeResponse = serde_json::from_str(body).map_err(|e| {
        Error::RemoteComputation(format!("Unexpected Earth Engine response: {e}"))
    })?;
    Ok(parsed.result)
}
