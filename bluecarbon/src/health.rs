use serde::Serialize;

use crate::collect::earth_engine::{Expression, Node};
use crate::collect::platform::RemotePlatform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Connected,
    Disconnected,
}

/// Result of a platform round trip; failures are reported, never raised
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub earth_engine: Connectivity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Evaluate the constant `1` on the platform
pub fn check<P: RemotePlatform + ?Sized>(platform: &P) -> HealthReport {
    match platform.compute(&Expression::new(Node::constant(1))) {
        Ok(_) => HealthReport {
            status: HealthStatus::Healthy,
            earth_engine: Connectivity::Connected,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Earth Engine health check failed");
            HealthReport {
                status: HealthStatus::Unhealthy,
                earth_engine: Connectivity::Disconnected,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakePlatform;
    use serde_json::json;

    #[test]
    fn test_healthy() {
        let platform = FakePlatform::answering(json!(1));
        let report = check(&platform);
        assert!(report.is_healthy());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "status": "healthy", "earth_engine": "connected" })
        );
        assert_eq!(
            platform.received.lock()[0].to_json(),
            json!({ "result": "0", "values": { "0": { "constantValue": 1 } } })
        );
    }

    #[test]
    fn test_unhealthy_reports_error() {
        let platform = FakePlatform::failing("Request had invalid authentication credentials.");
        let report = check(&platform);
        assert!(!report.is_healthy());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "status": "unhealthy",
                "earth_engine": "disconnected",
                "error": "Request had invalid authentication credentials."
            })
        );
    }
}
