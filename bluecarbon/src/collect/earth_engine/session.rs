use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::collect::global_variables::{
    compute_url, EE_API_URL, EE_SCOPE, ENV_ACCESS_TOKEN, ENV_API_URL, ENV_PROJECT,
    ENV_SERVICE_ACCOUNT_KEY, GOOGLE_TOKEN_URI,
};
use super::client::send_compute;
use super::expression::{Expression, Node};
use crate::error::Error;

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN_SECS: i64 = 60;
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Service-account key payload (the JSON file downloaded from Google Cloud)
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// How the process authenticates against Earth Engine
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Tokens are minted from a service-account key
    ServiceAccount {
        key: ServiceAccountKey,
        project: String,
    },
    /// Pre-minted OAuth token, e.g. `gcloud auth print-access-token`
    AccessToken { token: String, project: String },
}

impl Credentials {
    /// Read credentials from `EE_SERVICE_ACCOUNT_KEY`, falling back to
    /// `EE_ACCESS_TOKEN` + `EE_PROJECT`
    pub fn from_env() -> Result<Self> {
        let project = std::env::var(ENV_PROJECT).ok().filter(|p| !p.is_empty());

        if let Ok(payload) = std::env::var(ENV_SERVICE_ACCOUNT_KEY) {
            return Self::from_service_account_json(&payload, project);
        }

        let token = std::env::var(ENV_ACCESS_TOKEN).with_context(|| {
            format!(
                "No Earth Engine credentials: set {} or {} and {}",
                ENV_SERVICE_ACCOUNT_KEY, ENV_ACCESS_TOKEN, ENV_PROJECT
            )
        })?;
        let project =
            project.with_context(|| format!("{} is required with {}", ENV_PROJECT, ENV_ACCESS_TOKEN))?;

        Ok(Credentials::AccessToken { token, project })
    }

    /// Parse a service-account key payload; `project` overrides the key's `project_id`
    pub fn from_service_account_json(payload: &str, project: Option<String>) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(payload)
            .with_context(|| format!("{} is not a valid service-account key", ENV_SERVICE_ACCOUNT_KEY))?;
        let project = project
            .or_else(|| key.project_id.clone())
            .with_context(|| {
                format!("Service-account key has no project_id and {} is not set", ENV_PROJECT)
            })?;
        Ok(Credentials::ServiceAccount { key, project })
    }

    pub fn project(&self) -> &str {
        match self {
            Credentials::ServiceAccount { project, .. } | Credentials::AccessToken { project, .. } => {
                project
            }
        }
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(REFRESH_MARGIN_SECS) < expires_at,
            None => true,
        }
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Authenticated Earth Engine session
///
/// Created once at startup and shared for the lifetime of the process.
/// The cached access token is the only mutable state.
pub struct Session {
    credentials: Credentials,
    compute_url: Url,
    http: Client,
    token: Mutex<Option<AccessToken>>,
}

impl Session {
    /// Single initialisation attempt
    ///
    /// Obtains the first token, then evaluates the constant `1` so that a
    /// rejected token, an unknown project or an unreachable API fail here.
    pub fn initialize(credentials: Credentials, api_url: &str) -> Result<Self> {
        let session = Self::new(credentials, api_url)?;
        session
            .bearer_token()
            .context("Earth Engine authentication failed")?;
        send_compute(&session, &Expression::new(Node::constant(1)))
            .context("Earth Engine connectivity check failed")?;

        tracing::info!(
            project = session.project(),
            url = %session.compute_url,
            "Earth Engine session initialized"
        );
        Ok(session)
    }

    fn new(credentials: Credentials, api_url: &str) -> Result<Self> {
        let compute_url = compute_url(api_url, credentials.project())?;
        let http = Client::builder()
            .user_agent(concat!("bluecarbon/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Session {
            credentials,
            compute_url,
            http,
            token: Mutex::new(None),
        })
    }

    /// `Credentials::from_env` + `EE_API_URL`
    pub fn from_env() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        let api_url = std::env::var(ENV_API_URL).unwrap_or_else(|_| EE_API_URL.to_string());
        Self::initialize(credentials, &api_url)
    }

    pub fn project(&self) -> &str {
        self.credentials.project()
    }

    pub fn compute_url(&self) -> &Url {
        &self.compute_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Current access token, minting a new one when the cached token is about to expire
    pub fn bearer_token(&self) -> crate::error::Result<String> {
        let mut cached = self.token.lock();
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = match &self.credentials {
            Credentials::AccessToken { token, .. } => AccessToken {
                value: token.clone(),
                expires_at: None,
            },
            Credentials::ServiceAccount { key, .. } => self.mint_token(key, now)?,
        };
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Exchange a signed JWT assertion for an OAuth access token
    fn mint_token(&self, key: &ServiceAccountKey, now: DateTime<Utc>) -> crate::error::Result<AccessToken> {
        let claims = AssertionClaims {
            iss: &key.client_email,
            scope: EE_SCOPE,
            aud: &key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::RemoteComputation(format!("Invalid service-account private key: {e}")))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| Error::RemoteComputation(format!("Failed to sign token assertion: {e}")))?;

        tracing::debug!(client_email = %key.client_email, "Requesting Earth Engine access token");
        let response = self
            .http
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .map_err(Error::remote)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::RemoteComputation(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().map_err(Error::remote)?;
        Ok(AccessToken {
            value: token.access_token,
            expires_at: token.expires_in.map(|secs| now + Duration::seconds(secs)),
        })
    }
}
