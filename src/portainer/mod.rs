pub mod models;
pub mod session;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::RequestBuilder;

use crate::config::Credentials;
use crate::error::ApiError;

use models::{AuthRequest, AuthResponse, ContainerSummary};
use session::SessionToken;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const RESTART_TIMEOUT: Duration = Duration::from_secs(30);

/// The container operations the scheduler depends on.
#[async_trait]
pub trait ContainerApi: Send {
    async fn resolve_id(&mut self, endpoint_id: &str, container_name: &str) -> Result<String, ApiError>;

    async fn restart(&mut self, endpoint_id: &str, container_id: &str) -> Result<(), ApiError>;
}

pub struct PortainerClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    session: Option<SessionToken>,
}

impl PortainerClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            session: None,
        })
    }

    pub fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }

    /// Replace the cached session token, e.g. one restored from an earlier run.
    pub fn set_session(&mut self, session: SessionToken) {
        self.session = Some(session);
    }

    /// Exchange username/password for a fresh JWT. A no-op for API key credentials.
    pub async fn authenticate(&mut self) -> Result<(), ApiError> {
        if let Credentials::Password { username, password } = &self.credentials {
            let token = self.request_token(username, password).await?;
            self.session = Some(token);
        }
        Ok(())
    }

    async fn request_token(&self, username: &str, password: &str) -> Result<SessionToken, ApiError> {
        let result = async {
            let resp = self
                .client
                .post(format!("{}/api/auth", self.base_url))
                .timeout(LOOKUP_TIMEOUT)
                .json(&AuthRequest { username, password })
                .send()
                .await?
                .error_for_status()?;
            let body: AuthResponse = resp.json().await?;
            Ok::<_, ApiError>(body.jwt)
        }
        .await;

        match result {
            Ok(jwt) => {
                tracing::info!("Successfully authenticated with Portainer");
                Ok(SessionToken::issued_at(jwt, Utc::now()))
            }
            Err(e) => {
                tracing::error!("Authentication failed: {e}");
                Err(e)
            }
        }
    }

    /// Attach the API key, or a bearer token (authenticating when the cached one is missing or expired).
    async fn authorize(&mut self, req: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let (username, password) = match &self.credentials {
            Credentials::ApiKey(key) => return Ok(req.header("X-API-Key", key)),
            Credentials::Password { username, password } => (username, password),
        };

        let now = Utc::now();
        let token = match self.session.take().filter(|s| !s.is_expired_at(now)) {
            Some(token) => token,
            None => self.request_token(username, password).await?,
        };

        let req = req.bearer_auth(&token.value);
        self.session = Some(token);
        Ok(req)
    }

    pub async fn list_containers(&mut self, endpoint_id: &str) -> Result<Vec<ContainerSummary>, ApiError> {
        let req = self
            .client
            .get(format!(
                "{}/api/endpoints/{endpoint_id}/docker/containers/json?all=1",
                self.base_url
            ))
            .timeout(LOOKUP_TIMEOUT);
        let req = self.authorize(req).await?;

        let containers = req.send().await?.error_for_status()?.json().await?;
        Ok(containers)
    }
}

#[async_trait]
impl ContainerApi for PortainerClient {
    async fn resolve_id(&mut self, endpoint_id: &str, container_name: &str) -> Result<String, ApiError> {
        let result = self.list_containers(endpoint_id).await.and_then(|containers| {
            models::find_container(&containers, container_name)
                .map(|c| c.id.clone())
                .ok_or_else(|| ApiError::ContainerNotFound(container_name.to_string()))
        });

        if let Err(ref e) = result {
            tracing::error!("Failed to get container ID: {e}");
        }
        result
    }

    async fn restart(&mut self, endpoint_id: &str, container_id: &str) -> Result<(), ApiError> {
        let req = self
            .client
            .post(format!(
                "{}/api/endpoints/{endpoint_id}/docker/containers/{container_id}/restart",
                self.base_url
            ))
            .timeout(RESTART_TIMEOUT);

        let result = async {
            let req = self.authorize(req).await?;
            req.send().await?.error_for_status()?;
            Ok::<_, ApiError>(())
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!("Successfully restarted container {container_id}");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to restart container: {e}");
                Err(e)
            }
        }
    }
}
