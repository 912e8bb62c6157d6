use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::{Config, RESTART_TIME_FORMAT};
use crate::error::ApiError;
use crate::portainer::ContainerApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Restarted,
    Waiting,
}

/// Daily restart loop for a single container.
pub struct Restarter<A> {
    api: A,
    portainer_url: String,
    endpoint_id: String,
    container_name: String,
    restart_time: NaiveTime,
    check_interval: Duration,
    container_id: Option<String>,
    last_restart_date: Option<NaiveDate>,
}

impl<A: ContainerApi> Restarter<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            portainer_url: config.portainer_url.clone(),
            endpoint_id: config.endpoint_id.clone(),
            container_name: config.container_name.clone(),
            restart_time: config.restart_time,
            check_interval: Duration::from_secs(config.check_interval),
            container_id: None,
            last_restart_date: None,
        }
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    pub fn last_restart_date(&self) -> Option<NaiveDate> {
        self.last_restart_date
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// True when `now` falls in the target minute and no restart has happened on that date.
    pub fn should_restart(&self, now: NaiveDateTime) -> bool {
        let time_match =
            now.hour() == self.restart_time.hour() && now.minute() == self.restart_time.minute();

        time_match && self.last_restart_date != Some(now.date())
    }

    async fn resolve(&mut self) -> Result<String, ApiError> {
        let id = self
            .api
            .resolve_id(&self.endpoint_id, &self.container_name)
            .await?;
        self.container_id = Some(id.clone());
        Ok(id)
    }

    /// One lookup before the loop starts. A failure is logged and left for the loop to retry.
    pub async fn resolve_at_startup(&mut self) -> bool {
        match self.resolve().await {
            Ok(id) => {
                tracing::info!("Found container ID: {}...", short_id(&id));
                true
            }
            Err(e) => {
                tracing::error!("Failed to find container at startup: {e}");
                tracing::info!("Will retry on each check...");
                false
            }
        }
    }

    /// Run one check at local time `now`. Any error clears the cached container id.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Result<TickOutcome, ApiError> {
        let result = self.try_tick(now).await;
        if result.is_err() {
            self.container_id = None;
        }
        result
    }

    async fn try_tick(&mut self, now: NaiveDateTime) -> Result<TickOutcome, ApiError> {
        let container_id = match self.container_id.clone() {
            Some(id) => id,
            None => {
                let id = self.resolve().await?;
                tracing::info!("Resolved container ID: {}...", short_id(&id));
                id
            }
        };

        if !self.should_restart(now) {
            tracing::debug!(
                "Next restart at {}, currently {}",
                self.restart_time.format(RESTART_TIME_FORMAT),
                now.format("%H:%M")
            );
            return Ok(TickOutcome::Waiting);
        }

        tracing::info!("Time to restart container {}", self.container_name);
        self.api.restart(&self.endpoint_id, &container_id).await?;
        self.last_restart_date = Some(now.date());
        tracing::info!(
            "Next restart scheduled for {} tomorrow",
            self.restart_time.format(RESTART_TIME_FORMAT)
        );

        Ok(TickOutcome::Restarted)
    }

    /// Poll forever. Per-tick errors are logged and never end the loop.
    pub async fn run(mut self) {
        tracing::info!("Container Restarter starting...");
        tracing::info!("Portainer URL: {}", self.portainer_url);
        tracing::info!("Endpoint ID: {}", self.endpoint_id);
        tracing::info!("Container: {}", self.container_name);
        tracing::info!(
            "Scheduled restart time: {}",
            self.restart_time.format(RESTART_TIME_FORMAT)
        );
        tracing::info!("Check interval: {} seconds", self.check_interval.as_secs());

        self.resolve_at_startup().await;

        loop {
            if let Err(e) = self.tick(Local::now().naive_local()).await {
                tracing::error!("Error in main loop: {e}");
            }

            tokio::time::sleep(self.check_interval).await;
        }
    }
}

/// Docker-style 12 character short id.
pub fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
