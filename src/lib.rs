pub mod config;
pub mod error;
pub mod portainer;
pub mod scheduler;

use crate::config::Config;
use crate::error::ApiError;
use crate::portainer::PortainerClient;
use crate::scheduler::Restarter;

pub fn build_restarter(config: &Config) -> Result<Restarter<PortainerClient>, ApiError> {
    let client = PortainerClient::new(&config.portainer_url, config.credentials.clone())?;
    Ok(Restarter::new(client, config))
}
