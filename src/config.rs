use chrono::NaiveTime;

#[derive(Debug, Clone)]
pub struct Config {
    pub portainer_url: String,
    pub credentials: Credentials,
    pub endpoint_id: String,
    pub container_name: String,
    pub restart_time: NaiveTime,
    pub check_interval: u64,
    pub log_level: String,
}

#[derive(Clone, PartialEq)]
pub enum Credentials {
    ApiKey(String),
    Password { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => write!(f, "ApiKey(***)"),
            Credentials::Password { username, .. } => {
                write!(f, "Password {{ username: {username:?}, password: *** }}")
            }
        }
    }
}

pub const RESTART_TIME_FORMAT: &str = "%H:%M";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty required or credential values count as
    /// unset; settings with a default are validated as given.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let portainer_url = env_required(&get, "PORTAINER_URL")?;

        let credentials = match (
            get("PORTAINER_API_KEY"),
            get("PORTAINER_USERNAME"),
            get("PORTAINER_PASSWORD"),
        ) {
            (Some(key), _, _) => Credentials::ApiKey(key),
            (None, Some(username), Some(password)) => Credentials::Password { username, password },
            _ => {
                return Err(
                    "Either PORTAINER_API_KEY or both PORTAINER_USERNAME and PORTAINER_PASSWORD must be provided"
                        .to_string(),
                );
            }
        };

        let endpoint_id = env_or(&lookup, "ENDPOINT_ID", "1");
        if endpoint_id.trim().is_empty() {
            return Err("Invalid ENDPOINT_ID: must not be empty".to_string());
        }

        let container_name = env_required(&get, "CONTAINER_NAME")?;

        let restart_time = env_or(&lookup, "RESTART_TIME", "03:00");
        let restart_time = parse_restart_time(&restart_time)?;

        let check_interval: u64 = env_or(&lookup, "CHECK_INTERVAL", "60")
            .parse()
            .map_err(|e| format!("Invalid CHECK_INTERVAL: {e}"))?;
        if check_interval == 0 {
            return Err("Invalid CHECK_INTERVAL: must be at least 1 second".to_string());
        }

        let log_level = env_or(&lookup, "RESTARTER_LOG_LEVEL", "info");

        Ok(Config {
            portainer_url,
            credentials,
            endpoint_id,
            container_name,
            restart_time,
            check_interval,
            log_level,
        })
    }
}

/// Parse a 24-hour `HH:MM` time of day.
pub fn parse_restart_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), RESTART_TIME_FORMAT)
        .map_err(|_| format!("RESTART_TIME must be in HH:MM format (24-hour), got: {value}"))
}

fn env_required<F>(get: &F, key: &str) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
}

fn env_or<F>(get: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get(key).unwrap_or_else(|| default.to_string())
}
