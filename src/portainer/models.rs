use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
}

/// The fields of a Docker container listing entry that matter for lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Names", default)]
    pub names: Vec<String>,
}

impl ContainerSummary {
    /// Docker reports names with a leading `/`; accept either form, or an id prefix.
    pub fn matches(&self, name: &str) -> bool {
        let slashed = format!("/{name}");
        self.names.iter().any(|n| *n == slashed || n == name) || self.id.starts_with(name)
    }
}

/// First container in listing order that matches `name`.
pub fn find_container<'a>(containers: &'a [ContainerSummary], name: &str) -> Option<&'a ContainerSummary> {
    containers.iter().find(|c| c.matches(name))
}
