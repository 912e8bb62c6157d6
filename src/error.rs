#[derive(Debug)]
pub enum ApiError {
    Request(reqwest::Error),
    ContainerNotFound(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Request(err) => write!(f, "Request Error: {err}"),
            ApiError::ContainerNotFound(name) => write!(f, "Container '{name}' not found"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Request(err) => Some(err),
            ApiError::ContainerNotFound(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Request(err)
    }
}
