use chrono::{DateTime, Duration, Utc};

/// Portainer JWTs live for 8 hours; refresh 30 minutes early.
pub fn token_lifetime() -> Duration {
    Duration::hours(7) + Duration::minutes(30)
}

#[derive(Debug, Clone)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn issued_at(value: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: issued_at + token_lifetime(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
