use crate::models::AuthInfo;
use std::time::{Duration, Instant};

/// A token together with its lease, as tracked by the renewal loop
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub token: String,
    pub lease_duration: Duration,
    pub renewable: bool,
    pub obtained_at: Instant,
}

impl TokenInfo {
    pub fn new(token: String, lease_duration: Duration, renewable: bool) -> Self {
        Self {
            token,
            lease_duration,
            renewable,
            obtained_at: Instant::now(),
        }
    }

    /// Static token (never expires)
    pub fn static_token(token: String) -> Self {
        Self::new(token, Duration::ZERO, false)
    }

    pub fn from_auth(auth: &AuthInfo) -> Self {
        Self::new(
            auth.client_token.clone(),
            Duration::from_secs(auth.lease_duration),
            auth.renewable,
        )
    }

    /// True once `threshold` (0..1) of the lease has elapsed
    pub fn needs_refresh(&self, threshold: f64) -> bool {
        if self.lease_duration.is_zero() {
            return false;
        }
        self.obtained_at.elapsed() >= self.refresh_after(threshold)
    }

    /// Time from `obtained_at` until a refresh is due
    pub fn refresh_after(&self, threshold: f64) -> Duration {
        Duration::from_secs_f64(self.lease_duration.as_secs_f64() * threshold)
    }

    pub fn is_expired(&self) -> bool {
        if self.lease_duration.is_zero() {
            return false;
        }
        self.obtained_at.elapsed() >= self.lease_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token_never_expires() {
        let token = TokenInfo::static_token("test".to_string());
        assert!(!token.needs_refresh(0.75));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_needs_refresh_at_threshold() {
        let mut token = TokenInfo::new("test".to_string(), Duration::from_secs(100), true);
        token.obtained_at = Instant::now() - Duration::from_secs(80);
        assert!(token.needs_refresh(0.75));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_refresh_after_scales_lease() {
        let token = TokenInfo::new("test".to_string(), Duration::from_secs(3600), true);
        assert_eq!(token.refresh_after(0.5), Duration::from_secs(1800));
    }

    #[test]
    fn test_from_auth() {
        let auth: AuthInfo = serde_json::from_value(serde_json::json!({
            "client_token": "hvs.x",
            "lease_duration": 60,
            "renewable": true
        }))
        .unwrap();
        let info = TokenInfo::from_auth(&auth);
        assert_eq!(info.token, "hvs.x");
        assert_eq!(info.lease_duration, Duration::from_secs(60));
        assert!(info.renewable);
    }
}
