use super::{AuthMethod, TokenInfo};
use crate::client::VaultClient;
use crate::error::{Result, VaultError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

const DEFAULT_REFRESH_THRESHOLD: f64 = 0.75;
const DEFAULT_MIN_RENEWAL_DURATION: Duration = Duration::from_secs(300);
const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct TokenManagerConfig {
    /// Fraction of the lease after which the token is renewed
    pub refresh_threshold: f64,
    /// Leases shorter than this are left to expire
    pub min_renewal_duration: Duration,
    pub retry_interval: Duration,
}

impl Default for TokenManagerConfig {
    fn default() -> Self {
        Self {
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            min_renewal_duration: DEFAULT_MIN_RENEWAL_DURATION,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Logs a client in and keeps its token alive in the background. Dropping
/// the manager stops renewal; the client keeps its last token.
pub struct TokenManager {
    token: Arc<RwLock<TokenInfo>>,
    renewal: Option<JoinHandle<()>>,
}

impl TokenManager {
    pub async fn new(
        client: VaultClient,
        auth_method: Arc<dyn AuthMethod>,
        config: TokenManagerConfig,
    ) -> Result<Self> {
        let token_info = auth_method.authenticate(&client).await?;
        client.set_token(Some(token_info.token.clone())).await;

        let token = Arc::new(RwLock::new(token_info));
        let renewal = auth_method.supports_renewal().then(|| {
            tokio::spawn(renewal_loop(
                client,
                Arc::clone(&auth_method),
                Arc::clone(&token),
                config,
            ))
        });

        Ok(Self { token, renewal })
    }

    pub async fn get_token(&self) -> String {
        self.token.read().await.token.clone()
    }

    pub async fn token_info(&self) -> TokenInfo {
        self.token.read().await.clone()
    }
}

impl Drop for TokenManager {
    fn drop(&mut self) {
        if let Some(handle) = self.renewal.take() {
            handle.abort();
        }
    }
}

async fn renewal_loop(
    client: VaultClient,
    auth_method: Arc<dyn AuthMethod>,
    token: Arc<RwLock<TokenInfo>>,
    config: TokenManagerConfig,
) {
    loop {
        let (renewable, sleep_duration) = {
            let token_info = token.read().await;

            if token_info.lease_duration.is_zero() {
                // Static token, never refresh
                break;
            }

            if token_info.lease_duration < config.min_renewal_duration {
                tracing::debug!(
                    lease = ?token_info.lease_duration,
                    "Token lease too short for renewal"
                );
                break;
            }

            let until_refresh = if token_info.needs_refresh(config.refresh_threshold) {
                Duration::ZERO
            } else {
                token_info
                    .refresh_after(config.refresh_threshold)
                    .saturating_sub(token_info.obtained_at.elapsed())
            };

            (token_info.renewable, until_refresh)
        };

        if !sleep_duration.is_zero() {
            tokio::time::sleep(sleep_duration).await;
            continue;
        }

        let renewed = if renewable {
            renew_token(&client).await
        } else {
            Err(VaultError::AuthError("token is not renewable".to_string()))
        };

        match renewed {
            Ok(new_token) => {
                *token.write().await = new_token;
                tracing::debug!("Token renewed successfully");
            }
            Err(e) if !renewable || e.is_client_error() => {
                tracing::info!(error = %e, "Token renewal not possible, re-authenticating");
                match auth_method.authenticate(&client).await {
                    Ok(new_token) => {
                        client.set_token(Some(new_token.token.clone())).await;
                        *token.write().await = new_token;
                        tracing::debug!("Re-authenticated successfully");
                    }
                    Err(e) => {
                        tracing::error!("Re-authentication failed: {}", e);
                        tokio::time::sleep(config.retry_interval).await;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Token renewal failed: {}, retrying in {:?}",
                    e,
                    config.retry_interval
                );
                tokio::time::sleep(config.retry_interval).await;
            }
        }
    }
}

async fn renew_token(client: &VaultClient) -> Result<TokenInfo> {
    let auth = client.auth().token().renew_self(None).await?;
    client.set_token(Some(auth.client_token.clone())).await;
    Ok(TokenInfo::from_auth(&auth))
}
