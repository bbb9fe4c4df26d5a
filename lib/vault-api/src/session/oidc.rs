use super::oidc_cache::MIN_REMAINING_TTL;
use super::{AuthMethod, OidcCache, TokenInfo};
use crate::auth::{OidcAuthUrlPayload, OidcCallbackParams};
use crate::client::VaultClient;
use crate::error::{Result, VaultError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

const CALLBACK_PORT: u16 = 8250;
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);
const CALLBACK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>Vault login complete</h1><p>You can close this window.</p></body></html>";

/// Browser based OIDC login through the JWT/OIDC backend (local development)
pub struct OidcAuth {
    pub mount: String,
    pub role: String,
    cache: Option<OidcCache>,
}

impl OidcAuth {
    pub fn new(mount: String, role: String) -> Self {
        Self {
            mount,
            role,
            cache: OidcCache::new(),
        }
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn with_cache(mut self, cache: OidcCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Put a cached token on the client and read its real lease back.
    async fn adopt_cached(&self, client: &VaultClient, token: String) -> Result<TokenInfo> {
        client.set_token(Some(token.clone())).await;
        let lookup = client.auth().token().lookup_self().await?;

        let ttl = Duration::from_secs(lookup.ttl);
        if !ttl.is_zero() && ttl < MIN_REMAINING_TTL {
            return Err(VaultError::OidcError(format!(
                "Cached token expires in {}s",
                lookup.ttl
            )));
        }
        Ok(TokenInfo::new(token, ttl, lookup.renewable))
    }

    fn redirect_uri() -> String {
        format!("http://localhost:{}/oidc/callback", CALLBACK_PORT)
    }

    async fn wait_for_callback(&self, expected_state: &str) -> Result<OidcCallbackParams> {
        let listener = TcpListener::bind(("127.0.0.1", CALLBACK_PORT))
            .await
            .map_err(|e| VaultError::OidcError(format!("Failed to bind callback port: {}", e)))?;

        let request_line = tokio::time::timeout(CALLBACK_TIMEOUT, async {
            let (mut stream, _) = listener.accept().await?;

            let mut request_line = String::new();
            BufReader::new(&mut stream).read_line(&mut request_line).await?;
            stream.write_all(CALLBACK_RESPONSE.as_bytes()).await?;

            Ok::<_, std::io::Error>(request_line)
        })
        .await
        .map_err(|_| VaultError::OidcError("Callback timeout".to_string()))?
        .map_err(|e| VaultError::OidcError(format!("Callback error: {}", e)))?;

        let params = parse_callback(&request_line)?;
        if params.state != expected_state {
            return Err(VaultError::OidcError("State mismatch".to_string()));
        }
        Ok(params)
    }
}

/// Parse `GET /oidc/callback?state=...&code=... HTTP/1.1`
fn parse_callback(request_line: &str) -> Result<OidcCallbackParams> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| VaultError::OidcError("Invalid callback request".to_string()))?;

    let url = reqwest::Url::parse(&format!("http://localhost{}", target))
        .map_err(|e| VaultError::OidcError(format!("Invalid callback URL: {}", e)))?;

    let mut params = OidcCallbackParams::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "state" => params.state = value.into_owned(),
            "code" => params.code = value.into_owned(),
            "nonce" => params.nonce = Some(value.into_owned()),
            _ => {}
        }
    }

    if params.state.is_empty() {
        return Err(VaultError::OidcError("Missing state".to_string()));
    }
    if params.code.is_empty() {
        return Err(VaultError::OidcError("Missing code".to_string()));
    }
    Ok(params)
}

#[async_trait]
impl AuthMethod for OidcAuth {
    async fn authenticate(&self, client: &VaultClient) -> Result<TokenInfo> {
        let cache_scope = format!("{}|{}", client.address(), client.namespace().unwrap_or_default());

        if let Some(ref cache) = self.cache {
            if let Some(token) = cache.get(&cache_scope, &self.mount, &self.role) {
                match self.adopt_cached(client, token).await {
                    Ok(token_info) => {
                        tracing::debug!(lease = ?token_info.lease_duration, "Using cached OIDC token");
                        return Ok(token_info);
                    }
                    Err(e) => {
                        tracing::info!(error = %e, "Cached OIDC token unusable, logging in again");
                        cache.clear(&cache_scope, &self.mount, &self.role);
                        client.set_token(None).await;
                    }
                }
            }
        }

        let jwt = client.auth().jwt().with_mount(&self.mount);
        let auth_url = jwt
            .oidc_auth_url(&OidcAuthUrlPayload {
                role: Some(self.role.clone()),
                redirect_uri: Self::redirect_uri(),
                client_nonce: None,
            })
            .await?;

        if auth_url.auth_url.is_empty() {
            return Err(VaultError::OidcError(format!(
                "No auth URL returned, check that role {} allows {}",
                self.role,
                Self::redirect_uri()
            )));
        }
        let state = auth_url
            .state()
            .ok_or_else(|| VaultError::OidcError("Auth URL has no state".to_string()))?;

        tracing::info!("Opening browser for OIDC authentication...");
        if webbrowser::open(&auth_url.auth_url).is_err() {
            tracing::warn!("Failed to open browser. Please visit: {}", auth_url.auth_url);
        }

        let params = self.wait_for_callback(&state).await?;
        let auth = jwt.oidc_callback(&params).await?;
        let token_info = TokenInfo::from_auth(&auth);

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.set(
                &cache_scope,
                &self.mount,
                &self.role,
                &token_info.token,
                token_info.lease_duration,
            ) {
                tracing::warn!("Failed to cache OIDC token: {}", e);
            }
        }

        Ok(token_info)
    }

    fn supports_renewal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback() {
        let params =
            parse_callback("GET /oidc/callback?state=st_1&code=abc%2F123&nonce=n_9 HTTP/1.1\r\n")
                .unwrap();
        assert_eq!(params.state, "st_1");
        assert_eq!(params.code, "abc/123");
        assert_eq!(params.nonce.as_deref(), Some("n_9"));
    }

    #[test]
    fn test_parse_callback_missing_code() {
        let result = parse_callback("GET /oidc/callback?state=st_1 HTTP/1.1");
        assert!(matches!(result, Err(VaultError::OidcError(m)) if m == "Missing code"));
    }

    #[test]
    fn test_parse_callback_garbage() {
        assert!(parse_callback("").is_err());
    }
}
