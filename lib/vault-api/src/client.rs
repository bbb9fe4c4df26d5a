use crate::auth::Auth;
use crate::error::{Result, VaultError};
use crate::identity::Identity;
use crate::models::{AuthInfo, ErrorResponse, ListData, VaultResponse};
use crate::secret::Secret;
use crate::session::{
    AuthMethod, KubernetesAuth, OidcAuth, StaticTokenAuth, TokenManager, TokenManagerConfig,
};
use crate::sys::Sys;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_K8S_AUTH_METHOD: &str = "kubernetes";
const DEFAULT_OIDC_AUTH_METHOD: &str = "oidc";
const DEFAULT_ROLE: &str = "app";
const DEFAULT_K8S_JWT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";
const MERGE_PATCH: &str = "application/merge-patch+json";

pub struct VaultClientBuilder {
    address: Option<String>,
    token: Option<String>,
    namespace: Option<String>,
    timeout: Duration,
    k8s_auth_method: Option<String>,
    oidc_auth_method: Option<String>,
    role: Option<String>,
    application_name: Option<String>,
    renewable_token_min_duration: Duration,
    retry_interval: Duration,
}

impl Default for VaultClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultClientBuilder {
    pub fn new() -> Self {
        Self {
            address: None,
            token: None,
            namespace: None,
            timeout: DEFAULT_TIMEOUT,
            k8s_auth_method: None,
            oidc_auth_method: None,
            role: None,
            application_name: None,
            renewable_token_min_duration: Duration::from_secs(300),
            retry_interval: Duration::from_secs(10),
        }
    }

    pub fn address(mut self, url: impl Into<String>) -> Self {
        self.address = Some(url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Vault Enterprise namespace sent with every request
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn k8s_auth_method(mut self, method: impl Into<String>) -> Self {
        self.k8s_auth_method = Some(method.into());
        self
    }

    pub fn oidc_auth_method(mut self, method: impl Into<String>) -> Self {
        self.oidc_auth_method = Some(method.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sent as the User-Agent header
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn renewable_token_min_duration(mut self, duration: Duration) -> Self {
        self.renewable_token_min_duration = duration;
        self
    }

    pub fn retry_interval(mut self, duration: Duration) -> Self {
        self.retry_interval = duration;
        self
    }

    fn resolve_config<F>(&self, env: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = self
            .address
            .clone()
            .or_else(|| env("VAULT_ADDR"))
            .ok_or(VaultError::VaultNotDetected)?;

        let token = self.token.clone().or_else(|| env("VAULT_TOKEN"));

        let namespace = self
            .namespace
            .clone()
            .or_else(|| env("VAULT_NAMESPACE"))
            .filter(|ns| !ns.is_empty());

        let k8s_auth_method = self
            .k8s_auth_method
            .clone()
            .or_else(|| env("VAULT_AUTH_METHOD"))
            .unwrap_or_else(|| DEFAULT_K8S_AUTH_METHOD.to_string());

        let oidc_auth_method = self
            .oidc_auth_method
            .clone()
            .unwrap_or_else(|| DEFAULT_OIDC_AUTH_METHOD.to_string());

        let role = self
            .role
            .clone()
            .or_else(|| env("VAULT_ROLE_ID"))
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let k8s_jwt_path =
            env("K8S_JWT_TOKEN_PATH").unwrap_or_else(|| DEFAULT_K8S_JWT_PATH.to_string());

        let is_kubernetes = env("KUBERNETES_SERVICE_HOST").is_some();

        Ok(ResolvedConfig {
            address,
            token,
            namespace,
            k8s_auth_method,
            oidc_auth_method,
            role,
            k8s_jwt_path,
            is_kubernetes,
        })
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(ref app_name) = self.application_name {
            builder = builder.user_agent(app_name.clone());
        }
        Ok(builder.build()?)
    }

    fn client_from(&self, config: &ResolvedConfig) -> Result<VaultClient> {
        let parsed =
            reqwest::Url::parse(&config.address).map_err(|e| VaultError::InvalidAddress {
                address: config.address.clone(),
                message: e.to_string(),
            })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(VaultError::InvalidAddress {
                address: config.address.clone(),
                message: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let namespace_header = match config.namespace {
            Some(ref namespace) => Some(HeaderValue::from_str(namespace).map_err(|e| {
                VaultError::InvalidNamespace {
                    namespace: namespace.clone(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(VaultClient {
            inner: Arc::new(Inner {
                http: self.http_client()?,
                address: config.address.trim_end_matches('/').to_string(),
                base_url: parsed,
                namespace: config.namespace.clone(),
                namespace_header,
                token: RwLock::new(config.token.clone()),
            }),
        })
    }

    /// Build a client without logging in. The token, if any, comes from the
    /// builder or `VAULT_TOKEN`.
    pub fn build(self) -> Result<VaultClient> {
        let config = self.resolve_config(|key| std::env::var(key).ok())?;
        self.client_from(&config)
    }

    /// Build a client and log in with an auto-detected method:
    /// 1. VAULT_TOKEN → static token
    /// 2. KUBERNETES_SERVICE_HOST → Kubernetes auth
    /// 3. Otherwise → OIDC (local development)
    ///
    /// The returned manager keeps the token renewed until dropped.
    pub async fn build_with_login(self) -> Result<(VaultClient, TokenManager)> {
        let config = self.resolve_config(|key| std::env::var(key).ok())?;
        let client = self.client_from(&config)?;

        let auth_method: Arc<dyn AuthMethod> = if let Some(token) = config.token {
            Arc::new(StaticTokenAuth::new(token))
        } else if config.is_kubernetes {
            Arc::new(
                KubernetesAuth::new(config.k8s_auth_method, config.role)
                    .with_jwt_path(config.k8s_jwt_path),
            )
        } else {
            Arc::new(OidcAuth::new(config.oidc_auth_method, config.role))
        };

        let manager = TokenManager::new(
            client.clone(),
            auth_method,
            TokenManagerConfig {
                refresh_threshold: 0.75,
                min_renewal_duration: self.renewable_token_min_duration,
                retry_interval: self.retry_interval,
            },
        )
        .await?;

        Ok((client, manager))
    }
}

struct ResolvedConfig {
    address: String,
    token: Option<String>,
    namespace: Option<String>,
    k8s_auth_method: String,
    oidc_auth_method: String,
    role: String,
    k8s_jwt_path: String,
    is_kubernetes: bool,
}

/// A single request against the Vault HTTP API, relative to `/v1/`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    content_type: Option<&'static str>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Vault's `LIST` verb
    pub fn list(path: impl Into<String>) -> Self {
        // "LIST" is a valid token, the conversion cannot fail
        let method = Method::from_bytes(b"LIST").unwrap_or(Method::GET);
        Self::new(method, path)
    }

    /// PATCH with `application/merge-patch+json`, as Vault requires
    pub fn merge_patch(path: impl Into<String>) -> Self {
        let mut request = Self::new(Method::PATCH, path);
        request.content_type = Some(MERGE_PATCH);
        request
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

struct Inner {
    http: reqwest::Client,
    address: String,
    base_url: reqwest::Url,
    namespace: Option<String>,
    namespace_header: Option<HeaderValue>,
    token: RwLock<Option<String>>,
}

/// Vault HTTP client. Clones share the connection pool and the token.
#[derive(Clone)]
pub struct VaultClient {
    inner: Arc<Inner>,
}

impl VaultClient {
    pub fn from_env() -> Result<Self> {
        VaultClientBuilder::new().build()
    }

    pub fn builder() -> VaultClientBuilder {
        VaultClientBuilder::new()
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.token.read().await.clone()
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.inner.token.write().await = token;
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn secret(&self) -> Secret<'_> {
        Secret::new(self)
    }

    pub fn sys(&self) -> Sys<'_> {
        Sys::new(self)
    }

    pub fn identity(&self) -> Identity<'_> {
        Identity::new(self)
    }

    fn headers(&self, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(TOKEN_HEADER, header_value(TOKEN_HEADER, token)?);
        }
        if let Some(ref namespace) = self.inner.namespace_header {
            headers.insert(NAMESPACE_HEADER, namespace.clone());
        }
        Ok(headers)
    }

    /// `{address}/v1/{path}` with every path segment percent-encoded
    fn endpoint(&self, path: &str) -> Result<reqwest::Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VaultError::InvalidAddress {
                address: self.inner.address.clone(),
                message: "address cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push("v1")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    /// Send a request and return the raw response body of a 2xx reply.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<String> {
        let url = self.endpoint(&request.path)?;
        let token = self.token().await;

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(self.headers(token.as_deref())?);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            // json() keeps an explicit content type
            if let Some(content_type) = request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "Vault request"
        );

        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(api_error(status, &body))
        }
    }

    /// Send a request and decode the whole JSON body.
    pub async fn send<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let path = request.path.clone();
        let body = self.dispatch(request).await?;
        decode(&path, &body)
    }

    /// Send a request whose reply carries no useful body.
    pub async fn send_unit(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(request).await.map(|_| ())
    }

    /// Send a request and return the `data` field of the envelope.
    pub async fn send_data<D: DeserializeOwned>(&self, request: ApiRequest) -> Result<D> {
        let path = request.path.clone();
        let response: VaultResponse<D> = self.send(request).await?;
        response.data.ok_or_else(|| VaultError::Decode {
            path,
            message: "response has no data".to_string(),
        })
    }

    /// Like [`send_data`](Self::send_data), but an empty reply (204) is
    /// `None`. Vault answers some create-or-update calls with data only when
    /// the object is created.
    pub async fn send_optional_data<D: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Option<D>> {
        let path = request.path.clone();
        let body = self.dispatch(request).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let response: VaultResponse<D> = decode(&path, &body)?;
        Ok(response.data)
    }

    /// LIST a path. Vault answers 404 with no messages for an empty listing.
    pub async fn send_list(&self, request: ApiRequest) -> Result<Vec<String>> {
        match self.send_data::<ListData>(request).await {
            Ok(data) => Ok(data.keys),
            Err(VaultError::Api { status: 404, errors }) if errors.is_empty() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Send a login request and adopt the issued token.
    pub async fn send_login(&self, request: ApiRequest) -> Result<AuthInfo> {
        let path = request.path.clone();
        let auth = self.send_auth(request).await?;
        tracing::debug!(path = %path, accessor = %auth.accessor, "Logged in");
        self.set_token(Some(auth.client_token.clone())).await;
        Ok(auth)
    }

    /// Send a request and return the `auth` block without touching the
    /// client token.
    pub async fn send_auth(&self, request: ApiRequest) -> Result<AuthInfo> {
        let path = request.path.clone();
        let response: VaultResponse<serde_json::Value> = self.send(request).await?;
        response.auth.ok_or_else(|| VaultError::Decode {
            path,
            message: "response has no auth block".to_string(),
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| VaultError::AuthError(format!("Invalid {name}: {e}")))
}

fn decode<R: DeserializeOwned>(path: &str, body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|e| VaultError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn api_error(status: StatusCode, body: &str) -> VaultError {
    let errors = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.errors,
        Err(_) if body.trim().is_empty() => Vec::new(),
        Err(_) => vec![body.trim().to_string()],
    };
    VaultError::Api {
        status: status.as_u16(),
        errors,
    }
}
