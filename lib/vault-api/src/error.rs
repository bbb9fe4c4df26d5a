use thiserror::Error;

pub type Result<T, E = VaultError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault not detected: VAULT_ADDR not set")]
    VaultNotDetected,

    #[error("Invalid Vault address {address}: {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Invalid Vault namespace {namespace:?}: {message}")]
    InvalidNamespace { namespace: String, message: String },

    #[error("Empty {0} name")]
    EmptyName(&'static str),

    #[error("Vault API error ({status}): {}", .errors.join("; "))]
    Api { status: u16, errors: Vec<String> },

    #[error("Vault request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("OIDC authentication failed: {0}")]
    OidcError(String),

    #[error("Kubernetes auth failed: {0}")]
    KubernetesError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VaultError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            VaultError::Api { status, .. } => Some(*status),
            VaultError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(s) if (400..500).contains(&s))
    }
}
