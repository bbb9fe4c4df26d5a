use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Cached tokens must outlive this to be reused
pub(crate) const MIN_REMAINING_TTL: Duration = Duration::from_secs(3600);

#[derive(Serialize, Deserialize)]
struct CachedToken {
    token: String,
    expires_at: u64,
}

/// On-disk cache of OIDC-issued tokens, one JSON file per
/// (server scope, mount, role).
pub struct OidcCache {
    cache_dir: PathBuf,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl OidcCache {
    pub fn new() -> Option<Self> {
        directories::ProjectDirs::from("", "", "vault-api").map(|dirs| Self {
            cache_dir: dirs.cache_dir().to_path_buf(),
        })
    }

    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn cache_key(scope: &str, mount: &str, role: &str) -> String {
        let mut hasher = Sha256::new();
        for part in [scope, mount, role] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    fn cache_path(&self, scope: &str, mount: &str, role: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.json", Self::cache_key(scope, mount, role)))
    }

    pub fn get(&self, scope: &str, mount: &str, role: &str) -> Option<String> {
        let content = std::fs::read_to_string(self.cache_path(scope, mount, role)).ok()?;
        let cached: CachedToken = serde_json::from_str(&content).ok()?;

        let remaining = cached.expires_at.saturating_sub(unix_now());
        (remaining >= MIN_REMAINING_TTL.as_secs()).then_some(cached.token)
    }

    pub fn set(&self, scope: &str, mount: &str, role: &str, token: &str, ttl: Duration) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;

        let cached = CachedToken {
            token: token.to_string(),
            expires_at: unix_now() + ttl.as_secs(),
        };
        std::fs::write(
            self.cache_path(scope, mount, role),
            serde_json::to_string(&cached)?,
        )?;
        Ok(())
    }

    pub fn clear(&self, scope: &str, mount: &str, role: &str) {
        let _ = std::fs::remove_file(self.cache_path(scope, mount, role));
    }
}
