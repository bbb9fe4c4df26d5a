//! Path composition for Vault API endpoints.
//!
//! Every feature client owns a base path (for example `auth/approle`) and
//! builds endpoint paths by appending segments to it. Segments may carry
//! stray slashes from user input; they are normalized here so the dispatcher
//! always receives `a/b/c` with no leading or trailing slash.

use crate::error::{Result, VaultError};

/// Check a caller-supplied object name. A name made only of slashes would
/// collapse into the parent collection path, so it is rejected.
pub fn name<'n>(kind: &'static str, value: &'n str) -> Result<&'n str> {
    if value.split('/').all(str::is_empty) {
        return Err(VaultError::EmptyName(kind));
    }
    Ok(value)
}

/// Join a parent path and a relative child path.
pub fn join(parent: &str, child: &str) -> String {
    join_all([parent, child])
}

/// Join any number of path segments, dropping empty ones.
pub fn join_all<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for segment in segments {
        for part in segment.split('/').filter(|p| !p.is_empty()) {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(part);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_strips_slashes() {
        assert_eq!(join("auth/", "/approle/"), "auth/approle");
        assert_eq!(join("/secret", "data/app/db"), "secret/data/app/db");
    }

    #[test]
    fn test_join_skips_empty_segments() {
        assert_eq!(join("", "kv"), "kv");
        assert_eq!(join("kv", ""), "kv");
        assert_eq!(join("", ""), "");
        assert_eq!(join("a//b", "c"), "a/b/c");
    }

    #[test]
    fn test_name_rejects_empty() {
        assert_eq!(name("role", "web").unwrap(), "web");
        assert_eq!(name("secret", "app/db").unwrap(), "app/db");
        assert!(matches!(name("role", ""), Err(VaultError::EmptyName("role"))));
        assert!(matches!(name("user", "//"), Err(VaultError::EmptyName("user"))));
    }

    #[test]
    fn test_join_all() {
        assert_eq!(
            join_all(["auth", "approle/", "role", "my-role", "secret-id"]),
            "auth/approle/role/my-role/secret-id"
        );
    }
}
