//! Auth method backends mounted under `auth/`.

mod approle;
mod jwt;
mod kubernetes;
mod token;
mod userpass;

pub use approle::*;
pub use jwt::*;
pub use kubernetes::*;
pub use token::*;
pub use userpass::*;

use crate::client::VaultClient;
use crate::path;

pub struct Auth<'a> {
    client: &'a VaultClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    pub fn approle(&self) -> AppRole<'a> {
        AppRole::new(self.client, "approle")
    }

    pub fn kubernetes(&self) -> Kubernetes<'a> {
        Kubernetes::new(self.client, "kubernetes")
    }

    pub fn jwt(&self) -> Jwt<'a> {
        Jwt::new(self.client, "jwt")
    }

    pub fn userpass(&self) -> Userpass<'a> {
        Userpass::new(self.client, "userpass")
    }

    pub fn token(&self) -> Token<'a> {
        Token::new(self.client)
    }
}

/// `auth/<mount>` base path
fn mount_path(mount: &str) -> String {
    path::join("auth", mount)
}
