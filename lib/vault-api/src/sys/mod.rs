//! System backend endpoints under `sys/`.

mod audit;
mod auth;
mod namespaces;

pub use audit::*;
pub use auth::*;
pub use namespaces::*;

use crate::client::VaultClient;

pub struct Sys<'a> {
    client: &'a VaultClient,
}

impl<'a> Sys<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    pub fn audit(&self) -> Audit<'a> {
        Audit::new(self.client)
    }

    pub fn auth_methods(&self) -> AuthMethods<'a> {
        AuthMethods::new(self.client)
    }

    pub fn namespaces(&self) -> Namespaces<'a> {
        Namespaces::new(self.client)
    }
}
