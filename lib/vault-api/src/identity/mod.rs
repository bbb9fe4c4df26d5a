//! Identity secrets engine.

mod entity;
mod oidc;

pub use entity::*;
pub use oidc::*;

use crate::client::VaultClient;

pub struct Identity<'a> {
    client: &'a VaultClient,
}

impl<'a> Identity<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    pub fn entity(&self) -> Entities<'a> {
        Entities::new(self.client)
    }

    pub fn oidc(&self) -> OidcProvider<'a> {
        OidcProvider::new(self.client)
    }
}
