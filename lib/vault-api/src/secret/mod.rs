//! Secret engines.

mod kv2;

pub use kv2::*;

use crate::client::VaultClient;

pub struct Secret<'a> {
    client: &'a VaultClient,
}

impl<'a> Secret<'a> {
    pub(crate) fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    /// KV v2 engine mounted at `secret`
    pub fn kv2(&self) -> Kv2<'a> {
        Kv2::new(self.client, "secret")
    }
}
