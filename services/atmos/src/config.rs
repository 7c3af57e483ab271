use std::fmt::{Debug, Formatter};

use super::constants::*;
use cloudauth_core::{utils::Redact, Context};

/// Config carries the static configuration for Atmos-style storage clients.
#[derive(Clone, Default)]
pub struct Config {
    /// `uid` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ATMOS_UID`]
    pub uid: Option<String>,
    /// `secret_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ATMOS_SECRET_KEY`]
    pub secret_key: Option<String>,
}

impl Config {
    /// Create a new Config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set uid.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Set secret_key.
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(ATMOS_UID) {
            self.uid.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ATMOS_SECRET_KEY) {
            self.secret_key.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("uid", &self.uid.as_ref().map(Redact::from))
            .field("secret_key", &self.secret_key.as_ref().map(Redact::from))
            .finish()
    }
}
