// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Formatter};

use cloudauth_core::time::{now, DateTime};
use cloudauth_core::{utils::Redact, SigningCredential};

/// Credential that holds an api key and its shared secret.
#[derive(Clone)]
pub struct ApiKeyCredential {
    /// Public api key, repeated on every signed request.
    pub api_key: String,
    /// Shared secret the signature is computed under.
    pub secret_key: String,
}

impl ApiKeyCredential {
    /// Create a new credential.
    pub fn new(api_key: &str, secret_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

impl Debug for ApiKeyCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyCredential")
            .field("api_key", &Redact::from(&self.api_key))
            .field("secret_key", &Redact::from(&self.secret_key))
            .finish()
    }
}

impl SigningCredential for ApiKeyCredential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }
}

/// Session obtained from a login exchange.
///
/// Never mutated after creation; expiry triggers replacement through the
/// session cache.
#[derive(Clone)]
pub struct Session {
    /// Session key attached to every request signed under this session.
    pub session_key: String,
    /// Cookie the control plane pins the session to.
    pub jsessionid: Option<String>,
    /// When the session stops being usable, as declared by the provider or
    /// configured as a default.
    pub expires_at: Option<DateTime>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_key", &Redact::from(&self.session_key))
            .field("jsessionid", &self.jsessionid.as_ref().map(Redact::from))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SigningCredential for Session {
    fn is_valid(&self) -> bool {
        if self.session_key.is_empty() {
            return false;
        }
        // Take 60s as buffer to avoid using a session at the edge of expiry.
        if let Some(expires_at) = self.expires_at {
            return expires_at > now() + chrono::TimeDelta::try_seconds(60).expect("in bounds");
        }

        true
    }
}
