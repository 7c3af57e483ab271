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

use cloudauth_core::{utils::Redact, SigningCredential};

/// Credential for Atmos-style object storage.
#[derive(Clone)]
pub struct Credential {
    /// Full token uid, like `6039ac182f194e15b9261d73ce044939/user1`.
    pub uid: String,
    /// Shared secret, base64 encoded key material.
    pub secret_key: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(uid: &str, secret_key: &str) -> Self {
        Self {
            uid: uid.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("uid", &Redact::from(&self.uid))
            .field("secret_key", &Redact::from(&self.secret_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.uid.is_empty() && !self.secret_key.is_empty()
    }
}
