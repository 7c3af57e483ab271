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

use crate::{BackoffPolicy, Context, Error, ErrorKind, ProvideCredential, Result,
            SigningCredential};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// SessionCache memoizes the credential acquired from a provider and shares
/// one in-flight acquisition across concurrent callers.
///
/// Concurrent `get` calls during a cache miss elect a single leader through
/// an async mutex; the leader performs the underlying acquisition while the
/// rest wait and pick up the cached result, so a cold cache issues exactly
/// one login per generation. A waiter cancelled at the guard simply leaves
/// the queue; a cancelled leader releases the guard and the next waiter
/// takes over.
///
/// Acquisition failures split two ways:
///
/// - transient failures are retried in place under the login backoff policy;
/// - terminal authorization failures become sticky: every current and later
///   caller fails fast until the cache is rebuilt with new credentials.
pub struct SessionCache<C: SigningCredential> {
    provider: Arc<dyn ProvideCredential<Credential = C>>,
    backoff: BackoffPolicy,
    slot: Arc<Mutex<Slot<C>>>,
    flight: Arc<tokio::sync::Mutex<()>>,
}

enum Slot<C> {
    Empty,
    Ready(C),
    Denied { kind: ErrorKind, message: String },
}

impl<C: SigningCredential> SessionCache<C> {
    /// Create a new cache over the given provider.
    pub fn new(provider: impl ProvideCredential<Credential = C>) -> Self {
        Self {
            provider: Arc::new(provider),
            backoff: BackoffPolicy::default(),
            slot: Arc::new(Mutex::new(Slot::Empty)),
            flight: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Replace the backoff policy applied to transient acquisition failures.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Return the cached credential, acquiring one if needed.
    ///
    /// Returns `Ok(None)` when the provider has nothing to offer.
    pub async fn get(&self, ctx: &Context) -> Result<Option<C>> {
        if let Some(hit) = self.lookup()? {
            return Ok(Some(hit));
        }

        let _leader = self.flight.lock().await;

        // Another caller may have filled the slot while we queued.
        if let Some(hit) = self.lookup()? {
            return Ok(Some(hit));
        }

        let mut attempt = 0;
        loop {
            match self.provider.provide_credential(ctx).await {
                Ok(Some(credential)) => {
                    if credential.is_valid() {
                        *self.slot.lock().expect("lock poisoned") =
                            Slot::Ready(credential.clone());
                    }
                    return Ok(Some(credential));
                }
                Ok(None) => return Ok(None),
                Err(err) if err.kind() == ErrorKind::Authorization => {
                    *self.slot.lock().expect("lock poisoned") = Slot::Denied {
                        kind: err.kind(),
                        message: err.to_string(),
                    };
                    return Err(err);
                }
                Err(err) if err.is_transient() && self.backoff.should_retry(attempt) => {
                    log::debug!("credential acquisition failed, will retry: {err:?}");
                    tokio::time::sleep(self.backoff.delay_before(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Drop the cached credential, forcing the next `get` to re-acquire.
    ///
    /// Cheap and non-blocking. A sticky denial survives invalidation; only a
    /// freshly constructed cache clears it.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().expect("lock poisoned");
        if matches!(*slot, Slot::Ready(_)) {
            *slot = Slot::Empty;
        }
    }

    /// Remove and return the cached credential, if any.
    ///
    /// Used to tear a session down (logout) when the owning client closes.
    pub fn take(&self) -> Option<C> {
        let mut slot = self.slot.lock().expect("lock poisoned");
        match std::mem::replace(&mut *slot, Slot::Empty) {
            Slot::Ready(credential) => Some(credential),
            denied @ Slot::Denied { .. } => {
                *slot = denied;
                None
            }
            Slot::Empty => None,
        }
    }

    fn lookup(&self) -> Result<Option<C>> {
        let mut slot = self.slot.lock().expect("lock poisoned");
        match &*slot {
            Slot::Ready(credential) if credential.is_valid() => Ok(Some(credential.clone())),
            Slot::Ready(_) => {
                // Expired: replace, never mutate.
                *slot = Slot::Empty;
                Ok(None)
            }
            Slot::Denied { kind, message } => Err(Error::new(*kind, message.clone())),
            Slot::Empty => Ok(None),
        }
    }
}

impl<C: SigningCredential> Clone for SessionCache<C> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            backoff: self.backoff,
            slot: self.slot.clone(),
            flight: self.flight.clone(),
        }
    }
}

impl<C: SigningCredential> Debug for SessionCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("provider", &self.provider)
            .field("backoff", &self.backoff)
            .finish()
    }
}
