//! Classification of failed attempts into retry decisions.

use crate::{BackoffPolicy, Error, ErrorKind, Result};
use bytes::Bytes;
use http::header;
use http::uri::Authority;
use http::StatusCode;
use http::Uri;
use std::fmt::Debug;
use std::sync::Arc;

/// Command is the mutable execution context of one logical call.
///
/// It carries the current request, the attempt counter that bounds retries
/// and redirects alike, and the most recent terminal failure. Owned by a
/// single call chain, never shared across concurrent requests.
#[derive(Debug)]
pub struct Command {
    request: http::Request<Bytes>,
    attempts: u32,
    failure: Option<Error>,
}

impl Command {
    /// Wrap a request into a fresh command.
    pub fn new(request: http::Request<Bytes>) -> Self {
        Self {
            request,
            attempts: 0,
            failure: None,
        }
    }

    /// The request as it currently stands.
    pub fn request(&self) -> &http::Request<Bytes> {
        &self.request
    }

    /// How many retries have happened so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Build the next attempt from the current request.
    ///
    /// `Bytes` bodies clone cheaply and stay re-readable, so a retried
    /// attempt always carries the full body.
    pub fn next_attempt(&self) -> http::Request<Bytes> {
        let mut req = http::Request::new(self.request.body().clone());
        *req.method_mut() = self.request.method().clone();
        *req.uri_mut() = self.request.uri().clone();
        *req.version_mut() = self.request.version();
        *req.headers_mut() = self.request.headers().clone();
        req
    }

    /// Rewrite the request endpoint, preserving method, path and query.
    pub fn redirect_to(&mut self, authority: Authority) -> Result<()> {
        let mut parts = self.request.uri().clone().into_parts();
        parts.authority = Some(authority);
        if parts.scheme.is_none() {
            parts.scheme = Some(http::uri::Scheme::HTTP);
        }
        *self.request.uri_mut() = Uri::from_parts(parts)?;
        Ok(())
    }

    /// Take the recorded terminal failure.
    pub fn take_failure(&mut self) -> Error {
        self.failure
            .take()
            .unwrap_or_else(|| Error::unexpected("call aborted without a recorded failure"))
    }

    fn bump(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    fn fail(&mut self, error: Error) {
        self.failure = Some(error);
    }
}

/// ExtractEndpoint parses a provider-declared alternate endpoint out of a
/// redirect response body.
///
/// Some object stores answer 301/307 without a `Location` header and declare
/// the right endpoint in the error body instead; the format is
/// provider-specific, so the parser is injected.
pub trait ExtractEndpoint: Debug + Send + Sync + 'static {
    /// Extract the alternate endpoint, if the body declares one.
    fn alternate_endpoint(&self, response: &http::Response<Bytes>) -> Option<Authority>;
}

/// The decision taken after inspecting one attempt's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// The attempt succeeded; hand the response to the caller.
    Complete,
    /// Resend the same request after the backoff delay.
    RetrySameEndpoint,
    /// Rewrite the request host and resend.
    RetryNewEndpoint(Authority),
    /// Invalidate the cached session, re-sign and resend.
    RetryAfterInvalidate,
    /// Stop; the command carries the terminal failure.
    GiveUp,
}

/// RetryPolicy decides what a failed attempt means.
///
/// One parameterized policy per client instead of a handler subclass per
/// provider: the per-provider parts are the backoff bounds and the optional
/// redirect body parser.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    backoff: BackoffPolicy,
    redirect: Option<Arc<dyn ExtractEndpoint>>,
}

impl RetryPolicy {
    /// Create a policy with the given backoff bounds.
    pub fn new(backoff: BackoffPolicy) -> Self {
        Self {
            backoff,
            redirect: None,
        }
    }

    /// Attach a redirect body parser for 301/307 responses without a
    /// `Location` header.
    pub fn with_endpoint_extractor(mut self, extractor: impl ExtractEndpoint) -> Self {
        self.redirect = Some(Arc::new(extractor));
        self
    }

    /// The backoff bounds this policy consults.
    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Classify one attempt's outcome.
    ///
    /// Every retry decision increments the command's attempt counter exactly
    /// once; `GiveUp` records the terminal failure on the command.
    pub fn decide(&self, cmd: &mut Command, outcome: &Result<http::Response<Bytes>>) -> RetryDecision {
        match outcome {
            Ok(resp) if resp.status().is_success() => RetryDecision::Complete,
            Ok(resp) if resp.status() == StatusCode::UNAUTHORIZED => {
                if self.backoff.should_retry(cmd.attempts()) {
                    cmd.bump();
                    RetryDecision::RetryAfterInvalidate
                } else {
                    cmd.fail(Error::authorization(format!(
                        "session rejected after {} refresh attempts",
                        cmd.attempts()
                    )));
                    RetryDecision::GiveUp
                }
            }
            Ok(resp)
                if resp.status() == StatusCode::MOVED_PERMANENTLY
                    || resp.status() == StatusCode::TEMPORARY_REDIRECT =>
            {
                self.decide_redirect(cmd, resp)
            }
            Ok(resp) if resp.status().is_server_error() => {
                self.decide_transient(cmd, format!("server error {}", resp.status()))
            }
            Ok(resp) => {
                cmd.fail(Error::request_rejected(format!(
                    "request rejected with status {}",
                    resp.status()
                )));
                RetryDecision::GiveUp
            }
            Err(err) if err.is_transient() => self.decide_transient(cmd, err.to_string()),
            Err(err) => {
                cmd.fail(Error::new(err.kind(), err.to_string()));
                RetryDecision::GiveUp
            }
        }
    }

    fn decide_redirect(&self, cmd: &mut Command, resp: &http::Response<Bytes>) -> RetryDecision {
        let current_host = cmd
            .request()
            .uri()
            .host()
            .unwrap_or_default()
            .to_string();

        // A relative Location names no authority and therefore points at the
        // host we already talk to.
        let mut same_host = false;
        let target = if let Some(location) = resp.headers().get(header::LOCATION) {
            let authority = location
                .to_str()
                .ok()
                .and_then(|s| s.parse::<Uri>().ok())
                .and_then(|uri| uri.into_parts().authority);
            same_host = authority.is_none();
            authority
        } else if let Some(extractor) = &self.redirect {
            extractor.alternate_endpoint(resp)
        } else {
            None
        };

        match target {
            Some(authority) if !authority.host().eq_ignore_ascii_case(&current_host) => {
                if self.backoff.should_retry(cmd.attempts()) {
                    cmd.bump();
                    RetryDecision::RetryNewEndpoint(authority)
                } else {
                    cmd.fail(Error::redirect_exhausted(format!(
                        "redirected to {authority} after the retry budget of {} was spent",
                        self.backoff.max_retries()
                    )));
                    RetryDecision::GiveUp
                }
            }
            Some(_) => self.decide_same_host_redirect(cmd, &current_host),
            None if same_host => self.decide_same_host_redirect(cmd, &current_host),
            None => {
                cmd.fail(Error::protocol(format!(
                    "redirect from {current_host} carried no usable alternate endpoint"
                )));
                RetryDecision::GiveUp
            }
        }
    }

    // A redirect back to the host we already talk to is treated as a plain
    // transient failure; some providers return same-host 307s as a retry
    // signal, and failing fast here would turn those into hard errors.
    fn decide_same_host_redirect(&self, cmd: &mut Command, host: &str) -> RetryDecision {
        if self.backoff.should_retry(cmd.attempts()) {
            cmd.bump();
            RetryDecision::RetrySameEndpoint
        } else {
            cmd.fail(Error::redirect_exhausted(format!(
                "redirect loop on {host} after {} attempts",
                cmd.attempts()
            )));
            RetryDecision::GiveUp
        }
    }

    fn decide_transient(&self, cmd: &mut Command, cause: String) -> RetryDecision {
        if self.backoff.should_retry(cmd.attempts()) {
            cmd.bump();
            RetryDecision::RetrySameEndpoint
        } else {
            cmd.fail(Error::transient_transport(format!(
                "giving up after {} attempts: {cause}",
                cmd.attempts()
            )));
            RetryDecision::GiveUp
        }
    }
}
