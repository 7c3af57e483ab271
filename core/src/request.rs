use std::mem;
use std::str::FromStr;

use crate::canonical::query_escape;
use crate::{Error, Result};
use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;
use percent_encoding::percent_decode_str;

/// Signing context for a request.
///
/// Decomposes `http::request::Parts` into the pieces a canonicalizer works
/// on, lets the signer mutate them, and applies the result back. Query values
/// are held percent-decoded; call [`SigningRequest::query_encode`] before
/// [`SigningRequest::apply`] when the query has been touched.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as sent (not decoded).
    pub path: String,
    /// HTTP query parameters, percent-decoded.
    ///
    /// A literal `+` stays a `+` here: the query signature tables encode it
    /// distinctly from space, so the form-encoding convention must not be
    /// applied.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from `http::request::Parts`.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority cannot be signed")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|q| {
                    q.split('&')
                        .filter(|pair| !pair.is_empty())
                        .map(|pair| {
                            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                            (
                                percent_decode_str(k).decode_utf8_lossy().into_owned(),
                                percent_decode_str(v).decode_utf8_lossy().into_owned(),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return them when the context is applied.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to `http::request::Parts`.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if self.query.is_empty() {
                    self.path
                } else {
                    let mut s = self.path;
                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.push_str(k);
                        if !v.is_empty() {
                            s.push('=');
                            s.push_str(v);
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get headers whose name starts with the given prefix.
    ///
    /// Names come back lowercased; matching is case-insensitive on the name
    /// since the `http` crate stores names lowercased already.
    pub fn headers_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter(|(k, _)| k.as_str().starts_with(prefix))
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    /// Push a new query pair into the query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Remove every query pair whose name matches, ignoring ASCII case.
    pub fn query_remove(&mut self, key: &str) {
        self.query.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
    }

    /// Re-encode query values for the wire.
    ///
    /// Must run after the query has been modified and before [`Self::apply`],
    /// otherwise decoded values leak into the URI.
    pub fn query_encode(&mut self) {
        self.query = self
            .query
            .iter()
            .map(|(k, v)| (k.clone(), query_escape(v)))
            .collect();
    }
}
