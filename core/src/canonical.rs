//! Canonical string construction for the two signature placement schemes.
//!
//! Canonicalization is pure and deterministic: no clock reads, no I/O. The
//! caller injects identity and timestamp into the request before asking for
//! the canonical string, and the provider re-derives the exact same bytes on
//! its side, so the layouts here are wire contracts.

use crate::hash::{base64_hmac_sha1, base64_hmac_sha256};
use crate::request::SigningRequest;
use crate::{Error, Result};
use http::header::HeaderName;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;

/// AsciiSet for query canonicalization.
///
/// Providers validate signatures against their own decoding, so the table is
/// fixed: space encodes as `%20` while a literal `+` encodes as `%2B`, `=`
/// inside values encodes as `%3D`, and `/` stays unescaped.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Keyed hash used to turn a canonical string into a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    /// HMAC with SHA1, base64 encoded.
    HmacSha1,
    /// HMAC with SHA256, base64 encoded.
    HmacSha256,
}

impl SigningAlgorithm {
    /// Sign the UTF-8 bytes of a canonical string, returning the base64
    /// encoded digest.
    ///
    /// Pure and safe to call concurrently with the same key.
    pub fn sign(&self, key: &[u8], content: &[u8]) -> String {
        match self {
            SigningAlgorithm::HmacSha1 => base64_hmac_sha1(key, content),
            SigningAlgorithm::HmacSha256 => base64_hmac_sha256(key, content),
        }
    }
}

/// Scheme for header-placed HMAC signatures (object-storage style).
///
/// Describes which headers the canonical string covers and where the
/// identity and signature are injected.
#[derive(Debug, Clone)]
pub struct HeaderScheme {
    /// Fixed, ordered list of plain headers covered by the signature.
    pub simple_headers: Vec<HeaderName>,
    /// The single required date-equivalent header.
    pub date_header: HeaderName,
    /// Header carrying the caller identity.
    pub identity_header: HeaderName,
    /// Header the signature is placed in.
    pub signature_header: HeaderName,
    /// Provider-defined prefix selecting the custom headers to sign.
    pub header_prefix: &'static str,
    /// Keyed hash for this scheme.
    pub algorithm: SigningAlgorithm,
}

impl HeaderScheme {
    /// Build the canonical string for this scheme.
    ///
    /// ## Format
    ///
    /// ```text
    /// VERB + "\n" +
    /// <each simple header value, lowercased> + "\n" +
    /// Date + "\n" +
    /// <prefix headers as lowercase(name):folded(value), sorted, one per line> +
    /// <lowercased path>
    /// ```
    ///
    /// The date header must already be present: it is part of the caller
    /// contract, not something this function repairs silently.
    pub fn canonical_string(&self, req: &SigningRequest) -> Result<String> {
        let mut s = String::with_capacity(256);
        writeln!(s, "{}", req.method.as_str())?;
        for name in &self.simple_headers {
            writeln!(s, "{}", req.header_get_or_default(name)?.to_lowercase())?;
        }

        let date = req.headers.get(&self.date_header).ok_or_else(|| {
            Error::signing(format!(
                "header {} must be set before canonicalization",
                self.date_header
            ))
        })?;
        writeln!(s, "{}", date.to_str()?)?;

        // The signature header never signs itself, so a re-signed request
        // canonicalizes identically to a fresh one.
        let mut prefixed: Vec<(String, String)> = req
            .headers_with_prefix(self.header_prefix)
            .into_iter()
            .filter(|(k, _)| k != self.signature_header.as_str())
            .map(|(k, v)| (k, fold_header_value(&v)))
            .collect();
        prefixed.sort();
        for (k, v) in prefixed {
            writeln!(s, "{k}:{v}")?;
        }

        write!(s, "{}", req.path.to_lowercase())?;
        Ok(s)
    }
}

/// Scheme for query-placed HMAC signatures (control-plane style).
#[derive(Debug, Clone)]
pub struct QueryScheme {
    /// Query parameter carrying the caller identity.
    pub identity_param: &'static str,
    /// Query parameter the signature is placed in.
    pub signature_param: &'static str,
    /// Keyed hash for this scheme.
    pub algorithm: SigningAlgorithm,
}

impl QueryScheme {
    /// Build the canonical string for this scheme.
    ///
    /// Any existing signature parameter is dropped, parameter names are
    /// lowercased (values are not case-folded), entries are sorted by name
    /// ascending and joined as `name=value` with `&`, values re-encoded with
    /// [`QUERY_ENCODE_SET`].
    pub fn canonical_string(&self, req: &SigningRequest) -> String {
        let mut pairs: Vec<(String, String)> = req
            .query
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case(self.signature_param))
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        pairs.sort();

        let mut s = String::with_capacity(256);
        for (i, (k, v)) in pairs.iter().enumerate() {
            if i > 0 {
                s.push('&');
            }

            s.push_str(k);
            s.push('=');
            s.push_str(&query_escape(v));
        }

        s
    }
}

/// Percent-encode a single query value with [`QUERY_ENCODE_SET`].
pub fn query_escape(value: &str) -> String {
    utf8_percent_encode(value, &QUERY_ENCODE_SET).to_string()
}

/// Collapse embedded newlines and runs of spaces in a header value to single
/// spaces, trimming the ends.
///
/// Applied exactly once, at canonicalization time.
pub fn fold_header_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for c in value.chars() {
        if matches!(c, ' ' | '\t' | '\r' | '\n') {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }

    out
}
