//! AWS Signature Version 4 request signing
//!
//! Covers the subset needed for JSON POST requests: no query-string
//! encoding beyond pass-through and no chunked payload signing.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::ProviderError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Timestamp format for the `x-amz-date` header
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Credentials and scope for signing one service in one region
pub struct RequestSigner<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

impl fmt::Debug for RequestSigner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key_id", &"[REDACTED]")
            .field("secret_access_key", &"[REDACTED]")
            .field("region", &self.region)
            .field("service", &self.service)
            .finish()
    }
}

/// Request parts covered by the signature
///
/// Header names must be lowercase. `x-amz-date` has to be among them.
#[derive(Debug)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

impl CanonicalRequest<'_> {
    fn sorted_headers(&self) -> Vec<(&str, &str)> {
        let mut headers = self.headers.to_vec();
        headers.sort_by(|a, b| a.0.cmp(b.0));
        headers
    }

    fn signed_headers(&self) -> String {
        self.sorted_headers()
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";")
    }

    fn render(&self) -> String {
        let canonical_headers: String = self
            .sorted_headers()
            .iter()
            .map(|(name, value)| format!("{name}:{}\n", value.trim()))
            .collect();

        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.path,
            self.query,
            canonical_headers,
            self.signed_headers(),
            hex::encode(Sha256::digest(self.payload)),
        )
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ProviderError::new(format!("signing key rejected: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl RequestSigner<'_> {
    fn scope(&self, date: &str) -> String {
        format!("{date}/{}/{}/aws4_request", self.region, self.service)
    }

    fn signing_key(&self, date: &str) -> Result<Vec<u8>, ProviderError> {
        let k_date = hmac(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            date.as_bytes(),
        )?;
        let k_region = hmac(&k_date, self.region.as_bytes())?;
        let k_service = hmac(&k_region, self.service.as_bytes())?;
        hmac(&k_service, b"aws4_request")
    }

    /// Compute the `Authorization` header value for `request` at `now`
    pub fn authorization(
        &self,
        request: &CanonicalRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<String, ProviderError> {
        let amz_date = now.format(AMZ_DATE_FORMAT).to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = self.scope(&date);

        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(request.render().as_bytes()))
        );

        let signature = hex::encode(hmac(
            &self.signing_key(&date)?,
            string_to_sign.as_bytes(),
        )?);

        Ok(format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
            self.access_key_id,
            request.signed_headers(),
        ))
    }
}
