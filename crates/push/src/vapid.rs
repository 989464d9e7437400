//! VAPID (RFC 8292) application server authentication.
//!
//! Every push request carries a short-lived ES256 JWT whose audience is the
//! origin of the push service, plus the server's public key:
//! `Authorization: vapid t=<jwt>, k=<public key>`.

use aeris_core::types::Timestamp;
use chrono::Duration;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::PushError;

/// Push services reject tokens valid for more than 24 hours.
const TOKEN_VALIDITY_HOURS: i64 = 12;

/// Claims of a VAPID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VapidClaims {
    /// Origin of the push service, e.g. `https://fcm.googleapis.com`.
    pub aud: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Contact for the push service operator (`mailto:` or `https:` URL).
    pub sub: String,
}

/// Signs VAPID tokens with the server's P-256 private key.
pub struct VapidSigner {
    key: EncodingKey,
    public_key: String,
    subject: String,
}

impl std::fmt::Debug for VapidSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidSigner")
            .field("public_key", &self.public_key)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl VapidSigner {
    /// Build a signer from a PKCS#8 PEM private key.
    ///
    /// * `public_key` - The matching uncompressed public key, base64url
    ///   encoded; this is also the `applicationServerKey` given to browsers.
    /// * `subject` - `mailto:` or `https:` contact URL.
    pub fn from_pem(
        pem: &[u8],
        public_key: impl Into<String>,
        subject: impl Into<String>,
    ) -> Result<Self, PushError> {
        let public_key = public_key.into().trim().to_string();
        let subject = subject.into();
        if public_key.is_empty() {
            return Err(PushError::Config("public key must not be empty".into()));
        }
        if !(subject.starts_with("mailto:") || subject.starts_with("https:")) {
            return Err(PushError::Config(format!(
                "subject must be a mailto: or https: URL, got {subject:?}"
            )));
        }
        Ok(Self {
            key: EncodingKey::from_ec_pem(pem)?,
            public_key,
            subject,
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign a token for the push service hosting `endpoint`.
    pub fn sign(&self, endpoint: &str, now: Timestamp) -> Result<String, PushError> {
        let claims = VapidClaims {
            aud: audience(endpoint)?,
            exp: (now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp(),
            sub: self.subject.clone(),
        };
        Ok(encode(&Header::new(Algorithm::ES256), &claims, &self.key)?)
    }

    /// Value of the `Authorization` header for a push to `endpoint`.
    pub fn authorization(&self, endpoint: &str, now: Timestamp) -> Result<String, PushError> {
        let token = self.sign(endpoint, now)?;
        Ok(format!("vapid t={token}, k={}", self.public_key))
    }
}

/// Origin (`scheme://host[:port]`) of a push endpoint.
pub fn audience(endpoint: &str) -> Result<String, PushError> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| PushError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
        return Err(PushError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(url.origin().ascii_serialization())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use jsonwebtoken::{decode, DecodingKey, Validation};

    use super::*;

    const PRIVATE_PEM: &str = include_str!("../tests/fixtures/vapid_private.pem");
    const PUBLIC_PEM: &str = include_str!("../tests/fixtures/vapid_public.pem");
    const PUBLIC_KEY: &str = include_str!("../tests/fixtures/vapid_public.txt");

    fn signer() -> VapidSigner {
        VapidSigner::from_pem(PRIVATE_PEM.as_bytes(), PUBLIC_KEY, "mailto:ops@aeris.test").unwrap()
    }

    #[test]
    fn audience_is_endpoint_origin() {
        assert_eq!(
            audience("https://fcm.googleapis.com/fcm/send/abc:def").unwrap(),
            "https://fcm.googleapis.com"
        );
        assert_eq!(
            audience("http://127.0.0.1:8080/push/1").unwrap(),
            "http://127.0.0.1:8080"
        );
        assert_matches!(audience("not a url"), Err(PushError::InvalidEndpoint(_)));
        assert_matches!(audience("mailto:x@y"), Err(PushError::InvalidEndpoint(_)));
    }

    #[test]
    fn token_verifies_with_public_key() {
        let now = Utc::now();
        let token = signer()
            .sign("https://updates.push.services.mozilla.com/wpush/v2/xyz", now)
            .unwrap();

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&["https://updates.push.services.mozilla.com"]);
        let data = decode::<VapidClaims>(
            &token,
            &DecodingKey::from_ec_pem(PUBLIC_PEM.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims.sub, "mailto:ops@aeris.test");
        assert_eq!(data.claims.exp, (now + Duration::hours(12)).timestamp());
    }

    #[test]
    fn authorization_header_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let header = signer().authorization("https://push.example/abc", now).unwrap();

        assert!(header.starts_with("vapid t=ey"));
        assert!(header.ends_with(&format!(", k={PUBLIC_KEY}")));
        // Three base64url segments in the token.
        let token = header.trim_start_matches("vapid t=").split(',').next().unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert_matches!(
            VapidSigner::from_pem(PRIVATE_PEM.as_bytes(), PUBLIC_KEY, "ops@aeris.test"),
            Err(PushError::Config(_))
        );
        assert_matches!(
            VapidSigner::from_pem(PRIVATE_PEM.as_bytes(), "", "mailto:ops@aeris.test"),
            Err(PushError::Config(_))
        );
        assert_matches!(
            VapidSigner::from_pem(b"garbage", PUBLIC_KEY, "mailto:ops@aeris.test"),
            Err(PushError::Jwt(_))
        );
    }
}
