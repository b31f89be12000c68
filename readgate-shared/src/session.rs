/// Client-held signed session tokens
///
/// The server keeps no session storage. The whole session, a small JSON
/// object, is signed with HMAC-SHA256 and handed to the client in a cookie;
/// the client sends it back on every request and the server verifies it
/// before trusting any value inside.
///
/// # Token Format
///
/// ```text
/// hex(json({"data": {...}, "iat": <unix seconds>})) "." hex(hmac_sha256(key, <first part>))
/// ```
///
/// The HMAC key is derived from the configured secret, so the raw secret is
/// never used directly as a MAC key.
///
/// # Security
///
/// - Tokens are tamper-evident, not encrypted: clients can read the values
/// - Signature verification is constant-time (`Mac::verify_slice`)
/// - Tokens older than the configured max age are rejected
///
/// # Example
///
/// ```
/// use readgate_shared::session::{SessionCodec, SessionData};
/// use chrono::Duration;
///
/// let codec = SessionCodec::new(b"a-secret-that-is-at-least-32-bytes!", Duration::days(31));
///
/// let mut session = SessionData::default();
/// session.set_page_views(2);
///
/// let token = codec.encode(&session).unwrap();
/// let decoded = codec.decode(&token).unwrap();
/// assert_eq!(decoded.page_views(), 2);
/// ```

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Session key holding the article view counter
pub const PAGE_VIEWS_KEY: &str = "page_views";

/// Session key holding the authenticated user's ID
pub const USER_ID_KEY: &str = "user_id";

/// Context label mixed into the signing key
const KEY_DERIVATION_LABEL: &[u8] = b"readgate.cookie-session";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token is not in `payload.signature` form or is not valid hex
    #[error("Malformed session token: {0}")]
    Malformed(String),

    /// Signature does not match the payload
    #[error("Session token signature mismatch")]
    BadSignature,

    /// Token was issued longer ago than the configured max age
    #[error("Session token expired")]
    Expired,

    /// Payload could not be (de)serialized
    #[error("Session payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Key-value contents of one client's session
///
/// Values are arbitrary JSON; the typed accessors cover the two keys the
/// API uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData {
    values: BTreeMap<String, Value>,
}

impl SessionData {
    /// Gets a raw value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets a raw value, replacing any previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes a key, returning its previous value
    ///
    /// Removing an absent key is not an error.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of article views recorded in this session
    ///
    /// Absent or non-numeric values count as zero.
    pub fn page_views(&self) -> u64 {
        self.get(PAGE_VIEWS_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    pub fn set_page_views(&mut self, views: u64) {
        self.set(PAGE_VIEWS_KEY, views);
    }

    /// Authenticated user ID, if the session has one
    pub fn user_id(&self) -> Option<i64> {
        self.get(USER_ID_KEY).and_then(Value::as_i64)
    }

    pub fn set_user_id(&mut self, user_id: i64) {
        self.set(USER_ID_KEY, user_id);
    }
}

/// Signed envelope carried inside the token
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    data: SessionData,

    /// Issued at (Unix timestamp)
    iat: i64,
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionCodec {
    key: Vec<u8>,
    max_age: Duration,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("key", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl SessionCodec {
    /// Creates a codec from the configured secret
    ///
    /// # Arguments
    ///
    /// * `secret` - Server secret (should be at least 32 bytes)
    /// * `max_age` - How long an issued token stays valid
    pub fn new(secret: &[u8], max_age: Duration) -> Self {
        let mut mac = HmacSha256::new_from_slice(secret)
            .expect("HMAC can take key of any size");
        mac.update(KEY_DERIVATION_LABEL);

        Self {
            key: mac.finalize().into_bytes().to_vec(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }

    /// Encodes and signs a session, stamped with the current time
    pub fn encode(&self, data: &SessionData) -> Result<String, SessionError> {
        self.encode_at(data, Utc::now())
    }

    /// Encodes and signs a session with an explicit issue time
    pub fn encode_at(
        &self,
        data: &SessionData,
        issued_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let envelope = Envelope {
            data: data.clone(),
            iat: issued_at.timestamp(),
        };

        let payload = hex::encode(serde_json::to_vec(&envelope)?);

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    /// Verifies and decodes a token against the current time
    pub fn decode(&self, token: &str) -> Result<SessionData, SessionError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies and decodes a token as of `now`
    ///
    /// The signature is checked before the payload is parsed.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionData, SessionError> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| SessionError::Malformed("missing signature separator".to_string()))?;

        let signature = hex::decode(signature)
            .map_err(|e| SessionError::Malformed(format!("signature: {}", e)))?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let bytes = hex::decode(payload)
            .map_err(|e| SessionError::Malformed(format!("payload: {}", e)))?;
        let envelope: Envelope = serde_json::from_slice(&bytes)?;

        if now.timestamp() - envelope.iat > self.max_age.num_seconds() {
            return Err(SessionError::Expired);
        }

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-session-secret-at-least-32-bytes";

    fn codec() -> SessionCodec {
        SessionCodec::new(SECRET, Duration::days(31))
    }

    #[test]
    fn test_session_data_accessors() {
        let mut data = SessionData::default();
        assert!(data.is_empty());
        assert_eq!(data.page_views(), 0);
        assert_eq!(data.user_id(), None);

        data.set_page_views(3);
        data.set_user_id(42);
        assert_eq!(data.page_views(), 3);
        assert_eq!(data.user_id(), Some(42));

        assert_eq!(data.remove(USER_ID_KEY), Some(Value::from(42)));
        assert_eq!(data.remove(USER_ID_KEY), None);
        assert_eq!(data.user_id(), None);
    }

    #[test]
    fn test_non_numeric_page_views_count_as_zero() {
        let mut data = SessionData::default();
        data.set(PAGE_VIEWS_KEY, "lots");
        assert_eq!(data.page_views(), 0);
    }

    #[test]
    fn test_session_data_serializes_as_flat_object() {
        let mut data = SessionData::default();
        data.set_page_views(1);
        data.set_user_id(9);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({ "page_views": 1, "user_id": 9 }));
    }

    #[test]
    fn test_encode_decode() {
        let mut data = SessionData::default();
        data.set_page_views(2);
        data.set_user_id(5);

        let token = codec().encode(&data).unwrap();
        assert_eq!(token.matches('.').count(), 1);

        let decoded = codec().decode(&token).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let mut data = SessionData::default();
        data.set_page_views(4);
        let token = codec().encode(&data).unwrap();

        // Forge a fresh payload but keep the old signature
        let mut forged = SessionData::default();
        forged.set_page_views(0);
        let forged_token = codec().encode(&forged).unwrap();
        let (forged_payload, _) = forged_token.split_once('.').unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let result = codec().decode(&format!("{}.{}", forged_payload, signature));
        assert!(matches!(result, Err(SessionError::BadSignature)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = codec().encode(&SessionData::default()).unwrap();
        let other = SessionCodec::new(b"another-secret-that-is-32-bytes-long", Duration::days(31));

        assert!(matches!(other.decode(&token), Err(SessionError::BadSignature)));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(codec().decode("no-separator"), Err(SessionError::Malformed(_))));
        assert!(matches!(codec().decode("abcd.not-hex"), Err(SessionError::Malformed(_))));
        assert!(matches!(codec().decode(""), Err(SessionError::Malformed(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = SessionCodec::new(SECRET, Duration::hours(1));
        let issued = Utc::now() - Duration::hours(2);
        let token = codec.encode_at(&SessionData::default(), issued).unwrap();

        assert!(matches!(codec.decode(&token), Err(SessionError::Expired)));
        assert!(codec.decode_at(&token, issued + Duration::minutes(30)).is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", codec());
        assert!(rendered.contains("<redacted>"));
    }
}
