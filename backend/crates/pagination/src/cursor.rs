//! Opaque cursor encoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while encoding or decoding a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The cursor text is not valid base64url.
    #[error("cursor is not valid base64url: {message}")]
    Encoding {
        /// Decoder failure description.
        message: String,
    },
    /// The decoded bytes do not describe the expected key shape.
    #[error("cursor payload is malformed: {message}")]
    Payload {
        /// Serialisation failure description.
        message: String,
    },
}

/// Position in an ordered result set, identified by the ordering key of the
/// last row already returned.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let cursor = Cursor::new((42_i64, "abc".to_owned()));
/// let token = cursor.encode().expect("encodable key");
/// let decoded: Cursor<(i64, String)> = Cursor::decode(&token).expect("round trip");
/// assert_eq!(decoded.key(), &(42, "abc".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap an ordering key.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the ordering key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor and return the ordering key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the key as an opaque token.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(&self.key).map_err(|error| CursorError::Payload {
            message: error.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode an opaque token produced by [`Cursor::encode`].
    ///
    /// # Errors
    /// Returns [`CursorError::Encoding`] for invalid base64url and
    /// [`CursorError::Payload`] when the payload does not match `K`.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|error| CursorError::Encoding {
                message: error.to_string(),
            })?;
        let key = serde_json::from_slice(&bytes).map_err(|error| CursorError::Payload {
            message: error.to_string(),
        })?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Key {
        created_at: String,
        id: String,
    }

    #[rstest]
    fn encoded_cursor_is_url_safe() {
        let cursor = Cursor::new(Key {
            created_at: "2024-01-01T00:00:00Z".to_owned(),
            id: "??>>".to_owned(),
        });
        let token = cursor.encode().expect("encode");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "token should only use the base64url alphabet: {token}"
        );
    }

    #[rstest]
    #[case("%%%")]
    #[case("not base64!")]
    fn rejects_invalid_base64(#[case] token: &str) {
        let err = Cursor::<Key>::decode(token).expect_err("invalid token");
        assert!(matches!(err, CursorError::Encoding { .. }));
    }

    #[rstest]
    fn rejects_payload_of_the_wrong_shape() {
        let token = Cursor::new(vec![1, 2, 3]).encode().expect("encode");
        let err = Cursor::<Key>::decode(&token).expect_err("wrong shape");
        assert!(matches!(err, CursorError::Payload { .. }));
    }
}
