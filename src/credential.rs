//! Provides decoding of the credential Google hands back after sign-in.
//!
//! This module:
//! CredentialToken: The compact `header.payload.signature` string issued by Google.
//! Claims: The decoded payload, every standard Google ID token claim as an optional field.
//! UserProfile: The read-only projection (`email`, `name`, `image_url`) the application displays.
//!
//! # Caution
//! Only the structure of the token is checked. The signature is **not** verified, so
//! a decoded profile is display data and must not be trusted by a backend.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;

// The payload is decoded the way a browser's `atob` would after the URL-safe
// characters are swapped back: standard alphabet, padding optional.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Represents an encoded credential, which must be decoded before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialToken(pub(crate) String);

impl CredentialToken {
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Returns the second dot-separated segment.
    fn payload(&self) -> Result<&str, DecodeError> {
        self.0.split('.').nth(1).ok_or(DecodeError::Segment)
    }
}

impl From<String> for CredentialToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Represents the decoded payload of a Google credential.
///
/// Every claim is optional and read leniently: a claim with an unexpected type
/// (`aud` as an array, a string `email_verified`, a float `iat`) is dropped
/// instead of failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Claims {
    #[serde(deserialize_with = "lenient")]
    pub iss: Option<String>,  // Issuer (e.g., "https://accounts.google.com")
    #[serde(deserialize_with = "lenient")]
    pub aud: Option<String>,  // Client ID
    #[serde(deserialize_with = "lenient")]
    pub sub: Option<String>,  // User ID
    #[serde(deserialize_with = "lenient")]
    pub azp: Option<String>,  // Authorized party
    #[serde(deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub email_verified: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub given_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub family_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub picture: Option<String>,  // Profile picture URL
    #[serde(deserialize_with = "lenient")]
    pub hd: Option<String>,  // Hosted domain (Workspace accounts)
    #[serde(deserialize_with = "lenient")]
    pub nbf: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub iat: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub exp: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub jti: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub nonce: Option<String>,
}

// Reads any JSON value and keeps it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl Claims {
    /// Decodes the payload segment of a credential into `Claims`.
    ///
    /// Fails when the token has no second segment, the segment is not base64,
    /// the bytes are not UTF-8 or the text is not a JSON object. Duplicate keys
    /// keep their last value.
    pub fn decode(token: &CredentialToken) -> Result<Self, DecodeError> {
        let payload: String = token
            .payload()?
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();

        let bytes = PAYLOAD_ENGINE.decode(payload).map_err(|e| {
            debug!("Failed to decode credential payload: {}", e);
            DecodeError::Base64
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            debug!("Credential payload is not UTF-8: {}", e);
            DecodeError::Utf8
        })?;

        let value = serde_json::from_str::<Value>(&text).map_err(|e| {
            debug!("Failed to parse credential payload: {}", e);
            DecodeError::Deserialize
        })?;
        if !value.is_object() {
            debug!("Credential payload is not a JSON object");
            return Err(DecodeError::Deserialize);
        }
        serde_json::from_value::<Claims>(value).map_err(|e| {
            debug!("Failed to deserialize credential payload: {}", e);
            DecodeError::Deserialize
        })
    }
}

/// The signed-in user as shown by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    email: String,
    name: String,
    image_url: String,
}

impl UserProfile {
    /// Decodes a credential straight into a profile.
    pub fn from_credential(token: &CredentialToken) -> Result<Self, DecodeError> {
        Claims::decode(token)?.try_into()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }
}

impl TryFrom<Claims> for UserProfile {
    type Error = DecodeError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            email: claims.email.ok_or(DecodeError::MissingClaim("email"))?,
            name: claims.name.ok_or(DecodeError::MissingClaim("name"))?,
            image_url: claims.picture.ok_or(DecodeError::MissingClaim("picture"))?,
        })
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD, prelude::BASE64_URL_SAFE};

    use crate::error::DecodeError;

    use super::{Claims, CredentialToken, UserProfile};

    fn token_with_payload(json: &str) -> CredentialToken {
        CredentialToken(format!("h.{}.s", BASE64_URL_SAFE_NO_PAD.encode(json)))
    }

    #[test]
    fn test_profile_from_credential() {
        let token = token_with_payload(r#"{"email":"u@e.com","name":"U","picture":"http://p"}"#);

        let profile = UserProfile::from_credential(&token).unwrap();
        assert_eq!(profile.email(), "u@e.com");
        assert_eq!(profile.name(), "U");
        assert_eq!(profile.image_url(), "http://p");
    }

    #[test]
    fn test_profile_round_trip() {
        let claims = Claims {
            email: Some("a@b.com".to_string()),
            name: Some("A".to_string()),
            picture: Some("http://x/y.png".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&claims).unwrap();

        let decoded = Claims::decode(&token_with_payload(&json)).unwrap();
        assert_eq!(decoded, claims);

        let profile = UserProfile::try_from(decoded).unwrap();
        assert_eq!(profile.email(), "a@b.com");
        assert_eq!(profile.name(), "A");
        assert_eq!(profile.image_url(), "http://x/y.png");
    }

    #[test]
    fn test_claims_decode_full_payload() {
        let token = token_with_payload(
            r#"{
                "iss": "https://accounts.google.com",
                "aud": "my_aud",
                "sub": "my_sub",
                "azp": "my_azp",
                "email": "email@gmail.com",
                "email_verified": true,
                "given_name": "my_given_name",
                "family_name": "my_family_name",
                "name": "my_name",
                "picture": "https://picture.example.com",
                "iat": 1742189616,
                "exp": 1742193216,
                "jti": "my_jti"
            }"#,
        );

        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("my_sub"));
        assert_eq!(claims.email_verified, Some(true));
        assert_eq!(claims.exp, Some(1742193216));
        assert!(claims.nonce.is_none());
    }

    #[test]
    fn test_claims_decode_utf8_name() {
        let token = token_with_payload(r#"{"email":"z@e.com","name":"张三","picture":"http://p"}"#);

        let profile = UserProfile::from_credential(&token).unwrap();
        assert_eq!(profile.name(), "张三");
    }

    #[test]
    fn test_claims_decode_padded_payload() {
        let json = r#"{"email":"a@b.com","name":"Ab","picture":"http://p"}"#;
        let token = CredentialToken(format!("h.{}.s", BASE64_URL_SAFE.encode(json)));

        assert!(Claims::decode(&token).is_ok());
    }

    #[test]
    fn test_claims_decode_url_safe_characters() {
        let json = r#"{"email":"a@b.com","name":"ÿ?>~","picture":"http://p"}"#;
        let encoded = BASE64_URL_SAFE_NO_PAD.encode(json);
        assert!(encoded.contains('_') || encoded.contains('-'));

        let profile = UserProfile::from_credential(&CredentialToken(format!("h.{encoded}.s"))).unwrap();
        assert_eq!(profile.name(), "ÿ?>~");
    }

    #[test]
    fn test_claims_decode_single_segment() {
        let token = CredentialToken::new("no_dots_here");
        assert_eq!(Claims::decode(&token), Err(DecodeError::Segment));
    }

    #[test]
    fn test_claims_decode_invalid_base64() {
        let token = CredentialToken::new("h.%%%not-base64%%%.s");
        assert_eq!(Claims::decode(&token), Err(DecodeError::Base64));
    }

    #[test]
    fn test_claims_decode_invalid_utf8() {
        let encoded = BASE64_URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]);
        let token = CredentialToken(format!("h.{encoded}.s"));
        assert_eq!(Claims::decode(&token), Err(DecodeError::Utf8));
    }

    #[test]
    fn test_claims_decode_invalid_json() {
        let token = token_with_payload("not a valid json");
        assert_eq!(Claims::decode(&token), Err(DecodeError::Deserialize));
    }

    #[test]
    fn test_claims_decode_empty_payload() {
        let token = CredentialToken::new("h.");
        assert_eq!(Claims::decode(&token), Err(DecodeError::Deserialize));
    }

    #[test]
    fn test_profile_ignores_mistyped_claims() {
        let payloads = [
            r#"{"email":"u@e.com","name":"U","picture":"http://p","email_verified":"true"}"#,
            r#"{"email":"u@e.com","name":"U","picture":"http://p","aud":["a","b"]}"#,
            r#"{"email":"u@e.com","name":"U","picture":"http://p","iat":1.7e9}"#,
        ];
        for payload in payloads {
            let profile = UserProfile::from_credential(&token_with_payload(payload)).unwrap();
            assert_eq!(profile.email(), "u@e.com", "payload {payload}");
            assert_eq!(profile.image_url(), "http://p", "payload {payload}");
        }

        let claims = Claims::decode(&token_with_payload(payloads[1])).unwrap();
        assert!(claims.aud.is_none());
        assert_eq!(claims.email.as_deref(), Some("u@e.com"));
    }

    #[test]
    fn test_profile_duplicate_key_keeps_last() {
        let token =
            token_with_payload(r#"{"email":"u@e.com","name":"First","picture":"http://p","name":"Last"}"#);

        let profile = UserProfile::from_credential(&token).unwrap();
        assert_eq!(profile.name(), "Last");
    }

    #[test]
    fn test_claims_decode_non_object() {
        assert_eq!(
            Claims::decode(&token_with_payload(r#"["u@e.com"]"#)),
            Err(DecodeError::Deserialize)
        );
        assert_eq!(
            Claims::decode(&token_with_payload("null")),
            Err(DecodeError::Deserialize)
        );
    }

    #[test]
    fn test_profile_mistyped_required_claim() {
        let token = token_with_payload(r#"{"email":42,"name":"U","picture":"http://p"}"#);
        assert_eq!(
            UserProfile::from_credential(&token),
            Err(DecodeError::MissingClaim("email"))
        );
    }

    #[test]
    fn test_profile_missing_claim() {
        let token = token_with_payload(r#"{"email":"u@e.com","name":"U"}"#);
        assert_eq!(
            UserProfile::from_credential(&token),
            Err(DecodeError::MissingClaim("picture"))
        );
    }

    #[test]
    fn test_profile_serialize_camel_case() {
        let token = token_with_payload(r#"{"email":"u@e.com","name":"U","picture":"http://p"}"#);
        let profile = UserProfile::from_credential(&token).unwrap();

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["imageUrl"], "http://p");
    }
}
