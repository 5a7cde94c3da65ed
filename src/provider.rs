//! Describes the Google Identity Services surface the bridge depends on.
//!
//! This module:
//! - Defines the `IdentityProvider` trait, the `accounts.id` object of the GSI SDK
//!   (`initialize`, `prompt`, `renderButton`, `disableAutoSelect`).
//! - Turns the SDK's callbacks into Rust values: credentials arrive over a channel
//!   registered in `IdConfiguration`, prompt notifications resolve a future.
//! - Maps "not displayed" reason codes to message keys.
//!
//! Implement the trait over `wasm-bindgen` in a browser, or with a fake in tests.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::{config::PromptContext, credential::CredentialToken, i18n::MessageKey};

/// Payload of the SDK credential callback.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CredentialResponse {
    pub credential: CredentialToken,
    /// How the credential was selected (`auto`, `user`, `btn`, ...).
    pub select_by: Option<String>,
}

impl CredentialResponse {
    pub fn new(credential: &str) -> Self {
        Self {
            credential: CredentialToken::new(credential),
            select_by: None,
        }
    }
}

/// Sending half the provider uses in place of the SDK `callback` option.
pub type CredentialSender = UnboundedSender<CredentialResponse>;

/// Options passed to `google.accounts.id.initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct IdConfiguration {
    pub client_id: String,
    pub auto_select: bool,
    pub cancel_on_tap_outside: bool,
    pub context: PromptContext,
    #[serde(skip)]
    pub callback: CredentialSender,
}

/// Why the One Tap prompt did not display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotDisplayedReason {
    UnregisteredOrigin,
    BrowserNotSupported,
    InvalidClient,
    /// Any other vendor code, kept verbatim.
    Other(String),
}

impl NotDisplayedReason {
    pub fn from_code(code: &str) -> Self {
        match code {
            "unregistered_origin" => Self::UnregisteredOrigin,
            "browser_not_supported" => Self::BrowserNotSupported,
            "invalid_client" => Self::InvalidClient,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::UnregisteredOrigin => "unregistered_origin",
            Self::BrowserNotSupported => "browser_not_supported",
            Self::InvalidClient => "invalid_client",
            Self::Other(code) => code,
        }
    }

    /// Message shown to the user for this reason.
    pub fn message_key(&self) -> MessageKey {
        match self {
            Self::UnregisteredOrigin => MessageKey::OriginNotRegistered,
            Self::BrowserNotSupported => MessageKey::BrowserUnsupported,
            Self::InvalidClient => MessageKey::ClientMisconfigured,
            Self::Other(_) => MessageKey::PromptNotDisplayed,
        }
    }
}

impl fmt::Display for NotDisplayedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Notification delivered to the `prompt` listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptMoment {
    Displayed,
    NotDisplayed(NotDisplayedReason),
    Skipped(String),
    Dismissed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    #[default]
    Standard,
    Icon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonTheme {
    Outline,
    FilledBlue,
    FilledBlack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonSize {
    Large,
    Medium,
    Small,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonText {
    SigninWith,
    SignupWith,
    ContinueWith,
    Signin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonShape {
    Rectangular,
    Pill,
    Circle,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoAlignment {
    Left,
    Center,
}

/// Options passed to `google.accounts.id.renderButton`.
/// Unset fields are omitted so Google applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ButtonOptions {
    #[serde(rename = "type")]
    pub kind: ButtonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ButtonTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ButtonSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<ButtonText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ButtonShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_alignment: Option<LogoAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// The `google.accounts.id` capability.
///
/// Key Components:
/// - Error: What `initialize` / `render_button` fail with when the SDK throws.
/// - Prompt: Resolves with the first prompt moment Google reports.
///
/// Implementations are expected to be driven from a single thread; no `Send` bound
/// is placed on them.
pub trait IdentityProvider {
    type Error: Error;
    type Prompt: Future<Output = PromptMoment>;

    fn initialize(&self, config: IdConfiguration) -> Result<(), Self::Error>;

    fn prompt(&self) -> Self::Prompt;

    /// Renders the Google button inside the element with the given id.
    fn render_button(&self, parent: &str, options: &ButtonOptions) -> Result<(), Self::Error>;

    fn disable_auto_select(&self);
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::i18n::MessageKey;

    use super::{
        ButtonOptions, ButtonShape, ButtonText, ButtonTheme, ButtonType, CredentialResponse,
        NotDisplayedReason,
    };

    #[test]
    fn test_reason_message_keys() {
        let cases = [
            ("unregistered_origin", MessageKey::OriginNotRegistered),
            ("browser_not_supported", MessageKey::BrowserUnsupported),
            ("invalid_client", MessageKey::ClientMisconfigured),
            ("suppressed_by_user", MessageKey::PromptNotDisplayed),
            ("", MessageKey::PromptNotDisplayed),
        ];
        for (code, key) in cases {
            let reason = NotDisplayedReason::from_code(code);
            assert_eq!(reason.message_key(), key, "reason {code}");
            assert_eq!(reason.code(), code);
        }
    }

    #[test]
    fn test_reason_display() {
        let reason = NotDisplayedReason::from_code("opt_out_or_no_session");
        assert_eq!(reason.to_string(), "opt_out_or_no_session");
    }

    #[test]
    fn test_credential_response_deserialize() {
        let res: CredentialResponse =
            serde_json::from_value(json!({"credential": "a.b.c", "select_by": "btn"})).unwrap();
        assert_eq!(res.credential.value(), "a.b.c");
        assert_eq!(res.select_by.as_deref(), Some("btn"));
    }

    #[test]
    fn test_button_options_serialize() {
        let options = ButtonOptions {
            kind: ButtonType::Standard,
            theme: Some(ButtonTheme::FilledBlue),
            text: Some(ButtonText::SigninWith),
            shape: Some(ButtonShape::Pill),
            width: Some(240),
            locale: Some("zh".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "standard",
                "theme": "filled_blue",
                "text": "signin_with",
                "shape": "pill",
                "width": 240,
                "locale": "zh"
            })
        );
    }
}
