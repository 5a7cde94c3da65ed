use thiserror::Error;

use crate::provider::NotDisplayedReason;

/// Errors surfaced by the bridge operations.
///
/// None of them is fatal: every variant leaves the bridge in a state
/// from which `initialize` or `request_sign_in` can be retried.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Failed to load Google Sign-In script")]
    ScriptLoad,
    #[error("Failed to initialize Google Sign-In")]
    Initialization,
    #[error("Sign-in prompt not displayed: {0}")]
    PromptNotDisplayed(NotDisplayedReason),
    #[error("Failed to process credential")]
    CredentialDecode(#[from] DecodeError),
    #[error("Failed to render Google Sign-In button")]
    RenderButton,
    #[error("Google Sign-In is not initialized")]
    NotInitialized,
    #[error("Invalid configuration")]
    Config,
    #[error("Unsupported locale: {0}")]
    Locale(String),
    #[error("Failed to parse message catalog")]
    Catalog,
}

/// Reasons a credential token could not be turned into a profile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Credential has no payload segment")]
    Segment,
    #[error("Failed to decode credential payload")]
    Base64,
    #[error("Credential payload is not valid UTF-8")]
    Utf8,
    #[error("Failed to deserialize credential payload")]
    Deserialize,
    #[error("Credential payload is missing the `{0}` claim")]
    MissingClaim(&'static str),
}
