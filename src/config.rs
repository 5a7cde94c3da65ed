//! Defines the configuration handed to Google Identity Services.
//!
//! ## Structures
//! - `Config`: Everything the bridge needs to load and initialize the vendor SDK.
//! - `ConfigBuilder`: A builder for constructing a `Config` instance.
//!
//! Only the client ID is required. It is usually injected at build or start time
//! through the `GOOGLE_CLIENT_ID` environment variable (see [`Config::from_env`]).
//! Its absence is not validated here; Google reports it when the SDK initializes.
//!
//! # Example
//! ```rust,no_run
//! use tiny_google_identity::config::Config;
//!
//! let config = Config::builder()
//!     .client_id("your-client-id.apps.googleusercontent.com")
//!     .auto_select(false)
//!     .build();
//! ```
use serde::Serialize;
use tracing::{error, warn};
use url::Url;

use crate::error::Error;

/// Default location of the Google Identity Services client script.
pub const GSI_CLIENT_SRC: &str = "https://accounts.google.com/gsi/client";

/// Environment variables consulted by [`Config::from_env`], in order.
pub const CLIENT_ID_ENV: [&str; 2] = ["GOOGLE_CLIENT_ID", "NEXT_PUBLIC_GOOGLE_CLIENT_ID"];

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientID(pub String);

/// Wording used by Google in the One Tap prompt title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptContext {
    #[default]
    Signin,
    Signup,
    Use,
}

/// Holds the settings required to load and initialize Google Identity Services.
///
/// It is designed to be immutable once constructed.
///
/// # Fields
/// - `client_id`: The client ID obtained from Google Cloud Console.
/// - `script_src`: Where the GSI client script is loaded from.
/// - `auto_select`: Whether Google may sign a returning user in without interaction.
/// - `cancel_on_tap_outside`: Whether clicking outside the prompt dismisses it.
/// - `context`: Title wording of the prompt.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) client_id: ClientID,
    pub(crate) script_src: String,
    pub(crate) auto_select: bool,
    pub(crate) cancel_on_tap_outside: bool,
    pub(crate) context: PromptContext,
}

// ==========impl Config==========
impl Config {
    /// Returns a new `ConfigBuilder` instance to create a `Config` object.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Builds a `Config` whose client ID comes from the environment.
    ///
    /// A missing variable yields an empty client ID and a warning.
    pub fn from_env() -> Self {
        let client_id = CLIENT_ID_ENV
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .unwrap_or_else(|| {
                warn!("No Google client ID found in {:?}", CLIENT_ID_ENV);
                String::new()
            });
        Config::builder().client_id(&client_id).build()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id.0
    }

    pub fn auto_select(&self) -> bool {
        self.auto_select
    }

    pub fn cancel_on_tap_outside(&self) -> bool {
        self.cancel_on_tap_outside
    }

    pub fn context(&self) -> PromptContext {
        self.context
    }

    /// Parses the script source into an absolute URL.
    pub fn script_url(&self) -> Result<Url, Error> {
        Url::parse(&self.script_src).map_err(|e| {
            error!("Failed to parse script url {}: {}", self.script_src, e);
            Error::Config
        })
    }
}

/// Provides a convenient way to create a `Config` instance step by step.
///
/// Defaults match what the sign-in widget has always used: the public GSI
/// script, no auto select, cancel on tap outside and the `signin` context.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    client_id: ClientID,
    script_src: String,
    auto_select: bool,
    cancel_on_tap_outside: bool,
    context: PromptContext,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            client_id: ClientID::default(),
            script_src: GSI_CLIENT_SRC.to_string(),
            auto_select: false,
            cancel_on_tap_outside: true,
            context: PromptContext::default(),
        }
    }
}

// ==========impl ConfigBuilder==========
impl ConfigBuilder {
    /// Creates a new `ConfigBuilder` instance with default values.
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    /// Sets the client ID obtained from Google Cloud Console.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = ClientID(client_id.to_string());
        self
    }

    /// Overrides the GSI client script location.
    pub fn script_src(mut self, script_src: &str) -> Self {
        self.script_src = script_src.to_string();
        self
    }

    pub fn auto_select(mut self, auto_select: bool) -> Self {
        self.auto_select = auto_select;
        self
    }

    pub fn cancel_on_tap_outside(mut self, cancel: bool) -> Self {
        self.cancel_on_tap_outside = cancel;
        self
    }

    pub fn context(mut self, context: PromptContext) -> Self {
        self.context = context;
        self
    }

    /// Constructs a `Config` instance with the provided values.
    pub fn build(self) -> Config {
        Config {
            client_id: self.client_id,
            script_src: self.script_src,
            auto_select: self.auto_select,
            cancel_on_tap_outside: self.cancel_on_tap_outside,
            context: self.context,
        }
    }
}
