//! The identity bridge between the application and Google Identity Services.
//!
//! `IdentityBridge` owns the session state and drives the vendor SDK through an
//! [`IdentityProvider`], loading its script through a [`ScriptHost`].
//!
//! # State machine
//! ```text
//! Loading   -> SignedOut | Error
//! SignedOut -> SignedIn  | Error
//! SignedIn  -> SignedOut
//! Error     -> (retry initialize / request_sign_in, or sign_out)
//! ```
//! Every state change is published on a `tokio::sync::watch` channel, see
//! [`IdentityBridge::subscribe`].
//!
//! # Example
//! ```rust,ignore
//! let mut bridge = IdentityBridge::new(Config::from_env(), provider, document, Catalog::builtin(Locale::Zh));
//! bridge.initialize().await?;
//! bridge.request_sign_in().await?;
//! if let Some(Ok(profile)) = bridge.next_credential().await {
//!     println!("Hello {}", profile.name());
//! }
//! bridge.sign_out();
//! ```
//!
//! # Caution
//! Operations take `&mut self` and are meant to be driven from one task. Running two
//! bridges against the same document is not supported: each injects its own script.
use tokio::sync::{
    mpsc::{self, UnboundedReceiver},
    watch,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    credential::{CredentialToken, UserProfile},
    error::{DecodeError, Error},
    i18n::{MessageCatalog, MessageKey},
    provider::{ButtonOptions, CredentialResponse, IdConfiguration, IdentityProvider, PromptMoment},
    script::{ScriptHost, ScriptId},
};

/// An error shown to the user: the catalog key and its resolved, non-empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    key: MessageKey,
    text: String,
}

impl ErrorMessage {
    pub fn key(&self) -> MessageKey {
        self.key
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    SignedOut,
    SignedIn(UserProfile),
    Error(ErrorMessage),
}

impl SessionState {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            SessionState::SignedIn(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorMessage> {
        match self {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }
}

pub struct IdentityBridge<P, H, C>
where
    P: IdentityProvider,
    H: ScriptHost,
    C: MessageCatalog,
{
    config: Config,
    provider: P,
    host: H,
    catalog: C,
    state: watch::Sender<SessionState>,
    script: Option<ScriptId>,
    // Set only once the script's load future resolved successfully.
    loaded: bool,
    // Present once the provider accepted our configuration.
    credentials: Option<UnboundedReceiver<CredentialResponse>>,
}

impl<P, H, C> IdentityBridge<P, H, C>
where
    P: IdentityProvider,
    H: ScriptHost,
    C: MessageCatalog,
{
    pub fn new(config: Config, provider: P, host: H, catalog: C) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            config,
            provider,
            host,
            catalog,
            state,
            script: None,
            loaded: false,
            credentials: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receives every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_initialized(&self) -> bool {
        self.credentials.is_some()
    }

    /// Display text for `key` in the bridge's catalog.
    pub fn label(&self, key: MessageKey) -> String {
        self.catalog.message(key)
    }

    /// Loads the GSI script and registers the credential channel.
    ///
    /// The script is injected at most once per bridge; once initialized, further
    /// calls only clear a pending error. A failed or abandoned load removes the
    /// script element so the next call injects and awaits a fresh one.
    pub async fn initialize(&mut self) -> Result<(), Error> {
        if self.is_initialized() {
            debug!("Google Sign-In is already initialized");
            self.clear_error();
            return Ok(());
        }

        if !self.loaded {
            if self.script.is_some() {
                warn!("Discarding Google Sign-In script whose load was abandoned");
                self.remove_script();
            }
            let src = match self.config.script_url() {
                Ok(src) => src,
                Err(e) => {
                    self.fail(MessageKey::ScriptLoadFailed);
                    return Err(e);
                }
            };
            let (id, load) = self.host.append_script(&src);
            self.script = Some(id);

            if let Err(e) = load.await {
                error!("Failed to load Google Sign-In script: {}", e);
                self.remove_script();
                self.fail(MessageKey::ScriptLoadFailed);
                return Err(Error::ScriptLoad);
            }
            self.loaded = true;
            info!("Loaded Google Sign-In script from {}", src);
        }

        let (callback, credentials) = mpsc::unbounded_channel();
        let id_config = IdConfiguration {
            client_id: self.config.client_id().to_string(),
            auto_select: self.config.auto_select(),
            cancel_on_tap_outside: self.config.cancel_on_tap_outside(),
            context: self.config.context(),
            callback,
        };
        if let Err(e) = self.provider.initialize(id_config) {
            error!("Google Sign-In initialization error: {}", e);
            self.fail(MessageKey::InitializationFailed);
            return Err(Error::Initialization);
        }

        self.credentials = Some(credentials);
        self.transition(SessionState::SignedOut);
        Ok(())
    }

    /// Decodes a credential and signs the user in.
    ///
    /// On failure the session moves to `Error` with a generic message; the
    /// underlying cause is only logged. A credential that arrives before
    /// initialization is decoded but leaves the session untouched.
    pub fn handle_credential(&mut self, raw_token: &str) -> Result<UserProfile, DecodeError> {
        let decoded = UserProfile::from_credential(&CredentialToken::new(raw_token));
        if !self.is_initialized() {
            warn!("Credential received before Google Sign-In was initialized");
            return decoded;
        }

        match decoded {
            Ok(profile) => {
                debug!("Signed in as {}", profile.email());
                self.transition(SessionState::SignedIn(profile.clone()));
                Ok(profile)
            }
            Err(e) => {
                error!("Failed to process login: {}", e);
                self.fail(MessageKey::CredentialProcessingFailed);
                Err(e)
            }
        }
    }

    /// Waits for the next credential Google delivers and handles it.
    ///
    /// Returns `None` before initialization or once the provider dropped its sender.
    pub async fn next_credential(&mut self) -> Option<Result<UserProfile, DecodeError>> {
        let response = self.credentials.as_mut()?.recv().await?;
        if let Some(select_by) = &response.select_by {
            debug!("Credential selected by {}", select_by);
        }
        Some(self.handle_credential(response.credential.value()))
    }

    /// Shows the One Tap prompt and reports the moment Google notifies.
    ///
    /// A not displayed prompt moves the session to `Error` with the message for
    /// its reason code.
    pub async fn request_sign_in(&mut self) -> Result<PromptMoment, Error> {
        if !self.is_initialized() {
            warn!("Sign-in requested before Google Sign-In was initialized");
            return Err(Error::NotInitialized);
        }
        self.clear_error();

        let moment = self.provider.prompt().await;
        if let PromptMoment::NotDisplayed(reason) = &moment {
            error!("Google Sign-In popup not displayed: {}", reason);
            self.fail(reason.message_key());
            return Err(Error::PromptNotDisplayed(reason.clone()));
        }
        debug!("Prompt moment: {:?}", moment);
        Ok(moment)
    }

    /// Renders the Google button into the element with id `parent`.
    pub fn render_button(&self, parent: &str, options: &ButtonOptions) -> Result<(), Error> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        self.provider.render_button(parent, options).map_err(|e| {
            error!("Failed to render Google Sign-In button: {}", e);
            Error::RenderButton
        })
    }

    /// Forgets the signed-in user and clears any error. Calling it again is a no-op.
    pub fn sign_out(&mut self) {
        if self.is_initialized() {
            self.provider.disable_auto_select();
        }
        let next = self.idle_state();
        self.transition(next);
    }

    /// Removes the script and drops the credential channel, as on unmount.
    pub fn teardown(&mut self) {
        self.remove_script();
        self.credentials = None;
        self.transition(SessionState::Loading);
    }

    fn idle_state(&self) -> SessionState {
        if self.is_initialized() {
            SessionState::SignedOut
        } else {
            SessionState::Loading
        }
    }

    fn clear_error(&mut self) {
        if self.state.borrow().error().is_some() {
            let next = self.idle_state();
            self.transition(next);
        }
    }

    fn fail(&mut self, key: MessageKey) {
        let text = self.catalog.message(key);
        self.transition(SessionState::Error(ErrorMessage { key, text }));
    }

    fn transition(&mut self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!("Session state {:?} -> {:?}", state, next);
            *state = next;
            true
        });
    }

    fn remove_script(&mut self) {
        self.loaded = false;
        if let Some(id) = self.script.take() {
            self.host.remove_script(id);
        }
    }
}

impl<P, H, C> Drop for IdentityBridge<P, H, C>
where
    P: IdentityProvider,
    H: ScriptHost,
    C: MessageCatalog,
{
    fn drop(&mut self) {
        self.remove_script();
    }
}
