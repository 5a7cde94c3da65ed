// Drives the bridge against an in-process stand-in for the GSI SDK.
// Set .env file (optional)
// ```.env
// GOOGLE_CLIENT_ID="your_client_id"
// LOCALE="zh"
// ```
// finally ```cargo run --example decode_credential -- <credential>```
// Without an argument a sample credential is used.
use std::{
    cell::RefCell,
    future::{Ready, ready},
};

use anyhow::Context;
use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use tiny_google_identity::{
    bridge::IdentityBridge,
    config::Config,
    error::Error,
    i18n::{Catalog, Locale, MessageKey},
    provider::{
        ButtonOptions, CredentialResponse, CredentialSender, IdConfiguration, IdentityProvider,
        PromptMoment,
    },
    script::{ScriptHost, ScriptId},
};
use tracing::{info, warn};
use url::Url;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Log settings
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let locale = std::env::var("LOCALE")
        .ok()
        .and_then(|tag| Locale::from_tag(&tag))
        .unwrap_or_default();
    let credential = std::env::args().nth(1).unwrap_or_else(sample_credential);

    let provider = ConsoleProvider {
        credential,
        callback: RefCell::new(None),
    };
    let mut bridge = IdentityBridge::new(
        Config::from_env(),
        provider,
        ConsoleHost,
        Catalog::builtin(locale),
    );
    let mut states = bridge.subscribe();

    bridge.initialize().await?;
    bridge.render_button("signin", &ButtonOptions::default())?;
    bridge.request_sign_in().await?;

    let result = bridge
        .next_credential()
        .await
        .context("provider closed without a credential")?;
    match result.map_err(Error::from) {
        Ok(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        Err(e) => {
            let state = bridge.state();
            let message = state.error().map(|m| m.text().to_string()).unwrap_or_default();
            eprintln!("{message} ({e})");
        }
    }

    bridge.sign_out();
    println!("{}: {:?}", bridge.label(MessageKey::SignOut), *states.borrow_and_update());
    Ok(())
}

fn sample_credential() -> String {
    let payload = r#"{"email":"user@example.com","name":"Example User","picture":"https://example.com/me.png"}"#;
    format!("header.{}.signature", BASE64_URL_SAFE_NO_PAD.encode(payload))
}

/// Loads every script instantly.
struct ConsoleHost;

impl ScriptHost for ConsoleHost {
    type Error = std::convert::Infallible;
    type Load = Ready<Result<(), Self::Error>>;

    fn append_script(&self, src: &Url) -> (ScriptId, Self::Load) {
        info!("append <script src=\"{}\">", src);
        (ScriptId::new(), ready(Ok(())))
    }

    fn remove_script(&self, id: ScriptId) {
        info!("remove script {:?}", id);
    }
}

/// Answers every prompt with the credential given on the command line.
struct ConsoleProvider {
    credential: String,
    callback: RefCell<Option<CredentialSender>>,
}

impl IdentityProvider for ConsoleProvider {
    type Error = std::convert::Infallible;
    type Prompt = Ready<PromptMoment>;

    fn initialize(&self, config: IdConfiguration) -> Result<(), Self::Error> {
        info!("initialize {}", serde_json::to_string(&config).unwrap_or_default());
        *self.callback.borrow_mut() = Some(config.callback);
        Ok(())
    }

    fn prompt(&self) -> Self::Prompt {
        if let Some(callback) = self.callback.borrow().as_ref() {
            if let Err(e) = callback.send(CredentialResponse::new(&self.credential)) {
                warn!("Failed to deliver credential: {}", e);
            }
        }
        ready(PromptMoment::Displayed)
    }

    fn render_button(&self, parent: &str, options: &ButtonOptions) -> Result<(), Self::Error> {
        info!(
            "render button in #{} with {}",
            parent,
            serde_json::to_string(options).unwrap_or_default()
        );
        Ok(())
    }

    fn disable_auto_select(&self) {
        info!("disable auto select");
    }
}
