//! Locales and the message catalog user-facing text is resolved from.
//!
//! The bridge never carries display strings. It reports a [`MessageKey`] and the
//! application's [`MessageCatalog`] turns it into text for the active locale.
//! Catalogs use the nested JSON layout of the `messages/<locale>.json` files
//! shipped with this crate, where `auth.errors.scriptLoadFailed` addresses
//! `{"auth": {"errors": {"scriptLoadFailed": ...}}}`.
use std::{fmt, str::FromStr};

use serde_json::Value;
use tracing::error;

use crate::error::Error;

const EN_MESSAGES: &str = include_str!("../messages/en.json");
const ZH_MESSAGES: &str = include_str!("../messages/zh.json");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Zh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }

    /// Matches a language tag on its primary subtag, so `zh-CN` and `zh_Hant`
    /// both resolve to `Zh`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str().eq_ignore_ascii_case(primary))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| Error::Locale(s.to_string()))
    }
}

/// Every piece of text the sign-in widget displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Loading,
    SignIn,
    SignOut,
    ScriptLoadFailed,
    InitializationFailed,
    CredentialProcessingFailed,
    OriginNotRegistered,
    BrowserUnsupported,
    ClientMisconfigured,
    PromptNotDisplayed,
}

impl MessageKey {
    pub const ALL: [MessageKey; 10] = [
        MessageKey::Loading,
        MessageKey::SignIn,
        MessageKey::SignOut,
        MessageKey::ScriptLoadFailed,
        MessageKey::InitializationFailed,
        MessageKey::CredentialProcessingFailed,
        MessageKey::OriginNotRegistered,
        MessageKey::BrowserUnsupported,
        MessageKey::ClientMisconfigured,
        MessageKey::PromptNotDisplayed,
    ];

    /// Dotted path of the message inside a catalog.
    pub fn path(&self) -> &'static str {
        match self {
            MessageKey::Loading => "auth.loading",
            MessageKey::SignIn => "auth.signIn",
            MessageKey::SignOut => "auth.signOut",
            MessageKey::ScriptLoadFailed => "auth.errors.scriptLoadFailed",
            MessageKey::InitializationFailed => "auth.errors.initializationFailed",
            MessageKey::CredentialProcessingFailed => "auth.errors.credentialProcessingFailed",
            MessageKey::OriginNotRegistered => "auth.errors.originNotRegistered",
            MessageKey::BrowserUnsupported => "auth.errors.browserUnsupported",
            MessageKey::ClientMisconfigured => "auth.errors.clientMisconfigured",
            MessageKey::PromptNotDisplayed => "auth.errors.promptNotDisplayed",
        }
    }
}

/// Resolves message keys to display text.
pub trait MessageCatalog {
    fn resolve(&self, key: MessageKey) -> Option<String>;

    /// Like `resolve`, but never empty: a missing or blank entry yields the key path.
    fn message(&self, key: MessageKey) -> String {
        self.resolve(key)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| key.path().to_string())
    }
}

/// A JSON message catalog for one locale.
#[derive(Debug, Clone)]
pub struct Catalog {
    locale: Locale,
    messages: Value,
}

impl Catalog {
    pub fn from_json(locale: Locale, json: &str) -> Result<Self, Error> {
        let messages = serde_json::from_str::<Value>(json).map_err(|e| {
            error!("Failed to parse {} message catalog: {}", locale, e);
            Error::Catalog
        })?;
        Ok(Self { locale, messages })
    }

    /// The catalog bundled with the crate for `locale`.
    pub fn builtin(locale: Locale) -> Self {
        let json = match locale {
            Locale::En => EN_MESSAGES,
            Locale::Zh => ZH_MESSAGES,
        };
        Catalog::from_json(locale, json).unwrap_or(Self {
            locale,
            messages: Value::Null,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Looks up a dotted path such as `nav.home`.
    pub fn get(&self, path: &str) -> Option<&str> {
        let pointer = format!("/{}", path.replace('.', "/"));
        self.messages.pointer(&pointer)?.as_str()
    }
}

impl MessageCatalog for Catalog {
    fn resolve(&self, key: MessageKey) -> Option<String> {
        self.get(key.path()).map(str::to_string)
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::error::Error;

    use super::{Catalog, Locale, MessageCatalog, MessageKey};

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("en"), Some(Locale::En));
        assert_eq!(Locale::from_tag("zh-CN"), Some(Locale::Zh));
        assert_eq!(Locale::from_tag("ZH_Hant"), Some(Locale::Zh));
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("zh".parse::<Locale>().unwrap(), Locale::Zh);
        assert!(matches!("de".parse::<Locale>(), Err(Error::Locale(tag)) if tag == "de"));
    }

    #[test]
    fn test_builtin_catalogs_complete() {
        for locale in Locale::ALL {
            let catalog = Catalog::builtin(locale);
            for key in MessageKey::ALL {
                assert!(
                    catalog.resolve(key).is_some(),
                    "{} catalog is missing {}",
                    locale,
                    key.path()
                );
            }
        }
    }

    #[test]
    fn test_builtin_zh_messages() {
        let catalog = Catalog::builtin(Locale::Zh);
        assert_eq!(
            catalog.message(MessageKey::CredentialProcessingFailed),
            "登录处理失败"
        );
        assert_eq!(catalog.message(MessageKey::PromptNotDisplayed), "登录窗口无法显示");
        assert_eq!(catalog.get("nav.home"), Some("首页"));
    }

    #[test]
    fn test_message_falls_back_to_path() {
        let catalog =
            Catalog::from_json(Locale::En, r#"{"auth": {"loading": "", "signIn": "Go"}}"#).unwrap();
        assert_eq!(catalog.message(MessageKey::SignIn), "Go");
        assert_eq!(catalog.message(MessageKey::Loading), "auth.loading");
        assert_eq!(
            catalog.message(MessageKey::ScriptLoadFailed),
            "auth.errors.scriptLoadFailed"
        );
    }

    #[test]
    fn test_catalog_invalid_json() {
        assert!(matches!(
            Catalog::from_json(Locale::En, "{not json"),
            Err(Error::Catalog)
        ));
    }

    #[test]
    fn test_catalog_get_non_string() {
        let catalog = Catalog::builtin(Locale::En);
        assert_eq!(catalog.get("auth.errors"), None);
        assert_eq!(catalog.get("auth.missing"), None);
    }
}
