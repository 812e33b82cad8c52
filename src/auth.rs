//! Authentication for external AI providers.

use crate::provider::Provider;
use crate::store::Settings;
use log::debug;
use std::{env, fmt};
use thiserror::Error;

/// Where an API key came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    /// Supplied directly by the caller.
    Explicit,

    /// Read from the process environment.
    Environment,

    /// Stored in the user's external provider settings.
    UserSettings,
}

/// Manages authentication keys for AI service APIs.
pub struct Auth {
    api_key: String,
    source: Source,
}

impl Auth {
    /// Creates a new `Auth` structure using the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        Self {
            api_key,
            source: Source::Explicit,
        }
    }

    /// Retrieves an API key from the environment.
    ///
    /// Returns an error if the API key cannot be retrieved from the
    /// environment.
    pub fn from_env(envvar: impl Into<String>) -> AuthResult {
        let envvar = envvar.into();
        let api_key = env::var(&envvar).map_err(|err| AuthError::EnvError(envvar, err))?;
        Ok(Self {
            api_key,
            source: Source::Environment,
        })
    }

    /// Retrieves the API key stored in `envvar`, preferring the user's
    /// own settings over the environment.
    ///
    /// A blank stored value is treated as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use aikeys::auth::{Auth, Source};
    /// use aikeys::store::Settings;
    ///
    /// let mut settings = Settings::default();
    /// settings.insert("external-providers", "REPLICATE_API_TOKEN", "r8_from_settings");
    /// let auth = Auth::resolve("REPLICATE_API_TOKEN", &settings).unwrap();
    /// assert_eq!(auth.api_key(), "r8_from_settings");
    /// assert_eq!(auth.source(), Source::UserSettings);
    /// ```
    pub fn resolve(envvar: &str, settings: &Settings) -> AuthResult {
        let stored = settings
            .external_provider(envvar)
            .map(str::trim)
            .filter(|value| !value.is_empty());
        match stored {
            Some(api_key) => {
                debug!("Using ${envvar} from user settings");
                Ok(Self {
                    api_key: api_key.to_string(),
                    source: Source::UserSettings,
                })
            }
            None => {
                debug!("Using ${envvar} from the environment");
                Self::from_env(envvar)
            }
        }
    }

    /// Retrieves the primary API key for `provider`.
    ///
    /// See [`Auth::resolve()`] for where the key is looked up.
    pub fn for_provider(provider: Provider, settings: &Settings) -> AuthResult {
        Self::resolve(provider.api_key_envvar(), settings)
    }

    /// The actual API key.
    ///
    /// # Examples
    ///
    /// ```
    /// use aikeys::auth::Auth;
    /// let auth = Auth::new("ThisIsMyApiKey");
    /// assert_eq!(auth.api_key(), "ThisIsMyApiKey");
    /// ```
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Where the API key came from.
    pub fn source(&self) -> Source {
        self.source
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("api_key", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Standard result type for [`Auth`] creation.
pub type AuthResult = Result<Auth, AuthError>;

/// Indicates an error when creating an authentication key.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An error occurred while retrieving a key from the environment.
    #[error("Could not read ${0} from the environment: {1}")]
    EnvError(String, #[source] env::VarError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use temp_env::{with_var, with_var_unset};

    #[test]
    fn it_creates_an_auth_key_from_the_environment() {
        let key_name = "AUTH_API_KEY";
        let key_value = "ThisIsMyApiKey";
        with_var(key_name, Some(key_value), || {
            let auth = Auth::from_env(key_name);
            assert!(auth.is_ok());
            let auth = auth.unwrap();
            assert_eq!(auth.api_key(), key_value);
            assert_eq!(auth.source(), Source::Environment);
        })
    }

    #[test]
    fn it_returns_an_error_if_a_key_is_not_set_in_environment() {
        let key_name = "AUTH_API_KEY";
        with_var_unset(key_name, || {
            let auth = Auth::from_env(key_name);
            assert!(auth.is_err());
            assert!(matches!(
                auth.unwrap_err(),
                AuthError::EnvError(name, env::VarError::NotPresent) if name == key_name
            ));
        })
    }

    #[test]
    fn it_returns_an_error_if_a_key_is_not_unicode() {
        let key_name = "AUTH_API_KEY";
        let bytes = vec![0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff];
        let key_value = unsafe { OsString::from_encoded_bytes_unchecked(bytes) };
        with_var(key_name, Some(key_value), || {
            let auth = Auth::from_env(key_name);
            assert!(auth.is_err());
            assert!(matches!(
                auth.unwrap_err(),
                AuthError::EnvError(_, env::VarError::NotUnicode(_))
            ))
        })
    }

    #[test]
    fn it_prefers_user_settings_over_the_environment() {
        let mut settings = Settings::default();
        settings.insert("external-providers", "REPLICATE_API_TOKEN", "  from-settings ");
        with_var("REPLICATE_API_TOKEN", Some("from-env"), || {
            let auth = Auth::for_provider(Provider::Replicate, &settings).unwrap();
            assert_eq!(auth.api_key(), "from-settings");
            assert_eq!(auth.source(), Source::UserSettings);
        })
    }

    #[test]
    fn it_falls_back_to_the_environment() {
        let settings = Settings::default();
        with_var("FOREFRONTAI_API_KEY", Some("from-env"), || {
            let auth = Auth::for_provider(Provider::ForefrontAI, &settings).unwrap();
            assert_eq!(auth.api_key(), "from-env");
            assert_eq!(auth.source(), Source::Environment);
        })
    }

    #[test]
    fn it_treats_blank_settings_as_absent() {
        let mut settings = Settings::default();
        settings.insert("external-providers", "FOREFRONTAI_API_KEY", "   ");
        with_var("FOREFRONTAI_API_KEY", Some("from-env"), || {
            let auth = Auth::for_provider(Provider::ForefrontAI, &settings).unwrap();
            assert_eq!(auth.api_key(), "from-env");
        })
    }

    #[test]
    fn it_fails_when_no_source_has_the_key() {
        let settings = Settings::default();
        with_var_unset("REPLICATE_API_TOKEN", || {
            let auth = Auth::for_provider(Provider::Replicate, &settings);
            assert!(matches!(
                auth,
                Err(AuthError::EnvError(name, env::VarError::NotPresent))
                    if name == "REPLICATE_API_TOKEN"
            ));
        })
    }

    #[test]
    fn it_does_not_reveal_the_key_when_debugging() {
        let auth = Auth::new("ThisIsMyApiKey");
        let debugged = format!("{auth:?}");
        assert!(!debugged.contains("ThisIsMyApiKey"));
    }
}
