//! Environment and configuration utilities.

use crate::provider::EXTERNAL_PROVIDER_ENVVARS;
use crate::store::Settings;
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the location of the database.
pub const DATABASE_ENVVAR: &str = "AIKEYS_DATABASE";

/// Enables the demo user when set to a non-empty value.
pub const DEMO_MODE_ENVVAR: &str = "ENABLE_DEMO_MODE";

/// A configuration error.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither an explicit path nor a data directory is available.
    #[error("Could not determine where to store the database; use --database or set $AIKEYS_DATABASE")]
    NoDatabasePath,
}

/// Runtime configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Conf {
    database: PathBuf,
    demo_mode: bool,
}

impl Conf {
    /// Creates a configuration with explicit values.
    pub fn new(database: impl Into<PathBuf>, demo_mode: bool) -> Self {
        let database = database.into();
        Self {
            database,
            demo_mode,
        }
    }

    /// Builds the configuration from the environment.
    ///
    /// `database` takes precedence over anything found in the environment;
    /// see [`default_database_path()`] for where the database lives
    /// otherwise.
    pub fn from_env(database: Option<PathBuf>) -> Result<Self, Error> {
        let database = database
            .or_else(default_database_path)
            .ok_or(Error::NoDatabasePath)?;
        Ok(Self::new(database, demo_mode_enabled()))
    }

    /// Location of the SQLite database.
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// True if the demo user is enabled.
    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }
}

/// Where the database is stored when no path is given explicitly.
///
/// This is `$AIKEYS_DATABASE` if set, otherwise `aikeys.db` in the
/// platform's data directory for aikeys (`$XDG_DATA_HOME/aikeys` on Linux,
/// `~/Library/Application Support/aikeys` on macOS).
///
/// # Examples
///
/// ```
/// use aikeys::conf::default_database_path;
/// # use temp_env::with_var;
/// # with_var("AIKEYS_DATABASE", Some("/srv/aikeys.db"), || {
/// let path = default_database_path().unwrap();
/// assert_eq!(path.to_str(), Some("/srv/aikeys.db"));
/// # });
/// ```
pub fn default_database_path() -> Option<PathBuf> {
    if let Some(path) = non_empty_var(DATABASE_ENVVAR) {
        return Some(PathBuf::from(path));
    }

    ProjectDirs::from("", "", "aikeys").map(|dirs| dirs.data_dir().join("aikeys.db"))
}

/// True if `$ENABLE_DEMO_MODE` is set to a non-empty value.
pub fn demo_mode_enabled() -> bool {
    env::var_os(DEMO_MODE_ENVVAR).is_some_and(|value| !value.is_empty())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Returns the environment to pass to code that calls external providers.
///
/// Every [catalogued](EXTERNAL_PROVIDER_ENVVARS) variable is included,
/// taking the user's stored value if there is one and the current value
/// from the process environment otherwise. Variables set in neither place
/// are left out.
///
/// # Examples
///
/// ```
/// use aikeys::conf::provider_env;
/// use aikeys::store::Settings;
/// # use temp_env::with_vars_unset;
/// # use aikeys::provider::EXTERNAL_PROVIDER_ENVVARS;
/// # with_vars_unset(EXTERNAL_PROVIDER_ENVVARS, || {
/// let mut settings = Settings::default();
/// settings.insert("external-providers", "REPLICATE_API_TOKEN", "r8_secret");
/// let env = provider_env(&settings);
/// assert_eq!(env, vec![(String::from("REPLICATE_API_TOKEN"), String::from("r8_secret"))]);
/// # });
/// ```
pub fn provider_env(settings: &Settings) -> Vec<(String, String)> {
    EXTERNAL_PROVIDER_ENVVARS
        .into_iter()
        .filter_map(|envvar| {
            let value = settings
                .external_provider(envvar)
                .map(String::from)
                .or_else(|| env::var(envvar).ok())?;
            Some((envvar.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_env::{with_var, with_var_unset, with_vars, with_vars_unset};

    #[test]
    fn it_prefers_an_explicit_database_path() {
        with_var(DATABASE_ENVVAR, Some("/from/env.db"), || {
            let conf = Conf::from_env(Some(PathBuf::from("/explicit.db"))).unwrap();
            assert_eq!(conf.database(), Path::new("/explicit.db"));
        })
    }

    #[test]
    fn it_reads_the_database_path_from_the_environment() {
        with_var(DATABASE_ENVVAR, Some("/from/env.db"), || {
            let conf = Conf::from_env(None).unwrap();
            assert_eq!(conf.database(), Path::new("/from/env.db"));
        })
    }

    #[test]
    fn it_falls_back_to_the_platform_data_directory() {
        with_var_unset(DATABASE_ENVVAR, || {
            let expected = ProjectDirs::from("", "", "aikeys")
                .map(|dirs| dirs.data_dir().join("aikeys.db"));
            assert_eq!(default_database_path(), expected);
            if let Some(path) = default_database_path() {
                assert!(path.ends_with("aikeys.db"));
            }
        })
    }

    #[test]
    fn it_ignores_a_blank_database_variable() {
        with_var(DATABASE_ENVVAR, Some(""), || {
            assert_ne!(default_database_path(), Some(PathBuf::new()));
        })
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn it_honors_xdg_data_home_on_linux() {
        with_vars(
            [(DATABASE_ENVVAR, None), ("XDG_DATA_HOME", Some("/data"))],
            || {
                let path = default_database_path().unwrap();
                assert_eq!(path, Path::new("/data/aikeys/aikeys.db"));
            },
        )
    }

    #[test]
    fn it_enables_demo_mode_only_when_set() {
        with_var_unset(DEMO_MODE_ENVVAR, || assert!(!demo_mode_enabled()));
        with_var(DEMO_MODE_ENVVAR, Some(""), || assert!(!demo_mode_enabled()));
        with_var(DEMO_MODE_ENVVAR, Some("1"), || {
            assert!(demo_mode_enabled());
            let conf = Conf::from_env(Some(PathBuf::from("/tmp/a.db"))).unwrap();
            assert!(conf.demo_mode());
        });
    }

    #[test]
    fn it_overlays_user_settings_on_the_environment() {
        let mut settings = Settings::default();
        settings.insert("external-providers", "REPLICATE_API_TOKEN", "from-settings");
        with_vars_unset(EXTERNAL_PROVIDER_ENVVARS, || {
            with_vars(
                [
                    ("REPLICATE_API_TOKEN", Some("from-env")),
                    ("FOREFRONTAI_API_KEY", Some("ff-from-env")),
                ],
                || {
                    let env = provider_env(&settings);
                    assert_eq!(
                        env,
                        vec![
                            (
                                String::from("FOREFRONTAI_API_KEY"),
                                String::from("ff-from-env")
                            ),
                            (
                                String::from("REPLICATE_API_TOKEN"),
                                String::from("from-settings")
                            ),
                        ]
                    );
                },
            )
        })
    }

    #[test]
    fn it_returns_an_empty_overlay_when_nothing_is_configured() {
        with_vars_unset(EXTERNAL_PROVIDER_ENVVARS, || {
            assert!(provider_env(&Settings::default()).is_empty());
        })
    }
}
