//! Drives the command-line program.

use crate::account::{self, DEMO_USERNAME};
use crate::auth::{Auth, AuthError, Source};
use crate::conf::{self, Conf};
use crate::db::{self, Database};
use crate::http::HTTPError;
use crate::prompt::{self, Prompt};
use crate::provider::{Provider, is_external_provider_envvar};
use crate::service::{ProviderService, Verification};
use crate::session::{self, Session, Visitor};
use crate::settings::{self, Flash, Level};
use crate::store::{self, Settings};
use crate::text::{mask, shell_quote};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use colored::Colorize;
use indoc::formatdoc;
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// A command-line error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Conf(#[from] conf::Error),

    #[error(transparent)]
    Database(#[from] db::Error),

    #[error(transparent)]
    Account(#[from] account::Error),

    #[error(transparent)]
    Session(#[from] session::Error),

    #[error(transparent)]
    Settings(#[from] settings::Error),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    HTTP(#[from] HTTPError),

    #[error(transparent)]
    Prompt(#[from] prompt::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The variable is not one of the external provider variables.
    #[error("{0} is not an external provider setting.")]
    UnknownEnvvar(String),

    /// An operation reported a warning or failure; its messages have
    /// already been printed.
    #[error("{0}")]
    Rejected(String),
}

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Manages API credentials for external AI inference providers", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Location of the aikeys database
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Config {
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new user
    AddUser,

    /// Set a user's password without knowing the old one
    SetPassword,

    /// Change your own password
    Passwd {
        /// Your username
        username: String,
    },

    /// List external providers and the variables that configure them
    Providers,

    /// Show or change a user's external provider settings
    Settings(SettingsConfig),

    /// Print a user's provider credentials as shell exports
    Env {
        /// Your username
        username: String,
    },

    /// Check a provider credential with the provider itself
    Verify {
        /// Provider identifier, such as "replicate"
        provider: Provider,

        /// Prefer credentials stored for this user over the environment
        #[arg(long, value_name = "USERNAME")]
        user: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SettingsConfig {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Show stored external provider settings, masked
    Show {
        /// Your username
        username: String,
    },

    /// Store an external provider setting
    Set {
        /// Your username
        username: String,

        /// Variable name, such as REPLICATE_API_TOKEN
        envvar: String,

        /// New value
        value: String,
    },

    /// Remove an external provider setting
    Unset {
        /// Your username
        username: String,

        /// Variable name, such as REPLICATE_API_TOKEN
        envvar: String,
    },
}

/// Runs the command-line program with the given `config`.
pub async fn run(config: Config) -> Result<(), Error> {
    let conf = Conf::from_env(config.database.clone())?;
    let db = Database::open(conf.database())?;
    let stdin = io::stdin().lock();
    let mut runner = Runner::new(conf, db, Prompt::new(stdin, io::stderr()), io::stdout());
    runner.run(&config.command).await
}

/// Runs the command-line program.
struct Runner<R, W, O> {
    conf: Conf,
    db: Database,
    prompt: Prompt<R, W>,
    out: O,
}

impl<R: BufRead, W: Write, O: Write> Runner<R, W, O> {
    fn new(conf: Conf, db: Database, prompt: Prompt<R, W>, out: O) -> Self {
        Self {
            conf,
            db,
            prompt,
            out,
        }
    }

    async fn run(&mut self, command: &Command) -> Result<(), Error> {
        match command {
            Command::AddUser => self.run_add_user(),
            Command::SetPassword => self.run_set_password(),
            Command::Passwd { username } => self.run_passwd(username),
            Command::Providers => self.run_providers(),
            Command::Settings(config) => match &config.command {
                SettingsCommand::Show { username } => self.run_settings_show(username),
                SettingsCommand::Set {
                    username,
                    envvar,
                    value,
                } => self.run_settings_update(username, envvar, Some(value)),
                SettingsCommand::Unset { username, envvar } => {
                    self.run_settings_update(username, envvar, None)
                }
            },
            Command::Env { username } => self.run_env(username),
            Command::Verify { provider, user } => self.run_verify(*provider, user).await,
        }
    }

    /// Signs `username` in, asking for their password unless they are the
    /// demo user and demo mode is enabled.
    ///
    /// Returns the visitor along with the password that was entered.
    fn sign_in(&mut self, username: &str) -> Result<(Visitor, String), Error> {
        let conn = self.db.connection();
        let mut session = Session::new();
        let is_demo = account::normalize_username(username) == DEMO_USERNAME;
        let password = if self.conf.demo_mode() && is_demo {
            String::new()
        } else {
            let password = self.prompt.ask("Password")?;
            session::login(conn, &mut session, username, &password)?;
            password
        };
        let visitor = session::load_user(conn, &mut session, self.conf.demo_mode())?;
        Ok((visitor, password))
    }

    fn print_flashes(&mut self, flashes: &[Flash]) -> Result<(), Error> {
        for flash in flashes {
            let message = match flash.level() {
                Level::Success => flash.message().green(),
                Level::Warning => flash.message().yellow(),
                Level::Danger => flash.message().red(),
            };
            writeln!(self.out, "{message}")?;
        }

        match flashes.iter().find(|flash| !flash.is_success()) {
            Some(flash) => Err(Error::Rejected(flash.message().to_string())),
            None => Ok(()),
        }
    }

    fn run_add_user(&mut self) -> Result<(), Error> {
        let username = self.prompt.ask("Username")?;
        let password = self.prompt.ask_new_password()?;
        account::add_user(self.db.connection(), &username, &password)?;
        writeln!(self.out, "Registration successful.")?;
        Ok(())
    }

    fn run_set_password(&mut self) -> Result<(), Error> {
        let username = self.prompt.ask("Username")?;
        let password = self.prompt.ask_new_password()?;
        account::set_password(self.db.connection(), &username, &password)?;
        writeln!(self.out, "Successfully set the password for {username}.")?;
        Ok(())
    }

    fn run_passwd(&mut self, username: &str) -> Result<(), Error> {
        let (visitor, current_password) = self.sign_in(username)?;
        let new_password = self.prompt.ask("New password")?;
        let confirmation = self.prompt.ask("Repeat for confirmation")?;
        let flashes = settings::change_password(
            self.db.connection(),
            &visitor,
            &current_password,
            &new_password,
            &confirmation,
        )?;
        self.print_flashes(&flashes)
    }

    fn run_providers(&mut self) -> Result<(), Error> {
        let output = Provider::all()
            .map(|provider| {
                let envvars = provider
                    .envvars()
                    .iter()
                    .map(|envvar| {
                        let status = match std::env::var_os(envvar) {
                            Some(_) => "set in environment".green(),
                            None => "not set".dimmed(),
                        };
                        format!("  {envvar:<32} {status}")
                    })
                    .join("\n");
                let privacy = match provider.privacy_policy() {
                    Some(url) => format!("Privacy policy: {url}"),
                    None => String::from("Consult its privacy policy."),
                };
                formatdoc! {"
                    {name} ({id})
                      {description}
                    {envvars}
                      Requests are proxied to {display}'s servers. {privacy}",
                    name = provider.display_name().bold(),
                    id = provider.id(),
                    description = provider.description(),
                    display = provider.display_name(),
                    envvars = envvars,
                    privacy = privacy,
                }
            })
            .join("\n\n");
        writeln!(self.out, "{output}")?;
        Ok(())
    }

    fn run_settings_show(&mut self, username: &str) -> Result<(), Error> {
        let (visitor, _) = self.sign_in(username)?;
        let view = settings::external_providers_view(self.db.connection(), &visitor)?;
        let stored: Vec<_> = view
            .into_iter()
            .filter_map(|(envvar, value)| value.map(|value| (envvar, value)))
            .collect();

        if stored.is_empty() {
            writeln!(
                self.out,
                "No external providers are configured for {username}."
            )?;
        }
        for (envvar, value) in stored {
            writeln!(self.out, "{envvar}={}", mask(&value))?;
        }
        Ok(())
    }

    fn run_settings_update(
        &mut self,
        username: &str,
        envvar: &str,
        value: Option<&String>,
    ) -> Result<(), Error> {
        if !is_external_provider_envvar(envvar) {
            return Err(Error::UnknownEnvvar(envvar.to_string()));
        }

        let (visitor, _) = self.sign_in(username)?;
        let conn = self.db.connection();
        let mut form: HashMap<String, String> =
            settings::external_providers_view(conn, &visitor)?
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
                .collect();
        match value {
            Some(value) => form.insert(envvar.to_string(), value.clone()),
            None => form.remove(envvar),
        };
        debug!("Updating {envvar} for {username}");

        let flashes = settings::update_external_providers(conn, &visitor, &form)?;
        self.print_flashes(&flashes)
    }

    fn user_settings(&mut self, username: &str) -> Result<Settings, Error> {
        let (visitor, _) = self.sign_in(username)?;
        let user = visitor.login_required_allow_demo().map_err(settings::Error::from)?;
        Ok(store::get_settings(self.db.connection(), user.id())?)
    }

    fn run_env(&mut self, username: &str) -> Result<(), Error> {
        let settings = self.user_settings(username)?;
        for (envvar, value) in conf::provider_env(&settings) {
            writeln!(self.out, "export {envvar}={}", shell_quote(&value))?;
        }
        Ok(())
    }

    async fn run_verify(&mut self, provider: Provider, user: &Option<String>) -> Result<(), Error> {
        let settings = match user {
            Some(username) => self.user_settings(username)?,
            None => Settings::default(),
        };
        let auth = Auth::for_provider(provider, &settings)?;
        let source = match auth.source() {
            Source::UserSettings => "user settings",
            Source::Environment => "the environment",
            Source::Explicit => "the command line",
        };

        let service = ProviderService::new()?;
        let name = provider.display_name();
        match service.verify(provider, &auth).await? {
            Verification::Valid => {
                let message = format!("{name} accepted the credential from {source}.");
                writeln!(self.out, "{}", message.green())?;
                Ok(())
            }
            Verification::Invalid(status) => {
                let message = format!("{name} rejected the credential from {source} ({status}).");
                writeln!(self.out, "{}", message.red())?;
                Err(Error::Rejected(message))
            }
            Verification::Unsupported => {
                let message = format!("{name} does not offer a way to verify credentials.");
                writeln!(self.out, "{}", message.yellow())?;
                Ok(())
            }
        }
    }
}
