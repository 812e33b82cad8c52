//! Lets users see and change their own settings.
//!
//! Each operation reports its outcome as a list of [`Flash`] messages
//! suitable for showing to the user, and only fails outright on access
//! or storage errors.

use crate::account;
use crate::provider::EXTERNAL_PROVIDER_ENVVARS;
use crate::session::{AccessError, Visitor};
use crate::store::{self, EXTERNAL_PROVIDERS};
use log::{info, warn};
use rusqlite::Connection;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Minimum length of a new password.
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// A settings error.
#[derive(Debug, Error)]
pub enum Error {
    /// Nobody is signed in.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// An error from the account layer.
    #[error(transparent)]
    Account(#[from] account::Error),

    /// An error from the underlying database.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// How a [`Flash`] message should be presented.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Success,
    Warning,
    Danger,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// A one-off message describing the outcome of an operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Flash {
    level: Level,
    message: String,
}

impl Flash {
    /// Creates a new flash message.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        let message = message.into();
        Self { level, message }
    }

    /// How the message should be presented.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message itself.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if the message reports a successful operation.
    pub fn is_success(&self) -> bool {
        self.level == Level::Success
    }
}

impl fmt::Display for Flash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Changes the visitor's password.
///
/// The demo user's password cannot be changed. Otherwise the new password
/// must match its confirmation, the current password must be correct, and
/// the new password must be at least [`MIN_PASSWORD_LENGTH`] characters
/// long, checked in that order.
pub fn change_password(
    conn: &Connection,
    visitor: &Visitor,
    current_password: &str,
    new_password: &str,
    new_password_confirmation: &str,
) -> Result<Vec<Flash>, Error> {
    let user = visitor.login_required_allow_demo()?;
    let username = user.username();

    let flash = if user.is_demo() {
        warn!("Refusing to change the demo user's password");
        Flash::new(
            Level::Warning,
            "You cannot change the password of the demo user.",
        )
    } else if new_password != new_password_confirmation {
        Flash::new(Level::Danger, "Password and confirmation do not match.")
    } else if !account::is_password_correct(conn, username, current_password)? {
        warn!("Incorrect current password for {username}");
        Flash::new(Level::Danger, "Incorrect current password.")
    } else if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        Flash::new(
            Level::Danger,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long."),
        )
    } else {
        account::set_password(conn, username, new_password)?;
        Flash::new(Level::Success, "Password changed successfully.")
    };

    Ok(vec![flash])
}

/// Replaces the visitor's external provider credentials with `form`.
///
/// Every catalogued variable with a non-blank value in `form` is stored,
/// trimmed; every other catalogued variable is removed. Keys that are not
/// in the catalogue are ignored. The demo user's settings cannot be
/// changed.
pub fn update_external_providers(
    conn: &Connection,
    visitor: &Visitor,
    form: &HashMap<String, String>,
) -> Result<Vec<Flash>, Error> {
    let user = visitor.login_required_allow_demo()?;

    if user.is_demo() {
        warn!("Refusing to change the demo user's external providers");
        return Ok(vec![Flash::new(
            Level::Warning,
            "You cannot change the external providers settings of the demo user.",
        )]);
    }

    let tx = conn.unchecked_transaction()?;
    for envvar in EXTERNAL_PROVIDER_ENVVARS {
        let value = form
            .get(envvar)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty());
        match value {
            Some(value) => store::set_setting(&tx, user.id(), EXTERNAL_PROVIDERS, envvar, value)?,
            None => store::delete_setting(&tx, user.id(), EXTERNAL_PROVIDERS, envvar)?,
        }
    }
    tx.commit()?;
    info!("Saved external providers for {}", user.username());

    Ok(vec![Flash::new(Level::Success, "Settings saved successfully.")])
}

/// The visitor's external provider settings, in catalogue order.
///
/// Each catalogued variable is paired with its stored value, if any.
pub fn external_providers_view(
    conn: &Connection,
    visitor: &Visitor,
) -> Result<Vec<(&'static str, Option<String>)>, Error> {
    let user = visitor.login_required_allow_demo()?;
    let settings = store::get_settings(conn, user.id())?;
    let view = EXTERNAL_PROVIDER_ENVVARS
        .into_iter()
        .map(|envvar| (envvar, settings.external_provider(envvar).map(String::from)))
        .collect();
    Ok(view)
}
