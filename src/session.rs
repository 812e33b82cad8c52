//! Sign-in state.
//!
//! A [`Session`] remembers who is signed in between requests. Before each
//! request, [`load_user()`] turns the session into a [`Visitor`], which
//! operations then check with [`Visitor::login_required()`] or
//! [`Visitor::login_required_allow_demo()`].
//!
//! When demo mode is enabled (see [`Conf::demo_mode()`](crate::conf::Conf::demo_mode)),
//! anyone who is not signed in is treated as the [demo user](User::demo).

use crate::account::{self, DEMO_USER_ID, User};
use log::{debug, info, warn};
use rusqlite::Connection;
use thiserror::Error;

/// A sign-in error.
#[derive(Debug, Error)]
pub enum Error {
    /// The username does not exist or the password is wrong.
    ///
    /// The two cases are deliberately indistinguishable.
    #[error("Incorrect username or password.")]
    IncorrectCredentials,

    /// An error looking up the account.
    #[error(transparent)]
    Account(#[from] account::Error),
}

/// Indicates that an operation requires a signed-in user.
#[derive(Debug, Error, PartialEq)]
pub enum AccessError {
    /// Nobody (or only the demo user, where it is not allowed) is signed in.
    #[error("You must be logged in to do that.")]
    LoginRequired,
}

/// Remembers which user is signed in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    user_id: Option<i64>,
}

impl Session {
    /// Creates a session with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the signed-in user, if any.
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }
}

/// Signs `username` in if `password` is correct.
pub fn login(
    conn: &Connection,
    session: &mut Session,
    username: &str,
    password: &str,
) -> Result<User, Error> {
    let username = account::normalize_username(username);
    let user = account::find_user(conn, username)?;
    match user {
        Some(user) if account::is_password_correct(conn, username, password)? => {
            info!("User {username} logged in");
            session.user_id = Some(user.id());
            Ok(user)
        }
        _ => {
            warn!("Failed login attempt for {username}");
            Err(Error::IncorrectCredentials)
        }
    }
}

/// Signs the current user out.
pub fn logout(session: &mut Session) {
    session.user_id = None;
}

/// Resolves the session into the visitor making the current request.
///
/// This also keeps the session consistent with `demo_mode`: the demo user
/// is signed in automatically when demo mode is on and nobody else is
/// signed in, and is signed out when demo mode is off. A session that
/// refers to a user who no longer exists is cleared.
pub fn load_user(
    conn: &Connection,
    session: &mut Session,
    demo_mode: bool,
) -> Result<Visitor, account::Error> {
    match session.user_id {
        None if demo_mode => {
            debug!("Demo mode is enabled; signing in the demo user");
            session.user_id = Some(DEMO_USER_ID);
            Ok(Visitor::User(User::demo()))
        }
        None => Ok(Visitor::Anonymous),
        Some(DEMO_USER_ID) if demo_mode => Ok(Visitor::User(User::demo())),
        Some(DEMO_USER_ID) => {
            debug!("Demo mode is disabled; signing out the demo user");
            session.user_id = None;
            Ok(Visitor::Anonymous)
        }
        Some(id) => match account::get_user(conn, id)? {
            Some(user) => Ok(Visitor::User(user)),
            None => {
                warn!("Session refers to missing user {id}");
                session.user_id = None;
                Ok(Visitor::Anonymous)
            }
        },
    }
}

/// Whoever is making the current request.
#[derive(Clone, Debug, PartialEq)]
pub enum Visitor {
    /// Nobody is signed in.
    Anonymous,

    /// A registered user or the demo user is signed in.
    User(User),
}

impl Visitor {
    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Visitor::Anonymous => None,
            Visitor::User(user) => Some(user),
        }
    }

    /// True if the visitor is the demo user.
    pub fn is_demo_user(&self) -> bool {
        self.user().is_some_and(User::is_demo)
    }

    /// Returns the signed-in user, refusing anonymous visitors and the
    /// demo user.
    pub fn login_required(&self) -> Result<&User, AccessError> {
        self.user()
            .filter(|user| !user.is_demo())
            .ok_or(AccessError::LoginRequired)
    }

    /// Returns the signed-in user, refusing only anonymous visitors.
    pub fn login_required_allow_demo(&self) -> Result<&User, AccessError> {
        self.user().ok_or(AccessError::LoginRequired)
    }
}
