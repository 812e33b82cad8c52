//! User accounts and passwords.

pub mod password;

use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Identifier of the demo user, which is never stored in the database.
pub const DEMO_USER_ID: i64 = -1;

/// Username of the demo user.
pub const DEMO_USERNAME: &str = "demo";

/// An account error.
#[derive(Debug, Error)]
pub enum Error {
    /// The username is already taken.
    #[error("User {0} is already registered.")]
    AlreadyRegistered(String),

    /// No user exists with the given username.
    #[error("User {0} does not exist.")]
    UnknownUser(String),

    /// The username belongs to the demo user.
    #[error("The username {0} is reserved.")]
    ReservedUsername(String),

    /// Usernames cannot be blank.
    #[error("Username is required.")]
    EmptyUsername,

    /// An error from the underlying database.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// An account error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A registered user, or the demo user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    id: i64,
    username: String,
}

impl User {
    /// The synthetic demo user.
    ///
    /// # Examples
    ///
    /// ```
    /// use aikeys::account::User;
    /// let demo = User::demo();
    /// assert_eq!(demo.id(), -1);
    /// assert_eq!(demo.username(), "demo");
    /// assert!(demo.is_demo());
    /// ```
    pub fn demo() -> Self {
        Self {
            id: DEMO_USER_ID,
            username: String::from(DEMO_USERNAME),
        }
    }

    /// The user's database identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The user's login name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// True if this is the demo user.
    pub fn is_demo(&self) -> bool {
        self.id == DEMO_USER_ID
    }
}

/// Strips surrounding whitespace from a username as typed.
///
/// Every lookup goes through this, so `" bob"` and `"bob"` are one user.
pub fn normalize_username(username: &str) -> &str {
    username.trim()
}

/// Registers a new user with the given password.
///
/// The demo user's name is reserved, even when demo mode is off.
pub fn add_user(conn: &Connection, username: &str, password: &str) -> Result<User> {
    let username = normalize_username(username);
    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }
    if username == DEMO_USERNAME {
        return Err(Error::ReservedUsername(username.to_string()));
    }
    if find_user(conn, username)?.is_some() {
        return Err(Error::AlreadyRegistered(username.to_string()));
    }

    conn.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        params![username, password::hash(password)],
    )?;
    let id = conn.last_insert_rowid();
    info!("Registered user {username} with id {id}");
    Ok(User {
        id,
        username: username.to_string(),
    })
}

/// Looks up a user by username.
pub fn find_user(conn: &Connection, username: &str) -> Result<Option<User>> {
    let username = normalize_username(username);
    let user = conn
        .query_row(
            "SELECT id, username FROM user WHERE username = ?1",
            params![username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

/// Looks up a user by id.
pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username FROM user WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

/// Replaces the password of the user `username`.
pub fn set_password(conn: &Connection, username: &str, password: &str) -> Result<()> {
    let username = normalize_username(username);
    let updated = conn.execute(
        "UPDATE user SET password = ?1 WHERE username = ?2",
        params![password::hash(password), username],
    )?;
    if updated == 0 {
        return Err(Error::UnknownUser(username.to_string()));
    }
    info!("Changed password for user {username}");
    Ok(())
}

/// True if `password` is the password of the user `username`.
///
/// Unknown users never have a correct password.
pub fn is_password_correct(conn: &Connection, username: &str, password: &str) -> Result<bool> {
    let username = normalize_username(username);
    let stored: Option<String> = conn
        .query_row(
            "SELECT password FROM user WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()?;
    let correct = stored.is_some_and(|stored| password::verify(password, &stored));
    debug!("Password check for {username}: {correct}");
    Ok(correct)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Database;

    /// A database with a single user, `test`, whose password is `test`.
    pub(crate) fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        add_user(db.connection(), "test", "test").unwrap();
        db
    }

    #[test]
    fn it_checks_passwords() {
        let db = test_db();
        let conn = db.connection();
        assert!(!is_password_correct(conn, "test", "a").unwrap());
        assert!(!is_password_correct(conn, "a", "test").unwrap());
        assert!(is_password_correct(conn, "test", "test").unwrap());
    }

    #[test]
    fn it_sets_passwords() {
        let db = test_db();
        let conn = db.connection();
        set_password(conn, "test", "a").unwrap();
        assert!(!is_password_correct(conn, "test", "test").unwrap());
        assert!(is_password_correct(conn, "test", "a").unwrap());
    }

    #[test]
    fn it_does_not_set_passwords_for_unknown_users() {
        let db = test_db();
        let result = set_password(db.connection(), "nobody", "a");
        assert!(matches!(result, Err(Error::UnknownUser(name)) if name == "nobody"));
    }

    #[test]
    fn it_adds_users() {
        let db = test_db();
        let conn = db.connection();
        assert!(find_user(conn, "a-new-user").unwrap().is_none());

        let user = add_user(conn, "a-new-user", "a-password").unwrap();
        assert_eq!(user.username(), "a-new-user");
        assert!(!user.is_demo());
        assert_eq!(find_user(conn, "a-new-user").unwrap(), Some(user.clone()));
        assert_eq!(get_user(conn, user.id()).unwrap(), Some(user));
        assert!(is_password_correct(conn, "a-new-user", "a-password").unwrap());
    }

    #[test]
    fn it_refuses_to_add_a_user_twice() {
        let db = test_db();
        let result = add_user(db.connection(), "test", "another-password");
        assert!(matches!(result, Err(Error::AlreadyRegistered(_))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "User test is already registered."
        );
    }

    #[test]
    fn it_refuses_blank_usernames() {
        let db = test_db();
        let result = add_user(db.connection(), "   ", "a-password");
        assert!(matches!(result, Err(Error::EmptyUsername)));
    }

    #[test]
    fn it_reserves_the_demo_username() {
        let db = test_db();
        let conn = db.connection();
        for username in [DEMO_USERNAME, " demo "] {
            let result = add_user(conn, username, "a-password");
            assert!(matches!(result, Err(Error::ReservedUsername(name)) if name == "demo"));
        }
        assert!(find_user(conn, DEMO_USERNAME).unwrap().is_none());
    }

    #[test]
    fn it_ignores_surrounding_whitespace_in_usernames() {
        let db = test_db();
        let conn = db.connection();
        let user = add_user(conn, " bob ", "a-password").unwrap();
        assert_eq!(user.username(), "bob");
        assert_eq!(find_user(conn, "bob  ").unwrap(), Some(user));

        set_password(conn, " bob", "another-password").unwrap();
        assert!(is_password_correct(conn, "bob ", "another-password").unwrap());
        assert!(!is_password_correct(conn, "bob", "a-password").unwrap());
    }

    #[test]
    fn it_never_stores_plaintext_passwords() {
        let db = test_db();
        let stored: String = db
            .connection()
            .query_row(
                "SELECT password FROM user WHERE username = 'test'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_ne!(stored, "test");
        assert!(stored.starts_with("sha256$"));
    }

    #[test]
    fn it_does_not_find_the_demo_user_in_the_database() {
        let db = test_db();
        assert!(get_user(db.connection(), DEMO_USER_ID).unwrap().is_none());
    }
}
