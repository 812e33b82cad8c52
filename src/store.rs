//! Per-user settings, grouped into domains.

use log::debug;
use rusqlite::{Connection, params};
use std::collections::BTreeMap;

/// Domain holding external provider credentials.
pub const EXTERNAL_PROVIDERS: &str = "external-providers";

/// Stores `value` under `domain` and `name`, replacing any existing value.
pub fn set_setting(
    conn: &Connection,
    user_id: i64,
    domain: &str,
    name: &str,
    value: &str,
) -> rusqlite::Result<()> {
    debug!("Storing {domain}/{name} for user {user_id}");
    conn.execute(
        "INSERT OR REPLACE INTO settings (user_id, domain, name, value)
         VALUES (?1, ?2, ?3, ?4)",
        params![user_id, domain, name, value],
    )?;
    Ok(())
}

/// Removes the setting stored under `domain` and `name`, if there is one.
pub fn delete_setting(
    conn: &Connection,
    user_id: i64,
    domain: &str,
    name: &str,
) -> rusqlite::Result<()> {
    debug!("Deleting {domain}/{name} for user {user_id}");
    conn.execute(
        "DELETE FROM settings WHERE user_id = ?1 AND domain = ?2 AND name = ?3",
        params![user_id, domain, name],
    )?;
    Ok(())
}

/// Every setting stored for the user `user_id`.
pub fn get_settings(conn: &Connection, user_id: i64) -> rusqlite::Result<Settings> {
    let mut stmt = conn.prepare("SELECT domain, name, value FROM settings WHERE user_id = ?1")?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut settings = Settings::default();
    for row in rows {
        let (domain, name, value) = row?;
        settings.insert(domain, name, value);
    }
    Ok(settings)
}

/// A user's settings, keyed by domain and then by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    domains: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
    /// Adds a setting, replacing any previous value.
    pub fn insert(
        &mut self,
        domain: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.domains
            .entry(domain.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// All settings in `domain`.
    pub fn domain(&self, domain: &str) -> Option<&BTreeMap<String, String>> {
        self.domains.get(domain)
    }

    /// A single setting, if present.
    ///
    /// # Examples
    ///
    /// ```
    /// use aikeys::store::Settings;
    /// let mut settings = Settings::default();
    /// settings.insert("external-providers", "REPLICATE_API_TOKEN", "r8_secret");
    /// assert_eq!(
    ///     settings.get("external-providers", "REPLICATE_API_TOKEN"),
    ///     Some("r8_secret"),
    /// );
    /// assert_eq!(settings.get("external-providers", "OPENAI_API_KEY"), None);
    /// ```
    pub fn get(&self, domain: &str, name: &str) -> Option<&str> {
        self.domain(domain)
            .and_then(|settings| settings.get(name))
            .map(String::as_str)
    }

    /// The stored external provider credential `envvar`, if present.
    pub fn external_provider(&self, envvar: &str) -> Option<&str> {
        self.get(EXTERNAL_PROVIDERS, envvar)
    }

    /// All stored external provider credentials.
    pub fn external_providers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.domain(EXTERNAL_PROVIDERS)
            .into_iter()
            .flatten()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// True if no settings are stored at all.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
