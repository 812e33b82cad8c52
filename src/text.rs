//! Helpful utilities for working with text.

/// Hides most of a secret, leaving only enough to recognize it.
///
/// Secrets longer than eight characters keep their last four characters;
/// shorter secrets are hidden completely.
///
/// # Examples
///
/// ```
/// use aikeys::text::mask;
/// assert_eq!(mask("r8_abcdefghijklmnop"), "********mnop");
/// assert_eq!(mask("short"), "********");
/// assert_eq!(mask(""), "");
/// ```
pub fn mask(secret: &str) -> String {
    const HIDDEN: &str = "********";
    let len = secret.chars().count();
    if len == 0 {
        String::new()
    } else if len <= 8 {
        String::from(HIDDEN)
    } else {
        let tail: String = secret.chars().skip(len - 4).collect();
        format!("{HIDDEN}{tail}")
    }
}

/// Quotes `value` so that a POSIX shell reads it back verbatim.
///
/// # Examples
///
/// ```
/// use aikeys::text::shell_quote;
/// assert_eq!(shell_quote("plain"), "'plain'");
/// assert_eq!(shell_quote("it's"), r#"'it'\''s'"#);
/// ```
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'\''"#))
}
