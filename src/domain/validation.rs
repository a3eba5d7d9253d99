//! Payload rules shared by the HTTP schemas and startup configuration.

use crate::domain::favorite::FavoriteMovie;
use crate::domain::user::{Credentials, NewUser, UserId, UserUpdate};

pub const NAME_MIN_LEN: usize = 3;
pub const PASSWORD_MIN_LEN: usize = 8;

pub trait Validate {
    /// Returns a message naming the first field that breaks a rule.
    fn validate(&self) -> Result<(), String>;
}

pub fn min_len(field: &str, value: &str, min: usize) -> Result<(), String> {
    if value.chars().count() < min {
        return Err(format!("\"{}\" length must be at least {} characters long", field, min));
    }
    Ok(())
}

/// Address check without a TLD allow-list: `local@label.label[...]`.
pub fn email(field: &str, value: &str) -> Result<(), String> {
    let invalid = || Err(format!("\"{}\" must be a valid email", field));

    let Some((local, domain)) = value.split_once('@') else {
        return invalid();
    };
    if local.is_empty() || domain.contains('@') || local.chars().any(char::is_whitespace) {
        return invalid();
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let label_ok = |label: &&str| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    };
    if labels.len() < 2 || !labels.iter().all(label_ok) {
        return invalid();
    }
    Ok(())
}

fn optional<F>(value: Option<&String>, rule: F) -> Result<(), String>
where
    F: FnOnce(&str) -> Result<(), String>,
{
    value.map_or(Ok(()), |v| rule(v.as_str()))
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), String> {
        optional(self.mail.as_ref(), |v| email("mail", v))?;
        optional(self.password.as_ref(), |v| min_len("password", v, PASSWORD_MIN_LEN))
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), String> {
        min_len("firstName", &self.first_name, NAME_MIN_LEN)?;
        min_len("lastName", &self.last_name, NAME_MIN_LEN)?;
        min_len("userName", &self.user_name, NAME_MIN_LEN)?;
        min_len("password", &self.password, PASSWORD_MIN_LEN)?;
        optional(self.mail.as_ref(), |v| email("mail", v))
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), String> {
        optional(self.first_name.as_ref(), |v| min_len("firstName", v, NAME_MIN_LEN))?;
        optional(self.last_name.as_ref(), |v| min_len("lastName", v, NAME_MIN_LEN))?;
        optional(self.user_name.as_ref(), |v| min_len("userName", v, NAME_MIN_LEN))?;
        optional(self.password.as_ref(), |v| min_len("password", v, PASSWORD_MIN_LEN))?;
        optional(self.mail.as_ref(), |v| email("mail", v))
    }
}

// Type-only schemas: serde already enforces the required integer fields.
impl Validate for UserId {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Validate for FavoriteMovie {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
