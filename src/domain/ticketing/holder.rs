//! Ticket holder value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Maximum characters accepted for a first or last name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum characters accepted for a contact address.
pub const MAX_CONTACT_LEN: usize = 254;

/// The person a ticket is issued to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Holder {
    pub first_name: String,
    pub last_name: String,
    pub contact_address: Option<String>,
}

impl Holder {
    /// Validates and normalizes holder fields supplied by a buyer.
    ///
    /// Names are trimmed; a blank contact address counts as absent.
    pub fn new(
        last_name: &str,
        first_name: &str,
        contact_address: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let last_name = validate_name("last_name", last_name)?;
        let first_name = validate_name("first_name", first_name)?;
        let contact_address = match contact_address.map(str::trim) {
            None | Some("") => None,
            Some(contact) => Some(validate_contact(contact)?),
        };

        Ok(Self {
            first_name,
            last_name,
            contact_address,
        })
    }

    /// Holder built from whatever names a notification carried.
    ///
    /// Processor-supplied data is not validated like buyer input, but control
    /// characters are stripped because the name enters the signed message.
    pub fn from_processor(first_name: Option<&str>, last_name: Option<&str>) -> Self {
        Self {
            first_name: sanitize(first_name.unwrap_or_default()),
            last_name: sanitize(last_name.unwrap_or_default()),
            contact_address: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.first_name.is_empty() && self.last_name.is_empty()
    }

    /// Name printed on the credential: "First Last".
    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

fn validate_name(field: &str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let len = value.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::too_long(field, MAX_NAME_LEN, len));
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::invalid_format(
            field,
            "contains control characters",
        ));
    }
    Ok(value.to_string())
}

fn validate_contact(value: &str) -> Result<String, ValidationError> {
    let len = value.chars().count();
    if len > MAX_CONTACT_LEN {
        return Err(ValidationError::too_long(
            "contact_address",
            MAX_CONTACT_LEN,
            len,
        ));
    }
    if !value.contains('@') || value.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(ValidationError::invalid_format(
            "contact_address",
            "expected an email address",
        ));
    }
    Ok(value.to_string())
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_NAME_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}
