//! Customer contact details captured by the checkout form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating customer details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerError {
    /// The customer name is empty.
    #[error("el nombre es obligatorio")]
    EmptyName,
    /// The phone number is empty.
    #[error("el teléfono es obligatorio")]
    EmptyPhone,
    /// The email address is empty.
    #[error("el correo es obligatorio")]
    EmptyEmail,
    /// The email address is too long.
    #[error("el correo debe tener como máximo {max} caracteres")]
    EmailTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The email address has no @ symbol, or an empty side around it.
    #[error("el correo no es válido")]
    MalformedEmail,
}

/// An email address.
///
/// Provides basic structural validation: a non-empty local part and domain
/// separated by an `@` symbol, within the RFC 5321 length limit.
///
/// ## Examples
///
/// ```
/// use mercadito_core::Email;
///
/// assert!(Email::parse("ana@example.com").is_ok());
/// assert!(Email::parse("sin-arroba").is_err());
/// assert!(Email::parse("@dominio.com").is_err());
/// assert!(Email::parse("ana@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// has no `@` symbol, or has an empty local part or domain.
    pub fn parse(s: &str) -> Result<Self, CustomerError> {
        if s.is_empty() {
            return Err(CustomerError::EmptyEmail);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(CustomerError::EmailTooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(CustomerError::MalformedEmail)?;

        if at_pos == 0 || at_pos == s.len() - 1 {
            return Err(CustomerError::MalformedEmail);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated customer details for an order.
///
/// The checkout form captures name, email and phone; all three end up on
/// the remote order record verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    /// Customer's full name, trimmed.
    pub name: String,
    /// Customer's email address.
    pub email: Email,
    /// Customer's phone number, trimmed. Free-form: no format is enforced.
    pub phone: String,
}

impl Customer {
    /// Validate raw form fields into a `Customer`.
    ///
    /// Name and phone are trimmed and must be non-empty; the email must be
    /// structurally valid.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure encountered.
    pub fn parse(name: &str, email: &str, phone: &str) -> Result<Self, CustomerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CustomerError::EmptyName);
        }

        let email = Email::parse(email.trim())?;

        let phone = phone.trim();
        if phone.is_empty() {
            return Err(CustomerError::EmptyPhone);
        }

        Ok(Self {
            name: name.to_owned(),
            email,
            phone: phone.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_plus_tags() {
        assert!(Email::parse("ana.gomez+promo@tienda.mx").is_ok());
    }

    #[test]
    fn test_email_rejects_structurally_invalid() {
        assert_eq!(Email::parse("").unwrap_err(), CustomerError::EmptyEmail);
        assert_eq!(
            Email::parse("sin-arroba").unwrap_err(),
            CustomerError::MalformedEmail
        );
        assert_eq!(
            Email::parse("@tienda.mx").unwrap_err(),
            CustomerError::MalformedEmail
        );
        assert_eq!(
            Email::parse("ana@").unwrap_err(),
            CustomerError::MalformedEmail
        );
    }

    #[test]
    fn test_email_rejects_overlong() {
        let long = format!("{}@x.mx", "a".repeat(Email::MAX_LENGTH));
        assert!(matches!(
            Email::parse(&long).unwrap_err(),
            CustomerError::EmailTooLong { .. }
        ));
    }

    #[test]
    fn test_customer_trims_fields() {
        let customer = Customer::parse("  Ana Gómez ", "ana@tienda.mx", " 555-0134 ").unwrap();
        assert_eq!(customer.name, "Ana Gómez");
        assert_eq!(customer.phone, "555-0134");
    }

    #[test]
    fn test_customer_requires_all_fields() {
        assert_eq!(
            Customer::parse("  ", "ana@tienda.mx", "555").unwrap_err(),
            CustomerError::EmptyName
        );
        assert_eq!(
            Customer::parse("Ana", "ana@tienda.mx", " ").unwrap_err(),
            CustomerError::EmptyPhone
        );
        assert_eq!(
            Customer::parse("Ana", "", "555").unwrap_err(),
            CustomerError::EmptyEmail
        );
    }
}
