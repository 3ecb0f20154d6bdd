//! Credential Validation
//! Mission: Reject bad registration input before it reaches storage

use lazy_static::lazy_static;
use regex::Regex;

pub const NAME_MIN_CHARS: usize = 20;
pub const NAME_MAX_CHARS: usize = 60;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 16;
pub const ADDRESS_MAX_CHARS: usize = 400;
pub const STORE_NAME_MAX_CHARS: usize = 60;

/// Characters that satisfy the password special-character clause
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Password policy violation, one per independent clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    Length,
    MissingUppercase,
    MissingSpecial,
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Length => write!(
                f,
                "Password must be {PASSWORD_MIN_CHARS}-{PASSWORD_MAX_CHARS} characters"
            ),
            PasswordError::MissingUppercase => {
                write!(f, "Password must contain at least one uppercase letter")
            }
            PasswordError::MissingSpecial => {
                write!(f, "Password must contain at least one special character")
            }
        }
    }
}

/// Field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NameLength,
    InvalidEmail,
    Password(PasswordError),
    AddressTooLong,
    StoreNameLength,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NameLength => write!(
                f,
                "Name must be between {NAME_MIN_CHARS}-{NAME_MAX_CHARS} characters"
            ),
            ValidationError::InvalidEmail => write!(f, "Invalid email format"),
            ValidationError::Password(e) => e.fmt(f),
            ValidationError::AddressTooLong => write!(
                f,
                "Address must be at most {ADDRESS_MAX_CHARS} characters"
            ),
            ValidationError::StoreNameLength => write!(
                f,
                "Store name must be between 1-{STORE_NAME_MAX_CHARS} characters"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<PasswordError> for ValidationError {
    fn from(e: PasswordError) -> Self {
        ValidationError::Password(e)
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::NameLength)
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Check the three password clauses; the first failing clause is reported.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        return Err(PasswordError::Length);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(PasswordError::MissingSpecial);
    }
    Ok(())
}

pub fn validate_address(address: Option<&str>) -> Result<(), ValidationError> {
    match address {
        Some(a) if a.chars().count() > ADDRESS_MAX_CHARS => Err(ValidationError::AddressTooLong),
        _ => Ok(()),
    }
}

pub fn validate_store_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len == 0 || name.chars().count() > STORE_NAME_MAX_CHARS {
        Err(ValidationError::StoreNameLength)
    } else {
        Ok(())
    }
}

/// Full registration check in field order: name, email, password, address
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    address: Option<&str>,
) -> Result<(), ValidationError> {
    validate_name(name)?;
    validate_email(email)?;
    validate_password(password)?;
    validate_address(address)?;
    Ok(())
}
