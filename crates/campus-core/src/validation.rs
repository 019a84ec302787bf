//! # Validation Module
//!
//! Field validation rules shared by managers (before a write) and the line
//! codec (while reading).
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Manager operation (add/update)                                │
//! │  ├── THIS MODULE: field format checks, typed errors to the caller       │
//! │  └── Cross-record checks (uniqueness, referenced category exists)       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Line codec on read                                            │
//! │  └── THIS MODULE again: a line whose fields fail these rules is         │
//! │      treated as corrupt and silently skipped                            │
//! │                                                                         │
//! │  The same rules guard both directions, so every line the store writes   │
//! │  is a line the store will read back.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};

// =============================================================================
// Code Validators
// =============================================================================

/// Validates a category code: exactly three uppercase ASCII letters.
///
/// ## Example
/// ```rust
/// use campus_core::validation::validate_category_code;
///
/// assert!(validate_category_code("CLT").is_ok());
/// assert!(validate_category_code("CL").is_err());
/// assert!(validate_category_code("clt").is_err());
/// ```
pub fn validate_category_code(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "category code",
            reason: "must be exactly three uppercase letters",
        });
    }
    Ok(())
}

/// Validates a discount code: uppercase ASCII letters and underscores.
pub fn validate_discount_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "discount code",
        });
    }
    if !code.bytes().all(|b| b.is_ascii_uppercase() || b == b'_') {
        return Err(ValidationError::InvalidFormat {
            field: "discount code",
            reason: "must contain only uppercase letters and underscores",
        });
    }
    Ok(())
}

/// Validates a member identifier: non-empty ASCII alphanumeric.
pub fn validate_member_id(id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required { field: "member id" });
    }
    if !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "member id",
            reason: "must contain only letters and digits",
        });
    }
    Ok(())
}

/// Validates a bar code: non-empty ASCII alphanumeric, unquoted on disk.
pub fn validate_bar_code(bar_code: &str) -> ValidationResult<()> {
    if bar_code.is_empty() {
        return Err(ValidationError::Required { field: "bar code" });
    }
    if !bar_code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "bar code",
            reason: "must contain only letters and digits",
        });
    }
    Ok(())
}

// =============================================================================
// Free-Text Validators
// =============================================================================

/// Validates a display name: letters, digits and spaces.
///
/// Names never need quoting because the separator character is excluded.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "name",
            reason: "must contain only letters, digits and spaces",
        });
    }
    Ok(())
}

/// Validates a description: non-empty free text, stored quoted.
///
/// Commas are allowed (the quoting exists for them); double quotes and line
/// breaks would break the line format and are rejected.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description",
        });
    }
    if description.contains('"') || description.contains('\n') || description.contains('\r') {
        return Err(ValidationError::InvalidFormat {
            field: "description",
            reason: "must not contain double quotes or line breaks",
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
