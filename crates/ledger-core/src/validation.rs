//! # Validation Module
//!
//! Input validation for ledger writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Caller (UI / embedding app)                               │
//! │  └── THIS MODULE: business rule validation, immediate feedback      │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Database (SQLite)                                         │
//! │  ├── NOT NULL constraints                                           │
//! │  └── Foreign key constraints                                        │
//! │                                                                     │
//! │  Defense in depth: different layers catch different errors          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;

/// Maximum length accepted for customer and product names.
pub const MAX_NAME_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer or product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product price. Zero is allowed (giveaways), negative is not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates an order line quantity. Must be strictly positive; fractions
/// are fine (goods sold by weight).
pub fn validate_quantity(quantity: Decimal) -> ValidationResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(ValidationError::NotPositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an order line discount, in integer minor units.
pub fn validate_discount(discount: i64) -> ValidationResult<()> {
    if discount < 0 {
        return Err(ValidationError::Negative {
            field: "discount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
