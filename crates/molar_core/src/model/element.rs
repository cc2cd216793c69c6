//! Element domain model.
//!
//! # Responsibility
//! - Define the canonical element record stored in `elements`.
//! - Validate element invariants before persistence and after read-back.
//!
//! # Invariants
//! - `symbol` is 1..=3 characters with no surrounding whitespace.
//! - `name` is non-blank.
//! - `atomic_mass` is finite and strictly positive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Longest symbol accepted by the store.
pub const MAX_SYMBOL_CHARS: usize = 3;

/// Chemical element row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique key, matched case-sensitively.
    pub symbol: String,
    pub name: String,
    /// Grams per mole.
    pub atomic_mass: f64,
    /// `0` marks rows created by CSV import, which carries no number column.
    pub atomic_number: u32,
    pub category: Option<String>,
    /// Negative values denote years BCE.
    pub discovered_year: Option<i32>,
}

/// Invariant violations for [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValidationError {
    EmptySymbol,
    SymbolTooLong(String),
    SymbolHasWhitespace(String),
    EmptyName,
    NonPositiveMass(f64),
    MissingAtomicNumber,
}

impl Display for ElementValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySymbol => write!(f, "element symbol cannot be empty"),
            Self::SymbolTooLong(symbol) => write!(
                f,
                "element symbol `{symbol}` is longer than {MAX_SYMBOL_CHARS} characters"
            ),
            Self::SymbolHasWhitespace(symbol) => {
                write!(f, "element symbol `{symbol}` contains whitespace")
            }
            Self::EmptyName => write!(f, "element name cannot be empty"),
            Self::NonPositiveMass(mass) => {
                write!(f, "atomic mass must be a positive number, got {mass}")
            }
            Self::MissingAtomicNumber => write!(f, "atomic number must be at least 1"),
        }
    }
}

impl Error for ElementValidationError {}

impl Element {
    /// Creates an element without category or discovery year.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        atomic_mass: f64,
        atomic_number: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            atomic_mass,
            atomic_number,
            category: None,
            discovered_year: None,
        }
    }

    /// Sets the category, treating a blank string as absent.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            None
        } else {
            Some(category)
        };
        self
    }

    pub fn with_discovered_year(mut self, year: i32) -> Self {
        self.discovered_year = Some(year);
        self
    }

    /// Checks the invariants every stored row must satisfy.
    ///
    /// `atomic_number == 0` passes here because imported rows carry it.
    pub fn validate(&self) -> Result<(), ElementValidationError> {
        validate_symbol(&self.symbol)?;
        if self.name.trim().is_empty() {
            return Err(ElementValidationError::EmptyName);
        }
        if !self.atomic_mass.is_finite() || self.atomic_mass <= 0.0 {
            return Err(ElementValidationError::NonPositiveMass(self.atomic_mass));
        }
        Ok(())
    }

    /// Stricter check for elements entered by hand, which must carry a
    /// real atomic number.
    pub fn validate_for_entry(&self) -> Result<(), ElementValidationError> {
        self.validate()?;
        if self.atomic_number == 0 {
            return Err(ElementValidationError::MissingAtomicNumber);
        }
        Ok(())
    }
}

/// Validates a bare symbol as used for lookups and accumulator entries.
pub fn validate_symbol(symbol: &str) -> Result<(), ElementValidationError> {
    if symbol.is_empty() {
        return Err(ElementValidationError::EmptySymbol);
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(ElementValidationError::SymbolHasWhitespace(
            symbol.to_string(),
        ));
    }
    if symbol.chars().count() > MAX_SYMBOL_CHARS {
        return Err(ElementValidationError::SymbolTooLong(symbol.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_symbol, Element, ElementValidationError};

    fn carbon() -> Element {
        Element::new("C", "Углерод", 12.011, 6)
            .with_category("Неметалл")
            .with_discovered_year(-2000)
    }

    #[test]
    fn seeded_shape_is_valid() {
        let element = carbon();
        assert!(element.validate().is_ok());
        assert!(element.validate_for_entry().is_ok());
        assert_eq!(element.discovered_year, Some(-2000));
    }

    #[test]
    fn blank_category_is_stored_as_none() {
        let element = Element::new("Xx", "Test", 1.0, 1).with_category("  ");
        assert_eq!(element.category, None);
    }

    #[test]
    fn rejects_non_positive_and_non_finite_mass() {
        for mass in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let element = Element::new("C", "Углерод", mass, 6);
            assert!(matches!(
                element.validate(),
                Err(ElementValidationError::NonPositiveMass(_))
            ));
        }
    }

    #[test]
    fn symbol_rules() {
        assert_eq!(validate_symbol(""), Err(ElementValidationError::EmptySymbol));
        assert!(matches!(
            validate_symbol("Abcd"),
            Err(ElementValidationError::SymbolTooLong(_))
        ));
        assert!(matches!(
            validate_symbol("H e"),
            Err(ElementValidationError::SymbolHasWhitespace(_))
        ));
        // Multi-byte symbols count characters, not bytes.
        assert!(validate_symbol("Жжж").is_ok());
    }

    #[test]
    fn imported_rows_may_lack_atomic_number_but_entered_rows_may_not() {
        let element = Element::new("Uue", "Ununennium", 315.0, 0);
        assert!(element.validate().is_ok());
        assert_eq!(
            element.validate_for_entry(),
            Err(ElementValidationError::MissingAtomicNumber)
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        let element = Element::new("C", " ", 12.011, 6);
        assert_eq!(element.validate(), Err(ElementValidationError::EmptyName));
    }
}
