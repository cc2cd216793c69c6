//! Transient compound accumulator.
//!
//! # Responsibility
//! - Hold the ordered `(symbol, quantity)` entries of one compound under
//!   construction, plus its optional display name.
//! - Render the cosmetic formula and the persisted composition string.
//!
//! # Invariants
//! - Entries are never merged; repeated symbols stay independent.
//! - Only `CalculatorService` appends entries, after checking the quantity
//!   and resolving the symbol, so a failed add leaves the list untouched.
//! - `clear` drops both the entries and the display name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FORMULA_SEPARATOR: &str = " + ";
const COMPOSITION_SEPARATOR: char = ';';

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:;\s]+)\s*:\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*$")
        .expect("valid composition entry regex")
});

/// One `(symbol, quantity)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorEntry {
    pub symbol: String,
    /// Stoichiometric coefficient; fractional values are allowed.
    pub quantity: f64,
}

impl AccumulatorEntry {
    pub fn new(symbol: impl Into<String>, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
        }
    }
}

/// Malformed `symbol:quantity` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionError {
    pub fragment: String,
}

impl Display for CompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid composition entry `{}`; expected SYMBOL:QUANTITY with a positive quantity",
            self.fragment
        )
    }
}

impl Error for CompositionError {}

/// Ordered entries for one compound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accumulator {
    entries: Vec<AccumulatorEntry>,
    name: Option<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AccumulatorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the display name; blank input clears it.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        let trimmed = name.trim();
        self.name = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub(crate) fn push(&mut self, entry: AccumulatorEntry) {
        self.entries.push(entry);
    }

    /// Removes and returns the entry at `index`, or `None` when out of bounds.
    pub(crate) fn remove(&mut self, index: usize) -> Option<AccumulatorEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub(crate) fn replace(&mut self, entries: Vec<AccumulatorEntry>, name: Option<String>) {
        self.entries = entries;
        self.name = name;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.name = None;
    }

    /// Display formula such as `H₍2.0₎ + O`; empty for an empty accumulator.
    pub fn render_formula(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                if entry.quantity == 1.0 {
                    entry.symbol.clone()
                } else {
                    format!("{}₍{}₎", entry.symbol, format_quantity(entry.quantity))
                }
            })
            .collect::<Vec<_>>()
            .join(FORMULA_SEPARATOR)
    }

    /// Persisted composition such as `H:2.0;O:1.0`.
    pub fn render_composition(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}:{}", entry.symbol, format_quantity(entry.quantity)))
            .collect::<Vec<_>>()
            .join(&COMPOSITION_SEPARATOR.to_string())
    }
}

/// Formats a quantity in shortest round-trip form, keeping one fractional
/// digit for whole numbers (`2.0`, `0.25`).
pub fn format_quantity(quantity: f64) -> String {
    if quantity.is_finite() && quantity.fract() == 0.0 && quantity.abs() < 1e16 {
        format!("{quantity:.1}")
    } else {
        format!("{quantity}")
    }
}

/// Parses one `SYMBOL:QUANTITY` fragment.
///
/// Only the shape and sign are checked here; symbol resolution happens
/// against the store when the entry is added.
pub fn parse_entry(fragment: &str) -> Result<AccumulatorEntry, CompositionError> {
    let invalid = || CompositionError {
        fragment: fragment.to_string(),
    };
    let captures = ENTRY_RE.captures(fragment).ok_or_else(invalid)?;
    let quantity = captures[2].parse::<f64>().map_err(|_| invalid())?;
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(invalid());
    }
    Ok(AccumulatorEntry::new(&captures[1], quantity))
}

/// Parses a stored composition string back into ordered entries.
///
/// Empty fragments (e.g. a trailing `;`) are ignored.
pub fn parse_composition(composition: &str) -> Result<Vec<AccumulatorEntry>, CompositionError> {
    composition
        .split(COMPOSITION_SEPARATOR)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(parse_entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{format_quantity, parse_composition, parse_entry, Accumulator, AccumulatorEntry};

    fn water() -> Accumulator {
        let mut acc = Accumulator::new();
        acc.push(AccumulatorEntry::new("H", 2.0));
        acc.push(AccumulatorEntry::new("O", 1.0));
        acc
    }

    #[test]
    fn formula_omits_unit_quantities() {
        assert_eq!(water().render_formula(), "H₍2.0₎ + O");
        assert_eq!(Accumulator::new().render_formula(), "");
    }

    #[test]
    fn composition_keeps_every_quantity() {
        assert_eq!(water().render_composition(), "H:2.0;O:1.0");
    }

    #[test]
    fn quantity_format_matches_stored_data() {
        assert_eq!(format_quantity(2.0), "2.0");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(1.25), "1.25");
    }

    #[test]
    fn composition_parses_back_in_order() {
        let acc = water();
        let parsed = parse_composition(&acc.render_composition()).unwrap();
        assert_eq!(parsed, acc.entries());

        let parsed = parse_composition("C:6;H:12; O : 6 ;").unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2], AccumulatorEntry::new("O", 6.0));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        for bad in ["H", "H:", ":2", "H:abc", "H:-1", "H:0", "H 2:1"] {
            let err = parse_entry(bad).unwrap_err();
            assert_eq!(err.fragment, bad);
        }
        assert!(parse_composition("H:2;O").is_err());
    }

    #[test]
    fn remove_is_positional_and_bounds_checked() {
        let mut acc = water();
        acc.push(AccumulatorEntry::new("H", 1.0));
        assert!(acc.remove(3).is_none());
        assert_eq!(acc.len(), 3);

        let removed = acc.remove(1).unwrap();
        assert_eq!(removed.symbol, "O");
        let symbols: Vec<_> = acc.entries().iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, ["H", "H"]);
    }

    #[test]
    fn clear_resets_name_and_entries() {
        let mut acc = water();
        acc.set_name("  Вода ");
        assert_eq!(acc.name(), Some("Вода"));
        acc.clear();
        assert!(acc.is_empty());
        assert_eq!(acc.name(), None);
    }
}
