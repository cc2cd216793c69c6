//! Molar mass use-case service.
//!
//! # Responsibility
//! - Gate accumulator mutations behind quantity and symbol checks.
//! - Reduce an accumulator to a total mass and per-entry breakdown.
//! - Persist and reload saved compounds.
//!
//! # Invariants
//! - A rejected add/remove leaves the accumulator unchanged.
//! - `compute` sums contributions in entry order with no rounding.
//! - An entry whose symbol no longer resolves fails the whole computation.

use crate::model::accumulator::{parse_composition, Accumulator, AccumulatorEntry, CompositionError};
use crate::model::compound::NewSavedCompound;
use crate::model::element::{validate_symbol, ElementValidationError};
use crate::repo::compound_repo::CompoundRepository;
use crate::repo::element_repo::{ElementRepository, RepoError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CalcResult<T> = Result<T, CalcError>;

/// Service error for accumulator use-cases.
#[derive(Debug)]
pub enum CalcError {
    /// Compute or save on an empty accumulator.
    EmptyInput,
    InvalidQuantity(f64),
    InvalidSymbol(ElementValidationError),
    /// Symbol not present in the store at add time.
    UnknownElement(String),
    /// Symbol vanished from the store after the entry was added.
    UnresolvedElement { index: usize, symbol: String },
    IndexOutOfRange { index: usize, len: usize },
    MissingName,
    InvalidComposition(CompositionError),
    Repo(RepoError),
}

impl Display for CalcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "element list is empty"),
            Self::InvalidQuantity(quantity) => {
                write!(f, "quantity must be a positive number, got {quantity}")
            }
            Self::InvalidSymbol(err) => write!(f, "{err}"),
            Self::UnknownElement(symbol) => {
                write!(f, "element `{symbol}` is not in the database")
            }
            Self::UnresolvedElement { index, symbol } => write!(
                f,
                "entry {index} refers to element `{symbol}` which is no longer in the database"
            ),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "entry index {index} is out of range for {len} entries")
            }
            Self::MissingName => write!(f, "compound name cannot be empty"),
            Self::InvalidComposition(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CalcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSymbol(err) => Some(err),
            Self::InvalidComposition(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CalcError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CompositionError> for CalcError {
    fn from(value: CompositionError) -> Self {
        Self::InvalidComposition(value)
    }
}

/// Mass contributed by one accumulator entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub symbol: String,
    pub quantity: f64,
    /// `atomic_mass * quantity`.
    pub contribution: f64,
    pub atomic_mass: f64,
    /// Element name as stored.
    pub name: String,
}

/// Result of reducing an accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassComputation {
    pub total_mass: f64,
    /// One item per entry, in entry order.
    pub breakdown: Vec<Contribution>,
}

/// Calculator facade over element and compound repositories.
pub struct CalculatorService<E: ElementRepository, C: CompoundRepository> {
    elements: E,
    compounds: C,
}

impl<E: ElementRepository, C: CompoundRepository> CalculatorService<E, C> {
    pub fn new(elements: E, compounds: C) -> Self {
        Self {
            elements,
            compounds,
        }
    }

    /// Appends `(symbol, quantity)` after checking both against the store.
    ///
    /// # Errors
    /// - `InvalidQuantity` when `quantity` is not finite or `<= 0`.
    /// - `InvalidSymbol` / `UnknownElement` when the symbol cannot resolve.
    pub fn add_entry(
        &self,
        accumulator: &mut Accumulator,
        symbol: &str,
        quantity: f64,
    ) -> CalcResult<()> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CalcError::InvalidQuantity(quantity));
        }
        let symbol = symbol.trim();
        validate_symbol(symbol).map_err(CalcError::InvalidSymbol)?;
        if self.elements.get_element(symbol)?.is_none() {
            return Err(CalcError::UnknownElement(symbol.to_string()));
        }

        accumulator.push(AccumulatorEntry::new(symbol, quantity));
        Ok(())
    }

    /// Removes the entry at `index`, keeping the order of the rest.
    pub fn remove_entry(
        &self,
        accumulator: &mut Accumulator,
        index: usize,
    ) -> CalcResult<AccumulatorEntry> {
        let len = accumulator.len();
        accumulator
            .remove(index)
            .ok_or(CalcError::IndexOutOfRange { index, len })
    }

    /// Resolves every entry and sums `atomic_mass * quantity`.
    pub fn compute(&self, accumulator: &Accumulator) -> CalcResult<MassComputation> {
        if accumulator.is_empty() {
            return Err(CalcError::EmptyInput);
        }

        let mut total_mass = 0.0;
        let mut breakdown = Vec::with_capacity(accumulator.len());
        for (index, entry) in accumulator.entries().iter().enumerate() {
            let element = self.elements.get_element(&entry.symbol)?.ok_or_else(|| {
                CalcError::UnresolvedElement {
                    index,
                    symbol: entry.symbol.clone(),
                }
            })?;
            let contribution = element.atomic_mass * entry.quantity;
            total_mass += contribution;
            breakdown.push(Contribution {
                symbol: entry.symbol.clone(),
                quantity: entry.quantity,
                contribution,
                atomic_mass: element.atomic_mass,
                name: element.name,
            });
        }

        Ok(MassComputation {
            total_mass,
            breakdown,
        })
    }

    /// Computes and stores the accumulator as a saved compound.
    ///
    /// Returns the new row id together with the stored computation.
    pub fn save(
        &self,
        accumulator: &Accumulator,
        name: &str,
    ) -> CalcResult<(i64, MassComputation)> {
        if accumulator.is_empty() {
            return Err(CalcError::EmptyInput);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(CalcError::MissingName);
        }

        let computation = self.compute(accumulator)?;
        let id = self.compounds.create_saved_compound(&NewSavedCompound {
            name: name.to_string(),
            formula: accumulator.render_formula(),
            molar_mass: computation.total_mass,
            composition: accumulator.render_composition(),
        })?;
        Ok((id, computation))
    }

    /// Replaces the accumulator with the composition of a saved compound.
    ///
    /// Entries are checked against the store before anything is replaced.
    pub fn load_saved(&self, accumulator: &mut Accumulator, id: i64) -> CalcResult<()> {
        let saved = self
            .compounds
            .get_saved_compound(id)?
            .ok_or_else(|| {
                CalcError::Repo(RepoError::NotFound {
                    entity: "saved compound",
                    key: id.to_string(),
                })
            })?;

        let entries = parse_composition(&saved.composition)?;
        if entries.is_empty() {
            return Err(CalcError::EmptyInput);
        }
        for entry in &entries {
            if self.elements.get_element(&entry.symbol)?.is_none() {
                return Err(CalcError::UnknownElement(entry.symbol.clone()));
            }
        }

        accumulator.replace(entries, Some(saved.name));
        Ok(())
    }
}
