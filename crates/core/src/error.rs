//! Error types for the palletizer.

use crate::geometry::{CarrierId, ItemId};
use thiserror::Error;

/// Result type alias for palletizer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of input record a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordKind {
    /// An item record.
    Item,
    /// A carrier (pallet) record.
    Carrier,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item => write!(f, "item"),
            Self::Carrier => write!(f, "carrier"),
        }
    }
}

/// Errors that can occur while building or solving a loading problem.
///
/// Only [`Error::InfeasibleInput`] aborts a solve. Validation errors exclude a
/// single record, model errors exclude a single item and placement errors make
/// the search backtrack.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A malformed or physically impossible record.
    #[error("Invalid {kind} record {id}: {reason}")]
    Validation {
        /// Which record list the record came from.
        kind: RecordKind,
        /// The record's id.
        id: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// An item that can never be loaded on any carrier.
    #[error("Item {item} cannot be loaded: {reason}")]
    Model {
        /// The excluded item.
        item: ItemId,
        /// Why no carrier can take it.
        reason: String,
    },

    /// A carrier set that passes the capacity constraints but has no
    /// geometric arrangement.
    #[error("No placement on carrier {carrier} for item {item}: {reason}")]
    Placement {
        /// The carrier being packed.
        carrier: CarrierId,
        /// The first item the resolver could not place.
        item: ItemId,
        /// Details from the resolver.
        reason: String,
    },

    /// Nothing can be solved: no carriers, no items, or no loadable item.
    #[error("Infeasible input: {0}")]
    InfeasibleInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if this error only affects a single record or item.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Model { .. } | Self::Placement { .. }
        )
    }
}
