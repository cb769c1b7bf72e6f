//! Condition-side error kinds.
//!
//! Same all-or-nothing discipline as the escrow side: on any error no
//! partial mutation is visible. Agreement lookups cross into
//! `tenancy-escrow`; its errors convert losslessly where the kinds line up.

use thiserror::Error;

use tenancy_core::PartyId;
use tenancy_escrow::EscrowError;

/// Errors arising from condition-registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// A referenced entity is absent.
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// An identifier collision on creation.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        entity: &'static str,
        id: String,
    },

    /// The caller lacks the required role for the entity.
    #[error("caller {caller} is not authorized: {required}")]
    Unauthorized {
        caller: PartyId,
        required: &'static str,
    },

    /// The operation is invalid for the entity's current status.
    #[error("invalid state for {operation}: {reason}")]
    InvalidState {
        operation: &'static str,
        reason: String,
    },

    /// A numeric constraint was violated.
    #[error("invalid amount for {field}: {amount}")]
    InvalidAmount {
        field: &'static str,
        amount: u64,
    },
}

impl From<EscrowError> for ConditionError {
    fn from(err: EscrowError) -> Self {
        match err {
            EscrowError::NotFound { entity, id } => Self::NotFound { entity, id },
            EscrowError::AlreadyExists { entity, id } => Self::AlreadyExists { entity, id },
            EscrowError::Unauthorized { caller, required } => {
                Self::Unauthorized { caller, required }
            }
            EscrowError::InvalidState { operation, reason } => {
                Self::InvalidState { operation, reason }
            }
            EscrowError::InvalidAmount { field, amount } => Self::InvalidAmount { field, amount },
            EscrowError::InvalidRange { reason } => Self::InvalidState {
                operation: "escrow range check",
                reason,
            },
            EscrowError::AlreadyClaimed(id) => Self::InvalidState {
                operation: "escrow claim",
                reason: format!("deposit for agreement {id} already claimed"),
            },
        }
    }
}
