//! Escrow error kinds.
//!
//! Every escrow operation is all-or-nothing: on any of these errors no
//! partial mutation is visible and no transaction is appended. Errors are
//! values returned to the caller; presentation is the caller's job.

use thiserror::Error;

use tenancy_core::{AgreementId, PartyId};

/// Errors arising from escrow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
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

    /// A date constraint was violated.
    #[error("invalid range: {reason}")]
    InvalidRange { reason: String },

    /// The deposit has already been withdrawn.
    #[error("deposit for agreement {0} has already been claimed")]
    AlreadyClaimed(AgreementId),
}
