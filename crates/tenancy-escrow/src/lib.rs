//! # tenancy-escrow — Deposit Custody
//!
//! The escrow side of the Tenancy Stack:
//!
//! - **Error** ([`error`]): structured error kinds shared by every escrow
//!   operation.
//!
//! - **Agreement** ([`agreement`]): the rental agreement registry. Terms
//!   are immutable after creation; only the lifecycle status moves.
//!
//! - **Deposit** ([`deposit`]): the custody record for security-deposit
//!   funds, one per agreement, with its embedded dual-signer
//!   [`ReleaseApproval`](deposit::ReleaseApproval).
//!
//! - **Transaction** ([`transaction`]): the append-only audit log of
//!   money-moving events. Entries are written only by the ledger as a side
//!   effect of successful transitions.
//!
//! - **Ledger** ([`ledger`]): the deposit state machine
//!   (`unpaid → held → released → claimed`) and the [`ReleaseHold`] seam
//!   through which outstanding damage claims block withdrawal.
//!
//! Custody is state, not money: every transition assumes the external value
//! ledger moves the actual funds atomically with the recorded state change.

pub mod agreement;
pub mod deposit;
pub mod error;
pub mod ledger;
pub mod transaction;

pub use agreement::{Agreement, AgreementRegistry, AgreementStatus, PartyRole};
pub use deposit::{Deposit, DepositStatus, ReleaseApproval};
pub use error::EscrowError;
pub use ledger::{DepositLedger, NoHolds, ReleaseHold};
pub use transaction::{Transaction, TransactionLog, TransactionType};
