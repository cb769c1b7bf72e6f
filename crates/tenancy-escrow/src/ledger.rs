//! # Deposit Ledger
//!
//! The custody state machine for security deposits. One [`Deposit`] per
//! agreement, created on first payment and advanced by exactly three
//! operations:
//!
//! - [`pay_deposit`](DepositLedger::pay_deposit) — tenant moves funds into
//!   custody.
//! - [`approve_release`](DepositLedger::approve_release) — the dual-signer
//!   gate. Release happens on the second *distinct* approval; one party
//!   approving twice never suffices.
//! - [`claim_deposit`](DepositLedger::claim_deposit) — final withdrawal of
//!   already-released funds. Distinct from a damage claim, which is a
//!   condition-side entity consulted here through [`ReleaseHold`].
//!
//! Every successful transition appends one [`Transaction`] to the embedded
//! log. Failed operations mutate nothing and append nothing.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use tenancy_core::{AgreementId, CallContext, PartyId, Timestamp, TransactionId};

use crate::agreement::{Agreement, AgreementRegistry, PartyRole};
use crate::deposit::{Deposit, DepositStatus, ReleaseApproval};
use crate::error::EscrowError;
use crate::transaction::{Transaction, TransactionLog, TransactionType};

// ---------------------------------------------------------------------------
// Release hold seam
// ---------------------------------------------------------------------------

/// Source of outstanding holds against a deposit withdrawal.
///
/// The condition subsystem's damage-claim manager implements this; a filed
/// claim blocks [`claim_deposit`](DepositLedger::claim_deposit) until it is
/// resolved or rejected by the external arbitration collaborator.
pub trait ReleaseHold {
    /// Number of claims currently filed against the agreement's deposit.
    fn open_claim_count(&self, agreement_id: &AgreementId) -> usize;
}

/// A [`ReleaseHold`] with no claims, for hosts running the escrow side
/// without the condition registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolds;

impl ReleaseHold for NoHolds {
    fn open_claim_count(&self, _agreement_id: &AgreementId) -> usize {
        0
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// In-memory deposit ledger with its embedded transaction log.
///
/// Keyed by [`AgreementId`]; per-key entry locks serialize transitions of
/// the same deposit.
pub struct DepositLedger {
    deposits: DashMap<AgreementId, Deposit>,
    log: TransactionLog,
}

impl DepositLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            deposits: DashMap::new(),
            log: TransactionLog::new(),
        }
    }

    /// Pay the security deposit into custody.
    ///
    /// Creates the agreement's [`Deposit`] in [`Held`](DepositStatus::Held)
    /// status with `held_until` set to the agreement end date, and appends
    /// a [`DepositPaid`](TransactionType::DepositPaid) transaction from
    /// tenant to landlord. The actual transfer of value is the external
    /// ledger's side effect, assumed atomic with this state change.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] if the agreement is absent.
    /// - [`EscrowError::Unauthorized`] unless the caller is the tenant.
    /// - [`EscrowError::InvalidState`] if a deposit already exists in a
    ///   status other than unpaid.
    pub fn pay_deposit(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        agreement_id: &AgreementId,
    ) -> Result<Deposit, EscrowError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        if ctx.caller != agreement.tenant {
            return Err(EscrowError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "tenant of the agreement",
            });
        }

        let deposit = match self.deposits.entry(agreement_id.clone()) {
            Entry::Occupied(mut slot) => {
                if slot.get().status != DepositStatus::Unpaid {
                    return Err(EscrowError::InvalidState {
                        operation: "pay_deposit",
                        reason: format!("deposit is {}", slot.get().status),
                    });
                }
                let deposit = held_deposit(&agreement, ctx.now);
                slot.insert(deposit.clone());
                deposit
            }
            Entry::Vacant(slot) => {
                let deposit = held_deposit(&agreement, ctx.now);
                slot.insert(deposit.clone());
                deposit
            }
        };

        self.append_transaction(
            ctx,
            &agreement,
            TransactionType::DepositPaid,
            agreement.tenant.clone(),
            agreement.landlord.clone(),
            "Security deposit paid",
        );
        tracing::info!(agreement = %agreement_id, amount = deposit.amount, "deposit held");
        Ok(deposit)
    }

    /// Record the caller's release approval; release on the second
    /// distinct one.
    ///
    /// Re-approving is a no-op, not an error, and never duplicates the
    /// release transaction; this covers both a repeated approval while the
    /// deposit is held and any approval after it is released. When both
    /// flags become true the approval time is set, the deposit transitions
    /// to [`Released`](DepositStatus::Released), and one
    /// [`DepositReleased`](TransactionType::DepositReleased) transaction is
    /// appended.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] if the agreement or deposit is absent.
    /// - [`EscrowError::Unauthorized`] unless the caller is a party.
    /// - [`EscrowError::InvalidState`] if the deposit is unpaid or already
    ///   claimed.
    pub fn approve_release(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        agreement_id: &AgreementId,
    ) -> Result<Deposit, EscrowError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        let role = agreement
            .role_of(&ctx.caller)
            .ok_or_else(|| EscrowError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "tenant or landlord of the agreement",
            })?;

        let mut entry = self
            .deposits
            .get_mut(agreement_id)
            .ok_or_else(|| EscrowError::NotFound {
                entity: "deposit",
                id: agreement_id.to_string(),
            })?;
        let deposit = entry.value_mut();

        match deposit.status {
            DepositStatus::Held => {}
            // Released means both parties already approved; a repeated
            // approval is a no-op and never duplicates the transaction.
            DepositStatus::Released => return Ok(deposit.clone()),
            other => {
                return Err(EscrowError::InvalidState {
                    operation: "approve_release",
                    reason: format!("deposit is {other}"),
                })
            }
        }

        // Idempotent per party: a repeated approval changes nothing.
        if !deposit.approval.record(role) {
            return Ok(deposit.clone());
        }

        if deposit.approval.both_approved() {
            deposit.approval.approval_time = Some(ctx.now);
            deposit.status = DepositStatus::Released;
            let snapshot = deposit.clone();
            drop(entry);

            self.append_transaction(
                ctx,
                &agreement,
                TransactionType::DepositReleased,
                agreement.landlord.clone(),
                agreement.tenant.clone(),
                "Deposit release approved by both parties",
            );
            tracing::info!(agreement = %agreement_id, "deposit released");
            return Ok(snapshot);
        }

        tracing::debug!(agreement = %agreement_id, role = %role, "release approval recorded");
        Ok(deposit.clone())
    }

    /// Withdraw an already-released deposit.
    ///
    /// This is the terminal transition of the custody state machine. Any
    /// damage claim still filed against the agreement blocks withdrawal
    /// until the external arbitration collaborator resolves or rejects it.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] if the agreement or deposit is absent.
    /// - [`EscrowError::Unauthorized`] unless the caller is a party.
    /// - [`EscrowError::AlreadyClaimed`] if the deposit was already
    ///   withdrawn.
    /// - [`EscrowError::InvalidState`] unless the deposit is released and
    ///   no damage claims are outstanding.
    pub fn claim_deposit(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        agreement_id: &AgreementId,
        holds: &dyn ReleaseHold,
    ) -> Result<Deposit, EscrowError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        if !agreement.is_party(&ctx.caller) {
            return Err(EscrowError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "tenant or landlord of the agreement",
            });
        }

        let mut entry = self
            .deposits
            .get_mut(agreement_id)
            .ok_or_else(|| EscrowError::NotFound {
                entity: "deposit",
                id: agreement_id.to_string(),
            })?;
        let deposit = entry.value_mut();

        match deposit.status {
            DepositStatus::Claimed => {
                return Err(EscrowError::AlreadyClaimed(agreement_id.clone()))
            }
            DepositStatus::Released => {}
            other => {
                return Err(EscrowError::InvalidState {
                    operation: "claim_deposit",
                    reason: format!("deposit is {other}"),
                })
            }
        }

        let open = holds.open_claim_count(agreement_id);
        if open > 0 {
            return Err(EscrowError::InvalidState {
                operation: "claim_deposit",
                reason: format!("{open} damage claim(s) outstanding"),
            });
        }

        deposit.status = DepositStatus::Claimed;
        let snapshot = deposit.clone();
        drop(entry);

        self.append_transaction(
            ctx,
            &agreement,
            TransactionType::DepositClaimed,
            agreement.landlord.clone(),
            agreement.tenant.clone(),
            "Security deposit withdrawn",
        );
        tracing::info!(agreement = %agreement_id, "deposit claimed");
        Ok(snapshot)
    }

    /// Get the deposit for an agreement.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::NotFound`] if no deposit has been paid.
    pub fn get_deposit(&self, agreement_id: &AgreementId) -> Result<Deposit, EscrowError> {
        self.deposits
            .get(agreement_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EscrowError::NotFound {
                entity: "deposit",
                id: agreement_id.to_string(),
            })
    }

    /// Get a transaction from the embedded log.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::NotFound`] if absent.
    pub fn get_transaction(&self, id: &TransactionId) -> Result<Transaction, EscrowError> {
        self.log.get(id)
    }

    /// The agreement's transactions in append order.
    pub fn transactions_for(&self, agreement_id: &AgreementId) -> Vec<Transaction> {
        self.log.for_agreement(agreement_id)
    }

    /// Read access to the embedded transaction log.
    pub fn transaction_log(&self) -> &TransactionLog {
        &self.log
    }

    fn append_transaction(
        &self,
        ctx: &CallContext,
        agreement: &Agreement,
        transaction_type: TransactionType,
        sender: PartyId,
        recipient: PartyId,
        note: &str,
    ) {
        self.log.append(Transaction {
            id: TransactionId::new(),
            agreement_id: agreement.id.clone(),
            transaction_type,
            amount: agreement.deposit_amount,
            sender,
            recipient,
            time: ctx.now,
            note: note.to_string(),
        });
    }
}

impl Default for DepositLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DepositLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepositLedger")
            .field("deposits", &self.deposits.len())
            .field("log", &self.log)
            .finish()
    }
}

fn held_deposit(agreement: &Agreement, now: Timestamp) -> Deposit {
    Deposit {
        agreement_id: agreement.id.clone(),
        amount: agreement.deposit_amount,
        paid_at: now,
        held_until: agreement.end_date,
        status: DepositStatus::Held,
        approval: ReleaseApproval::new(),
    }
}
