//! # Transaction Log
//!
//! Append-only audit record of money-moving events. Entries are written
//! only by the [`DepositLedger`](crate::ledger::DepositLedger) as a side
//! effect of its own successful transitions; there is no external write
//! operation. Entries are never edited or removed.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use tenancy_core::{AgreementId, PartyId, Timestamp, TransactionId};

use crate::error::EscrowError;

/// The kind of custody event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Tenant funds moved into custody.
    DepositPaid,
    /// Both parties approved release of the deposit.
    DepositReleased,
    /// The released deposit was withdrawn.
    DepositClaimed,
}

impl TransactionType {
    /// The canonical string name of this transaction type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepositPaid => "deposit-paid",
            Self::DepositReleased => "deposit-released",
            Self::DepositClaimed => "deposit-claimed",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable audit entry for one custody-affecting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// The agreement whose deposit this event concerns.
    pub agreement_id: AgreementId,
    pub transaction_type: TransactionType,
    /// Amount in the smallest currency unit.
    pub amount: u64,
    pub sender: PartyId,
    pub recipient: PartyId,
    pub time: Timestamp,
    /// Free-text note for presentation.
    pub note: String,
}

/// The append-only transaction log.
///
/// Lookup is by [`TransactionId`]; [`ordered`](TransactionLog::ordered)
/// replays entries in append order.
pub struct TransactionLog {
    entries: DashMap<TransactionId, Transaction>,
    order: RwLock<Vec<TransactionId>>,
}

impl TransactionLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Append a transaction. Crate-internal: only ledger transitions write.
    pub(crate) fn append(&self, transaction: Transaction) -> TransactionId {
        let id = transaction.id.clone();
        self.order.write().push(id.clone());
        self.entries.insert(id.clone(), transaction);
        id
    }

    /// Get a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::NotFound`] if absent.
    pub fn get(&self, id: &TransactionId) -> Result<Transaction, EscrowError> {
        self.entries
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EscrowError::NotFound {
                entity: "transaction",
                id: id.to_string(),
            })
    }

    /// All transactions in append order.
    pub fn ordered(&self) -> Vec<Transaction> {
        let order = self.order.read();
        order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| entry.value().clone()))
            .collect()
    }

    /// Transactions for one agreement, in append order.
    pub fn for_agreement(&self, agreement_id: &AgreementId) -> Vec<Transaction> {
        self.ordered()
            .into_iter()
            .filter(|txn| txn.agreement_id == *agreement_id)
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLog")
            .field("entries", &self.entries.len())
            .finish()
    }
}
