//! # Deposit Custody Record
//!
//! One [`Deposit`] per agreement, carrying the custody status and the
//! embedded dual-signer [`ReleaseApproval`]. The record is created by the
//! ledger on first payment and is never deleted; terminal deposits remain
//! for audit.

use serde::{Deserialize, Serialize};

use tenancy_core::{AgreementId, Timestamp};

use crate::agreement::PartyRole;

/// The custody state of a security deposit.
///
/// ```text
/// (absent = Unpaid) ──pay_deposit()──▶ Held ──both approvals──▶ Released
///                                                                  │
///                                                          claim_deposit()
///                                                                  │
///                                                                  ▼
///                                                               Claimed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositStatus {
    /// No funds in custody yet.
    Unpaid,
    /// Funds are in custody.
    Held,
    /// Both parties approved release; awaiting withdrawal.
    Released,
    /// Funds withdrawn. Terminal state.
    Claimed,
}

impl DepositStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Held => "held",
            Self::Released => "released",
            Self::Claimed => "claimed",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Claimed)
    }
}

impl std::fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The dual-signer consent record gating deposit release.
///
/// `approval_time` is `Some` exactly when both flags are true; it records
/// the moment the second approval arrived. One party approving any number
/// of times moves only its own flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseApproval {
    pub tenant_approved: bool,
    pub landlord_approved: bool,
    pub approval_time: Option<Timestamp>,
}

impl ReleaseApproval {
    /// A fresh record with neither party approved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both parties have approved.
    pub fn both_approved(&self) -> bool {
        self.tenant_approved && self.landlord_approved
    }

    /// Whether `role` has already approved.
    pub fn approved_by(&self, role: PartyRole) -> bool {
        match role {
            PartyRole::Tenant => self.tenant_approved,
            PartyRole::Landlord => self.landlord_approved,
        }
    }

    /// Set the flag for `role`. Returns false if it was already set.
    pub(crate) fn record(&mut self, role: PartyRole) -> bool {
        let flag = match role {
            PartyRole::Tenant => &mut self.tenant_approved,
            PartyRole::Landlord => &mut self.landlord_approved,
        };
        if *flag {
            return false;
        }
        *flag = true;
        true
    }
}

/// The custody record for one agreement's security deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub agreement_id: AgreementId,
    /// Amount in custody, always equal to the agreement's deposit amount.
    pub amount: u64,
    pub paid_at: Timestamp,
    /// End of the custody window; at least the agreement end date. Audit
    /// data, compared against the caller's clock, never waited on.
    pub held_until: Timestamp,
    pub status: DepositStatus,
    pub approval: ReleaseApproval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_approval_is_empty() {
        let approval = ReleaseApproval::new();
        assert!(!approval.tenant_approved);
        assert!(!approval.landlord_approved);
        assert!(!approval.both_approved());
        assert!(approval.approval_time.is_none());
    }

    #[test]
    fn record_is_idempotent_per_role() {
        let mut approval = ReleaseApproval::new();
        assert!(approval.record(PartyRole::Tenant));
        assert!(!approval.record(PartyRole::Tenant));
        assert!(approval.approved_by(PartyRole::Tenant));
        assert!(!approval.approved_by(PartyRole::Landlord));
        assert!(!approval.both_approved());
    }

    #[test]
    fn both_roles_complete_the_approval() {
        let mut approval = ReleaseApproval::new();
        approval.record(PartyRole::Landlord);
        approval.record(PartyRole::Tenant);
        assert!(approval.both_approved());
    }

    #[test]
    fn status_strings() {
        assert_eq!(DepositStatus::Unpaid.as_str(), "unpaid");
        assert_eq!(DepositStatus::Held.as_str(), "held");
        assert_eq!(DepositStatus::Released.as_str(), "released");
        assert_eq!(DepositStatus::Claimed.as_str(), "claimed");
    }

    #[test]
    fn only_claimed_is_terminal() {
        assert!(DepositStatus::Claimed.is_terminal());
        assert!(!DepositStatus::Unpaid.is_terminal());
        assert!(!DepositStatus::Held.is_terminal());
        assert!(!DepositStatus::Released.is_terminal());
    }

    #[test]
    fn deposit_serde_roundtrip() {
        let deposit = Deposit {
            agreement_id: AgreementId::new("agreement-001").unwrap(),
            amount: 200_000_000,
            paid_at: Timestamp::from_epoch_secs(1_625_097_600).unwrap(),
            held_until: Timestamp::from_epoch_secs(1_656_633_600).unwrap(),
            status: DepositStatus::Held,
            approval: ReleaseApproval::new(),
        };
        let json = serde_json::to_string(&deposit).unwrap();
        let back: Deposit = serde_json::from_str(&json).unwrap();
        assert_eq!(deposit, back);
    }
}
