//! # Rental Agreement Registry
//!
//! Stores rental agreement terms. An agreement binds a tenant, a landlord,
//! and a property to a deposit amount, a rent amount, and a tenancy window.
//! Terms are immutable after creation; only [`AgreementStatus`] moves,
//! through [`complete_agreement`](AgreementRegistry::complete_agreement)
//! and [`terminate_agreement`](AgreementRegistry::terminate_agreement).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use tenancy_core::{AgreementId, CallContext, PartyId, PropertyId, Timestamp};

use crate::error::EscrowError;

// ---------------------------------------------------------------------------
// Status and roles
// ---------------------------------------------------------------------------

/// The lifecycle state of a rental agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgreementStatus {
    /// The tenancy is in force.
    Active,
    /// The tenancy ran to its end date. Terminal state.
    Completed,
    /// The tenancy ended early. Terminal state.
    Terminated,
}

impl AgreementStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Terminated)
    }
}

impl std::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role a principal holds on an agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyRole {
    Tenant,
    Landlord,
}

impl PartyRole {
    /// The canonical string name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Landlord => "landlord",
        }
    }
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Agreement record
// ---------------------------------------------------------------------------

/// A rental agreement.
///
/// Amounts are in the smallest currency unit. `end_date` is strictly after
/// `start_date`; both amounts are strictly positive. Both facts are
/// enforced at creation and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: AgreementId,
    pub tenant: PartyId,
    pub landlord: PartyId,
    pub property_id: PropertyId,
    pub deposit_amount: u64,
    pub rent_amount: u64,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub status: AgreementStatus,
    pub created_at: Timestamp,
}

impl Agreement {
    /// The role `party` holds on this agreement, if any.
    pub fn role_of(&self, party: &PartyId) -> Option<PartyRole> {
        if *party == self.tenant {
            Some(PartyRole::Tenant)
        } else if *party == self.landlord {
            Some(PartyRole::Landlord)
        } else {
            None
        }
    }

    /// Whether `party` is the tenant or the landlord.
    pub fn is_party(&self, party: &PartyId) -> bool {
        self.role_of(party).is_some()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// In-memory rental agreement registry.
///
/// Keyed by [`AgreementId`]. Per-key entry locks serialize mutations of the
/// same agreement.
pub struct AgreementRegistry {
    agreements: DashMap<AgreementId, Agreement>,
}

impl AgreementRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            agreements: DashMap::new(),
        }
    }

    /// Create a rental agreement.
    ///
    /// The agreement starts [`Active`](AgreementStatus::Active) with
    /// creation time taken from `ctx.now`.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::AlreadyExists`] if `id` is taken.
    /// - [`EscrowError::InvalidRange`] if `end_date <= start_date`.
    /// - [`EscrowError::InvalidAmount`] if either amount is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn create_agreement(
        &self,
        ctx: &CallContext,
        id: AgreementId,
        tenant: PartyId,
        landlord: PartyId,
        property_id: PropertyId,
        deposit_amount: u64,
        rent_amount: u64,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<Agreement, EscrowError> {
        if end_date <= start_date {
            return Err(EscrowError::InvalidRange {
                reason: format!("end date {end_date} is not after start date {start_date}"),
            });
        }
        if deposit_amount == 0 {
            return Err(EscrowError::InvalidAmount {
                field: "deposit_amount",
                amount: deposit_amount,
            });
        }
        if rent_amount == 0 {
            return Err(EscrowError::InvalidAmount {
                field: "rent_amount",
                amount: rent_amount,
            });
        }

        match self.agreements.entry(id.clone()) {
            Entry::Occupied(_) => Err(EscrowError::AlreadyExists {
                entity: "agreement",
                id: id.to_string(),
            }),
            Entry::Vacant(slot) => {
                let agreement = Agreement {
                    id: id.clone(),
                    tenant,
                    landlord,
                    property_id,
                    deposit_amount,
                    rent_amount,
                    start_date,
                    end_date,
                    status: AgreementStatus::Active,
                    created_at: ctx.now,
                };
                slot.insert(agreement.clone());
                tracing::info!(agreement = %id, deposit = deposit_amount, "agreement created");
                Ok(agreement)
            }
        }
    }

    /// Get an agreement by id.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::NotFound`] if absent.
    pub fn get_agreement(&self, id: &AgreementId) -> Result<Agreement, EscrowError> {
        self.agreements
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EscrowError::NotFound {
                entity: "agreement",
                id: id.to_string(),
            })
    }

    /// Mark an agreement completed once its end date has passed.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] if absent.
    /// - [`EscrowError::Unauthorized`] unless the caller is a party.
    /// - [`EscrowError::InvalidState`] unless the agreement is active and
    ///   `ctx.now` has reached the end date.
    pub fn complete_agreement(
        &self,
        ctx: &CallContext,
        id: &AgreementId,
    ) -> Result<Agreement, EscrowError> {
        let mut entry = self
            .agreements
            .get_mut(id)
            .ok_or_else(|| EscrowError::NotFound {
                entity: "agreement",
                id: id.to_string(),
            })?;
        let agreement = entry.value_mut();

        if !agreement.is_party(&ctx.caller) {
            return Err(EscrowError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "tenant or landlord of the agreement",
            });
        }
        if agreement.status != AgreementStatus::Active {
            return Err(EscrowError::InvalidState {
                operation: "complete_agreement",
                reason: format!("agreement is {}", agreement.status),
            });
        }
        if ctx.now < agreement.end_date {
            return Err(EscrowError::InvalidState {
                operation: "complete_agreement",
                reason: format!("tenancy runs until {}", agreement.end_date),
            });
        }

        agreement.status = AgreementStatus::Completed;
        tracing::info!(agreement = %id, "agreement completed");
        Ok(agreement.clone())
    }

    /// Terminate an agreement before its end date.
    ///
    /// Records the early exit; deposit consequences still go through the
    /// release approval protocol.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] if absent.
    /// - [`EscrowError::Unauthorized`] unless the caller is a party.
    /// - [`EscrowError::InvalidState`] unless the agreement is active.
    pub fn terminate_agreement(
        &self,
        ctx: &CallContext,
        id: &AgreementId,
    ) -> Result<Agreement, EscrowError> {
        let mut entry = self
            .agreements
            .get_mut(id)
            .ok_or_else(|| EscrowError::NotFound {
                entity: "agreement",
                id: id.to_string(),
            })?;
        let agreement = entry.value_mut();

        if !agreement.is_party(&ctx.caller) {
            return Err(EscrowError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "tenant or landlord of the agreement",
            });
        }
        if agreement.status != AgreementStatus::Active {
            return Err(EscrowError::InvalidState {
                operation: "terminate_agreement",
                reason: format!("agreement is {}", agreement.status),
            });
        }

        agreement.status = AgreementStatus::Terminated;
        tracing::info!(agreement = %id, by = %ctx.caller, "agreement terminated");
        Ok(agreement.clone())
    }
}

impl Default for AgreementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AgreementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgreementRegistry")
            .field("agreements", &self.agreements.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(s: &str) -> PartyId {
        PartyId::new(s).unwrap()
    }

    fn ctx(caller: &str, secs: i64) -> CallContext {
        CallContext::new(party(caller), Timestamp::from_epoch_secs(secs).unwrap())
    }

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    fn create_sample(registry: &AgreementRegistry) -> Agreement {
        registry
            .create_agreement(
                &ctx("landlord-1", 1_625_097_600),
                AgreementId::new("agreement-001").unwrap(),
                party("tenant-1"),
                party("landlord-1"),
                PropertyId::new("property-001").unwrap(),
                200_000_000,
                50_000_000,
                ts(1_625_097_600),
                ts(1_625_097_600 + 31_536_000),
            )
            .unwrap()
    }

    #[test]
    fn create_and_get() {
        let registry = AgreementRegistry::new();
        let created = create_sample(&registry);
        assert_eq!(created.status, AgreementStatus::Active);
        assert_eq!(created.created_at, ts(1_625_097_600));

        let fetched = registry
            .get_agreement(&AgreementId::new("agreement-001").unwrap())
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn duplicate_id_rejected() {
        let registry = AgreementRegistry::new();
        create_sample(&registry);
        let result = registry.create_agreement(
            &ctx("landlord-1", 0),
            AgreementId::new("agreement-001").unwrap(),
            party("tenant-2"),
            party("landlord-1"),
            PropertyId::new("property-002").unwrap(),
            1,
            1,
            ts(0),
            ts(1),
        );
        assert!(matches!(result, Err(EscrowError::AlreadyExists { .. })));
    }

    #[test]
    fn end_date_must_follow_start_date() {
        let registry = AgreementRegistry::new();
        for (start, end) in [(100, 100), (100, 99)] {
            let result = registry.create_agreement(
                &ctx("landlord-1", 0),
                AgreementId::new("agreement-bad").unwrap(),
                party("tenant-1"),
                party("landlord-1"),
                PropertyId::new("property-001").unwrap(),
                1000,
                100,
                ts(start),
                ts(end),
            );
            assert!(matches!(result, Err(EscrowError::InvalidRange { .. })));
        }
    }

    #[test]
    fn zero_amounts_rejected() {
        let registry = AgreementRegistry::new();
        for (deposit, rent) in [(0, 100), (100, 0)] {
            let result = registry.create_agreement(
                &ctx("landlord-1", 0),
                AgreementId::new("agreement-bad").unwrap(),
                party("tenant-1"),
                party("landlord-1"),
                PropertyId::new("property-001").unwrap(),
                deposit,
                rent,
                ts(0),
                ts(1),
            );
            assert!(matches!(result, Err(EscrowError::InvalidAmount { .. })));
        }
    }

    #[test]
    fn get_missing_returns_not_found() {
        let registry = AgreementRegistry::new();
        let result = registry.get_agreement(&AgreementId::new("nope").unwrap());
        assert!(matches!(result, Err(EscrowError::NotFound { .. })));
    }

    #[test]
    fn role_resolution() {
        let registry = AgreementRegistry::new();
        let agreement = create_sample(&registry);
        assert_eq!(agreement.role_of(&party("tenant-1")), Some(PartyRole::Tenant));
        assert_eq!(
            agreement.role_of(&party("landlord-1")),
            Some(PartyRole::Landlord)
        );
        assert_eq!(agreement.role_of(&party("stranger")), None);
    }

    #[test]
    fn complete_after_end_date() {
        let registry = AgreementRegistry::new();
        create_sample(&registry);
        let id = AgreementId::new("agreement-001").unwrap();

        // Before the end date the tenancy is still running.
        let early = registry.complete_agreement(&ctx("tenant-1", 1_625_097_601), &id);
        assert!(matches!(early, Err(EscrowError::InvalidState { .. })));

        let done = registry
            .complete_agreement(&ctx("tenant-1", 1_625_097_600 + 31_536_000), &id)
            .unwrap();
        assert_eq!(done.status, AgreementStatus::Completed);
        assert!(done.status.is_terminal());
    }

    #[test]
    fn complete_requires_party() {
        let registry = AgreementRegistry::new();
        create_sample(&registry);
        let result = registry.complete_agreement(
            &ctx("stranger", 1_625_097_600 + 31_536_000),
            &AgreementId::new("agreement-001").unwrap(),
        );
        assert!(matches!(result, Err(EscrowError::Unauthorized { .. })));
    }

    #[test]
    fn terminate_early() {
        let registry = AgreementRegistry::new();
        create_sample(&registry);
        let id = AgreementId::new("agreement-001").unwrap();
        let terminated = registry
            .terminate_agreement(&ctx("landlord-1", 1_625_097_700), &id)
            .unwrap();
        assert_eq!(terminated.status, AgreementStatus::Terminated);

        // Terminal states reject further transitions.
        let again = registry.terminate_agreement(&ctx("landlord-1", 1_625_097_800), &id);
        assert!(matches!(again, Err(EscrowError::InvalidState { .. })));
    }

    #[test]
    fn status_strings() {
        assert_eq!(AgreementStatus::Active.as_str(), "active");
        assert_eq!(AgreementStatus::Completed.as_str(), "completed");
        assert_eq!(AgreementStatus::Terminated.as_str(), "terminated");
        assert!(!AgreementStatus::Active.is_terminal());
    }

    #[test]
    fn agreement_serde_roundtrip() {
        let registry = AgreementRegistry::new();
        let agreement = create_sample(&registry);
        let json = serde_json::to_string(&agreement).unwrap();
        let back: Agreement = serde_json::from_str(&json).unwrap();
        assert_eq!(agreement, back);
    }
}
