//! # Damage Claim Manager
//!
//! Landlord-filed claims against move-out findings. A claim can only be
//! filed once the move-out report is completed and the contested room has
//! an entry in it. While a claim stays `Filed` it blocks the escrow side's
//! deposit withdrawal through the [`ReleaseHold`] seam; the filed →
//! resolved/rejected transitions are recorded here on behalf of the
//! external arbitration collaborator.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use tenancy_core::{AgreementId, CallContext, ClaimId, ContentDigest, PartyId, RoomId, Timestamp};
use tenancy_escrow::{AgreementRegistry, ReleaseHold};

use crate::error::ConditionError;
use crate::report::{ConditionReportManager, ReportStatus, ReportType};
use crate::room::RoomConditionStore;

/// The lifecycle state of a damage claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Filed and outstanding; blocks deposit withdrawal.
    Filed,
    /// Upheld by the external arbiter. Terminal state.
    Resolved,
    /// Dismissed by the external arbiter. Terminal state.
    Rejected,
}

impl ClaimStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filed => "filed",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A landlord's assertion of damage with a repair-cost estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageClaim {
    pub id: ClaimId,
    pub agreement_id: AgreementId,
    /// The room contested; always has a move-out condition entry.
    pub room_id: RoomId,
    pub damage_description: String,
    /// Estimated repair cost in the smallest currency unit, positive.
    pub repair_cost: u64,
    pub image_hashes: Vec<ContentDigest>,
    pub claimed_by: PartyId,
    pub claim_date: Timestamp,
    pub status: ClaimStatus,
}

/// In-memory damage claim manager.
pub struct DamageClaimManager {
    claims: DashMap<ClaimId, DamageClaim>,
    by_agreement: DashMap<AgreementId, Vec<ClaimId>>,
}

impl DamageClaimManager {
    /// Create a new empty manager.
    pub fn new() -> Self {
        Self {
            claims: DashMap::new(),
            by_agreement: DashMap::new(),
        }
    }

    /// File a damage claim against a move-out finding.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NotFound`] if the agreement, the move-out
    ///   report, or the room's move-out entry is absent.
    /// - [`ConditionError::Unauthorized`] unless the caller is the
    ///   agreement's landlord.
    /// - [`ConditionError::InvalidState`] if the move-out report is not
    ///   completed.
    /// - [`ConditionError::InvalidAmount`] if `repair_cost` is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn file_claim(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        reports: &ConditionReportManager,
        rooms: &RoomConditionStore,
        agreement_id: &AgreementId,
        room_id: RoomId,
        damage_description: String,
        repair_cost: u64,
        image_hashes: Vec<ContentDigest>,
    ) -> Result<DamageClaim, ConditionError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        if ctx.caller != agreement.landlord {
            return Err(ConditionError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "landlord of the agreement",
            });
        }
        if repair_cost == 0 {
            return Err(ConditionError::InvalidAmount {
                field: "repair_cost",
                amount: repair_cost,
            });
        }

        let report = reports.get_report(agreement_id, ReportType::MoveOut)?;
        if report.status != ReportStatus::Completed {
            return Err(ConditionError::InvalidState {
                operation: "file_claim",
                reason: "move-out report is not completed".to_string(),
            });
        }
        // The contested room must be documented in the move-out report.
        rooms.get_room_condition(agreement_id, ReportType::MoveOut, &room_id)?;

        let claim = DamageClaim {
            id: ClaimId::new(),
            agreement_id: agreement_id.clone(),
            room_id,
            damage_description,
            repair_cost,
            image_hashes,
            claimed_by: ctx.caller.clone(),
            claim_date: ctx.now,
            status: ClaimStatus::Filed,
        };
        self.claims.insert(claim.id.clone(), claim.clone());
        self.by_agreement
            .entry(agreement_id.clone())
            .or_default()
            .push(claim.id.clone());
        tracing::info!(
            claim = %claim.id,
            agreement = %agreement_id,
            room = %claim.room_id,
            cost = repair_cost,
            "damage claim filed"
        );
        Ok(claim)
    }

    /// Record the external arbiter upholding a claim.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NotFound`] if the claim is absent.
    /// - [`ConditionError::InvalidState`] unless the claim is filed.
    pub fn resolve_claim(&self, id: &ClaimId) -> Result<DamageClaim, ConditionError> {
        self.settle(id, ClaimStatus::Resolved)
    }

    /// Record the external arbiter dismissing a claim.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_claim`](Self::resolve_claim).
    pub fn reject_claim(&self, id: &ClaimId) -> Result<DamageClaim, ConditionError> {
        self.settle(id, ClaimStatus::Rejected)
    }

    fn settle(&self, id: &ClaimId, target: ClaimStatus) -> Result<DamageClaim, ConditionError> {
        let mut entry = self
            .claims
            .get_mut(id)
            .ok_or_else(|| ConditionError::NotFound {
                entity: "damage claim",
                id: id.to_string(),
            })?;
        let claim = entry.value_mut();

        if claim.status != ClaimStatus::Filed {
            return Err(ConditionError::InvalidState {
                operation: "settle_claim",
                reason: format!("claim is {}", claim.status),
            });
        }
        claim.status = target;
        tracing::info!(claim = %id, status = %target, "damage claim settled");
        Ok(claim.clone())
    }

    /// Get a claim by id.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::NotFound`] if absent.
    pub fn get_claim(&self, id: &ClaimId) -> Result<DamageClaim, ConditionError> {
        self.claims
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ConditionError::NotFound {
                entity: "damage claim",
                id: id.to_string(),
            })
    }

    /// All claims for an agreement, in filing order.
    pub fn claims_for_agreement(&self, agreement_id: &AgreementId) -> Vec<DamageClaim> {
        let Some(ids) = self.by_agreement.get(agreement_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.claims.get(id).map(|entry| entry.value().clone()))
            .collect()
    }
}

impl ReleaseHold for DamageClaimManager {
    fn open_claim_count(&self, agreement_id: &AgreementId) -> usize {
        self.claims_for_agreement(agreement_id)
            .iter()
            .filter(|claim| claim.status == ClaimStatus::Filed)
            .count()
    }
}

impl Default for DamageClaimManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DamageClaimManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamageClaimManager")
            .field("claims", &self.claims.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ConditionRating;
    use crate::room::RoomType;
    use tenancy_core::{sha256_digest, PropertyId};

    const START: i64 = 1_625_097_600;
    const END: i64 = START + 31_536_000;

    fn party(s: &str) -> PartyId {
        PartyId::new(s).unwrap()
    }

    fn ctx(caller: &str, secs: i64) -> CallContext {
        CallContext::new(party(caller), Timestamp::from_epoch_secs(secs).unwrap())
    }

    fn agreement_id() -> AgreementId {
        AgreementId::new("agreement-001").unwrap()
    }

    struct Fixture {
        registry: AgreementRegistry,
        reports: ConditionReportManager,
        rooms: RoomConditionStore,
        claims: DamageClaimManager,
    }

    fn fixture(complete_move_out: bool) -> Fixture {
        let registry = AgreementRegistry::new();
        registry
            .create_agreement(
                &ctx("landlord-1", START),
                agreement_id(),
                party("tenant-1"),
                party("landlord-1"),
                PropertyId::new("property-001").unwrap(),
                200_000_000,
                50_000_000,
                Timestamp::from_epoch_secs(START).unwrap(),
                Timestamp::from_epoch_secs(END).unwrap(),
            )
            .unwrap();

        let reports = ConditionReportManager::new();
        let rooms = RoomConditionStore::new();
        reports
            .create_report(
                &ctx("landlord-1", END),
                &registry,
                &agreement_id(),
                ReportType::MoveOut,
                ConditionRating::Good,
                sha256_digest(b"move-out report"),
            )
            .unwrap();
        rooms
            .add_room_condition(
                &ctx("landlord-1", END),
                &registry,
                &reports,
                &agreement_id(),
                ReportType::MoveOut,
                RoomId::new("living-room").unwrap(),
                RoomType::LivingRoom,
                ConditionRating::Good,
                "Carpet stains and wall damage from hanging items".to_string(),
                vec![sha256_digest(b"damage photo")],
                String::new(),
            )
            .unwrap();
        if complete_move_out {
            for caller in ["tenant-1", "landlord-1"] {
                reports
                    .sign_report(&ctx(caller, END + 1), &registry, &agreement_id(), ReportType::MoveOut)
                    .unwrap();
            }
        }

        Fixture {
            registry,
            reports,
            rooms,
            claims: DamageClaimManager::new(),
        }
    }

    fn file(f: &Fixture, room: &str, cost: u64) -> Result<DamageClaim, ConditionError> {
        f.claims.file_claim(
            &ctx("landlord-1", END + 86_400),
            &f.registry,
            &f.reports,
            &f.rooms,
            &agreement_id(),
            RoomId::new(room).unwrap(),
            "Carpet stains and wall damage from hanging items".to_string(),
            cost,
            vec![sha256_digest(b"damage photo")],
        )
    }

    #[test]
    fn file_claim_after_completed_move_out() {
        let f = fixture(true);
        let claim = file(&f, "living-room", 50_000_000).unwrap();
        assert_eq!(claim.status, ClaimStatus::Filed);
        assert_eq!(claim.claimed_by, party("landlord-1"));
        assert_eq!(f.claims.get_claim(&claim.id).unwrap(), claim);
        assert_eq!(f.claims.open_claim_count(&agreement_id()), 1);
    }

    #[test]
    fn draft_move_out_report_blocks_filing() {
        let f = fixture(false);
        let result = file(&f, "living-room", 50_000_000);
        assert!(matches!(result, Err(ConditionError::InvalidState { .. })));
    }

    #[test]
    fn only_landlord_files() {
        let f = fixture(true);
        let result = f.claims.file_claim(
            &ctx("tenant-1", END),
            &f.registry,
            &f.reports,
            &f.rooms,
            &agreement_id(),
            RoomId::new("living-room").unwrap(),
            "damage".to_string(),
            1,
            vec![],
        );
        assert!(matches!(result, Err(ConditionError::Unauthorized { .. })));
    }

    #[test]
    fn zero_repair_cost_rejected() {
        let f = fixture(true);
        let result = file(&f, "living-room", 0);
        assert!(matches!(result, Err(ConditionError::InvalidAmount { .. })));
    }

    #[test]
    fn undocumented_room_rejected() {
        let f = fixture(true);
        let result = file(&f, "garage", 50_000_000);
        assert!(matches!(result, Err(ConditionError::NotFound { .. })));
    }

    #[test]
    fn resolve_and_reject_transitions() {
        let f = fixture(true);
        let first = file(&f, "living-room", 50_000_000).unwrap();
        let resolved = f.claims.resolve_claim(&first.id).unwrap();
        assert_eq!(resolved.status, ClaimStatus::Resolved);
        assert!(resolved.status.is_terminal());
        assert_eq!(f.claims.open_claim_count(&agreement_id()), 0);

        // A settled claim cannot move again.
        let again = f.claims.reject_claim(&first.id);
        assert!(matches!(again, Err(ConditionError::InvalidState { .. })));
    }

    #[test]
    fn open_count_tracks_filed_claims_only() {
        let f = fixture(true);
        let first = file(&f, "living-room", 50_000_000).unwrap();
        // Same room can be contested more than once.
        let second = file(&f, "living-room", 25_000_000).unwrap();
        assert_eq!(f.claims.open_claim_count(&agreement_id()), 2);

        f.claims.reject_claim(&first.id).unwrap();
        assert_eq!(f.claims.open_claim_count(&agreement_id()), 1);
        f.claims.resolve_claim(&second.id).unwrap();
        assert_eq!(f.claims.open_claim_count(&agreement_id()), 0);

        let all = f.claims.claims_for_agreement(&agreement_id());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[test]
    fn unknown_claim_is_not_found() {
        let f = fixture(true);
        assert!(matches!(
            f.claims.get_claim(&ClaimId::new()),
            Err(ConditionError::NotFound { .. })
        ));
        assert!(matches!(
            f.claims.resolve_claim(&ClaimId::new()),
            Err(ConditionError::NotFound { .. })
        ));
    }

    #[test]
    fn claim_serde_roundtrip() {
        let f = fixture(true);
        let claim = file(&f, "living-room", 50_000_000).unwrap();
        let json = serde_json::to_string(&claim).unwrap();
        let back: DamageClaim = serde_json::from_str(&json).unwrap();
        assert_eq!(claim, back);
    }

    #[test]
    fn status_strings() {
        assert_eq!(ClaimStatus::Filed.as_str(), "filed");
        assert_eq!(ClaimStatus::Resolved.as_str(), "resolved");
        assert_eq!(ClaimStatus::Rejected.as_str(), "rejected");
        assert!(!ClaimStatus::Filed.is_terminal());
    }
}
