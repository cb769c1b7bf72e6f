//! # Condition Report Manager
//!
//! One inspection report per (agreement, move-in | move-out). A report is
//! created as a draft by the landlord or a designated inspector, then
//! signed by tenant and landlord. The second signature completes the
//! report; from that moment its room entries are frozen.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use tenancy_core::{AgreementId, CallContext, ContentDigest, PartyId, Timestamp};
use tenancy_escrow::{Agreement, AgreementRegistry, PartyRole};

use crate::error::ConditionError;

// ---------------------------------------------------------------------------
// Report vocabulary
// ---------------------------------------------------------------------------

/// Which end of the tenancy an inspection documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    MoveIn,
    MoveOut,
}

impl ReportType {
    /// The canonical string name of this report type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoveIn => "move-in",
            Self::MoveOut => "move-out",
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lifecycle state of a condition report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Open for room entries and signatures.
    Draft,
    /// Both parties signed; room entries are frozen. Terminal state.
    Completed,
}

impl ReportStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordinal condition rating.
///
/// Variant order is the scale: `Poor < Fair < Good < Excellent`. The
/// derived `Ord` is what the comparator uses to decide whether a move-out
/// rating is strictly worse than its move-in counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionRating {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ConditionRating {
    /// The canonical string name of this rating.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl std::fmt::Display for ConditionRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of a condition report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    pub agreement: AgreementId,
    pub report_type: ReportType,
}

impl ReportKey {
    pub fn new(agreement: AgreementId, report_type: ReportType) -> Self {
        Self {
            agreement,
            report_type,
        }
    }
}

impl std::fmt::Display for ReportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.agreement, self.report_type)
    }
}

// ---------------------------------------------------------------------------
// Report record
// ---------------------------------------------------------------------------

/// An inspection report for one end of a tenancy.
///
/// Signature times double as signed flags: a party has signed exactly when
/// its timestamp is `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionReport {
    pub agreement_id: AgreementId,
    pub report_type: ReportType,
    /// The principal who performed the inspection.
    pub inspector: PartyId,
    pub inspection_date: Timestamp,
    pub overall_condition: ConditionRating,
    /// Fingerprint of the externally stored report document.
    pub document_hash: ContentDigest,
    pub tenant_signed_at: Option<Timestamp>,
    pub landlord_signed_at: Option<Timestamp>,
    pub status: ReportStatus,
}

impl ConditionReport {
    /// Whether `role` has signed.
    pub fn signed_by(&self, role: PartyRole) -> bool {
        match role {
            PartyRole::Tenant => self.tenant_signed_at.is_some(),
            PartyRole::Landlord => self.landlord_signed_at.is_some(),
        }
    }

    /// Whether both parties have signed.
    pub fn fully_signed(&self) -> bool {
        self.tenant_signed_at.is_some() && self.landlord_signed_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// In-memory condition report manager.
///
/// Holds the reports keyed by [`ReportKey`] and the per-agreement inspector
/// designations that authorize report creation and room entry alongside
/// the landlord.
pub struct ConditionReportManager {
    reports: DashMap<ReportKey, ConditionReport>,
    inspectors: DashMap<AgreementId, PartyId>,
}

impl ConditionReportManager {
    /// Create a new empty manager.
    pub fn new() -> Self {
        Self {
            reports: DashMap::new(),
            inspectors: DashMap::new(),
        }
    }

    /// Designate an inspector for an agreement.
    ///
    /// At most one inspector per agreement; a second designation replaces
    /// the first.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NotFound`] if the agreement is absent.
    /// - [`ConditionError::Unauthorized`] unless the caller is the
    ///   agreement's landlord.
    pub fn designate_inspector(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        agreement_id: &AgreementId,
        inspector: PartyId,
    ) -> Result<(), ConditionError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        if ctx.caller != agreement.landlord {
            return Err(ConditionError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "landlord of the agreement",
            });
        }
        tracing::info!(agreement = %agreement_id, inspector = %inspector, "inspector designated");
        self.inspectors.insert(agreement_id.clone(), inspector);
        Ok(())
    }

    /// Whether `party` may create reports and room entries for the
    /// agreement: the landlord, or the designated inspector.
    pub fn can_inspect(&self, agreement: &Agreement, party: &PartyId) -> bool {
        if *party == agreement.landlord {
            return true;
        }
        self.inspectors
            .get(&agreement.id)
            .map(|entry| entry.value() == party)
            .unwrap_or(false)
    }

    /// Create a draft condition report.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NotFound`] if the agreement is absent.
    /// - [`ConditionError::Unauthorized`] unless the caller is the landlord
    ///   or the designated inspector.
    /// - [`ConditionError::AlreadyExists`] if a report of this type already
    ///   exists for the agreement.
    pub fn create_report(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        agreement_id: &AgreementId,
        report_type: ReportType,
        overall_condition: ConditionRating,
        document_hash: ContentDigest,
    ) -> Result<ConditionReport, ConditionError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        if !self.can_inspect(&agreement, &ctx.caller) {
            return Err(ConditionError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "landlord or designated inspector",
            });
        }

        let key = ReportKey::new(agreement_id.clone(), report_type);
        match self.reports.entry(key.clone()) {
            Entry::Occupied(_) => Err(ConditionError::AlreadyExists {
                entity: "condition report",
                id: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                let report = ConditionReport {
                    agreement_id: agreement_id.clone(),
                    report_type,
                    inspector: ctx.caller.clone(),
                    inspection_date: ctx.now,
                    overall_condition,
                    document_hash,
                    tenant_signed_at: None,
                    landlord_signed_at: None,
                    status: ReportStatus::Draft,
                };
                slot.insert(report.clone());
                tracing::info!(report = %key, inspector = %ctx.caller, "condition report drafted");
                Ok(report)
            }
        }
    }

    /// Sign a condition report as tenant or landlord.
    ///
    /// The second distinct signature completes the report and freezes its
    /// room entries. Re-signing by an already-signed party is a no-op.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NotFound`] if the agreement or report is absent.
    /// - [`ConditionError::Unauthorized`] unless the caller is a party to
    ///   the agreement.
    pub fn sign_report(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        agreement_id: &AgreementId,
        report_type: ReportType,
    ) -> Result<ConditionReport, ConditionError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        let role = agreement
            .role_of(&ctx.caller)
            .ok_or_else(|| ConditionError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "tenant or landlord of the agreement",
            })?;

        let key = ReportKey::new(agreement_id.clone(), report_type);
        let mut entry = self
            .reports
            .get_mut(&key)
            .ok_or_else(|| ConditionError::NotFound {
                entity: "condition report",
                id: key.to_string(),
            })?;
        let report = entry.value_mut();

        // Re-signing is a no-op for the already-signed party.
        if report.signed_by(role) {
            return Ok(report.clone());
        }

        match role {
            PartyRole::Tenant => report.tenant_signed_at = Some(ctx.now),
            PartyRole::Landlord => report.landlord_signed_at = Some(ctx.now),
        }

        if report.fully_signed() {
            report.status = ReportStatus::Completed;
            tracing::info!(report = %key, "condition report completed");
        }
        Ok(report.clone())
    }

    /// Get a report by (agreement, type).
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::NotFound`] if absent.
    pub fn get_report(
        &self,
        agreement_id: &AgreementId,
        report_type: ReportType,
    ) -> Result<ConditionReport, ConditionError> {
        let key = ReportKey::new(agreement_id.clone(), report_type);
        self.reports
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ConditionError::NotFound {
                entity: "condition report",
                id: key.to_string(),
            })
    }
}

impl Default for ConditionReportManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConditionReportManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionReportManager")
            .field("reports", &self.reports.len())
            .field("inspectors", &self.inspectors.len())
            .finish()
    }
}
