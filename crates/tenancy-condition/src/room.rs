//! # Room Condition Store
//!
//! Per-room condition entries attached to a condition report. Entries can
//! be added while the parent report is a draft; the report's completion
//! (both signatures) freezes them.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use tenancy_core::{AgreementId, CallContext, ContentDigest, RoomId};
use tenancy_escrow::AgreementRegistry;

use crate::error::ConditionError;
use crate::report::{ConditionRating, ConditionReportManager, ReportStatus, ReportType};

/// The function of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Bedroom,
    Bathroom,
    Kitchen,
    LivingRoom,
    DiningRoom,
    Hallway,
    Garage,
    Other,
}

impl RoomType {
    /// The canonical string name of this room type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bedroom => "bedroom",
            Self::Bathroom => "bathroom",
            Self::Kitchen => "kitchen",
            Self::LivingRoom => "living-room",
            Self::DiningRoom => "dining-room",
            Self::Hallway => "hallway",
            Self::Garage => "garage",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of a room condition entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomKey {
    pub agreement: AgreementId,
    pub report_type: ReportType,
    pub room: RoomId,
}

impl RoomKey {
    pub fn new(agreement: AgreementId, report_type: ReportType, room: RoomId) -> Self {
        Self {
            agreement,
            report_type,
            room,
        }
    }
}

impl std::fmt::Display for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.agreement, self.report_type, self.room)
    }
}

/// A per-room condition assessment.
///
/// `damage_description` is empty when no damage was found. Image
/// fingerprints keep their submission order; the photographs themselves
/// live with the external evidence store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCondition {
    pub agreement_id: AgreementId,
    pub report_type: ReportType,
    pub room_id: RoomId,
    pub room_type: RoomType,
    pub condition: ConditionRating,
    pub damage_description: String,
    pub image_hashes: Vec<ContentDigest>,
    pub notes: String,
}

impl RoomCondition {
    /// Whether the entry records any damage.
    pub fn has_damage_description(&self) -> bool {
        !self.damage_description.is_empty()
    }
}

/// In-memory store of room condition entries, keyed by [`RoomKey`].
pub struct RoomConditionStore {
    rooms: DashMap<RoomKey, RoomCondition>,
}

impl RoomConditionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a room entry to a draft report.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NotFound`] if the agreement or the parent report
    ///   is absent.
    /// - [`ConditionError::Unauthorized`] unless the caller is the landlord
    ///   or the designated inspector.
    /// - [`ConditionError::InvalidState`] if the parent report is already
    ///   completed.
    /// - [`ConditionError::AlreadyExists`] if the room already has an entry
    ///   in this report.
    #[allow(clippy::too_many_arguments)]
    pub fn add_room_condition(
        &self,
        ctx: &CallContext,
        agreements: &AgreementRegistry,
        reports: &ConditionReportManager,
        agreement_id: &AgreementId,
        report_type: ReportType,
        room_id: RoomId,
        room_type: RoomType,
        condition: ConditionRating,
        damage_description: String,
        image_hashes: Vec<ContentDigest>,
        notes: String,
    ) -> Result<RoomCondition, ConditionError> {
        let agreement = agreements.get_agreement(agreement_id)?;
        if !reports.can_inspect(&agreement, &ctx.caller) {
            return Err(ConditionError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "landlord or designated inspector",
            });
        }

        let report = reports.get_report(agreement_id, report_type)?;
        if report.status == ReportStatus::Completed {
            return Err(ConditionError::InvalidState {
                operation: "add_room_condition",
                reason: "room entries are frozen once the report is completed".to_string(),
            });
        }

        let key = RoomKey::new(agreement_id.clone(), report_type, room_id.clone());
        match self.rooms.entry(key.clone()) {
            Entry::Occupied(_) => Err(ConditionError::AlreadyExists {
                entity: "room condition",
                id: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                let entry = RoomCondition {
                    agreement_id: agreement_id.clone(),
                    report_type,
                    room_id,
                    room_type,
                    condition,
                    damage_description,
                    image_hashes,
                    notes,
                };
                slot.insert(entry.clone());
                tracing::debug!(room = %key, rating = %entry.condition, "room condition recorded");
                Ok(entry)
            }
        }
    }

    /// Get a room entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::NotFound`] if absent.
    pub fn get_room_condition(
        &self,
        agreement_id: &AgreementId,
        report_type: ReportType,
        room_id: &RoomId,
    ) -> Result<RoomCondition, ConditionError> {
        let key = RoomKey::new(agreement_id.clone(), report_type, room_id.clone());
        self.rooms
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ConditionError::NotFound {
                entity: "room condition",
                id: key.to_string(),
            })
    }

    /// All room entries of one report, ordered by room id.
    pub fn rooms_for_report(
        &self,
        agreement_id: &AgreementId,
        report_type: ReportType,
    ) -> Vec<RoomCondition> {
        let mut entries: Vec<RoomCondition> = self
            .rooms
            .iter()
            .filter(|entry| {
                entry.key().agreement == *agreement_id && entry.key().report_type == report_type
            })
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        entries
    }
}

impl Default for RoomConditionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomConditionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomConditionStore")
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
