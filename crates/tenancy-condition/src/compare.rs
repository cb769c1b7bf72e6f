//! # Condition Comparator
//!
//! Pure read-side comparison of paired move-in/move-out room entries.
//! Nothing here mutates state or files a claim; a damage claim is a
//! separate, explicit act by the landlord.

use serde::{Deserialize, Serialize};

use tenancy_core::{AgreementId, RoomId};

use crate::error::ConditionError;
use crate::report::{ConditionRating, ConditionReportManager, ReportStatus, ReportType};
use crate::room::RoomConditionStore;

/// The outcome of comparing one room across both inspections.
///
/// `has_damage` is true when the move-out rating is strictly worse than the
/// move-in rating on the ordinal scale, or the move-out entry carries a
/// damage description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomComparison {
    pub move_in_condition: ConditionRating,
    pub move_out_condition: ConditionRating,
    pub has_damage: bool,
}

/// Compare one room's move-in and move-out entries.
///
/// Both parent reports must exist and be completed, and the room must have
/// an entry in each.
///
/// # Errors
///
/// Returns [`ConditionError::NotFound`] if either report is absent or not
/// yet completed, or if either room entry is missing.
pub fn compare_conditions(
    reports: &ConditionReportManager,
    rooms: &RoomConditionStore,
    agreement_id: &AgreementId,
    room_id: &RoomId,
) -> Result<RoomComparison, ConditionError> {
    require_completed(reports, agreement_id, ReportType::MoveIn)?;
    require_completed(reports, agreement_id, ReportType::MoveOut)?;

    let move_in = rooms.get_room_condition(agreement_id, ReportType::MoveIn, room_id)?;
    let move_out = rooms.get_room_condition(agreement_id, ReportType::MoveOut, room_id)?;

    Ok(RoomComparison {
        move_in_condition: move_in.condition,
        move_out_condition: move_out.condition,
        has_damage: move_out.condition < move_in.condition
            || move_out.has_damage_description(),
    })
}

/// Compare every room that has entries in both completed reports, ordered
/// by room id.
///
/// # Errors
///
/// Returns [`ConditionError::NotFound`] if either report is absent or not
/// yet completed.
pub fn compare_all(
    reports: &ConditionReportManager,
    rooms: &RoomConditionStore,
    agreement_id: &AgreementId,
) -> Result<Vec<(RoomId, RoomComparison)>, ConditionError> {
    require_completed(reports, agreement_id, ReportType::MoveIn)?;
    require_completed(reports, agreement_id, ReportType::MoveOut)?;

    let move_out_rooms = rooms.rooms_for_report(agreement_id, ReportType::MoveOut);
    let mut comparisons = Vec::new();
    for move_out in move_out_rooms {
        let Ok(move_in) =
            rooms.get_room_condition(agreement_id, ReportType::MoveIn, &move_out.room_id)
        else {
            // Rooms documented only at move-out have no baseline to diff.
            continue;
        };
        comparisons.push((
            move_out.room_id.clone(),
            RoomComparison {
                move_in_condition: move_in.condition,
                move_out_condition: move_out.condition,
                has_damage: move_out.condition < move_in.condition
                    || move_out.has_damage_description(),
            },
        ));
    }
    Ok(comparisons)
}

fn require_completed(
    reports: &ConditionReportManager,
    agreement_id: &AgreementId,
    report_type: ReportType,
) -> Result<(), ConditionError> {
    let report = reports.get_report(agreement_id, report_type)?;
    if report.status != ReportStatus::Completed {
        return Err(ConditionError::NotFound {
            entity: "completed condition report",
            id: format!("{agreement_id}/{report_type}"),
        });
    }
    Ok(())
}
