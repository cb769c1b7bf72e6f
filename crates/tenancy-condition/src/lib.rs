//! # tenancy-condition — Property-Condition Verification
//!
//! The inspection side of the Tenancy Stack:
//!
//! - **Error** ([`error`]): structured error kinds for condition
//!   operations.
//!
//! - **Property** ([`property`]): the property registry, independent of
//!   agreements. A property is owned by the landlord who registered it.
//!
//! - **Report** ([`report`]): one [`ConditionReport`](report::ConditionReport)
//!   per (agreement, move-in | move-out). A report becomes `Completed` only
//!   once both parties have signed; completion freezes its room entries.
//!
//! - **Room** ([`room`]): per-room condition entries attached to a report,
//!   with evidence image fingerprints.
//!
//! - **Compare** ([`compare`]): the pure read-side comparator over paired
//!   move-in/move-out room entries.
//!
//! - **Claim** ([`claim`]): landlord-filed damage claims against move-out
//!   findings. A filed claim blocks deposit withdrawal on the escrow side
//!   through the [`ReleaseHold`](tenancy_escrow::ReleaseHold) seam.

pub mod claim;
pub mod compare;
pub mod error;
pub mod property;
pub mod report;
pub mod room;

pub use claim::{ClaimStatus, DamageClaim, DamageClaimManager};
pub use compare::{compare_all, compare_conditions, RoomComparison};
pub use error::ConditionError;
pub use property::{Property, PropertyRegistry, PropertyStatus, PropertyType};
pub use report::{
    ConditionRating, ConditionReport, ConditionReportManager, ReportKey, ReportStatus, ReportType,
};
pub use room::{RoomCondition, RoomConditionStore, RoomKey, RoomType};
