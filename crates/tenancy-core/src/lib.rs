//! # tenancy-core — Shared Domain Primitives
//!
//! Foundation types used by both sides of the Tenancy Stack:
//!
//! - **Identity** ([`identity`]): validated identifier newtypes. Each
//!   identifier is a distinct type, so an [`AgreementId`] cannot be passed
//!   where a [`PropertyId`] is expected.
//!
//! - **Time** ([`time`]): [`Timestamp`], a UTC-only timestamp truncated to
//!   seconds precision.
//!
//! - **Digest** ([`digest`]): [`ContentDigest`], the 32-byte SHA-256
//!   fingerprint retained for inspection evidence (images, documents).
//!   Evidence blobs themselves live in external storage.
//!
//! - **Context** ([`context`]): [`CallContext`], the caller identity and
//!   current logical time passed explicitly into every operation. There are
//!   no ambient globals for either value.

pub mod context;
pub mod digest;
pub mod error;
pub mod identity;
pub mod time;

pub use context::CallContext;
pub use digest::{sha256_digest, ContentDigest};
pub use error::ValidationError;
pub use identity::{AgreementId, ClaimId, PartyId, PropertyId, RoomId, TransactionId};
pub use time::Timestamp;
