//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the Tenancy Stack.
//!
//! Two families:
//!
//! - **Caller-chosen string identifiers** ([`AgreementId`], [`PropertyId`],
//!   [`RoomId`]) and the opaque [`PartyId`] principal. These validate their
//!   format at construction time.
//! - **System-generated UUID identifiers** ([`TransactionId`], [`ClaimId`]),
//!   always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Implements `Deserialize` for string newtypes that must validate their
/// contents. Deserializes as a plain `String`, then routes through the
/// type's `new()` constructor so invalid values are rejected at
/// deserialization time, not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Implements the shared surface of a caller-chosen string identifier:
/// ASCII alphanumerics plus `-` and `_`, at most 64 characters
/// (e.g. `"agreement-001"`, `"living-room"`).
macro_rules! string_identifier {
    ($ty:ident, $kind:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $ty(String);

        impl_validating_deserialize!($ty);

        impl $ty {
            /// Create an identifier from a string, validating format.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::InvalidIdentifier`] if the value is
            /// empty, longer than 64 characters, or contains characters other
            /// than ASCII alphanumerics, `-`, and `_`.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if s.is_empty()
                    || s.len() > 64
                    || !s
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    return Err(ValidationError::InvalidIdentifier {
                        kind: $kind,
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Access the identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_identifier!(
    AgreementId,
    "agreement",
    "A caller-chosen identifier for a rental agreement (e.g. `\"agreement-001\"`)."
);

string_identifier!(
    PropertyId,
    "property",
    "A caller-chosen identifier for a registered property (e.g. `\"property-001\"`)."
);

string_identifier!(
    RoomId,
    "room",
    "A caller-chosen identifier for a room within a property (e.g. `\"living-room\"`)."
);

// ---------------------------------------------------------------------------
// Party principal
// ---------------------------------------------------------------------------

/// An opaque principal identifying a tenant, landlord, or inspector.
///
/// Who a principal *is* (and how the caller was authenticated as one) is the
/// job of the external identity collaborator. This type only carries the
/// principal string and compares it for equality.
///
/// # Validation
///
/// - Non-empty, at most 128 characters
/// - Printable ASCII, no whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PartyId(String);

impl_validating_deserialize!(PartyId);

impl PartyId {
    /// Create a party principal from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidParty`] if the value is empty,
    /// longer than 128 characters, or contains non-printable or whitespace
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.len() > 128 || !s.chars().all(|c| c.is_ascii_graphic()) {
            return Err(ValidationError::InvalidParty(s));
        }
        Ok(Self(s))
    }

    /// Access the principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PartyId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

/// A unique identifier for a transaction log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random transaction identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a transaction identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// A unique identifier for a damage claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(Uuid);

impl ClaimId {
    /// Create a new random claim identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a claim identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "claim:{}", self.0)
    }
}
