//! # Property Registry
//!
//! Stores property metadata. Properties are registered and owned by
//! landlords, independent of any agreement; agreements reference a
//! property but never own it.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use tenancy_core::{CallContext, PartyId, PropertyId, Timestamp};

use crate::error::ConditionError;

/// The category of a registered property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Apartment,
    House,
    Townhouse,
    Studio,
    Commercial,
}

impl PropertyType {
    /// The canonical string name of this property type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Townhouse => "townhouse",
            Self::Studio => "studio",
            Self::Commercial => "commercial",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a property is available for new agreements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyStatus {
    Active,
    Inactive,
}

impl PropertyStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    /// The landlord who registered the property.
    pub owner: PartyId,
    pub address: String,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub registered_at: Timestamp,
    pub status: PropertyStatus,
}

/// In-memory property registry, keyed by [`PropertyId`].
pub struct PropertyRegistry {
    properties: DashMap<PropertyId, Property>,
}

impl PropertyRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            properties: DashMap::new(),
        }
    }

    /// Register a property. The caller becomes its owner.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::AlreadyExists`] if `id` is taken.
    pub fn register_property(
        &self,
        ctx: &CallContext,
        id: PropertyId,
        address: String,
        property_type: PropertyType,
        bedrooms: u32,
        bathrooms: u32,
    ) -> Result<Property, ConditionError> {
        match self.properties.entry(id.clone()) {
            Entry::Occupied(_) => Err(ConditionError::AlreadyExists {
                entity: "property",
                id: id.to_string(),
            }),
            Entry::Vacant(slot) => {
                let property = Property {
                    id: id.clone(),
                    owner: ctx.caller.clone(),
                    address,
                    property_type,
                    bedrooms,
                    bathrooms,
                    registered_at: ctx.now,
                    status: PropertyStatus::Active,
                };
                slot.insert(property.clone());
                tracing::info!(property = %id, owner = %ctx.caller, "property registered");
                Ok(property)
            }
        }
    }

    /// Get a property by id.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError::NotFound`] if absent.
    pub fn get_property(&self, id: &PropertyId) -> Result<Property, ConditionError> {
        self.properties
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ConditionError::NotFound {
                entity: "property",
                id: id.to_string(),
            })
    }

    /// Take a property off the market.
    ///
    /// # Errors
    ///
    /// - [`ConditionError::NotFound`] if absent.
    /// - [`ConditionError::Unauthorized`] unless the caller is the owner.
    /// - [`ConditionError::InvalidState`] if already inactive.
    pub fn deactivate_property(
        &self,
        ctx: &CallContext,
        id: &PropertyId,
    ) -> Result<Property, ConditionError> {
        self.set_status(ctx, id, PropertyStatus::Inactive)
    }

    /// Return a property to the market.
    ///
    /// # Errors
    ///
    /// Same as [`deactivate_property`](Self::deactivate_property), with
    /// [`ConditionError::InvalidState`] if already active.
    pub fn reactivate_property(
        &self,
        ctx: &CallContext,
        id: &PropertyId,
    ) -> Result<Property, ConditionError> {
        self.set_status(ctx, id, PropertyStatus::Active)
    }

    fn set_status(
        &self,
        ctx: &CallContext,
        id: &PropertyId,
        target: PropertyStatus,
    ) -> Result<Property, ConditionError> {
        let mut entry = self
            .properties
            .get_mut(id)
            .ok_or_else(|| ConditionError::NotFound {
                entity: "property",
                id: id.to_string(),
            })?;
        let property = entry.value_mut();

        if property.owner != ctx.caller {
            return Err(ConditionError::Unauthorized {
                caller: ctx.caller.clone(),
                required: "owner of the property",
            });
        }
        if property.status == target {
            return Err(ConditionError::InvalidState {
                operation: "set_property_status",
                reason: format!("property is already {target}"),
            });
        }

        property.status = target;
        Ok(property.clone())
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("properties", &self.properties.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(caller: &str, secs: i64) -> CallContext {
        CallContext::new(
            PartyId::new(caller).unwrap(),
            Timestamp::from_epoch_secs(secs).unwrap(),
        )
    }

    fn register(registry: &PropertyRegistry) -> Property {
        registry
            .register_property(
                &ctx("landlord-1", 1_622_505_600),
                PropertyId::new("property-001").unwrap(),
                "123 Main St, Apt 4B, New York, NY 10001".to_string(),
                PropertyType::Apartment,
                2,
                1,
            )
            .unwrap()
    }

    #[test]
    fn register_and_get() {
        let registry = PropertyRegistry::new();
        let property = register(&registry);
        assert_eq!(property.owner, PartyId::new("landlord-1").unwrap());
        assert_eq!(property.status, PropertyStatus::Active);
        assert_eq!(property.bedrooms, 2);
        assert_eq!(property.bathrooms, 1);

        let fetched = registry
            .get_property(&PropertyId::new("property-001").unwrap())
            .unwrap();
        assert_eq!(fetched, property);
    }

    #[test]
    fn duplicate_id_rejected() {
        let registry = PropertyRegistry::new();
        register(&registry);
        let result = registry.register_property(
            &ctx("landlord-2", 0),
            PropertyId::new("property-001").unwrap(),
            "elsewhere".to_string(),
            PropertyType::House,
            3,
            2,
        );
        assert!(matches!(result, Err(ConditionError::AlreadyExists { .. })));
        // First registration untouched.
        let kept = registry
            .get_property(&PropertyId::new("property-001").unwrap())
            .unwrap();
        assert_eq!(kept.owner, PartyId::new("landlord-1").unwrap());
    }

    #[test]
    fn get_missing_returns_not_found() {
        let registry = PropertyRegistry::new();
        let result = registry.get_property(&PropertyId::new("nope").unwrap());
        assert!(matches!(result, Err(ConditionError::NotFound { .. })));
    }

    #[test]
    fn deactivate_then_reactivate() {
        let registry = PropertyRegistry::new();
        register(&registry);
        let id = PropertyId::new("property-001").unwrap();

        let inactive = registry.deactivate_property(&ctx("landlord-1", 1), &id).unwrap();
        assert_eq!(inactive.status, PropertyStatus::Inactive);

        let twice = registry.deactivate_property(&ctx("landlord-1", 2), &id);
        assert!(matches!(twice, Err(ConditionError::InvalidState { .. })));

        let active = registry.reactivate_property(&ctx("landlord-1", 3), &id).unwrap();
        assert_eq!(active.status, PropertyStatus::Active);
    }

    #[test]
    fn status_changes_require_owner() {
        let registry = PropertyRegistry::new();
        register(&registry);
        let result = registry.deactivate_property(
            &ctx("stranger", 1),
            &PropertyId::new("property-001").unwrap(),
        );
        assert!(matches!(result, Err(ConditionError::Unauthorized { .. })));
    }

    #[test]
    fn type_and_status_strings() {
        assert_eq!(PropertyType::Apartment.as_str(), "apartment");
        assert_eq!(PropertyType::Commercial.as_str(), "commercial");
        assert_eq!(PropertyStatus::Active.as_str(), "active");
        assert_eq!(PropertyStatus::Inactive.as_str(), "inactive");
    }

    #[test]
    fn property_serde_roundtrip() {
        let registry = PropertyRegistry::new();
        let property = register(&registry);
        let json = serde_json::to_string(&property).unwrap();
        let back: Property = serde_json::from_str(&json).unwrap();
        assert_eq!(property, back);
    }
}
