//! Persistence seam for template variants
//!
//! The store owns the per-vehicle-type [`ActiveSlot`]s. A variant's
//! `status` is derived from them on every read, so the single-active rule
//! holds as long as slots only change through [`VariantStore::swap_active`].

use crate::variant::{ActiveSlot, TemplateStatus, TemplateVariant};
use inspect_core::{InspectError, InspectResult, VehicleType};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Persistence collaborator for template variants.
///
/// Implementations must be atomic per record and must execute
/// `swap_active` as a single compare-and-swap.
pub trait VariantStore: Send + Sync {
    /// All variants in insertion order, any status
    fn load_variants(&self) -> InspectResult<Vec<TemplateVariant>>;

    fn load_variant(&self, id: &str) -> InspectResult<Option<TemplateVariant>>;

    /// Insert or replace a variant's content. `status` is ignored.
    fn save_variant(&self, variant: &TemplateVariant) -> InspectResult<()>;

    /// Remove a variant. Fails with `Conflict` while it holds its active slot.
    /// Returns false when there was nothing to remove.
    fn delete_variant(&self, id: &str) -> InspectResult<bool>;

    fn active_slot(&self, vehicle_type: VehicleType) -> InspectResult<ActiveSlot>;

    /// Set the slot to `next` only if it still equals `expected`.
    /// Returns false when another writer changed it first.
    fn swap_active(&self, vehicle_type: VehicleType, expected: &ActiveSlot, next: ActiveSlot) -> InspectResult<bool>;
}

impl<T: VariantStore + ?Sized> VariantStore for Arc<T> {
    fn load_variants(&self) -> InspectResult<Vec<TemplateVariant>> {
        (**self).load_variants()
    }

    fn load_variant(&self, id: &str) -> InspectResult<Option<TemplateVariant>> {
        (**self).load_variant(id)
    }

    fn save_variant(&self, variant: &TemplateVariant) -> InspectResult<()> {
        (**self).save_variant(variant)
    }

    fn delete_variant(&self, id: &str) -> InspectResult<bool> {
        (**self).delete_variant(id)
    }

    fn active_slot(&self, vehicle_type: VehicleType) -> InspectResult<ActiveSlot> {
        (**self).active_slot(vehicle_type)
    }

    fn swap_active(&self, vehicle_type: VehicleType, expected: &ActiveSlot, next: ActiveSlot) -> InspectResult<bool> {
        (**self).swap_active(vehicle_type, expected, next)
    }
}

#[derive(Debug, Default)]
struct Tables {
    variants: Vec<TemplateVariant>,
    slots: HashMap<VehicleType, ActiveSlot>,
}

impl Tables {
    fn slot(&self, vehicle_type: VehicleType) -> ActiveSlot {
        self.slots.get(&vehicle_type).cloned().unwrap_or_default()
    }

    fn materialize(&self, variant: &TemplateVariant) -> TemplateVariant {
        let mut variant = variant.clone();
        variant.status = if self.slot(variant.vehicle_type).is(&variant.id) {
            TemplateStatus::Active
        } else {
            TemplateStatus::Inactive
        };
        variant
    }
}

/// In-memory store, shareable across threads
#[derive(Debug, Default)]
pub struct MemoryVariantStore {
    tables: RwLock<Tables>,
}

impl MemoryVariantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store; variants marked active claim their slot in order,
    /// so a later active sibling wins.
    pub fn with_variants(variants: Vec<TemplateVariant>) -> Self {
        let mut tables = Tables::default();
        for variant in variants {
            if variant.is_active() {
                tables
                    .slots
                    .insert(variant.vehicle_type, ActiveSlot::Active(variant.id.clone()));
            }
            tables.variants.push(variant);
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    fn read(&self) -> InspectResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| InspectError::Storage("variant store lock poisoned".to_string()))
    }

    fn write(&self) -> InspectResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| InspectError::Storage("variant store lock poisoned".to_string()))
    }
}

impl VariantStore for MemoryVariantStore {
    fn load_variants(&self) -> InspectResult<Vec<TemplateVariant>> {
        let tables = self.read()?;
        Ok(tables.variants.iter().map(|v| tables.materialize(v)).collect())
    }

    fn load_variant(&self, id: &str) -> InspectResult<Option<TemplateVariant>> {
        let tables = self.read()?;
        Ok(tables.variants.iter().find(|v| v.id == id).map(|v| tables.materialize(v)))
    }

    fn save_variant(&self, variant: &TemplateVariant) -> InspectResult<()> {
        let mut tables = self.write()?;
        match tables.variants.iter().position(|v| v.id == variant.id) {
            Some(index) => {
                let previous = &tables.variants[index];
                if previous.vehicle_type != variant.vehicle_type
                    && tables.slot(previous.vehicle_type).is(&variant.id)
                {
                    return Err(InspectError::Conflict(format!(
                        "template '{}' is active for {} and cannot change vehicle type",
                        variant.id, previous.vehicle_type
                    )));
                }
                tables.variants[index] = variant.clone();
            }
            None => tables.variants.push(variant.clone()),
        }
        Ok(())
    }

    fn delete_variant(&self, id: &str) -> InspectResult<bool> {
        let mut tables = self.write()?;
        let Some(index) = tables.variants.iter().position(|v| v.id == id) else {
            return Ok(false);
        };
        if tables.slot(tables.variants[index].vehicle_type).is(id) {
            return Err(InspectError::Conflict(format!(
                "template '{}' is active; deactivate it before deleting",
                id
            )));
        }
        tables.variants.remove(index);
        Ok(true)
    }

    fn active_slot(&self, vehicle_type: VehicleType) -> InspectResult<ActiveSlot> {
        Ok(self.read()?.slot(vehicle_type))
    }

    fn swap_active(&self, vehicle_type: VehicleType, expected: &ActiveSlot, next: ActiveSlot) -> InspectResult<bool> {
        let mut tables = self.write()?;
        if &tables.slot(vehicle_type) != expected {
            return Ok(false);
        }
        if let ActiveSlot::Active(id) = &next {
            let variant = tables
                .variants
                .iter()
                .find(|v| &v.id == id)
                .ok_or_else(|| InspectError::NotFound(format!("template '{}'", id)))?;
            if variant.vehicle_type != vehicle_type {
                return Err(InspectError::Validation(format!(
                    "template '{}' is for {}, not {}",
                    id, variant.vehicle_type, vehicle_type
                )));
            }
        }
        tables.slots.insert(vehicle_type, next);
        Ok(true)
    }
}
