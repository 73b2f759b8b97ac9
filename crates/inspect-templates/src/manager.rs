//! Template variant manager
//!
//! Listing, activation, deletion and content saves over a [`VariantStore`].
//! Activation is a compare-and-swap on the vehicle type's [`ActiveSlot`]:
//! two racing activations cannot both win, the loser gets a `Conflict`.

use crate::store::VariantStore;
use crate::variant::{ActiveSlot, TemplateVariant};
use chrono::Utc;
use inspect_checklist::Checklist;
use inspect_core::{CategoryDefinition, InspectError, InspectResult, VehicleType};

pub struct TemplateManager<S: VariantStore> {
    store: S,
}

impl<S: VariantStore> TemplateManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All variants, any status
    pub fn list_variants(&self) -> InspectResult<Vec<TemplateVariant>> {
        self.store.load_variants()
    }

    /// Variants for one vehicle type
    pub fn list_for(&self, vehicle_type: VehicleType) -> InspectResult<Vec<TemplateVariant>> {
        Ok(self
            .store
            .load_variants()?
            .into_iter()
            .filter(|v| v.vehicle_type == vehicle_type)
            .collect())
    }

    pub fn get(&self, variant_id: &str) -> InspectResult<TemplateVariant> {
        self.store
            .load_variant(variant_id)?
            .ok_or_else(|| InspectError::NotFound(format!("template '{}'", variant_id)))
    }

    /// Create and persist a new inactive variant
    pub fn create(
        &self,
        name: impl Into<String>,
        vehicle_type: VehicleType,
        categories: Vec<CategoryDefinition>,
    ) -> InspectResult<TemplateVariant> {
        self.save(TemplateVariant::new(name, vehicle_type, categories))
    }

    /// Create a variant holding a copy of the checklist
    pub fn create_from_checklist(
        &self,
        name: impl Into<String>,
        vehicle_type: VehicleType,
        checklist: &Checklist,
    ) -> InspectResult<TemplateVariant> {
        self.save(TemplateVariant::from_checklist(name, vehicle_type, checklist))
    }

    /// Make `variant_id` the only active variant of its vehicle type
    pub fn activate(&self, variant_id: &str) -> InspectResult<()> {
        let variant = self.get(variant_id)?;
        let prior = self.store.active_slot(variant.vehicle_type)?;
        if prior.is(variant_id) {
            return Ok(());
        }
        self.activate_if(variant_id, &prior)
    }

    /// Activate only if the vehicle type's slot still equals `expected`
    pub fn activate_if(&self, variant_id: &str, expected: &ActiveSlot) -> InspectResult<()> {
        let variant = self.get(variant_id)?;
        let next = ActiveSlot::Active(variant.id.clone());

        if !self.store.swap_active(variant.vehicle_type, expected, next)? {
            tracing::warn!(
                variant_id,
                vehicle_type = %variant.vehicle_type,
                "activation lost to a concurrent change"
            );
            return Err(InspectError::Conflict(format!(
                "active template for {} changed while activating '{}'",
                variant.vehicle_type, variant_id
            )));
        }

        tracing::info!(
            variant_id,
            vehicle_type = %variant.vehicle_type,
            previous = expected.variant_id().unwrap_or("none"),
            "template activated"
        );
        Ok(())
    }

    /// Mark a variant inactive; a no-op when it already is
    pub fn deactivate(&self, variant_id: &str) -> InspectResult<()> {
        let variant = self.get(variant_id)?;
        let current = self.store.active_slot(variant.vehicle_type)?;
        if !current.is(variant_id) {
            return Ok(());
        }

        if !self
            .store
            .swap_active(variant.vehicle_type, &current, ActiveSlot::NoneActive)?
            && self.store.active_slot(variant.vehicle_type)?.is(variant_id)
        {
            return Err(InspectError::Conflict(format!(
                "active template for {} changed while deactivating '{}'",
                variant.vehicle_type, variant_id
            )));
        }

        tracing::info!(variant_id, vehicle_type = %variant.vehicle_type, "template deactivated");
        Ok(())
    }

    /// Delete an inactive variant
    pub fn delete(&self, variant_id: &str) -> InspectResult<()> {
        let variant = self.get(variant_id)?;
        if self.store.active_slot(variant.vehicle_type)?.is(variant_id) {
            return Err(InspectError::Conflict(format!(
                "template '{}' is active; deactivate it before deleting",
                variant_id
            )));
        }
        if !self.store.delete_variant(variant_id)? {
            return Err(InspectError::NotFound(format!("template '{}'", variant_id)));
        }
        tracing::info!(variant_id, "template deleted");
        Ok(())
    }

    /// Validate and persist the whole variant, bumping `updated_at`.
    /// Activation state is left as the store has it.
    pub fn save(&self, mut variant: TemplateVariant) -> InspectResult<TemplateVariant> {
        variant.validate()?;
        variant.updated_at = Utc::now();
        self.store.save_variant(&variant)?;
        tracing::debug!(
            variant_id = %variant.id,
            fields = variant.field_count(),
            "template saved"
        );
        self.get(&variant.id)
    }

    /// Load a variant, apply `edit` to it and save the result
    pub fn edit<T>(
        &self,
        variant_id: &str,
        edit: impl FnOnce(&mut TemplateVariant) -> InspectResult<T>,
    ) -> InspectResult<T> {
        let mut variant = self.get(variant_id)?;
        let out = edit(&mut variant)?;
        self.save(variant)?;
        Ok(out)
    }

    /// The active variant of a vehicle type, if any
    pub fn active_for(&self, vehicle_type: VehicleType) -> InspectResult<Option<TemplateVariant>> {
        match self.store.active_slot(vehicle_type)? {
            ActiveSlot::Active(id) => self.store.load_variant(&id),
            ActiveSlot::NoneActive => Ok(None),
        }
    }

    /// Categories an inspection should use: the active variant's, else the checklist's
    pub fn resolve_categories(
        &self,
        vehicle_type: VehicleType,
        checklist: &Checklist,
    ) -> InspectResult<Vec<CategoryDefinition>> {
        Ok(match self.active_for(vehicle_type)? {
            Some(variant) => variant.categories,
            None => checklist.categories().to_vec(),
        })
    }
}
