//! Vehicle archives: one car, one archive
//!
//! Every inspected vehicle has a single archive keyed by VIN that collects
//! the ids of its reports over time.

use crate::report::{link_to_archive, unlink, ReportResult};
use chrono::{DateTime, NaiveDate, Utc};
use inspect_core::{InspectError, InspectResult};
use serde::{Deserialize, Serialize};

pub const VIN_LENGTH: usize = 17;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveStatus {
    InStock,
    Sold,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleArchive {
    pub id: String,
    pub vin: String,
    pub brand: String,
    pub model: String,
    pub year: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default)]
    pub report_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_inspection_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ArchiveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleArchive {
    pub fn new(
        vin: &str,
        brand: impl Into<String>,
        model: impl Into<String>,
        year: u16,
    ) -> InspectResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: format!("arc-{}", uuid::Uuid::new_v4()),
            vin: normalize_vin(vin)?,
            brand: brand.into(),
            model: model.into(),
            year,
            color: None,
            plate_number: None,
            mileage: 0,
            report_ids: Vec::new(),
            last_inspection_date: None,
            status: ArchiveStatus::Unknown,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_plate(mut self, plate_number: impl Into<String>) -> Self {
        self.plate_number = Some(plate_number.into());
        self
    }

    pub fn with_mileage(mut self, mileage: u32) -> Self {
        self.mileage = mileage;
        self
    }

    pub fn has_report(&self, report_id: &str) -> bool {
        self.report_ids.iter().any(|r| r == report_id)
    }
}

/// Uppercase a VIN and check it: 17 characters, ASCII letters and digits,
/// no I, O or Q.
pub fn normalize_vin(vin: &str) -> InspectResult<String> {
    let vin = vin.trim().to_ascii_uppercase();
    if vin.chars().count() != VIN_LENGTH {
        return Err(InspectError::Validation(format!(
            "VIN '{}' must be {} characters",
            vin, VIN_LENGTH
        )));
    }
    if let Some(c) = vin
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() || matches!(c, 'I' | 'O' | 'Q'))
    {
        return Err(InspectError::Validation(format!("VIN '{}' contains '{}'", vin, c)));
    }
    Ok(vin)
}

#[derive(Debug, Default)]
pub struct ArchiveIndex {
    archives: Vec<VehicleArchive>,
}

impl ArchiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an archive; a second archive for the same VIN is a conflict
    pub fn insert(&mut self, archive: VehicleArchive) -> InspectResult<()> {
        if let Some(existing) = self.find_by_vin(&archive.vin) {
            return Err(InspectError::Conflict(format!(
                "VIN {} already archived as {}",
                archive.vin, existing.id
            )));
        }
        tracing::debug!(archive_id = %archive.id, vin = %archive.vin, "archive created");
        self.archives.push(archive);
        Ok(())
    }

    pub fn archives(&self) -> &[VehicleArchive] {
        &self.archives
    }

    pub fn get(&self, archive_id: &str) -> InspectResult<&VehicleArchive> {
        self.archives
            .iter()
            .find(|a| a.id == archive_id)
            .ok_or_else(|| InspectError::NotFound(format!("archive '{}'", archive_id)))
    }

    pub fn find_by_vin(&self, vin: &str) -> Option<&VehicleArchive> {
        let vin = vin.trim().to_ascii_uppercase();
        self.archives.iter().find(|a| a.vin == vin)
    }

    /// Case-insensitive substring match on VIN or plate number
    pub fn search(&self, query: &str) -> Vec<&VehicleArchive> {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return self.archives.iter().collect();
        }
        self.archives
            .iter()
            .filter(|a| {
                a.vin.contains(&query)
                    || a
                        .plate_number
                        .as_deref()
                        .map(|p| p.to_uppercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    /// Archive holding `report_id`, if any
    pub fn archive_of(&self, report_id: &str) -> Option<&VehicleArchive> {
        self.archives.iter().find(|a| a.has_report(report_id))
    }

    /// Attach a report to an archive. A report linked elsewhere must be
    /// unlinked first.
    pub fn link_report(
        &mut self,
        archive_id: &str,
        report: &mut ReportResult,
        inspected_on: NaiveDate,
    ) -> InspectResult<()> {
        if let Some(current) = report.archive_id.as_deref() {
            if current != archive_id {
                return Err(InspectError::Conflict(format!(
                    "report {} is linked to archive {}",
                    report.id, current
                )));
            }
        }

        let archive = self.get_mut(archive_id)?;
        link_to_archive(report, archive_id)?;
        if !archive.has_report(&report.id) {
            archive.report_ids.push(report.id.clone());
        }
        if archive.last_inspection_date.map_or(true, |d| d < inspected_on) {
            archive.last_inspection_date = Some(inspected_on);
        }
        archive.updated_at = Utc::now();

        tracing::info!(archive_id, report_id = %report.id, "report linked");
        Ok(())
    }

    /// Detach a report from its archive. False when it was not linked.
    /// An unknown archive leaves the report linked.
    pub fn unlink_report(&mut self, report: &mut ReportResult) -> InspectResult<bool> {
        let Some(archive_id) = report.archive_id.clone() else {
            return Ok(false);
        };
        let archive = self.get_mut(&archive_id)?;
        archive.report_ids.retain(|r| r != &report.id);
        archive.updated_at = Utc::now();
        unlink(report);

        tracing::info!(archive_id = %archive_id, report_id = %report.id, "report unlinked");
        Ok(true)
    }

    fn get_mut(&mut self, archive_id: &str) -> InspectResult<&mut VehicleArchive> {
        self.archives
            .iter_mut()
            .find(|a| a.id == archive_id)
            .ok_or_else(|| InspectError::NotFound(format!("archive '{}'", archive_id)))
    }
}
