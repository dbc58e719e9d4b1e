//! Offline commands behind `shiftdesk-cli`. They work on JSON files and
//! never touch the database.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use shiftdesk_core::{PermissionCatalog, Role};
use shiftdesk_models::ids::{BusinessId, ShiftSlotId};
use shiftdesk_models::schedule::{
    CreateShiftSlotDto, EmployeeAvailability, ProposedShift, ShiftSlot, SlotCoverage,
    ValidationReport,
};
use validator::Validate;

use crate::modules::schedule::coverage::slot_coverage;
use crate::modules::schedule::validator::validate_schedule;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Catalog grouped by category, followed by each role's defaults.
pub fn render_catalog(catalog: &PermissionCatalog) -> String {
    let mut out = String::new();
    let mut current = None;

    for info in catalog.describe() {
        if current != Some(info.category) {
            let _ = writeln!(out, "{:?}", info.category);
            current = Some(info.category);
        }
        let _ = writeln!(out, "  {:<20} {}", info.id.as_str(), info.description);
    }

    for role in [Role::Admin, Role::Employee] {
        let defaults: Vec<&str> = catalog
            .role_defaults(role)
            .iter()
            .map(|p| p.as_str())
            .collect();
        let _ = writeln!(out, "\n{} defaults: {}", role.as_str(), defaults.join(", "));
    }

    out
}

pub fn validate(
    shifts: &[ProposedShift],
    employees: &[EmployeeAvailability],
) -> ValidationReport {
    validate_schedule(shifts, employees)
}

/// Slot definitions in a file carry no ids. Each gets a fixed id from its
/// position so colliding keys come out the same on every run.
pub fn slots_from_definitions(
    definitions: Vec<CreateShiftSlotDto>,
) -> anyhow::Result<Vec<ShiftSlot>> {
    definitions
        .into_iter()
        .enumerate()
        .map(|(i, dto)| {
            dto.validate()
                .with_context(|| format!("Invalid slot #{}", i + 1))?;
            Ok(ShiftSlot {
                id: ShiftSlotId::from_u128(i as u128 + 1),
                business_id: BusinessId::from_u128(0),
                day_of_week: dto.day_of_week,
                slot_name: dto.slot_name,
                start_time: dto.start_time,
                end_time: dto.end_time,
                required_count: dto.required_count,
            })
        })
        .collect()
}

pub fn coverage(
    shifts: &[ProposedShift],
    slots: &[ShiftSlot],
) -> BTreeMap<String, SlotCoverage> {
    slot_coverage(shifts, slots)
}

pub fn render_coverage(coverage: &BTreeMap<String, SlotCoverage>) -> String {
    let mut out = String::new();
    for (key, stats) in coverage {
        let marker = if stats.coverage_pct >= 100.0 { "ok " } else { "LOW" };
        let _ = writeln!(
            out,
            "{} {:<40} required {:>2}  scheduled {:>2}  {:>6.1}%",
            marker, key, stats.required, stats.scheduled, stats.coverage_pct
        );
    }
    out
}
