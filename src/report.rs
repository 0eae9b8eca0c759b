//! Headless reports over saved plan snapshots.

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;

use canvas::doc::{Document, ElementKind, Orientation};
use canvas::export::{self, ExportError, ExportLayout, LegendEntry};
use canvas::hit::ApproxTextMeasure;
use canvas::persist::{self, PersistError};
use serde::Serialize;

/// Number of elements of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ElementCounts {
    pub walls: usize,
    pub doors: usize,
    pub windows: usize,
    pub shapes: usize,
    pub objects: usize,
    pub texts: usize,
}

impl ElementCounts {
    #[must_use]
    pub fn tally(doc: &Document) -> Self {
        let mut counts = Self::default();
        for el in doc.elements() {
            let slot = match el.kind() {
                ElementKind::Wall => &mut counts.walls,
                ElementKind::Door => &mut counts.doors,
                ElementKind::Window => &mut counts.windows,
                ElementKind::Shape => &mut counts.shapes,
                ElementKind::Object => &mut counts.objects,
                ElementKind::Text => &mut counts.texts,
            };
            *slot += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub project_name: String,
    pub orientation: Orientation,
    pub elements: usize,
    pub counts: ElementCounts,
}

#[must_use]
pub fn info(doc: &Document) -> PlanInfo {
    PlanInfo {
        project_name: doc.project_name.clone(),
        orientation: doc.orientation,
        elements: doc.len(),
        counts: ElementCounts::tally(doc),
    }
}

/// Content bounds and A4 placement, measuring text with the glyph estimate.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] when nothing on the plan has extent.
pub fn bounds(doc: &Document) -> Result<ExportLayout, ExportError> {
    ExportLayout::compute(doc, &ApproxTextMeasure)
}

#[must_use]
pub fn legend(doc: &Document) -> Vec<LegendEntry> {
    export::equipment_legend(doc)
}

/// What a repair pass changed, plus the repaired snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOutcome {
    /// Doors and windows dropped for lack of a host wall.
    pub dropped: usize,
    /// Doors and windows whose position was pulled back into `[0, 1]`.
    pub clamped: usize,
    #[serde(skip)]
    pub json: String,
}

/// Decode a raw snapshot, drop dangling doors and windows, clamp positions
/// and re-encode.
///
/// # Errors
///
/// Returns [`PersistError::Malformed`] when the input does not parse.
pub fn repair(json: &str) -> Result<RepairOutcome, PersistError> {
    let snapshot = persist::decode_snapshot(json)?;
    let clamped = snapshot
        .elements
        .iter()
        .filter_map(|el| el.as_insertable())
        .filter(|ins| !(0.0..=1.0).contains(&ins.position))
        .count();

    let mut doc = Document::from(snapshot);
    let dropped = doc.repair();
    tracing::info!(dropped, clamped, "repaired snapshot");
    Ok(RepairOutcome { dropped, clamped, json: persist::to_json(&doc)? })
}
