use tracing::debug;

use crate::error::PipelineError;
use crate::table::{ColumnData, IncidentTable, SemanticType};

/// Assign a semantic type to every column, one pass, column independent.
///
/// Float storage stays numeric, parsed dates stay timestamps, booleans
/// stay boolean; everything else — text and integer columns alike,
/// including the derived `year`/`month` — becomes categorical. A column
/// whose every cell is missing carries no evidence for any type and is
/// surfaced as an error rather than silently defaulted.
///
/// Idempotent: a column that already carries a semantic type keeps it.
#[tracing::instrument(level = "info", skip(table))]
pub fn normalize_types(table: &mut IncidentTable) -> Result<(), PipelineError> {
    for column in table.columns_mut() {
        if column.semantic.is_some() {
            continue;
        }
        if !column.data.is_empty() && column.data.missing_count() == column.data.len() {
            return Err(PipelineError::TypeAssignment {
                column: column.name.clone(),
                reason: "every cell is missing; no observable type".into(),
            });
        }
        let semantic = match &column.data {
            ColumnData::Float(_) => SemanticType::Numeric,
            ColumnData::Date(_) => SemanticType::Timestamp,
            ColumnData::Bool(_) => SemanticType::Boolean,
            ColumnData::Int(_) | ColumnData::Text(_) => SemanticType::Categorical,
        };
        debug!(column = %column.name, semantic = ?semantic, "assigned semantic type");
        column.semantic = Some(semantic);
    }
    Ok(())
}
