use tracing::{debug, warn};

use crate::table::{ColumnData, IncidentTable, SemanticType};

/// Fill gaps per column according to its semantic type.
///
/// Numeric gaps take the arithmetic mean of the non-missing cells, so the
/// column mean is unchanged by imputation. Categorical gaps are
/// backward-filled: each gap takes the next later non-missing value in row
/// order; a trailing run with nothing after it stays missing and is only
/// logged. Boolean and timestamp columns are untouched. Existing values
/// are never altered, which also makes a rerun on already-filled data a
/// no-op.
///
/// Must run after the type normalizer; columns without a semantic type
/// are skipped.
#[tracing::instrument(level = "info", skip(table))]
pub fn impute_missing(table: &mut IncidentTable) {
    for column in table.columns_mut() {
        match (column.semantic, &mut column.data) {
            (Some(SemanticType::Numeric), ColumnData::Float(cells)) => {
                let (sum, count) = cells
                    .iter()
                    .flatten()
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if count == 0 {
                    continue;
                }
                let mean = sum / count as f64;
                let mut filled = 0usize;
                for cell in cells.iter_mut() {
                    if cell.is_none() {
                        *cell = Some(mean);
                        filled += 1;
                    }
                }
                if filled > 0 {
                    debug!(column = %column.name, filled, mean, "mean-filled numeric gaps");
                }
            }
            (Some(SemanticType::Categorical), ColumnData::Text(cells)) => {
                report_fill(&column.name, backward_fill(cells));
            }
            (Some(SemanticType::Categorical), ColumnData::Int(cells)) => {
                report_fill(&column.name, backward_fill(cells));
            }
            // boolean, timestamp, post-cast numeric ints: nothing to fill
            _ => {}
        }
    }
}

fn report_fill(column: &str, (filled, trailing): (usize, usize)) {
    if filled > 0 {
        debug!(column, filled, "backward-filled categorical gaps");
    }
    if trailing > 0 {
        warn!(
            column,
            trailing, "trailing missing run has no later value; left unfilled"
        );
    }
}

/// Backward fill in place; returns (filled, trailing-left-missing) counts.
fn backward_fill<T: Clone>(cells: &mut [Option<T>]) -> (usize, usize) {
    let mut filled = 0;
    let mut trailing = 0;
    let mut next: Option<T> = None;
    for cell in cells.iter_mut().rev() {
        match cell {
            Some(value) => next = Some(value.clone()),
            None => match &next {
                Some(value) => {
                    *cell = Some(value.clone());
                    filled += 1;
                }
                None => trailing += 1,
            },
        }
    }
    (filled, trailing)
}
