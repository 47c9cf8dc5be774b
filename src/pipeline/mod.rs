pub mod dates;
pub mod impute;
pub mod load;
pub mod normalize;

use std::path::Path;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::table::{ColumnData, IncidentTable, SemanticType};

/// Run the whole cleaning pipeline against the incident CSV at `path` and
/// return the finished, owned table.
///
/// Stage order matters: date features are derived before normalization so
/// the new columns get classified, and imputation runs after normalization
/// because the fill strategy depends on the assigned semantic type. The
/// caller passes the returned table on to the rendering layer explicitly;
/// nothing is stashed in global state.
pub fn run<P: AsRef<Path>>(
    path: P,
    config: &PipelineConfig,
) -> Result<IncidentTable, PipelineError> {
    let mut table = load::load_csv(path)?;
    info!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "loaded incident table"
    );

    dates::extract_date_features(&mut table, config)?;
    normalize::normalize_types(&mut table)?;
    impute::impute_missing(&mut table);
    cast_integer_columns(&mut table, config)?;

    info!(columns = table.num_columns(), "cleaning pipeline complete");
    Ok(table)
}

/// Final numeric cast: truncate configured numeric columns from float to
/// integer storage. Runs after imputation, so an imputed mean of 42.5
/// lands as 42. The semantic type stays numeric.
pub fn cast_integer_columns(
    table: &mut IncidentTable,
    config: &PipelineConfig,
) -> Result<(), PipelineError> {
    for name in &config.integer_columns {
        let column = table
            .column_mut(name)
            .ok_or_else(|| PipelineError::TypeAssignment {
                column: name.clone(),
                reason: "configured integer column not present in the table".into(),
            })?;
        if column.semantic != Some(SemanticType::Numeric) {
            return Err(PipelineError::TypeAssignment {
                column: name.clone(),
                reason: "integer cast requires a numeric column".into(),
            });
        }
        if let ColumnData::Float(cells) = &column.data {
            let ints = cells.iter().map(|c| c.map(|v| v.trunc() as i64)).collect();
            column.data = ColumnData::Int(ints);
            debug!(column = %name, "cast numeric column to integer storage");
        }
        // already integer storage: nothing to do
    }
    Ok(())
}
