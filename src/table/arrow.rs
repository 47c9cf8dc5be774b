use anyhow::{anyhow, Result};
use arrow::{
    array::{
        ArrayRef, BooleanBuilder, Date32Builder, Float64Builder, Int64Builder,
        StringDictionaryBuilder,
    },
    datatypes::{DataType, Field, Int32Type, Schema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use super::{Column, ColumnData, IncidentTable, SemanticType};

/// Map a column's semantic type + storage into an Arrow DataType.
///
/// - Numeric / float storage → Float64
/// - Numeric / integer storage (post-cast) → Int64
/// - Categorical → Dictionary(Int32, Utf8), the finite label set
/// - Boolean → Boolean
/// - Timestamp → Date32 (the source carries dates, not times)
pub fn map_to_arrow_type(semantic: SemanticType, data: &ColumnData) -> DataType {
    match (semantic, data) {
        (SemanticType::Numeric, ColumnData::Int(_)) => DataType::Int64,
        (SemanticType::Numeric, _) => DataType::Float64,
        (SemanticType::Categorical, _) => {
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
        }
        (SemanticType::Boolean, _) => DataType::Boolean,
        (SemanticType::Timestamp, _) => DataType::Date32,
    }
}

/// Build the read-only `RecordBatch` handed to the rendering layer from a
/// finished incident table. Every column must already carry a semantic
/// type, i.e. the pipeline must have run to completion.
pub fn to_record_batch(table: &IncidentTable) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for column in table.columns() {
        let semantic = column.semantic.ok_or_else(|| {
            anyhow!(
                "column `{}` has no semantic type; run the pipeline first",
                column.name
            )
        })?;
        fields.push(Field::new(
            &column.name,
            map_to_arrow_type(semantic, &column.data),
            true,
        ));
        arrays.push(build_array(column, semantic)?);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(Into::into)
}

fn build_array(column: &Column, semantic: SemanticType) -> Result<ArrayRef> {
    let array: ArrayRef = match (semantic, &column.data) {
        (SemanticType::Numeric, ColumnData::Float(cells)) => {
            let mut b = Float64Builder::new();
            for cell in cells {
                b.append_option(*cell);
            }
            Arc::new(b.finish())
        }
        (SemanticType::Numeric, ColumnData::Int(cells)) => {
            let mut b = Int64Builder::new();
            for cell in cells {
                b.append_option(*cell);
            }
            Arc::new(b.finish())
        }
        (SemanticType::Categorical, ColumnData::Text(cells)) => {
            let mut b = StringDictionaryBuilder::<Int32Type>::new();
            for cell in cells {
                b.append_option(cell.as_deref());
            }
            Arc::new(b.finish())
        }
        (SemanticType::Categorical, ColumnData::Int(cells)) => {
            let mut b = StringDictionaryBuilder::<Int32Type>::new();
            for cell in cells {
                b.append_option(cell.map(|v| v.to_string()));
            }
            Arc::new(b.finish())
        }
        (SemanticType::Boolean, ColumnData::Bool(cells)) => {
            let mut b = BooleanBuilder::new();
            for cell in cells {
                b.append_option(*cell);
            }
            Arc::new(b.finish())
        }
        (SemanticType::Timestamp, ColumnData::Date(cells)) => {
            let mut b = Date32Builder::new();
            for cell in cells {
                b.append_option(cell.map(days_from_epoch));
            }
            Arc::new(b.finish())
        }
        (semantic, data) => {
            return Err(anyhow!(
                "column `{}` storage `{}` does not match semantic type {:?}",
                column.name,
                data.kind_name(),
                semantic
            ))
        }
    };
    Ok(array)
}

fn days_from_epoch(d: NaiveDate) -> i32 {
    // 1970-01-01 is day 719,163 of the common era
    d.num_days_from_ce() - 719_163
}
