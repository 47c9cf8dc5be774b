use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::PipelineError;
use crate::table::{Column, ColumnData, IncidentTable};

/// Cell spellings treated as a missing value, per the usual conventions
/// for NA markers in delimited files.
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "null"];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(cell))
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Primitive type observed in a single cell. Column-level inference folds
/// these across all rows; any conflict other than int/float demotes the
/// column to text, the same way inconsistent samples fall back to utf8
/// when deriving schemas from raw feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_kind(cell: &str) -> RawKind {
    if cell.parse::<i64>().is_ok() {
        RawKind::Int
    } else if cell.parse::<f64>().is_ok() {
        RawKind::Float
    } else if parse_bool(cell).is_some() {
        RawKind::Bool
    } else {
        RawKind::Text
    }
}

fn combine(a: RawKind, b: RawKind) -> RawKind {
    use RawKind::*;
    match (a, b) {
        (x, y) if x == y => x,
        (Int, Float) | (Float, Int) => Float,
        _ => Text,
    }
}

/// Read the incident CSV at `path` into an `IncidentTable`.
///
/// The header row names the columns; every data row must have the same
/// field count. Per-column primitive types are inferred from the observed
/// cells, with one widening rule: an integer column containing any missing
/// cell is stored as float, so the imputer can mean-fill it later.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<IncidentTable, PipelineError> {
    let path_buf = path.as_ref().to_path_buf();
    let load_err = |reason: String| PipelineError::Load {
        path: path_buf.clone(),
        reason,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path_buf)
        .map_err(|e| load_err(e.to_string()))?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| load_err(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(load_err("header row is empty or missing".into()));
    }
    if let Some(idx) = headers.iter().position(|h| h.is_empty()) {
        return Err(load_err(format!("header at index {} is empty", idx)));
    }

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| load_err(format!("record {}: {}", idx, e)))?;
        rows.push(record);
    }

    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<Option<&str>> = rows
            .iter()
            .map(|r| {
                let cell = r.get(idx).unwrap_or("");
                if is_missing(cell) {
                    None
                } else {
                    Some(cell)
                }
            })
            .collect();
        let missing = cells.iter().filter(|c| c.is_none()).count();

        let mut kind: Option<RawKind> = None;
        for cell in cells.iter().flatten() {
            let observed = infer_kind(cell);
            kind = Some(match kind {
                None => observed,
                Some(prev) => combine(prev, observed),
            });
            if kind == Some(RawKind::Text) {
                break;
            }
        }

        // An all-missing column carries no evidence; the normalizer
        // surfaces it as a type-assignment failure.
        let mut kind = kind.unwrap_or(RawKind::Text);
        if kind == RawKind::Int && missing > 0 {
            kind = RawKind::Float;
        }

        debug!(column = %name, kind = ?kind, missing, "inferred primitive type");

        let data = match kind {
            RawKind::Int => {
                ColumnData::Int(cells.iter().map(|c| c.and_then(|s| s.parse().ok())).collect())
            }
            RawKind::Float => {
                ColumnData::Float(cells.iter().map(|c| c.and_then(|s| s.parse().ok())).collect())
            }
            RawKind::Bool => {
                ColumnData::Bool(cells.iter().map(|c| c.and_then(parse_bool)).collect())
            }
            RawKind::Text => {
                ColumnData::Text(cells.iter().map(|c| c.map(str::to_string)).collect())
            }
        };
        columns.push(Column::new(name.clone(), data));
    }

    Ok(IncidentTable::new(columns))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    pub(crate) fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,incidents=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    pub(crate) fn write_csv(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }

    #[test]
    fn loads_rows_and_headers_exactly() -> Result<()> {
        init_test_logging();
        let tmp = write_csv(
            "id,date,armed,age,body_camera\n\
             3,2015-01-02,gun,53,False\n\
             4,2015-01-02,gun,47,False\n\
             8,2015-01-04,unarmed,,True\n",
        )?;

        let table = load_csv(tmp.path())?;
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 5);
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "date", "armed", "age", "body_camera"]);
        Ok(())
    }

    #[test]
    fn infers_primitive_types_with_widening() -> Result<()> {
        init_test_logging();
        let tmp = write_csv(
            "id,date,armed,age,body_camera\n\
             3,2015-01-02,gun,53,False\n\
             4,2015-01-02,gun,47,False\n\
             8,2015-01-04,unarmed,,True\n",
        )?;

        let table = load_csv(tmp.path())?;
        // fully-populated integers stay integer
        assert!(matches!(
            table.column("id").unwrap().data,
            ColumnData::Int(_)
        ));
        // a gap widens the numeric column to float
        assert_eq!(
            table.column("age").unwrap().data,
            ColumnData::Float(vec![Some(53.0), Some(47.0), None])
        );
        assert_eq!(
            table.column("body_camera").unwrap().data,
            ColumnData::Bool(vec![Some(false), Some(false), Some(true)])
        );
        assert!(matches!(
            table.column("armed").unwrap().data,
            ColumnData::Text(_)
        ));
        Ok(())
    }

    #[test]
    fn mixed_values_demote_to_text() -> Result<()> {
        let tmp = write_csv("flag\n1\nTrue\n")?;
        let table = load_csv(tmp.path())?;
        assert_eq!(
            table.column("flag").unwrap().data,
            ColumnData::Text(vec![Some("1".into()), Some("True".into())])
        );
        Ok(())
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_csv("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
    }

    #[test]
    fn ragged_rows_are_a_load_error() -> Result<()> {
        let tmp = write_csv("a,b,c\n1,2,3\n4,5\n")?;
        let err = load_csv(tmp.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
        Ok(())
    }

    #[test]
    fn empty_header_cell_is_a_load_error() -> Result<()> {
        let tmp = write_csv("a,,c\n1,2,3\n")?;
        let err = load_csv(tmp.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Load { .. }));
        Ok(())
    }
}
