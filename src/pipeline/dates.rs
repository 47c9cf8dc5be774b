use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::table::{Column, ColumnData, IncidentTable};

/// Calendar feature columns derived from the designated date column.
pub const YEAR_COLUMN: &str = "year";
pub const MONTH_COLUMN: &str = "month";
pub const DAY_NAME_COLUMN: &str = "day_name";

const DASH_FMT: &str = "%Y-%m-%d";
const SLASH_FMT: &str = "%Y/%m/%d";

/// Parse `"YYYY-MM-DD"` or `"YYYY/MM/DD"` into a calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DASH_FMT)
        .or_else(|_| NaiveDate::parse_from_str(s, SLASH_FMT))
        .ok()
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse every configured date column into timestamp cells, then derive
/// `year`, `month` and `day_name` from the designated date column.
///
/// Parsing is strict: one unparseable non-missing cell fails the whole
/// stage. The derived columns always come from the single designated
/// column named in the config, regardless of how many date columns were
/// parsed. Runs before type normalization so the new columns get
/// classified with everything else.
#[tracing::instrument(level = "info", skip(table, config))]
pub fn extract_date_features(
    table: &mut IncidentTable,
    config: &PipelineConfig,
) -> Result<(), PipelineError> {
    for name in &config.date_columns {
        let column = table
            .column_mut(name)
            .ok_or_else(|| PipelineError::TypeAssignment {
                column: name.clone(),
                reason: "configured date column not present in the table".into(),
            })?;

        let cells = match &column.data {
            ColumnData::Text(cells) => cells,
            // already parsed on a previous run
            ColumnData::Date(_) => continue,
            other => {
                return Err(PipelineError::TypeAssignment {
                    column: name.clone(),
                    reason: format!("cannot parse {} storage as dates", other.kind_name()),
                })
            }
        };

        let mut parsed = Vec::with_capacity(cells.len());
        for (row, cell) in cells.iter().enumerate() {
            match cell {
                None => parsed.push(None),
                Some(value) => match parse_date(value) {
                    Some(date) => parsed.push(Some(date)),
                    None => {
                        return Err(PipelineError::Parse {
                            column: name.clone(),
                            row,
                            value: value.clone(),
                        })
                    }
                },
            }
        }
        debug!(column = %name, rows = parsed.len(), "parsed date column");
        column.data = ColumnData::Date(parsed);
    }

    let designated = &config.designated_date_column;
    let dates = match table.column(designated).map(|c| &c.data) {
        Some(ColumnData::Date(dates)) => dates.clone(),
        Some(_) => {
            return Err(PipelineError::TypeAssignment {
                column: designated.clone(),
                reason: "designated date column was not parsed; add it to date_columns".into(),
            })
        }
        None => {
            return Err(PipelineError::TypeAssignment {
                column: designated.clone(),
                reason: "designated date column not present in the table".into(),
            })
        }
    };

    let years = dates.iter().map(|d| d.map(|d| d.year() as i64)).collect();
    let months = dates.iter().map(|d| d.map(|d| d.month() as i64)).collect();
    let days = dates
        .iter()
        .map(|d| d.map(|d| day_name(d.weekday()).to_string()))
        .collect();

    table.upsert_column(Column::new(YEAR_COLUMN, ColumnData::Int(years)));
    table.upsert_column(Column::new(MONTH_COLUMN, ColumnData::Int(months)));
    table.upsert_column(Column::new(DAY_NAME_COLUMN, ColumnData::Text(days)));
    debug!(designated = %designated, "derived calendar feature columns");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_dates(cells: Vec<Option<&str>>) -> IncidentTable {
        IncidentTable::new(vec![Column::new(
            "date",
            ColumnData::Text(cells.into_iter().map(|c| c.map(str::to_string)).collect()),
        )])
    }

    #[test]
    fn derives_year_month_and_day_name() {
        let mut table = table_with_dates(vec![Some("2021-03-15"), Some("2015/01/04")]);
        extract_date_features(&mut table, &PipelineConfig::default()).unwrap();

        assert_eq!(
            table.column(YEAR_COLUMN).unwrap().data,
            ColumnData::Int(vec![Some(2021), Some(2015)])
        );
        assert_eq!(
            table.column(MONTH_COLUMN).unwrap().data,
            ColumnData::Int(vec![Some(3), Some(1)])
        );
        assert_eq!(
            table.column(DAY_NAME_COLUMN).unwrap().data,
            ColumnData::Text(vec![Some("Monday".into()), Some("Sunday".into())])
        );
        assert!(matches!(
            table.column("date").unwrap().data,
            ColumnData::Date(_)
        ));
    }

    #[test]
    fn unparseable_date_fails_the_whole_stage() {
        let mut table = table_with_dates(vec![Some("2021-03-15"), Some("15/03/2021")]);
        let err = extract_date_features(&mut table, &PipelineConfig::default()).unwrap_err();
        match err {
            PipelineError::Parse { column, row, value } => {
                assert_eq!(column, "date");
                assert_eq!(row, 1);
                assert_eq!(value, "15/03/2021");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn derived_features_come_from_the_designated_column_only() {
        let mut table = IncidentTable::new(vec![
            Column::new(
                "date",
                ColumnData::Text(vec![Some("2021-03-15".into())]),
            ),
            Column::new(
                "reported",
                ColumnData::Text(vec![Some("2021-03-17".into())]),
            ),
        ]);
        let config = PipelineConfig {
            date_columns: vec!["date".into(), "reported".into()],
            ..PipelineConfig::default()
        };
        extract_date_features(&mut table, &config).unwrap();

        // both columns parsed, features from `date` alone
        assert!(matches!(
            table.column("reported").unwrap().data,
            ColumnData::Date(_)
        ));
        assert_eq!(
            table.column(DAY_NAME_COLUMN).unwrap().data,
            ColumnData::Text(vec![Some("Monday".into())])
        );
    }

    #[test]
    fn designated_column_must_be_configured_for_parsing() {
        let mut table = table_with_dates(vec![Some("2021-03-15")]);
        let config = PipelineConfig {
            date_columns: vec![],
            ..PipelineConfig::default()
        };
        let err = extract_date_features(&mut table, &config).unwrap_err();
        assert!(matches!(err, PipelineError::TypeAssignment { .. }));
    }

    #[test]
    fn rerunning_is_safe() {
        let mut table = table_with_dates(vec![Some("2021-03-15")]);
        let config = PipelineConfig::default();
        extract_date_features(&mut table, &config).unwrap();
        extract_date_features(&mut table, &config).unwrap();
        assert_eq!(table.num_columns(), 4);
    }
}
