use anyhow::Result;
use incidents::{pipeline, table::to_record_batch, PipelineConfig, SemanticType};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// The static incident dataset shipped with the dashboard deployment.
const DATA_FILE: &str = "data/us-police-shootings-2015-22.csv";

/// Optional deploy-time config override next to the binary.
const CONFIG_FILE: &str = "pipeline.yaml";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = if Path::new(CONFIG_FILE).exists() {
        PipelineConfig::from_yaml_file(CONFIG_FILE)?
    } else {
        PipelineConfig::default()
    };
    info!(designated = %config.designated_date_column, "pipeline config ready");

    // ─── 3) run the cleaning pipeline once, before anything renders ──
    let table = pipeline::run(DATA_FILE, &config)?;
    for column in table.columns() {
        let labels = match column.semantic {
            Some(SemanticType::Categorical) => Some(column.distinct_labels().len()),
            _ => None,
        };
        info!(
            name = %column.name,
            semantic = ?column.semantic,
            missing = column.data.missing_count(),
            labels,
            "column"
        );
    }

    // ─── 4) hand the finished table to the rendering layer ───────────
    let batch = to_record_batch(&table)?;
    info!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "incident table ready for rendering"
    );

    Ok(())
}
