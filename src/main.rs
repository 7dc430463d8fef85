//! Cardiosense: Cardiovascular risk assessment
//!
//! Main entry point. Assesses stored patient records and prints each
//! assessment as JSON.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiosense::adapters::forest::RandomForestClassifier;
use cardiosense::adapters::sanitize::SanitizingMakeWriter;
use cardiosense::adapters::sqlite::SqliteStore;
use cardiosense::AssessmentService;

fn main() -> Result<()> {
    // Initialize logging.
    //
    // JSON goes to stdout, so logs default to a file when stdout is piped.
    // - interactive TTY: log to stdout
    // - non-interactive: log to a file
    let log_mode =
        std::env::var("CARDIOSENSE_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        // auto
        _ => !interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file = std::env::var("CARDIOSENSE_LOG_FILE")
            .unwrap_or_else(|_| "cardiosense.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let ids = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<i64>()
                .with_context(|| format!("Invalid record id: {arg}"))
        })
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        eprintln!("usage: cardiosense RECORD_ID...");
        return Ok(());
    }

    let db_path =
        std::env::var("CARDIOSENSE_DB_PATH").unwrap_or_else(|_| "cardiosense.db".to_string());
    let store = SqliteStore::new(&db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;
    tracing::info!("Starting Cardiosense: {} record(s) to assess", ids.len());

    let service = AssessmentService::new(RandomForestClassifier::new());
    for id in ids {
        let assessment = service.assess_patient(&store, id).map_err(|e| {
            tracing::error!("Assessment failed: {e}");
            e
        })?;
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    }

    tracing::info!("Cardiosense shutdown complete.");
    Ok(())
}
