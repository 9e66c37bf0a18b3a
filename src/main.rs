use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hopecal::config::Config;
use hopecal::refresh;
use hopecal::store::WorkbookFile;

const USAGE: &str = "usage: hopecal [refresh-calendar | refresh-events]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    hopecal::observability::init(config.metrics_port);

    let command = std::env::args().nth(1).unwrap_or_else(|| "refresh-calendar".into());
    info!("hopecal {command}");
    info!("  workbook: {}", config.workbook.display());
    info!(
        "  request log: {}",
        config.request_log.as_ref().map_or("disabled".to_string(), |p| p.display().to_string())
    );
    info!("  metrics: {}", config.metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let store = WorkbookFile::open(&config.workbook, config.request_log.clone()).inspect_err(|e| {
        error!("cannot open workbook {}: {e}", config.workbook.display());
    })?;

    let result = match command.as_str() {
        "refresh-calendar" => refresh::refresh_calendar(&store, &config).await.map(|_| ()),
        "refresh-events" => refresh::refresh_events(&store, &config).await.map(|_| ()),
        other => {
            error!("unknown command {other:?}");
            return Err(USAGE.into());
        }
    };

    if let Err(e) = &result {
        error!("{command} failed ({:?}): {e}", e.kind());
    }
    Ok(result?)
}
