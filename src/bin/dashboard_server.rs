use std::sync::Arc;

use salesdash::{
    dashboard_router, init_logging, log_app_bind, log_app_start, log_dataset_check,
    log_dataset_selected, logging_config_from_env, DashboardController, DatasetChoice,
    DatasetSource, InMemoryDataset, JsonFileDataset, ServerConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let config = ServerConfig::from_env()?;
    let source = source_from_config(&config);
    let controller = Arc::new(DashboardController::new(source, config.top_n));
    log_dataset_check(
        &controller.source_label(),
        controller.load_records().await.as_deref(),
    );
    let app = dashboard_router(controller);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn source_from_config(config: &ServerConfig) -> Arc<dyn DatasetSource> {
    match &config.dataset {
        DatasetChoice::Demo { reason } => {
            log_dataset_selected("demo", Some(*reason), config.top_n);
            Arc::new(InMemoryDataset::demo())
        }
        DatasetChoice::File(path) => {
            let source = JsonFileDataset::new(path.clone());
            log_dataset_selected(&source.describe(), None, config.top_n);
            Arc::new(source)
        }
    }
}
