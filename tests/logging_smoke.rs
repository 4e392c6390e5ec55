use std::io;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use salesdash::{
    dashboard_router, demo_dataset, log_app_bind, log_app_start, log_dataset_check,
    log_dataset_selected, DashboardController, DatasetSource, FilterCriteria, InMemoryDataset,
    JsonFileDataset, LoggingConfig, TOP_ROWS,
};
use tower::util::ServiceExt;
use tracing::dispatcher::with_default;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriter;

#[derive(Clone, Default)]
struct SharedWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    fn output_string(&self) -> String {
        let bytes = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        String::from_utf8_lossy(&bytes).to_string()
    }
}

struct SharedWriterGuard {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs(max_level: Level, f: impl FnOnce()) -> String {
    let writer = SharedWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_max_level(max_level)
        .with_writer(writer.clone())
        .finish();
    let dispatch = tracing::Dispatch::new(subscriber);

    with_default(&dispatch, f);
    writer.output_string()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("single-thread runtime should build")
        .block_on(future)
}

#[test]
fn server_lifecycle_helpers_emit_baseline_events() {
    let logs = capture_logs(Level::INFO, || {
        let cfg = LoggingConfig::default();
        log_app_start(&cfg);
        log_dataset_selected("demo", Some("SALESDASH_USE_DEMO"), TOP_ROWS);
        log_app_bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));
    });

    assert!(logs.contains("\"event\":\"app.start\""));
    assert!(logs.contains("\"event\":\"dataset.selected\""));
    assert!(logs.contains("\"reason\":\"SALESDASH_USE_DEMO\""));
    assert!(logs.contains("\"event\":\"app.bind\""));
}

#[test]
fn view_route_emits_request_and_rendered_events() {
    let logs = capture_logs(Level::INFO, || {
        block_on(async {
            let controller = DashboardController::new(Arc::new(InMemoryDataset::demo()), TOP_ROWS);
            let app = dashboard_router(Arc::new(controller));

            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/dashboard/view?segment=consumer")
                        .body(Body::empty())
                        .expect("request should build"),
                )
                .await
                .expect("view request should succeed");

            assert_eq!(response.status(), StatusCode::OK);
        });
    });

    assert!(logs.contains("\"event\":\"http.view.request\""));
    assert!(logs.contains("\"event\":\"pipeline.rendered\""));
}

#[test]
fn failed_dataset_load_is_logged_as_error() {
    let logs = capture_logs(Level::INFO, || {
        block_on(async {
            let controller = DashboardController::new(
                Arc::new(JsonFileDataset::new("/missing/salesdash/dataset.json")),
                TOP_ROWS,
            );
            let outcome = controller.apply(FilterCriteria::default()).await;
            assert_eq!(outcome, salesdash::ApplyOutcome::Failed);
        });
    });

    assert!(logs.contains("\"event\":\"pipeline.load_failed\""));
    assert!(logs.contains("\"level\":\"ERROR\""));
}

#[test]
fn rejected_button_selection_is_logged_as_warning() {
    let logs = capture_logs(Level::INFO, || {
        block_on(async {
            let controller = DashboardController::new(Arc::new(InMemoryDataset::demo()), TOP_ROWS);
            let app = dashboard_router(Arc::new(controller));

            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/dashboard?category=Garden")
                        .body(Body::empty())
                        .expect("request should build"),
                )
                .await
                .expect("page request should succeed");

            assert_eq!(response.status(), StatusCode::OK);
        });
    });

    assert!(logs.contains("\"event\":\"http.dashboard.request\""));
    assert!(logs.contains("\"event\":\"toggle.rejected\""));
}

#[test]
fn startup_dataset_check_reports_ready_or_unavailable() {
    let logs = capture_logs(Level::INFO, || {
        let records = demo_dataset();
        log_dataset_check("demo", Ok(records.as_slice()));

        let missing = JsonFileDataset::new("/missing/salesdash/dataset.json");
        let err = missing.load().expect_err("missing file should fail");
        log_dataset_check(&missing.describe(), Err(&err));
    });

    assert!(logs.contains("\"event\":\"dataset.ready\""));
    assert!(logs.contains("\"records\":20"));
    assert!(logs.contains("\"regions\":4"));
    assert!(logs.contains("\"event\":\"dataset.unavailable\""));
    assert!(logs.contains("\"level\":\"WARN\""));
}
