use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use salesdash::{
    apply_filters, demo_dataset, ApplyOutcome, DashboardController, DashboardView, DatasetError,
    DatasetSource, FilterCriteria, JsonFileDataset, SalesRecord, SalesSummary, TOP_ROWS,
};
use tempfile::NamedTempFile;

const DATASET_JSON: &str = r#"[
  {"OrderID":"CA-2015-1","CustomerName":"Ann","Segment":"Consumer","Region":"East","Country":"United States",
   "Category":"Furniture","Sub-Category":"Chairs","Sales":50,"Profit":100,"Quantity":2,"Year":2015,"DiscountType":"None"},
  {"OrderID":"CA-2016-2","CustomerName":"Bob","Segment":"Corporate","Region":"West","Country":"United States",
   "Category":"Technology","Sub-Category":"Phones","Sales":80,"Profit":200,"Quantity":3,"Year":2016,"DiscountType":"High"}
]"#;

fn write_dataset(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp dataset should be created");
    file.write_all(contents.as_bytes())
        .expect("temp dataset should be written");
    file.flush().expect("temp dataset should flush");
    file
}

fn rendered(outcome: ApplyOutcome) -> DashboardView {
    match outcome {
        ApplyOutcome::Rendered(view) => *view,
        other => panic!("expected rendered view, got {other:?}"),
    }
}

#[tokio::test]
async fn file_dataset_is_reloaded_on_every_apply() {
    let file = write_dataset(DATASET_JSON);
    let controller =
        DashboardController::new(Arc::new(JsonFileDataset::new(file.path())), TOP_ROWS);

    let first = rendered(controller.apply(FilterCriteria::default()).await);
    assert_eq!(first.order_count, 2);
    assert_eq!(first.total_profit, 300.0);
    assert_eq!(first.total_sales, 130.0);

    std::fs::write(file.path(), "[]").expect("dataset should be rewritten");
    let second = rendered(controller.apply(FilterCriteria::default()).await);
    assert_eq!(second.order_count, 0);
    assert!(second.table_rows.is_empty());
}

#[tokio::test]
async fn parse_failure_keeps_previous_view() {
    let file = write_dataset(DATASET_JSON);
    let controller =
        DashboardController::new(Arc::new(JsonFileDataset::new(file.path())), TOP_ROWS);

    let criteria = FilterCriteria {
        year: Some("2015".to_string()),
        ..FilterCriteria::default()
    };
    let first = rendered(controller.apply(criteria.clone()).await);
    assert_eq!(first.order_count, 1);

    std::fs::write(file.path(), "{not json").expect("dataset should be rewritten");
    assert_eq!(controller.apply(FilterCriteria::default()).await, ApplyOutcome::Failed);
    assert_eq!(controller.current(), Some(first));
}

#[test]
fn parse_failure_reports_dataset_path() {
    let file = write_dataset("[{\"OrderID\": 1}]");
    let err = JsonFileDataset::new(file.path())
        .load()
        .expect_err("malformed record should fail");

    assert!(matches!(err, DatasetError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

/// First load blocks until released; later loads return immediately.
struct GatedDataset {
    records: Vec<SalesRecord>,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
    entered: AtomicBool,
}

impl DatasetSource for GatedDataset {
    fn load(&self) -> Result<Vec<SalesRecord>, DatasetError> {
        let gate = self
            .gate
            .lock()
            .expect("gate lock should not be poisoned")
            .take();
        if let Some(gate) = gate {
            self.entered.store(true, Ordering::SeqCst);
            let _ = gate.recv();
        }
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

fn gated_controller() -> (Arc<DashboardController>, Arc<GatedDataset>, mpsc::Sender<()>) {
    let (release, gate) = mpsc::channel();
    let source = Arc::new(GatedDataset {
        records: demo_dataset(),
        gate: Mutex::new(Some(gate)),
        entered: AtomicBool::new(false),
    });
    let controller = Arc::new(DashboardController::new(source.clone(), TOP_ROWS));
    (controller, source, release)
}

fn year(value: &str) -> FilterCriteria {
    FilterCriteria {
        year: Some(value.to_string()),
        ..FilterCriteria::default()
    }
}

async fn wait_for_blocked_load(source: &GatedDataset) {
    while !source.entered.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slower_earlier_request_cannot_overwrite_newer_view() {
    let (controller, source, release) = gated_controller();

    let slow = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.apply_for("tab-1", year("2014")).await })
    };
    wait_for_blocked_load(&source).await;

    let newer = rendered(controller.apply_for("tab-1", year("2017")).await);
    assert_eq!(newer.criteria, year("2017"));

    release.send(()).expect("slow load should still be waiting");
    let slow_outcome = slow.await.expect("slow task should not panic");

    assert_eq!(slow_outcome, ApplyOutcome::Superseded);
    assert_eq!(controller.current_for("tab-1"), Some(newer));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn another_client_does_not_supersede_in_flight_request() {
    let (controller, source, release) = gated_controller();

    let slow = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.apply_for("tab-a", year("2014")).await })
    };
    wait_for_blocked_load(&source).await;

    let other = rendered(controller.apply_for("tab-b", year("2017")).await);
    assert_eq!(other.criteria, year("2017"));

    release.send(()).expect("slow load should still be waiting");
    let slow_view = rendered(slow.await.expect("slow task should not panic"));

    assert_eq!(slow_view.criteria, year("2014"));
    assert_eq!(controller.current_for("tab-a"), Some(slow_view));
    assert_eq!(controller.current_for("tab-b"), Some(other));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn anonymous_requests_all_render_but_newest_stays_committed() {
    let (controller, source, release) = gated_controller();

    let slow = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.apply(year("2014")).await })
    };
    wait_for_blocked_load(&source).await;

    let newer = rendered(controller.apply(year("2017")).await);

    release.send(()).expect("slow load should still be waiting");
    let slow_view = rendered(slow.await.expect("slow task should not panic"));

    assert_eq!(slow_view.criteria, year("2014"));
    assert_eq!(controller.current(), Some(newer));
}

#[test]
fn category_counts_partition_the_filtered_set() {
    let records = demo_dataset();
    for year in ["2014", "2015", "2016", "2017", "1999"] {
        let criteria = FilterCriteria {
            year: Some(year.to_string()),
            ..FilterCriteria::default()
        };
        let filtered = apply_filters(&records, &criteria);
        let summary = SalesSummary::from_records(&filtered);
        assert_eq!(summary.category_orders.total() as usize, filtered.len());
    }
}
