//! Filter-and-aggregate pipeline with latest-request-wins commits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::aggregate::SalesSummary;
use crate::charts::{build_charts, ChartPayload};
use crate::dataset::{DatasetError, DatasetSource};
use crate::filter::{apply_filters, rank_by_profit, FilterCriteria};
use crate::format::{format_grouped_integer, format_revenue};
use crate::record::{SalesRecord, TABLE_HEADERS};

/// Everything the page shows for one set of criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub criteria: FilterCriteria,
    pub order_count: usize,
    pub total_profit: f64,
    pub total_sales: f64,
    pub net_profit_display: String,
    pub revenue_display: String,
    pub orders_display: String,
    pub table_headers: Vec<String>,
    pub table_rows: Vec<Vec<String>>,
    pub summary: SalesSummary,
    pub charts: Vec<ChartPayload>,
}

/// Filtered records are ranked by profit before aggregation, so chart labels
/// follow first appearance in the ranked table.
pub fn build_view(
    records: &[SalesRecord],
    criteria: &FilterCriteria,
    top_n: usize,
) -> DashboardView {
    let ranked = rank_by_profit(&apply_filters(records, criteria));
    let summary = SalesSummary::from_records(&ranked);

    DashboardView {
        criteria: criteria.clone(),
        order_count: summary.order_count,
        total_profit: summary.total_profit,
        total_sales: summary.total_sales,
        net_profit_display: format_grouped_integer(summary.rounded_profit()),
        revenue_display: format_revenue(summary.total_sales),
        orders_display: summary.order_count.to_string(),
        table_headers: TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
        table_rows: ranked
            .iter()
            .take(top_n)
            .map(SalesRecord::table_cells)
            .collect(),
        charts: build_charts(&summary),
        summary,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issues increasing tickets; only the newest ticket may commit.
#[derive(Debug, Default)]
pub struct RenderSequencer {
    latest: AtomicU64,
}

impl RenderSequencer {
    pub fn issue(&self) -> RenderTicket {
        RenderTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Rendered(Box<DashboardView>),
    /// The same client issued a newer request before this one finished.
    Superseded,
    /// The dataset could not be loaded; the committed view is unchanged.
    Failed,
}

/// Client id used when a request does not name one. Anonymous requests are
/// never superseded; they only refuse to overwrite a newer committed view.
pub const ANONYMOUS_CLIENT: &str = "";

const MAX_CLIENT_SESSIONS: usize = 4096;

#[derive(Debug, Default)]
struct ClientSession {
    sequencer: RenderSequencer,
    committed: RwLock<Option<(RenderTicket, DashboardView)>>,
}

pub struct DashboardController {
    source: Arc<dyn DatasetSource>,
    top_n: usize,
    sessions: RwLock<HashMap<String, Arc<ClientSession>>>,
}

impl DashboardController {
    pub fn new(source: Arc<dyn DatasetSource>, top_n: usize) -> Self {
        Self {
            source,
            top_n,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn source_label(&self) -> String {
        self.source.describe()
    }

    pub async fn load_records(&self) -> Result<Vec<SalesRecord>, DatasetError> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || source.load())
            .await
            .map_err(|source| DatasetError::Task {
                source_label: self.source.describe(),
                source,
            })?
    }

    pub async fn apply(&self, criteria: FilterCriteria) -> ApplyOutcome {
        self.apply_for(ANONYMOUS_CLIENT, criteria).await
    }

    /// Renders `criteria` for one client. A named client's older in-flight
    /// request is superseded by its newer one; other clients are unaffected.
    pub async fn apply_for(&self, client: &str, criteria: FilterCriteria) -> ApplyOutcome {
        let session = self.session(client);
        let exclusive = client != ANONYMOUS_CLIENT;
        let ticket = session.sequencer.issue();

        let records = match self.load_records().await {
            Ok(records) => records,
            Err(err) => {
                error!(
                    component = "pipeline",
                    event = "pipeline.load_failed",
                    client,
                    ticket = ticket.value(),
                    source = %self.source.describe(),
                    error = %err
                );
                return ApplyOutcome::Failed;
            }
        };

        if exclusive && !session.sequencer.is_current(ticket) {
            debug!(
                component = "pipeline",
                event = "pipeline.superseded",
                client,
                ticket = ticket.value(),
                stage = "load"
            );
            return ApplyOutcome::Superseded;
        }

        let view = build_view(&records, &criteria, self.top_n);

        let mut committed = session
            .committed
            .write()
            .expect("dashboard view lock should not be poisoned");
        if exclusive && !session.sequencer.is_current(ticket) {
            debug!(
                component = "pipeline",
                event = "pipeline.superseded",
                client,
                ticket = ticket.value(),
                stage = "commit"
            );
            return ApplyOutcome::Superseded;
        }
        let newest = committed
            .as_ref()
            .map_or(true, |(seen, _)| ticket > *seen);
        if newest {
            *committed = Some((ticket, view.clone()));
        }
        drop(committed);

        info!(
            component = "pipeline",
            event = "pipeline.rendered",
            client,
            ticket = ticket.value(),
            committed = newest,
            dataset_records = records.len(),
            order_count = view.order_count,
            table_rows = view.table_rows.len()
        );
        ApplyOutcome::Rendered(Box::new(view))
    }

    pub fn current(&self) -> Option<DashboardView> {
        self.current_for(ANONYMOUS_CLIENT)
    }

    /// Last view committed for `client`.
    pub fn current_for(&self, client: &str) -> Option<DashboardView> {
        let sessions = self
            .sessions
            .read()
            .expect("client session lock should not be poisoned");
        let committed = sessions
            .get(client)?
            .committed
            .read()
            .expect("dashboard view lock should not be poisoned");
        committed.as_ref().map(|(_, view)| view.clone())
    }

    fn session(&self, client: &str) -> Arc<ClientSession> {
        if let Some(session) = self
            .sessions
            .read()
            .expect("client session lock should not be poisoned")
            .get(client)
        {
            return Arc::clone(session);
        }

        let mut sessions = self
            .sessions
            .write()
            .expect("client session lock should not be poisoned");
        if !sessions.contains_key(client) && sessions.len() >= MAX_CLIENT_SESSIONS {
            let evicted = sessions
                .keys()
                .find(|key| key.as_str() != ANONYMOUS_CLIENT)
                .cloned();
            if let Some(evicted) = evicted {
                sessions.remove(&evicted);
                debug!(
                    component = "pipeline",
                    event = "pipeline.session_evicted",
                    client = %evicted
                );
            }
        }
        Arc::clone(sessions.entry(client.to_string()).or_default())
    }
}
