//! Dashboard page and JSON view routes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::filter::{FilterCriteria, FilterOptions};
use crate::pipeline::{
    build_view, ApplyOutcome, DashboardController, DashboardView, ANONYMOUS_CLIENT,
};
use crate::toggle::{CardDeck, GroupKind, ToggleState};

/// Query string accepted by the page route: dropdown criteria plus button selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default, rename = "discountType")]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub insight: Option<String>,
    /// Per-tab id sent by the page script; cancel-and-replace is scoped to it.
    #[serde(default)]
    pub client: Option<String>,
}

impl DashboardQuery {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            year: self.year.clone(),
            discount_type: self.discount_type.clone(),
            region: self.region.clone(),
            segment: self.segment.clone(),
        }
    }

    pub fn client_id(&self) -> &str {
        self.client.as_deref().unwrap_or(ANONYMOUS_CLIENT)
    }
}

/// Inputs for one full page render.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub criteria: FilterCriteria,
    pub options: FilterOptions,
    pub deck: CardDeck,
    pub toggle: Option<ToggleState>,
    pub view: DashboardView,
}

pub fn dashboard_router(controller: Arc<DashboardController>) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard_html))
        .route("/dashboard/view", get(get_dashboard_view))
        .route("/dashboard/view/current", get(get_current_view))
        .with_state(DashboardAppState { controller })
}

pub fn render_dashboard_html(page: &DashboardPage) -> String {
    let now_utc = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let view = &page.view;

    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>Sales Dashboard</title>\n");
    out.push_str("<script src=\"https://cdn.jsdelivr.net/npm/chart.js@4\"></script>\n");
    out.push_str("<script src=\"https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2\"></script>\n");
    out.push_str("<style>:root{--bg:#f4f6fb;--card:#ffffff;--ink:#1d2433;--muted:#667085;--line:#e3e7ef;--head:#243b63;--accent:#3b6fd8}*{box-sizing:border-box}body{margin:0;color:var(--ink);font-family:\"Montserrat\",\"Segoe UI\",sans-serif;background:var(--bg)}.shell{max-width:1500px;margin:0 auto;padding:24px 18px 28px}.hero{background:linear-gradient(135deg,#1f3358 0%,#3b6fd8 100%);color:#f7f9fc;border-radius:16px;padding:18px 20px}.hero h1{margin:0 0 8px;font-size:1.6rem}.hero-meta{display:flex;gap:16px;flex-wrap:wrap;font-size:.9rem;color:#dbe5f8}#filterForm{display:flex;gap:12px;flex-wrap:wrap;margin-top:16px}#filterForm select{padding:8px 10px;border-radius:8px;border:1px solid var(--line);background:#fff;font:inherit}.stats{display:grid;grid-template-columns:repeat(3,1fr);gap:12px;margin-top:16px}.stat{background:var(--card);border-radius:14px;padding:14px 16px;box-shadow:0 6px 18px rgba(29,36,51,.08)}.stat h3{margin:0 0 6px;font-size:.8rem;text-transform:uppercase;color:var(--muted)}.stat span{font-size:1.5rem;font-weight:700}.panel{margin-top:16px;background:var(--card);border-radius:16px;padding:14px;box-shadow:0 6px 18px rgba(29,36,51,.08);overflow:auto}.charts{display:grid;grid-template-columns:repeat(3,1fr);gap:12px}.filter_button,.region_button{display:flex;gap:8px;flex-wrap:wrap;margin-bottom:12px}.filter_button button,.region_button button{border:1px solid var(--line);background:#fff;border-radius:999px;padding:6px 14px;cursor:pointer;font:inherit}button.active{background:var(--accent);color:#fff;border-color:var(--accent)}.filterable_cards,.insight{display:flex;gap:12px;flex-wrap:wrap}.card{border:1px solid var(--line);border-radius:12px;padding:12px 14px;min-width:200px}.card h4{margin:0 0 6px}.card p{margin:2px 0;font-size:.85rem;color:var(--muted)}.hide{display:none}table{width:100%;border-collapse:collapse}th{background:var(--head);color:#f2f5fa;font-size:.78rem;text-transform:uppercase;padding:9px 10px;text-align:left}td{font-size:.84rem;padding:8px 10px;border-bottom:1px solid var(--line);white-space:nowrap}@media (max-width:900px){.charts,.stats{grid-template-columns:1fr}}</style>\n");
    out.push_str("</head><body><main class=\"shell\">\n");

    out.push_str("<section class=\"hero\"><h1>Sales Dashboard</h1><div class=\"hero-meta\">");
    out.push_str(&format!("<span>Orders shown: {}</span>", view.order_count));
    out.push_str(&format!(
        "<span>Generated: {}</span>",
        escape_html(&now_utc)
    ));
    out.push_str("</div></section>\n");

    out.push_str("<form id=\"filterForm\" onsubmit=\"return false\">");
    push_select(
        &mut out,
        "year",
        "All Years",
        &page.options.years,
        page.criteria.year_constraint(),
    );
    push_select(
        &mut out,
        "discountType",
        "All Discounts",
        &page.options.discount_types,
        page.criteria.discount_type_constraint(),
    );
    push_select(
        &mut out,
        "region",
        "All Regions",
        &page.options.regions,
        page.criteria.region_constraint(),
    );
    push_select(
        &mut out,
        "segment",
        "All Segments",
        &page.options.segments,
        page.criteria.segment_constraint(),
    );
    out.push_str("</form>\n");

    out.push_str("<section class=\"stats\">");
    push_stat(&mut out, "net.profit", "Net Profit", &view.net_profit_display);
    push_stat(&mut out, "revenue", "Revenue", &view.revenue_display);
    push_stat(&mut out, "total.orders", "Total Orders", &view.orders_display);
    out.push_str("</section>\n");

    out.push_str("<section class=\"panel charts\">");
    for chart in &view.charts {
        out.push_str(&format!(
            "<div id=\"{}\" class=\"chart-box\"></div>",
            escape_html(&chart.container)
        ));
    }
    out.push_str("</section>\n");

    if let Some(toggle) = &page.toggle {
        push_card_group(&mut out, toggle, &page.deck, GroupKind::Category);
        push_card_group(&mut out, toggle, &page.deck, GroupKind::Region);
    }

    out.push_str("<section class=\"panel\"><table id=\"dataTable\">");
    out.push_str("<tr>");
    for header in &view.table_headers {
        out.push_str("<th>");
        out.push_str(&escape_html(header));
        out.push_str("</th>");
    }
    out.push_str("</tr>\n");
    for row in &view.table_rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&escape_html(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table></section>\n");

    let initial = serde_json::to_string(view).unwrap_or_else(|_| "null".to_string());
    out.push_str("<script id=\"initial-view\" type=\"application/json\">");
    out.push_str(&initial.replace("</", "<\\/"));
    out.push_str("</script>\n<script>");
    out.push_str(DASHBOARD_SCRIPT);
    out.push_str("</script>\n");
    out.push_str("</main></body></html>\n");
    out
}

/// Browser glue: button groups, latest-request-wins view fetches, chart sink.
const DASHBOARD_SCRIPT: &str = r#"
(function () {
  const form = document.getElementById('filterForm');
  const netProfit = document.querySelector('[data-name="net.profit"] span');
  const revenue = document.querySelector('[data-name="revenue"] span');
  const orders = document.querySelector('[data-name="total.orders"] span');
  const groups = {
    category: {
      buttons: '.filter_button button',
      cards: '.filterable_cards .card',
      wildcard: true,
    },
    region: { buttons: '.region_button button', cards: '.insight .card', wildcard: false },
  };
  const selected = {};
  Object.keys(groups).forEach(function (key) {
    const active = document.querySelector(groups[key].buttons + '.active');
    selected[key] = active ? active.dataset.name : null;
  });

  function applyGroup(key) {
    const group = groups[key];
    const name = selected[key];
    document.querySelectorAll(group.buttons).forEach(function (button) {
      button.classList.toggle('active', button.dataset.name === name);
    });
    document.querySelectorAll(group.cards).forEach(function (card) {
      const show = card.dataset.name === name || (group.wildcard && name === 'all');
      card.classList.toggle('hide', !show);
    });
  }

  Object.keys(groups).forEach(function (key) {
    document.querySelectorAll(groups[key].buttons).forEach(function (button) {
      button.addEventListener('click', function () {
        selected[key] = button.dataset.name;
        applyGroup(key);
      });
    });
  });

  function renderTable(view) {
    const table = document.getElementById('dataTable');
    table.innerHTML = '';
    const head = document.createElement('tr');
    view.table_headers.forEach(function (text) {
      const th = document.createElement('th');
      th.textContent = text;
      head.appendChild(th);
    });
    table.appendChild(head);
    view.table_rows.forEach(function (cells) {
      const row = document.createElement('tr');
      cells.forEach(function (text) {
        const td = document.createElement('td');
        td.textContent = text;
        row.appendChild(td);
      });
      table.appendChild(row);
    });
  }

  function renderChart(payload) {
    const container = document.getElementById(payload.container);
    if (!container || typeof Chart === 'undefined') return;
    container.innerHTML = '';
    const canvas = document.createElement('canvas');
    canvas.id = payload.id;
    container.appendChild(canvas);
    if (payload.width) canvas.width = payload.width;
    if (payload.height) canvas.height = payload.height;
    const config = JSON.parse(JSON.stringify(payload.config));
    const labels = config.options.plugins.datalabels;
    if (labels && labels.share) {
      delete labels.share;
      labels.formatter = function (value, ctx) {
        return ctx.dataset.percentages[ctx.dataIndex] + '%';
      };
    }
    if (typeof ChartDataLabels !== 'undefined') config.plugins = [ChartDataLabels];
    new Chart(canvas.getContext('2d'), config);
  }

  function render(view) {
    if (!view) return;
    netProfit.textContent = view.net_profit_display;
    revenue.textContent = view.revenue_display;
    orders.textContent = view.orders_display;
    renderTable(view);
    view.charts.forEach(renderChart);
  }

  const client = window.crypto && crypto.randomUUID
    ? crypto.randomUUID()
    : Date.now().toString(36) + Math.random().toString(36).slice(2);
  let sequence = 0;
  let inflight = null;
  function fetchView() {
    if (inflight) inflight.abort();
    const controller = new AbortController();
    inflight = controller;
    const mine = ++sequence;
    const params = new URLSearchParams(new FormData(form));
    params.set('client', client);
    fetch('/dashboard/view?' + params.toString(), { signal: controller.signal })
      .then(function (response) { return response.ok ? response.json() : null; })
      .then(function (view) { if (mine === sequence) render(view); })
      .catch(function (error) {
        if (error.name !== 'AbortError') console.error('Error fetching data:', error);
      });
  }

  form.querySelectorAll('select').forEach(function (select) {
    select.addEventListener('change', fetchView);
  });

  render(JSON.parse(document.getElementById('initial-view').textContent));
})();
"#;

fn push_select(
    out: &mut String,
    id: &str,
    all_label: &str,
    values: &[String],
    current: Option<&str>,
) {
    out.push_str(&format!("<select id=\"{id}\" name=\"{id}\">"));
    out.push_str(&format!("<option value=\"\">{}</option>", escape_html(all_label)));
    for value in values {
        let selected = if current == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        let escaped = escape_html(value);
        out.push_str(&format!("<option value=\"{escaped}\"{selected}>{escaped}</option>"));
    }
    out.push_str("</select>");
}

fn push_stat(out: &mut String, name: &str, label: &str, value: &str) {
    out.push_str(&format!(
        "<div class=\"stat\" data-name=\"{}\"><h3>{}</h3><span>{}</span></div>",
        escape_html(name),
        escape_html(label),
        escape_html(value)
    ));
}

fn push_card_group(out: &mut String, toggle: &ToggleState, deck: &CardDeck, kind: GroupKind) {
    let (button_class, card_class) = match kind {
        GroupKind::Category => ("filter_button", "filterable_cards"),
        GroupKind::Region => ("region_button", "insight"),
    };
    let group = toggle.group(kind);

    out.push_str("<section class=\"panel\">");
    out.push_str(&format!("<div class=\"{button_class}\">"));
    for name in group.buttons() {
        let active = if group.is_active(name) { " class=\"active\"" } else { "" };
        let escaped = escape_html(name);
        out.push_str(&format!(
            "<button type=\"button\" data-name=\"{escaped}\"{active}>{escaped}</button>"
        ));
    }
    out.push_str("</div>");

    out.push_str(&format!("<div class=\"{card_class}\">"));
    for card in deck.cards(kind) {
        let class = if toggle.is_visible(kind, card) {
            "card"
        } else {
            "card hide"
        };
        out.push_str(&format!(
            "<div class=\"{class}\" data-name=\"{}\"><h4>{}</h4>",
            escape_html(&card.name),
            escape_html(&card.title)
        ));
        for line in &card.lines {
            out.push_str("<p>");
            out.push_str(&escape_html(line));
            out.push_str("</p>");
        }
        out.push_str("</div>");
    }
    out.push_str("</div></section>\n");
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Clone)]
struct DashboardAppState {
    controller: Arc<DashboardController>,
}

async fn get_dashboard_html(
    State(state): State<DashboardAppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    info!(
        component = "dashboard",
        event = "http.dashboard.request",
        category = ?query.category,
        insight = ?query.insight
    );

    let records = match state.controller.load_records().await {
        Ok(records) => records,
        Err(err) => {
            error!(
                component = "dashboard",
                event = "pipeline.load_failed",
                source = %state.controller.source_label(),
                error = %err
            );
            Vec::new()
        }
    };

    let criteria = query.criteria();
    let deck = CardDeck::from_records(&records);
    let mut toggle = ToggleState::for_deck(&deck).ok();
    if let Some(toggle) = toggle.as_mut() {
        let selections = [
            (GroupKind::Category, query.category.as_deref()),
            (GroupKind::Region, query.insight.as_deref()),
        ];
        for (kind, name) in selections {
            let Some(name) = name else { continue };
            if let Err(err) = toggle.select(kind, name) {
                warn!(
                    component = "dashboard",
                    event = "toggle.rejected",
                    group = kind.as_str(),
                    error = %err
                );
            }
        }
    }

    let page = DashboardPage {
        options: FilterOptions::from_records(&records),
        view: build_view(&records, &criteria, state.controller.top_n()),
        criteria,
        deck,
        toggle,
    };
    Html(render_dashboard_html(&page))
}

async fn get_dashboard_view(
    State(state): State<DashboardAppState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let criteria = query.criteria();
    info!(
        component = "dashboard",
        event = "http.view.request",
        client = query.client_id(),
        year = ?criteria.year,
        discount_type = ?criteria.discount_type,
        region = ?criteria.region,
        segment = ?criteria.segment
    );

    match state.controller.apply_for(query.client_id(), criteria).await {
        ApplyOutcome::Rendered(view) => Json(*view).into_response(),
        ApplyOutcome::Superseded => (
            StatusCode::CONFLICT,
            Json(json!({ "status": "superseded" })),
        )
            .into_response(),
        ApplyOutcome::Failed => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
            .into_response(),
    }
}

async fn get_current_view(
    State(state): State<DashboardAppState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    match state.controller.current_for(query.client_id()) {
        Some(view) => Json(view).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "status": "empty" }))).into_response(),
    }
}
