use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::{
    auth,
    config::Settings,
    snapshot::SnapshotState,
    stats::{self, StockRecord, WinWindow, UW_SENTINEL},
    store::SqliteStore,
    utils::{normalize_code, now_ts, sanitize_day},
};

#[derive(Clone)]
pub struct DashboardState {
    pub settings: Settings,
    pub store: SqliteStore,
    pub snapshot: SnapshotState,
}

pub async fn serve_dashboard(
    settings: Settings,
    store: SqliteStore,
    snapshot: SnapshotState,
) -> Result<()> {
    let state = DashboardState {
        settings: settings.clone(),
        store,
        snapshot,
    };

    let mut app = Router::new()
        .route("/", get(index))
        .route("/api/stocks", get(api_stocks))
        .route("/api/summary", get(api_summary))
        .route("/api/top_uw", get(api_top_uw))
        .route("/api/uw/{name}", get(api_uw_detail))
        .route("/api/uw_options", get(api_uw_options))
        .route("/api/auth/login", post(api_login))
        .route("/api/auth/logout", post(api_logout))
        .route("/api/auth/me", get(api_me))
        .route("/api/admin/stocks", get(api_admin_stocks).post(api_admin_upsert_stock))
        .route("/api/admin/stocks/{id}", delete(api_admin_delete_stock))
        .route("/api/admin/accounts", get(api_admin_accounts).post(api_admin_upsert_account))
        .route("/api/admin/accounts/{id}", delete(api_admin_delete_account))
        .route("/api/admin/bookkeeping", get(api_admin_bookkeeping))
        .route("/api/admin/profits", post(api_admin_add_profit))
        .route("/api/admin/profits/{id}", delete(api_admin_delete_profit))
        .route("/api/admin/expenses", post(api_admin_add_expense))
        .route("/api/admin/expenses/{id}", delete(api_admin_delete_expense))
        .with_state(state);

    if settings.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    let addr: SocketAddr = format!("{}:{}", settings.dashboard_host, settings.dashboard_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("dashboard addr parse: {e}"))?;

    log::info!("dashboard.start url=http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Admin routes resolve the bearer token up front; failures short-circuit
/// with 401 so handlers only run with a live session.
fn require_admin(st: &DashboardState, headers: &HeaderMap) -> Result<auth::Session, Response> {
    match auth::session_from_headers(&st.store, headers) {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"ok": false, "error": "unauthorized"})),
        )
            .into_response()),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()),
    }
}

fn store_error(e: anyhow::Error) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}

// ---- Public listing & stats ----

#[derive(Deserialize)]
struct StocksQ {
    page: Option<usize>,
    search: Option<String>,
    uw: Option<String>,
}

async fn api_stocks(State(st): State<DashboardState>, Query(q): Query<StocksQ>) -> Response {
    let page = q.page.unwrap_or(1).max(1);
    let page_size = st.settings.page_size;
    match st.store.fetch_stocks_page(page, page_size, q.search.as_deref(), q.uw.as_deref()) {
        Ok((data, count)) => {
            let total_pages = ((count as usize) + page_size - 1) / page_size;
            Json(serde_json::json!({
                "data": data,
                "count": count,
                "page": page,
                "page_size": page_size,
                "total_pages": total_pages,
            }))
            .into_response()
        }
        Err(e) => store_error(e),
    }
}

async fn api_summary(State(st): State<DashboardState>) -> impl IntoResponse {
    let records = st.snapshot.load();
    let breadth = stats::market_breadth(&records);
    let streak = stats::top_streak_underwriter(&records);
    Json(serde_json::json!({
        "ts": now_ts(),
        "breadth": breadth,
        // Explicit null tells the UI to render its "no data" placeholder.
        "streak": streak,
    }))
}

#[derive(Deserialize)]
struct TopUwQ {
    window: Option<WinWindow>,
}

async fn api_top_uw(State(st): State<DashboardState>, Query(q): Query<TopUwQ>) -> impl IntoResponse {
    let records = st.snapshot.load();
    let uw_stats = stats::underwriter_stats(&records);
    let ranked = stats::rank_underwriters(&uw_stats, q.window.unwrap_or(WinWindow::TwoDay));
    Json(ranked)
}

async fn api_uw_detail(
    State(st): State<DashboardState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let records = st.snapshot.load();
    let detail = stats::records_for_underwriter(&records, &name);
    let uw_stats = stats::underwriter_stats(&records);
    let summary = uw_stats.get(&name).map(|s| {
        serde_json::json!({
            "count": s.count,
            "win_rate_1": s.win_rate(1) * 100.0,
            "win_rate_2": s.win_rate(2) * 100.0,
            "win_rate_3": s.win_rate(3) * 100.0,
        })
    });
    Json(serde_json::json!({
        "underwriter": name,
        "summary": summary,
        "records": detail,
    }))
}

async fn api_uw_options(State(st): State<DashboardState>) -> impl IntoResponse {
    let records = st.snapshot.load();
    Json(stats::underwriter_filter_options(&records))
}

// ---- Auth ----

#[derive(Deserialize)]
struct LoginReq {
    email: String,
    password: String,
}

async fn api_login(State(st): State<DashboardState>, Json(req): Json<LoginReq>) -> Response {
    match auth::login(&st.settings, &st.store, &req.email, &req.password) {
        Ok(Some(issued)) => Json(serde_json::json!({
            "ok": true,
            "token": issued.token,
            "expires_ts": issued.expires_ts,
            "email": st.settings.admin_email,
        }))
        .into_response(),
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"ok": false, "error": "invalid_credentials"})),
        )
            .into_response(),
        Err(e) => store_error(e),
    }
}

async fn api_logout(State(st): State<DashboardState>, headers: HeaderMap) -> Response {
    let Some(token) = auth::bearer_token(&headers) else {
        return Json(serde_json::json!({"ok": true, "removed": false})).into_response();
    };
    match auth::logout(&st.store, &token) {
        Ok(removed) => Json(serde_json::json!({"ok": true, "removed": removed})).into_response(),
        Err(e) => store_error(e),
    }
}

async fn api_me(State(st): State<DashboardState>, headers: HeaderMap) -> Response {
    let session = match require_admin(&st, &headers) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    Json(serde_json::json!({
        "email": session.email,
        "expires_ts": session.expires_ts,
    }))
    .into_response()
}

// ---- Admin: stocks ----

#[derive(Deserialize)]
struct AdminStocksQ {
    page: Option<usize>,
    search: Option<String>,
}

async fn api_admin_stocks(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Query(q): Query<AdminStocksQ>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    let page = q.page.unwrap_or(1).max(1);
    let page_size = st.settings.page_size;
    match st.store.fetch_stocks_page(page, page_size, q.search.as_deref(), None) {
        Ok((data, count)) => Json(serde_json::json!({
            "data": data,
            "count": count,
            "page": page,
            "page_size": page_size,
        }))
        .into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct StockUpsertReq {
    id: Option<String>,
    code: String,
    date: String,
    uw: Option<String>,
    float_pct: Option<f64>,
    d1: Option<f64>,
    d2: Option<f64>,
    d3: Option<f64>,
    d4: Option<f64>,
    d5: Option<f64>,
    d6: Option<f64>,
    d7: Option<f64>,
}

async fn api_admin_upsert_stock(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Json(req): Json<StockUpsertReq>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }

    let code = normalize_code(&req.code);
    if code.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "code_required"})),
        )
            .into_response();
    }
    let date = req.date.trim().to_string();
    if date.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "date_required"})),
        )
            .into_response();
    }

    let id = req.id.filter(|s| !s.trim().is_empty());
    match st.store.check_duplicate_code(&code, id.as_deref()) {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(serde_json::json!({"ok": false, "error": "duplicate_code", "code": code})),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => return store_error(e),
    }

    let uw = req
        .uw
        .map(|s| normalize_code(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UW_SENTINEL.to_string());

    let rec = StockRecord {
        id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        code,
        date,
        uw,
        float_pct: sanitize_day(req.float_pct),
        d1: sanitize_day(req.d1),
        d2: sanitize_day(req.d2),
        d3: sanitize_day(req.d3),
        d4: sanitize_day(req.d4),
        d5: sanitize_day(req.d5),
        d6: sanitize_day(req.d6),
        d7: sanitize_day(req.d7),
    };

    if let Err(e) = st.store.upsert_stock(&rec) {
        return store_error(e);
    }
    if let Err(e) = st.snapshot.refresh(&st.store) {
        log::warn!("snapshot.refresh_failed after upsert: {e}");
    }
    log::info!("stock.upsert code={} id={}", rec.code, rec.id);
    Json(serde_json::json!({"ok": true, "id": rec.id})).into_response()
}

async fn api_admin_delete_stock(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    match st.store.delete_stock(&id) {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"ok": false, "error": "not_found"})),
        )
            .into_response(),
        Ok(_) => {
            if let Err(e) = st.snapshot.refresh(&st.store) {
                log::warn!("snapshot.refresh_failed after delete: {e}");
            }
            log::info!("stock.delete id={id}");
            Json(serde_json::json!({"ok": true})).into_response()
        }
        Err(e) => store_error(e),
    }
}

// ---- Admin: accounts ----

async fn api_admin_accounts(State(st): State<DashboardState>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    match st.store.fetch_accounts() {
        Ok(rows) => Json(JsonValue::Array(rows)).into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct AccountUpsertReq {
    id: Option<String>,
    entry_number: Option<i64>,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    rdn: Option<String>,
    device_user: Option<String>,
}

async fn api_admin_upsert_account(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Json(req): Json<AccountUpsertReq>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "name_required"})),
        )
            .into_response();
    }
    let id = req
        .id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    match st.store.upsert_account(
        &id,
        req.entry_number,
        &name,
        req.email.as_deref(),
        req.phone.as_deref(),
        req.rdn.as_deref(),
        req.device_user.as_deref(),
    ) {
        Ok(()) => Json(serde_json::json!({"ok": true, "id": id})).into_response(),
        Err(e) => store_error(e),
    }
}

async fn api_admin_delete_account(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    match st.store.delete_account(&id) {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"ok": false, "error": "not_found"})),
        )
            .into_response(),
        Ok(_) => Json(serde_json::json!({"ok": true})).into_response(),
        Err(e) => store_error(e),
    }
}

// ---- Admin: bookkeeping ----

async fn api_admin_bookkeeping(State(st): State<DashboardState>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    let summary = match st.store.fetch_profit_summary() {
        Ok(s) => s,
        Err(e) => return store_error(e),
    };
    let profits = st.store.fetch_profits().unwrap_or_default();
    let expenses = st.store.fetch_expenses().unwrap_or_default();
    Json(serde_json::json!({
        "summary": summary,
        "profits": profits,
        "expenses": expenses,
    }))
    .into_response()
}

#[derive(Deserialize)]
struct ProfitReq {
    stock_name: String,
    profit_amount: f64,
}

async fn api_admin_add_profit(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Json(req): Json<ProfitReq>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    let name = normalize_code(&req.stock_name);
    if name.is_empty() || !req.profit_amount.is_finite() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "invalid_profit"})),
        )
            .into_response();
    }
    let id = Uuid::new_v4().to_string();
    match st.store.insert_profit(&id, &name, req.profit_amount, now_ts()) {
        Ok(()) => Json(serde_json::json!({"ok": true, "id": id})).into_response(),
        Err(e) => store_error(e),
    }
}

async fn api_admin_delete_profit(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    match st.store.delete_profit(&id) {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"ok": false, "error": "not_found"})),
        )
            .into_response(),
        Ok(_) => Json(serde_json::json!({"ok": true})).into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct ExpenseReq {
    description: String,
    expense_type: Option<String>,
    amount: f64,
}

async fn api_admin_add_expense(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Json(req): Json<ExpenseReq>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    let description = req.description.trim().to_string();
    if description.is_empty() || !req.amount.is_finite() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "invalid_expense"})),
        )
            .into_response();
    }
    let id = Uuid::new_v4().to_string();
    match st.store.insert_expense(
        &id,
        &description,
        req.expense_type.as_deref().filter(|s| !s.trim().is_empty()),
        req.amount,
        now_ts(),
    ) {
        Ok(()) => Json(serde_json::json!({"ok": true, "id": id})).into_response(),
        Err(e) => store_error(e),
    }
}

async fn api_admin_delete_expense(
    State(st): State<DashboardState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = require_admin(&st, &headers) {
        return resp;
    }
    match st.store.delete_expense(&id) {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"ok": false, "error": "not_found"})),
        )
            .into_response(),
        Ok(_) => Json(serde_json::json!({"ok": true})).into_response(),
        Err(e) => store_error(e),
    }
}

// ---- Inline UI ----

async fn index(State(st): State<DashboardState>) -> impl IntoResponse {
    Html(render_index_html(
        &st.settings.dashboard_host,
        st.settings.dashboard_port,
        st.store.path(),
    ))
}

fn render_index_html(host: &str, port: u16, sqlite_path: &str) -> String {
    // Single-file UI, no build step: markup, styles and fetch wiring in one
    // page, same approach as the rest of our dashboards.
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>UWTrack • Underwriter Dashboard</title>
    <style>
      :root {{
        --bg: #0b1220;
        --panel: rgba(255,255,255,0.06);
        --stroke: rgba(255,255,255,0.12);
        --text: rgba(255,255,255,0.92);
        --muted: rgba(255,255,255,0.65);
        --good: #33d17a;
        --bad: #ff4d4d;
        --warn: #ffcc00;
        --brand: #7c5cff;
        --brand2: #3dd6d0;
      }}
      * {{ box-sizing: border-box; }}
      body {{
        margin: 0;
        font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial;
        color: var(--text);
        background: radial-gradient(1200px 900px at 15% 10%, rgba(124,92,255,0.20), transparent 60%),
                    radial-gradient(1100px 800px at 90% 20%, rgba(61,214,208,0.16), transparent 55%),
                    var(--bg);
      }}
      .wrap {{ max-width: 1280px; margin: 0 auto; padding: 22px 18px 42px; }}
      .topbar {{
        display: flex; align-items: center; justify-content: space-between; gap: 12px;
        padding: 16px 16px; border: 1px solid var(--stroke); border-radius: 16px;
        background: linear-gradient(180deg, rgba(255,255,255,0.06), rgba(255,255,255,0.03));
        backdrop-filter: blur(10px);
      }}
      .brand {{ display: flex; align-items: center; gap: 12px; }}
      .logo {{
        width: 42px; height: 42px; border-radius: 12px;
        background: conic-gradient(from 180deg, var(--brand), var(--brand2), var(--brand));
        box-shadow: 0 12px 30px rgba(124,92,255,0.25);
      }}
      .title {{ font-weight: 800; letter-spacing: 0.2px; }}
      .subtitle {{ color: var(--muted); font-size: 12px; margin-top: 2px; }}
      .chips {{ display: flex; flex-wrap: wrap; gap: 8px; justify-content: flex-end; }}
      .chip {{
        padding: 7px 10px; border-radius: 999px; border: 1px solid var(--stroke);
        background: rgba(255,255,255,0.04);
        font-size: 12px; color: var(--muted);
        white-space: nowrap;
      }}
      .chip b {{ color: var(--text); font-weight: 700; }}
      .grid {{ display: grid; gap: 14px; margin-top: 14px; grid-template-columns: repeat(12, 1fr); }}
      .card {{
        border: 1px solid var(--stroke); border-radius: 16px; background: var(--panel);
        backdrop-filter: blur(10px);
        overflow: hidden;
      }}
      .card .hd {{
        display:flex; align-items: center; justify-content: space-between; gap: 10px;
        padding: 12px 14px; border-bottom: 1px solid rgba(255,255,255,0.08);
        background: rgba(255,255,255,0.03);
      }}
      .card .hd .h {{ font-weight: 800; letter-spacing: 0.2px; }}
      .pill {{ font-size: 12px; color: var(--muted); border: 1px solid var(--stroke); padding: 3px 8px; border-radius: 999px; background: rgba(255,255,255,0.04); }}
      .card .bd {{ padding: 12px 14px; }}
      .kpis {{ display: grid; gap: 10px; grid-template-columns: repeat(4, 1fr); }}
      .kpi {{
        border: 1px solid rgba(255,255,255,0.10);
        border-radius: 14px;
        background: linear-gradient(180deg, rgba(255,255,255,0.05), rgba(255,255,255,0.03));
        padding: 12px 12px;
      }}
      .kpi .lbl {{ color: var(--muted); font-size: 12px; }}
      .kpi .val {{ font-size: 22px; font-weight: 850; margin-top: 6px; letter-spacing: -0.3px; }}
      .kpi .sub {{ color: var(--muted); font-size: 12px; margin-top: 5px; }}
      .good {{ color: var(--good); }}
      .bad {{ color: var(--bad); }}
      .warn {{ color: var(--warn); }}
      table {{ width: 100%; border-collapse: collapse; }}
      th, td {{ padding: 10px 10px; border-bottom: 1px solid rgba(255,255,255,0.07); vertical-align: top; }}
      th {{ text-align: left; color: var(--muted); font-size: 12px; font-weight: 700; }}
      td {{ font-size: 13px; }}
      .row2 {{ color: var(--muted); font-size: 12px; margin-top: 4px; }}
      .mono {{ font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace; }}
      .tag {{
        display:inline-block; padding: 3px 8px; border-radius: 999px; border: 1px solid rgba(255,255,255,0.12);
        background: rgba(255,255,255,0.04); color: var(--muted); font-size: 12px;
      }}
      .tag.strong {{ background: rgba(51,209,122,0.25); color: var(--good); border-color: rgba(51,209,122,0.4); }}
      .tag.moderate {{ background: rgba(51,209,122,0.10); color: var(--good); }}
      .tag.weak {{ background: rgba(255,77,77,0.15); color: var(--bad); border-color: rgba(255,77,77,0.35); }}
      .btn {{
        cursor: pointer;
        padding: 8px 10px;
        border-radius: 10px;
        border: 1px solid rgba(255,255,255,0.12);
        background: rgba(255,255,255,0.05);
        color: var(--text);
        font-weight: 700;
        font-size: 12px;
      }}
      .btn:hover {{ background: rgba(255,255,255,0.08); }}
      .btn.danger {{ border-color: rgba(255,77,77,0.45); }}
      input, select {{
        padding: 8px 10px; border-radius: 10px; border: 1px solid rgba(255,255,255,0.14);
        background: rgba(255,255,255,0.05); color: var(--text); font-size: 13px;
      }}
      input::placeholder {{ color: rgba(255,255,255,0.35); }}
      .split {{ display:flex; gap: 10px; flex-wrap: wrap; align-items: center; }}
      .uwgrid {{ display: grid; gap: 10px; grid-template-columns: repeat(3, 1fr); }}
      .uwcard {{
        border: 1px solid rgba(255,255,255,0.10); border-radius: 14px; padding: 12px;
        background: linear-gradient(180deg, rgba(255,255,255,0.05), rgba(255,255,255,0.03));
        display: flex; align-items: center; justify-content: space-between; cursor: pointer;
      }}
      .uwcard:hover {{ background: rgba(255,255,255,0.08); }}
      .rank {{
        width: 34px; height: 34px; border-radius: 999px; display: flex; align-items: center;
        justify-content: center; font-weight: 800; border: 1px solid var(--stroke);
        background: rgba(255,255,255,0.06);
      }}
      .rank.r1 {{ background: rgba(255,204,0,0.2); color: var(--warn); }}
      .formgrid {{ display: grid; gap: 8px; grid-template-columns: repeat(4, 1fr); }}
      .small {{ font-size: 12px; color: var(--muted); }}
      .footer {{ margin-top: 14px; color: var(--muted); font-size: 12px; }}
      .hidden {{ display: none !important; }}
      .banner {{
        margin-top: 12px;
        padding: 10px 12px;
        border-radius: 14px;
        border: 1px solid rgba(255,255,255,0.14);
        background: rgba(255, 77, 77, 0.10);
        display: none;
      }}
      .col-12 {{ grid-column: span 12; }}
      .col-8 {{ grid-column: span 8; }}
      .col-6 {{ grid-column: span 6; }}
      .col-4 {{ grid-column: span 4; }}
      @media (max-width: 1100px) {{
        .kpis {{ grid-template-columns: repeat(2, 1fr); }}
        .uwgrid {{ grid-template-columns: repeat(1, 1fr); }}
        .col-8 {{ grid-column: span 12; }}
        .col-6 {{ grid-column: span 12; }}
        .col-4 {{ grid-column: span 12; }}
      }}
    </style>
  </head>
  <body>
    <div class="wrap">
      <div class="topbar">
        <div class="brand">
          <div class="logo"></div>
          <div>
            <div class="title">UWTrack • Underwriter Dashboard</div>
            <div class="subtitle">Local: <span class="mono">{host}:{port}</span></div>
          </div>
        </div>
        <div class="chips">
          <div class="chip">SQLite: <b class="mono">{sqlite_path}</b></div>
          <div class="chip">Status: <b id="statusText">starting…</b></div>
          <button class="btn" id="refreshBtn">Refresh</button>
          <button class="btn" id="loginBtn">Admin login</button>
          <button class="btn hidden" id="logoutBtn">Logout</button>
        </div>
      </div>

      <div class="banner" id="errBanner">
        <div style="font-weight:850;">Something is failing</div>
        <div class="row2" id="errBannerMsg">--</div>
      </div>

      <div class="grid">
        <div class="card col-12">
          <div class="hd">
            <div class="h">Market Overview</div>
            <div class="pill" id="summaryMeta">--</div>
          </div>
          <div class="bd">
            <div class="kpis">
              <div class="kpi">
                <div class="lbl">Listings tracked</div>
                <div class="val" id="kpiTotal">--</div>
                <div class="sub">all recorded IPOs</div>
              </div>
              <div class="kpi">
                <div class="lbl">Day-1 green</div>
                <div class="val good" id="kpiGreen">--</div>
                <div class="sub">closed above listing price</div>
              </div>
              <div class="kpi">
                <div class="lbl">Day-1 red</div>
                <div class="val bad" id="kpiRed">--</div>
                <div class="sub">closed below listing price</div>
              </div>
              <div class="kpi">
                <div class="lbl">Streak leader</div>
                <div class="val" id="kpiStreak">--</div>
                <div class="sub" id="kpiStreakSub">six straight green days</div>
              </div>
            </div>
          </div>
        </div>

        <div class="card col-12">
          <div class="hd">
            <div class="h">Top Underwriters</div>
            <div class="pill">avg win rate, days 1–2</div>
          </div>
          <div class="bd">
            <div class="uwgrid" id="uwGrid"></div>
            <div class="small" id="uwEmpty" style="display:none; padding: 8px;">No underwriter data yet.</div>
          </div>
        </div>

        <div class="card col-12">
          <div class="hd">
            <div class="h">Listings</div>
            <div class="split">
              <input id="searchBox" placeholder="Search ticker…" />
              <select id="uwFilter"><option value="">All underwriters</option></select>
            </div>
          </div>
          <div class="bd">
            <table>
              <thead>
                <tr>
                  <th>Code</th>
                  <th>Date</th>
                  <th>UW</th>
                  <th>D1</th><th>D2</th><th>D3</th><th>D4</th><th>D5</th><th>D6</th><th>D7</th>
                </tr>
              </thead>
              <tbody id="stockRows"></tbody>
            </table>
            <div class="split" style="margin-top: 10px; justify-content: space-between;">
              <div class="small">Page <b id="pageNow">1</b> of <b id="pageTotal">1</b></div>
              <div class="split">
                <button class="btn" id="prevBtn">Previous</button>
                <button class="btn" id="nextBtn">Next</button>
              </div>
            </div>
          </div>
        </div>

        <div class="card col-12 hidden" id="detailCard">
          <div class="hd">
            <div class="h">Underwriter detail: <span id="detailName" class="mono"></span></div>
            <button class="btn" id="detailClose">Close</button>
          </div>
          <div class="bd">
            <div class="small" id="detailSummary" style="margin-bottom: 8px;"></div>
            <table>
              <thead>
                <tr><th>Code</th><th>Date</th><th>D1</th><th>D2</th><th>D3</th></tr>
              </thead>
              <tbody id="detailRows"></tbody>
            </table>
          </div>
        </div>

        <div class="card col-12 hidden" id="adminCard">
          <div class="hd">
            <div class="h">Admin • Stock entry</div>
            <div class="pill" id="formMode">new record</div>
          </div>
          <div class="bd">
            <div class="formgrid">
              <input id="f-code" placeholder="Code" />
              <input id="f-date" type="date" />
              <input id="f-uw" placeholder="Underwriter (- for none)" />
              <input id="f-float" type="number" step="any" placeholder="Float %" />
              <input id="f-d1" type="number" step="any" placeholder="D1 %" />
              <input id="f-d2" type="number" step="any" placeholder="D2 %" />
              <input id="f-d3" type="number" step="any" placeholder="D3 %" />
              <input id="f-d4" type="number" step="any" placeholder="D4 %" />
              <input id="f-d5" type="number" step="any" placeholder="D5 %" />
              <input id="f-d6" type="number" step="any" placeholder="D6 %" />
              <input id="f-d7" type="number" step="any" placeholder="D7 %" />
            </div>
            <div class="split" style="margin-top: 10px;">
              <button class="btn" id="saveBtn">Save record</button>
              <button class="btn hidden" id="cancelEditBtn">Cancel edit</button>
              <span class="small" id="saveMsg"></span>
            </div>
            <table style="margin-top: 14px;">
              <thead>
                <tr><th>Code</th><th>UW</th><th>D1</th><th></th></tr>
              </thead>
              <tbody id="adminRows"></tbody>
            </table>
            <div class="split" style="margin-top: 10px; justify-content: space-between;">
              <input id="adminSearchBox" placeholder="Search ticker…" />
              <div class="split">
                <button class="btn" id="adminPrevBtn">Previous</button>
                <button class="btn" id="adminNextBtn">Next</button>
              </div>
            </div>
          </div>
        </div>

        <div class="card col-6 hidden" id="accountsCard">
          <div class="hd">
            <div class="h">Admin • Accounts</div>
            <div class="pill" id="accountsMeta">--</div>
          </div>
          <div class="bd">
            <div class="formgrid" style="grid-template-columns: repeat(3, 1fr);">
              <input id="a-entry" type="number" placeholder="Entry #" />
              <input id="a-name" placeholder="Name" />
              <input id="a-email" placeholder="Email" />
              <input id="a-phone" placeholder="Phone" />
              <input id="a-rdn" placeholder="RDN" />
              <input id="a-device" placeholder="Device" />
            </div>
            <div class="split" style="margin-top: 8px;">
              <button class="btn" id="accountSaveBtn">Add account</button>
            </div>
            <table style="margin-top: 12px;">
              <thead><tr><th>#</th><th>Name</th><th>Email</th><th></th></tr></thead>
              <tbody id="accountRows"></tbody>
            </table>
          </div>
        </div>

        <div class="card col-6 hidden" id="bookCard">
          <div class="hd">
            <div class="h">Admin • Bookkeeping</div>
            <div class="pill" id="netPill">net --</div>
          </div>
          <div class="bd">
            <div class="split">
              <input id="p-name" placeholder="Stock" />
              <input id="p-amount" type="number" step="any" placeholder="Profit" />
              <button class="btn" id="profitAddBtn">Add profit</button>
            </div>
            <div class="split" style="margin-top: 8px;">
              <input id="e-desc" placeholder="Expense description" />
              <input id="e-type" placeholder="Type" />
              <input id="e-amount" type="number" step="any" placeholder="Amount" />
              <button class="btn" id="expenseAddBtn">Add expense</button>
            </div>
            <table style="margin-top: 12px;">
              <thead><tr><th>Entry</th><th>Amount</th><th></th></tr></thead>
              <tbody id="bookRows"></tbody>
            </table>
          </div>
        </div>
      </div>

      <div class="footer">
        Tip: set <span class="mono">ADMIN_PASSWORD</span> to enable the admin panel.
      </div>
    </div>

    <script>
      let token = localStorage.getItem("uwtrack_token") || null;
      let page = 1, adminPage = 1, totalPages = 1;

      const fmtPct = (x) => {{
        if (x === null || x === undefined) return "-";
        const n = Number(x);
        if (!Number.isFinite(n)) return "-";
        return (n > 0 ? "+" : "") + n + "%";
      }};
      const pctCls = (x) => {{
        const n = Number(x);
        if (x === null || x === undefined || !Number.isFinite(n)) return "";
        if (n > 0) return "good";
        if (n < 0) return "bad";
        return "warn";
      }};
      function escapeHtml(s) {{
        return (s||"").toString().replaceAll("&","&amp;").replaceAll("<","&lt;").replaceAll(">","&gt;").replaceAll('"',"&quot;").replaceAll("'","&#039;");
      }}

      async function getJson(path) {{
        const headers = token ? {{ "Authorization": "Bearer " + token }} : {{}};
        const r = await fetch(path, {{ cache: "no-store", headers }});
        if (!r.ok) throw new Error(path + " -> " + r.status);
        return await r.json();
      }}
      async function sendJson(method, path, body) {{
        const headers = {{ "Content-Type": "application/json" }};
        if (token) headers["Authorization"] = "Bearer " + token;
        const r = await fetch(path, {{ method, headers, body: body ? JSON.stringify(body) : undefined }});
        const data = await r.json().catch(() => ({{}}));
        if (!r.ok) throw new Error(data.error || (path + " -> " + r.status));
        return data;
      }}

      function setStatus(ok, msg) {{
        const el = document.getElementById("statusText");
        el.textContent = msg;
        el.className = ok ? "good" : "bad";
      }}
      function showBanner(msg) {{
        document.getElementById("errBannerMsg").textContent = msg;
        document.getElementById("errBanner").style.display = "block";
      }}
      function hideBanner() {{ document.getElementById("errBanner").style.display = "none"; }}

      function renderSummary(s) {{
        document.getElementById("kpiTotal").textContent = String(s.breadth.total);
        document.getElementById("kpiGreen").textContent = String(s.breadth.green);
        document.getElementById("kpiRed").textContent = String(s.breadth.red);
        const streakEl = document.getElementById("kpiStreak");
        const subEl = document.getElementById("kpiStreakSub");
        if (s.streak) {{
          streakEl.textContent = s.streak.underwriter;
          subEl.textContent = "avg WR " + s.streak.avg_win_rate.toFixed(0) + "% (3-day)";
        }} else {{
          streakEl.textContent = "-";
          subEl.textContent = "no qualifying streak";
        }}
        document.getElementById("summaryMeta").textContent = new Date(s.ts * 1000).toLocaleTimeString();
      }}

      function renderTopUw(list) {{
        const grid = document.getElementById("uwGrid");
        grid.innerHTML = "";
        document.getElementById("uwEmpty").style.display = list.length ? "none" : "block";
        list.forEach((item, i) => {{
          const div = document.createElement("div");
          div.className = "uwcard";
          div.onclick = () => openDetail(item.underwriter);
          div.innerHTML = `
            <div class="split">
              <div class="rank ${{i === 0 ? "r1" : ""}}">${{i + 1}}</div>
              <div>
                <div style="font-weight:800;">${{escapeHtml(item.underwriter)}}</div>
                <div class="row2">${{item.count}} listings • D1 ${{item.win_rate_1.toFixed(0)}}% / D2 ${{item.win_rate_2.toFixed(0)}}%</div>
              </div>
            </div>
            <span class="tag ${{item.badge}}">${{item.avg_win_rate.toFixed(0)}}%</span>
          `;
          grid.appendChild(div);
        }});
      }}

      function renderStocks(resp) {{
        totalPages = Math.max(1, resp.total_pages);
        document.getElementById("pageNow").textContent = String(resp.page);
        document.getElementById("pageTotal").textContent = String(totalPages);
        const tb = document.getElementById("stockRows");
        tb.innerHTML = "";
        if (!resp.data.length) {{
          tb.innerHTML = `<tr><td colspan="10" class="small" style="padding: 18px; text-align:center;">No data found.</td></tr>`;
          return;
        }}
        for (const s of resp.data) {{
          const tr = document.createElement("tr");
          const days = [s.d1, s.d2, s.d3, s.d4, s.d5, s.d6, s.d7]
            .map((d) => `<td class="${{pctCls(d)}}">${{fmtPct(d)}}</td>`)
            .join("");
          tr.innerHTML = `
            <td style="font-weight:800;">${{escapeHtml(s.code)}}</td>
            <td class="small">${{escapeHtml(s.date)}}</td>
            <td><span class="tag">${{escapeHtml(s.uw)}}</span></td>
            ${{days}}
          `;
          tb.appendChild(tr);
        }}
      }}

      async function loadStocks() {{
        const search = document.getElementById("searchBox").value;
        const uw = document.getElementById("uwFilter").value;
        const params = new URLSearchParams({{ page: String(page) }});
        if (search) params.set("search", search);
        if (uw) params.set("uw", uw);
        renderStocks(await getJson("/api/stocks?" + params));
      }}

      async function loadUwOptions() {{
        const names = await getJson("/api/uw_options");
        const sel = document.getElementById("uwFilter");
        const current = sel.value;
        sel.innerHTML = '<option value="">All underwriters</option>';
        for (const n of names) {{
          const opt = document.createElement("option");
          opt.value = n;
          opt.textContent = n;
          sel.appendChild(opt);
        }}
        if (names.includes(current)) sel.value = current;
      }}

      async function openDetail(name) {{
        const d = await getJson("/api/uw/" + encodeURIComponent(name));
        document.getElementById("detailCard").classList.remove("hidden");
        document.getElementById("detailName").textContent = name;
        const s = d.summary;
        document.getElementById("detailSummary").textContent = s
          ? `${{s.count}} listings • WR D1 ${{s.win_rate_1.toFixed(0)}}% / D2 ${{s.win_rate_2.toFixed(0)}}% / D3 ${{s.win_rate_3.toFixed(0)}}%`
          : "no aggregated stats for this underwriter";
        const tb = document.getElementById("detailRows");
        tb.innerHTML = "";
        for (const r of d.records) {{
          const tr = document.createElement("tr");
          tr.innerHTML = `
            <td style="font-weight:800;">${{escapeHtml(r.code)}}</td>
            <td class="small">${{escapeHtml(r.date)}}</td>
            <td class="${{pctCls(r.d1)}}">${{fmtPct(r.d1)}}</td>
            <td class="${{pctCls(r.d2)}}">${{fmtPct(r.d2)}}</td>
            <td class="${{pctCls(r.d3)}}">${{fmtPct(r.d3)}}</td>
          `;
          tb.appendChild(tr);
        }}
        document.getElementById("detailCard").scrollIntoView({{ behavior: "smooth" }});
      }}

      // ---- Admin ----

      function setAdminVisible(on) {{
        for (const id of ["adminCard", "accountsCard", "bookCard"]) {{
          document.getElementById(id).classList.toggle("hidden", !on);
        }}
        document.getElementById("loginBtn").classList.toggle("hidden", on);
        document.getElementById("logoutBtn").classList.toggle("hidden", !on);
      }}

      function resetForm() {{
        for (const id of ["f-code","f-date","f-uw","f-float","f-d1","f-d2","f-d3","f-d4","f-d5","f-d6","f-d7"]) {{
          document.getElementById(id).value = "";
        }}
        editId = null;
        document.getElementById("formMode").textContent = "new record";
        document.getElementById("cancelEditBtn").classList.add("hidden");
      }}

      let editId = null;
      let adminData = [];

      function renderAdminStocks(resp) {{
        adminData = resp.data;
        const tb = document.getElementById("adminRows");
        tb.innerHTML = "";
        resp.data.forEach((s, i) => {{
          const tr = document.createElement("tr");
          tr.innerHTML = `
            <td style="font-weight:800;">${{escapeHtml(s.code)}}</td>
            <td>${{escapeHtml(s.uw)}}</td>
            <td class="${{pctCls(s.d1)}}">${{fmtPct(s.d1)}}</td>
            <td>
              <button class="btn" data-edit="${{i}}">Edit</button>
              <button class="btn danger" data-del="${{escapeHtml(s.id)}}">Delete</button>
            </td>
          `;
          tb.appendChild(tr);
        }});
      }}

      async function loadAdminStocks() {{
        const search = document.getElementById("adminSearchBox").value;
        const params = new URLSearchParams({{ page: String(adminPage) }});
        if (search) params.set("search", search);
        renderAdminStocks(await getJson("/api/admin/stocks?" + params));
      }}

      function numOrNull(id) {{
        const v = document.getElementById(id).value;
        if (v === "") return null;
        const n = Number(v);
        return Number.isFinite(n) ? n : null;
      }}

      async function saveStock() {{
        const body = {{
          id: editId,
          code: document.getElementById("f-code").value,
          date: document.getElementById("f-date").value,
          uw: document.getElementById("f-uw").value,
          float_pct: numOrNull("f-float"),
          d1: numOrNull("f-d1"), d2: numOrNull("f-d2"), d3: numOrNull("f-d3"),
          d4: numOrNull("f-d4"), d5: numOrNull("f-d5"), d6: numOrNull("f-d6"),
          d7: numOrNull("f-d7"),
        }};
        const msg = document.getElementById("saveMsg");
        try {{
          await sendJson("POST", "/api/admin/stocks", body);
          msg.textContent = "saved";
          resetForm();
          await Promise.all([refresh(), loadAdminStocks()]);
        }} catch (e) {{
          msg.textContent = e.message === "duplicate_code" ? "ticker already exists" : e.message;
        }}
      }}

      function startEdit(i) {{
        const s = adminData[i];
        if (!s) return;
        editId = s.id;
        document.getElementById("f-code").value = s.code;
        document.getElementById("f-date").value = s.date;
        document.getElementById("f-uw").value = s.uw;
        document.getElementById("f-float").value = s.float_pct ?? "";
        for (let d = 1; d <= 7; d++) document.getElementById("f-d" + d).value = s["d" + d] ?? "";
        document.getElementById("formMode").textContent = "editing " + s.code;
        document.getElementById("cancelEditBtn").classList.remove("hidden");
        document.getElementById("adminCard").scrollIntoView({{ behavior: "smooth" }});
      }}

      async function deleteStock(id) {{
        if (!confirm("Delete this record permanently?")) return;
        await sendJson("DELETE", "/api/admin/stocks/" + encodeURIComponent(id));
        await Promise.all([refresh(), loadAdminStocks()]);
      }}

      async function loadAccounts() {{
        const rows = await getJson("/api/admin/accounts");
        document.getElementById("accountsMeta").textContent = rows.length + " registered";
        const tb = document.getElementById("accountRows");
        tb.innerHTML = "";
        for (const a of rows) {{
          const tr = document.createElement("tr");
          tr.innerHTML = `
            <td>${{a.entry_number ?? "-"}}</td>
            <td style="font-weight:700;">${{escapeHtml(a.name)}}</td>
            <td class="small">${{escapeHtml(a.email || "-")}}</td>
            <td><button class="btn danger" data-delacc="${{escapeHtml(a.id)}}">Delete</button></td>
          `;
          tb.appendChild(tr);
        }}
      }}

      async function addAccount() {{
        const entry = document.getElementById("a-entry").value;
        await sendJson("POST", "/api/admin/accounts", {{
          entry_number: entry === "" ? null : Number(entry),
          name: document.getElementById("a-name").value,
          email: document.getElementById("a-email").value || null,
          phone: document.getElementById("a-phone").value || null,
          rdn: document.getElementById("a-rdn").value || null,
          device_user: document.getElementById("a-device").value || null,
        }});
        for (const id of ["a-entry","a-name","a-email","a-phone","a-rdn","a-device"]) document.getElementById(id).value = "";
        await loadAccounts();
      }}

      async function loadBookkeeping() {{
        const b = await getJson("/api/admin/bookkeeping");
        const net = b.summary.net_profit;
        const pill = document.getElementById("netPill");
        pill.textContent = `profit ${{b.summary.total_profit.toFixed(0)}} • expense ${{b.summary.total_expense.toFixed(0)}} • net ${{net.toFixed(0)}}`;
        pill.className = "pill " + (net >= 0 ? "good" : "bad");
        const tb = document.getElementById("bookRows");
        tb.innerHTML = "";
        for (const p of b.profits) {{
          const tr = document.createElement("tr");
          tr.innerHTML = `
            <td style="font-weight:700;">${{escapeHtml(p.stock_name)}}</td>
            <td class="good">+${{p.profit_amount}}</td>
            <td><button class="btn danger" data-delprofit="${{escapeHtml(p.id)}}">x</button></td>
          `;
          tb.appendChild(tr);
        }}
        for (const e of b.expenses) {{
          const tr = document.createElement("tr");
          tr.innerHTML = `
            <td>${{escapeHtml(e.description)}} <span class="tag">${{escapeHtml(e.expense_type || "other")}}</span></td>
            <td class="bad">-${{e.amount}}</td>
            <td><button class="btn danger" data-delexpense="${{escapeHtml(e.id)}}">x</button></td>
          `;
          tb.appendChild(tr);
        }}
      }}

      async function loadAdminAll() {{
        await Promise.all([loadAdminStocks(), loadAccounts(), loadBookkeeping()]);
      }}

      async function doLogin() {{
        const email = prompt("Admin email:");
        if (email === null) return;
        const password = prompt("Password:");
        if (password === null) return;
        try {{
          const resp = await sendJson("POST", "/api/auth/login", {{ email, password }});
          token = resp.token;
          localStorage.setItem("uwtrack_token", token);
          setAdminVisible(true);
          await loadAdminAll();
        }} catch (e) {{
          showBanner("Login failed: " + e.message);
        }}
      }}

      async function doLogout() {{
        try {{ await sendJson("POST", "/api/auth/logout"); }} catch (e) {{}}
        token = null;
        localStorage.removeItem("uwtrack_token");
        setAdminVisible(false);
      }}

      async function checkExistingSession() {{
        if (!token) return;
        try {{
          await getJson("/api/auth/me");
          setAdminVisible(true);
          await loadAdminAll();
        }} catch (e) {{
          token = null;
          localStorage.removeItem("uwtrack_token");
        }}
      }}

      async function refresh() {{
        try {{
          const [summary, topUw] = await Promise.all([
            getJson("/api/summary"),
            getJson("/api/top_uw"),
          ]);
          renderSummary(summary);
          renderTopUw(topUw);
          await Promise.all([loadUwOptions(), loadStocks()]);
          setStatus(true, "live");
          hideBanner();
        }} catch (e) {{
          setStatus(false, "disconnected");
          showBanner((e && e.message) ? e.message : String(e));
        }}
      }}

      // Debounced search boxes so typing doesn't hammer the API.
      let searchTimer, adminSearchTimer;
      document.getElementById("searchBox").addEventListener("input", () => {{
        clearTimeout(searchTimer);
        searchTimer = setTimeout(() => {{ page = 1; loadStocks(); }}, 500);
      }});
      document.getElementById("adminSearchBox").addEventListener("input", () => {{
        clearTimeout(adminSearchTimer);
        adminSearchTimer = setTimeout(() => {{ adminPage = 1; loadAdminStocks(); }}, 500);
      }});
      document.getElementById("uwFilter").addEventListener("change", () => {{ page = 1; loadStocks(); }});
      document.getElementById("prevBtn").addEventListener("click", () => {{ if (page > 1) {{ page--; loadStocks(); }} }});
      document.getElementById("nextBtn").addEventListener("click", () => {{ if (page < totalPages) {{ page++; loadStocks(); }} }});
      document.getElementById("adminPrevBtn").addEventListener("click", () => {{ if (adminPage > 1) {{ adminPage--; loadAdminStocks(); }} }});
      document.getElementById("adminNextBtn").addEventListener("click", () => {{ adminPage++; loadAdminStocks(); }});
      document.getElementById("refreshBtn").addEventListener("click", refresh);
      document.getElementById("loginBtn").addEventListener("click", doLogin);
      document.getElementById("logoutBtn").addEventListener("click", doLogout);
      document.getElementById("saveBtn").addEventListener("click", saveStock);
      document.getElementById("cancelEditBtn").addEventListener("click", resetForm);
      document.getElementById("accountSaveBtn").addEventListener("click", () => addAccount().catch((e) => showBanner(e.message)));
      document.getElementById("profitAddBtn").addEventListener("click", async () => {{
        await sendJson("POST", "/api/admin/profits", {{
          stock_name: document.getElementById("p-name").value,
          profit_amount: Number(document.getElementById("p-amount").value),
        }}).catch((e) => showBanner(e.message));
        document.getElementById("p-name").value = "";
        document.getElementById("p-amount").value = "";
        loadBookkeeping();
      }});
      document.getElementById("expenseAddBtn").addEventListener("click", async () => {{
        await sendJson("POST", "/api/admin/expenses", {{
          description: document.getElementById("e-desc").value,
          expense_type: document.getElementById("e-type").value || null,
          amount: Number(document.getElementById("e-amount").value),
        }}).catch((e) => showBanner(e.message));
        for (const id of ["e-desc","e-type","e-amount"]) document.getElementById(id).value = "";
        loadBookkeeping();
      }});
      document.getElementById("detailClose").addEventListener("click", () => document.getElementById("detailCard").classList.add("hidden"));
      document.body.addEventListener("click", (ev) => {{
        const t = ev.target;
        if (t.dataset.edit !== undefined) startEdit(Number(t.dataset.edit));
        if (t.dataset.del) deleteStock(t.dataset.del).catch((e) => showBanner(e.message));
        if (t.dataset.delacc) sendJson("DELETE", "/api/admin/accounts/" + t.dataset.delacc).then(loadAccounts).catch((e) => showBanner(e.message));
        if (t.dataset.delprofit) sendJson("DELETE", "/api/admin/profits/" + t.dataset.delprofit).then(loadBookkeeping).catch((e) => showBanner(e.message));
        if (t.dataset.delexpense) sendJson("DELETE", "/api/admin/expenses/" + t.dataset.delexpense).then(loadBookkeeping).catch((e) => showBanner(e.message));
      }});

      refresh();
      checkExistingSession();
    </script>
  </body>
</html>"#,
        host = host,
        port = port,
        sqlite_path = sqlite_path,
    )
}
