//! Data-connector protocol endpoints
//!
//! Unauthenticated: the table platform calls them server to server.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::connector::protocol::{meta_descriptor, ConnectorRequest, RecordOut, RecordsData, TableMeta};
use crate::connector::{self, CONNECTOR_PAGE_SIZE};
use crate::http::envelope::{ok, ApiResult};
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;

/// GET /meta.json
async fn meta() -> Json<Value> {
    Json(meta_descriptor())
}

/// POST /table_meta
async fn table_meta(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ConnectorRequest>,
) -> ApiResult<TableMeta> {
    let query = req.query()?;
    let conn = state.store.connect().await?;
    ok(connector::table_meta(conn.as_ref(), &query.collection).await)
}

/// POST /records
async fn records(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ConnectorRequest>,
) -> ApiResult<RecordsData> {
    let query = req.query()?;
    let conn = state.store.connect().await?;
    // maxPageSize from the caller is ignored
    let page = connector::page(conn.as_ref(), &query.collection, &query.page_token, CONNECTOR_PAGE_SIZE).await?;

    tracing::info!(
        collection = %query.collection,
        token = %query.page_token,
        returned = page.records.len(),
        has_more = page.has_more,
        "connector records"
    );
    ok(RecordsData {
        next_page_token: page.next_token,
        has_more: page.has_more,
        records: page.records.into_iter().map(RecordOut::from).collect(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meta.json", get(meta))
        .route("/table_meta", post(table_meta))
        .route("/records", post(records))
}
