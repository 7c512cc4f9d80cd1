//! Snapshot ingestion and query endpoints

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::{
    api::{error::ApiError, error::ApiResult, state::ApiState},
    notifier::ViewerEvent,
    storage::StoreRecord,
};

/// POST /api/servers/:name/data
///
/// Accept one pushed snapshot, upsert it as the machine's latest record,
/// and notify connected viewers. The body is stored verbatim; only JSON
/// well-formedness is enforced (by the extractor).
pub async fn ingest_snapshot(
    State(state): State<ApiState>,
    Path(server_name): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Value>> {
    debug!("ingesting snapshot for {server_name} from {addr}");

    let record = StoreRecord::new(server_name.clone(), addr.ip().to_string(), payload);
    state.store.upsert(record).await?;

    // Viewers learn the name only; they re-query for the data
    let notified = state
        .notifier
        .broadcast(ViewerEvent::ServerUpdated { server_name })
        .await;
    info!("snapshot stored, {notified} viewers notified");

    Ok(Json(json!({ "success": true })))
}

/// GET /api/servers
///
/// All machines' latest records, payload decoded
pub async fn list_servers(State(state): State<ApiState>) -> ApiResult<Json<Vec<StoreRecord>>> {
    let records = state.store.get_all().await?;
    Ok(Json(records))
}

/// GET /api/servers/:name
///
/// One machine's latest record, or 404 if it never pushed
pub async fn get_server(
    State(state): State<ApiState>,
    Path(server_name): Path<String>,
) -> ApiResult<Json<StoreRecord>> {
    let record = state
        .store
        .get_one(&server_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Server not found".to_string()))?;

    Ok(Json(record))
}
