//! Request handlers for health and device lookups.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::ApiState;
use crate::lifecycle::LifecycleState;
use crate::registry::{DeviceRecord, Page, PageToken};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub component: &'static str,
    pub state: LifecycleState,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page_token: Option<String>,
    #[serde(default)]
    pub page_size: usize,
}

pub async fn get_health(State(state): State<ApiState>) -> Json<HealthStatus> {
    let lifecycle = *state.state.borrow();
    Json(HealthStatus {
        status: if lifecycle == LifecycleState::Running { "ok" } else { "draining" },
        version: env!("CARGO_PKG_VERSION"),
        component: state.component,
        state: lifecycle,
    })
}

pub async fn list_devices(
    State(state): State<ApiState>,
    Path(tenant): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, ApiError> {
    let token = params
        .page_token
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(PageToken::parse)
        .transpose()?;
    let page = state
        .store
        .list(&tenant, token.as_ref(), params.page_size)
        .await?;
    Ok(Json(page))
}

pub async fn get_device(
    State(state): State<ApiState>,
    Path((tenant, name)): Path<(String, String)>,
) -> Result<Json<DeviceRecord>, ApiError> {
    let record = state.store.get(&tenant, &name).await?;
    Ok(Json(record))
}
