//! Orchestration of a deployment's throttling update.
//!
//! One invocation per deployment: resolve settings once, then update
//! each deployed gateway flavor in turn. The flavors never race each
//! other; every external call is awaited before the next one starts.

use crate::descriptor::ServiceDescriptor;
use crate::dispatcher;
use crate::error::Result;
use crate::gateway::{GatewayClient, HttpApiStageUpdate, RestStageUpdate};
use crate::settings::{GlobalThrottlingSettings, DEFAULT_HTTP_API_STAGE};
use crate::{http_api_planner, reset_planner, rest_planner};
use tracing::info;

/// Identifiers of the deployed gateways, resolved ahead of planning.
/// A missing identifier means that flavor is not deployed; its
/// settings are skipped with a log rather than failing the run.
#[derive(Debug, Clone, Default)]
pub struct ApiIds {
    pub rest_api_id: Option<String>,
    pub http_api_id: Option<String>,
}

/// Apply the resolved throttling settings to every deployed gateway.
pub async fn update_stage_throttling(
    settings: &GlobalThrottlingSettings,
    descriptor: &ServiceDescriptor,
    ids: &ApiIds,
    client: &dyn GatewayClient,
) -> Result<()> {
    update_rest_stage(settings, descriptor, ids, client).await?;
    update_http_api_stage(settings, descriptor, ids, client).await
}

async fn update_rest_stage(
    settings: &GlobalThrottlingSettings,
    descriptor: &ServiceDescriptor,
    ids: &ApiIds,
    client: &dyn GatewayClient,
) -> Result<()> {
    let Some(rest_api_id) = ids.rest_api_id.as_deref() else {
        info!("No REST API found. Throttling settings will be ignored.");
        return Ok(());
    };

    let update = RestStageUpdate {
        rest_api_id: rest_api_id.to_string(),
        stage_name: settings.stage.clone(),
        patch_operations: rest_planner::plan(settings, descriptor),
    };
    dispatcher::dispatch_rest_update(client, update, "Updating").await
}

async fn update_http_api_stage(
    settings: &GlobalThrottlingSettings,
    descriptor: &ServiceDescriptor,
    ids: &ApiIds,
    client: &dyn GatewayClient,
) -> Result<()> {
    let Some(http_api_id) = ids.http_api_id.as_deref() else {
        info!("No HTTP API found. Throttling settings will be ignored.");
        return Ok(());
    };

    // Stage defaults apply even when no endpoint declares an override,
    // so the update goes out with an empty route map too.
    let update = HttpApiStageUpdate {
        api_id: http_api_id.to_string(),
        stage_name: DEFAULT_HTTP_API_STAGE.to_string(),
        default_route_settings: http_api_planner::default_route_settings(settings),
        route_settings: http_api_planner::route_settings(settings, descriptor),
    };
    dispatcher::dispatch_http_api_update(client, update).await
}

/// Remove endpoint-level overrides from the REST stage so the
/// stage-inherited defaults take over. HTTP-style stages need no
/// reset; their next update rewrites the full route map anyway.
pub async fn reset_endpoint_settings(
    settings: &GlobalThrottlingSettings,
    descriptor: &ServiceDescriptor,
    ids: &ApiIds,
    client: &dyn GatewayClient,
) -> Result<()> {
    let Some(rest_api_id) = ids.rest_api_id.as_deref() else {
        info!("No REST API found. Nothing to reset.");
        return Ok(());
    };

    let patch_operations = reset_planner::plan(&settings.rest_endpoints, descriptor);
    if patch_operations.is_empty() {
        info!("No endpoint-specific throttling settings to reset.");
        return Ok(());
    }

    let update = RestStageUpdate {
        rest_api_id: rest_api_id.to_string(),
        stage_name: settings.stage.clone(),
        patch_operations,
    };
    dispatcher::dispatch_rest_update(client, update, "Resetting").await
}
