//! Route-settings planning for HTTP-style stages.
//!
//! HTTP-style stages take a full map of per-route throttling settings
//! in a single update call, with stage defaults carried in a separate
//! record. Unlike the REST flavor, the route model supports a native
//! `ANY` route, so no method fan-out happens here.

use crate::descriptor::{ApiFlavor, ServiceDescriptor};
use crate::endpoint_locator;
use crate::settings::{EndpointThrottlingSettings, GlobalThrottlingSettings};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

/// Throttling limits for one route, in the gateway's wire casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteThrottling {
    pub throttling_burst_limit: i64,
    pub throttling_rate_limit: i64,
}

/// Stage-default limits, carried separately from the route map.
pub fn default_route_settings(settings: &GlobalThrottlingSettings) -> RouteThrottling {
    RouteThrottling {
        throttling_burst_limit: settings.max_concurrent_requests.wire(),
        throttling_rate_limit: settings.max_requests_per_second.wire(),
    }
}

/// Per-route settings keyed `"{METHOD} {path}"`, in settings order.
/// Unresolvable endpoints contribute nothing; identical keys overwrite
/// earlier entries.
pub fn route_settings(
    settings: &GlobalThrottlingSettings,
    descriptor: &ServiceDescriptor,
) -> IndexMap<String, RouteThrottling> {
    let mut routes = IndexMap::new();
    for endpoint in &settings.http_api_endpoints {
        if let Some((key, throttling)) = route_for_endpoint(endpoint, descriptor) {
            routes.insert(key, throttling);
        }
    }
    routes
}

fn route_for_endpoint(
    endpoint: &EndpointThrottlingSettings,
    descriptor: &ServiceDescriptor,
) -> Option<(String, RouteThrottling)> {
    let Some(function) = descriptor.function(&endpoint.function_name) else {
        warn!(
            "Function {} is not defined in the service descriptor.",
            endpoint.function_name
        );
        return None;
    };
    if function.events.is_empty() {
        warn!("Function {} has not defined events.", endpoint.function_name);
        return None;
    }
    let Some(trigger) = endpoint_locator::locate(&function.events, ApiFlavor::HttpApi, endpoint)
    else {
        warn!(
            "Function {} has not defined any HTTP API events matching {} {}.",
            endpoint.function_name, endpoint.method, endpoint.path
        );
        return None;
    };

    let key = format!("{} {}", trigger.method.to_uppercase(), trigger.path);
    let throttling = RouteThrottling {
        throttling_burst_limit: endpoint.max_concurrent_requests.wire(),
        throttling_rate_limit: endpoint.max_requests_per_second.wire(),
    };
    Some((key, throttling))
}
