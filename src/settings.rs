//! Resolution of the declarative throttling configuration.
//!
//! Global limits fall back to the gateway's own account-level defaults.
//! Endpoint limits resolve field by field: explicit value, else inherit
//! the global field. An explicit `disabled: true` wins over everything
//! for that endpoint.

use crate::config::StageOverrides;
use crate::descriptor::{ApiFlavor, ServiceDescriptor};

pub const DEFAULT_MAX_REQUESTS_PER_SECOND: u32 = 10_000;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: u32 = 5_000;

/// HTTP-style APIs have no named stages; updates always target this one.
pub const DEFAULT_HTTP_API_STAGE: &str = "$default";

/// A single resolved limit. `Disabled` reaches the wire as the literal
/// -1, which the gateway reads as "leave unconstrained / do not
/// overwrite". Keeping it tagged here avoids arithmetic on the
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Disabled,
    Value(u32),
}

impl Limit {
    /// Lower to the wire representation.
    pub fn wire(&self) -> i64 {
        match self {
            Limit::Disabled => -1,
            Limit::Value(n) => i64::from(*n),
        }
    }

    fn resolve(explicit: Option<u32>, inherited: Limit) -> Limit {
        match explicit {
            Some(n) => Limit::Value(n),
            None => inherited,
        }
    }
}

/// Service-wide settings resolved once per deployment invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalThrottlingSettings {
    pub stage: String,
    pub region: String,
    pub max_requests_per_second: Limit,
    pub max_concurrent_requests: Limit,
    pub rest_endpoints: Vec<EndpointThrottlingSettings>,
    pub http_api_endpoints: Vec<EndpointThrottlingSettings>,
}

/// Settings for one endpoint that declared an explicit throttling block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointThrottlingSettings {
    pub function_name: String,
    pub method: String,
    pub path: String,
    pub max_requests_per_second: Limit,
    pub max_concurrent_requests: Limit,
}

/// Build the resolved settings tree from the descriptor.
///
/// Returns `None` when the descriptor has no throttling block at all;
/// the caller warns once and performs no gateway calls. Endpoints
/// without a throttling sub-block are not tracked, they inherit stage
/// behavior implicitly.
pub fn resolve(
    descriptor: &ServiceDescriptor,
    overrides: &StageOverrides,
) -> Option<GlobalThrottlingSettings> {
    let config = descriptor.throttling.as_ref()?;

    let (max_requests_per_second, max_concurrent_requests) = if config.disabled {
        (Limit::Disabled, Limit::Disabled)
    } else {
        (
            Limit::Value(
                config
                    .max_requests_per_second
                    .unwrap_or(DEFAULT_MAX_REQUESTS_PER_SECOND),
            ),
            Limit::Value(
                config
                    .max_concurrent_requests
                    .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS),
            ),
        )
    };

    let mut settings = GlobalThrottlingSettings {
        stage: overrides
            .stage
            .clone()
            .unwrap_or_else(|| descriptor.provider.stage.clone()),
        region: overrides
            .region
            .clone()
            .unwrap_or_else(|| descriptor.provider.region.clone()),
        max_requests_per_second,
        max_concurrent_requests,
        rest_endpoints: Vec::new(),
        http_api_endpoints: Vec::new(),
    };

    for (declared_name, function) in &descriptor.functions {
        let function_name = function.name.as_deref().unwrap_or(declared_name);
        for event in &function.events {
            for flavor in [ApiFlavor::Rest, ApiFlavor::HttpApi] {
                let Some(def) = event.event_of(flavor) else {
                    continue;
                };
                let Some(throttling) = def.throttling() else {
                    continue;
                };
                let Some(endpoint) = def.endpoint() else {
                    continue;
                };

                let (rate, burst) = if throttling.disabled {
                    (Limit::Disabled, Limit::Disabled)
                } else {
                    (
                        Limit::resolve(
                            throttling.max_requests_per_second,
                            settings.max_requests_per_second,
                        ),
                        Limit::resolve(
                            throttling.max_concurrent_requests,
                            settings.max_concurrent_requests,
                        ),
                    )
                };

                let resolved = EndpointThrottlingSettings {
                    function_name: function_name.to_string(),
                    method: endpoint.method,
                    path: endpoint.path,
                    max_requests_per_second: rate,
                    max_concurrent_requests: burst,
                };
                match flavor {
                    ApiFlavor::Rest => settings.rest_endpoints.push(resolved),
                    ApiFlavor::HttpApi => settings.http_api_endpoints.push(resolved),
                }
            }
        }
    }

    Some(settings)
}
