//! Reset planning: detach endpoint-level overrides so the stage
//! defaults take over again.
//!
//! Only REST-style stages need this; an HTTP-style stage is rewritten
//! wholesale on every update, so omitting a route from the next update
//! already resets it.

use crate::descriptor::{ApiFlavor, ServiceDescriptor};
use crate::endpoint_locator;
use crate::patch::{patch_path_for, PatchOperation};
use crate::rest_planner::ANY_METHOD_EXPANSION;
use crate::settings::EndpointThrottlingSettings;
use tracing::warn;

/// One `remove` operation per concrete method of every resolvable
/// endpoint, in settings order. `ANY` fans out exactly as in update
/// planning.
pub fn plan(
    endpoints: &[EndpointThrottlingSettings],
    descriptor: &ServiceDescriptor,
) -> Vec<PatchOperation> {
    let mut operations = Vec::new();
    for endpoint in endpoints {
        operations.extend(endpoint_reset_patch(endpoint, descriptor));
    }
    operations
}

fn endpoint_reset_patch(
    endpoint: &EndpointThrottlingSettings,
    descriptor: &ServiceDescriptor,
) -> Vec<PatchOperation> {
    let Some(function) = descriptor.function(&endpoint.function_name) else {
        warn!(
            "Function {} is not defined in the service descriptor.",
            endpoint.function_name
        );
        return Vec::new();
    };
    if function.events.is_empty() {
        warn!("Function {} has not defined events.", endpoint.function_name);
        return Vec::new();
    }
    let Some(trigger) = endpoint_locator::locate(&function.events, ApiFlavor::Rest, endpoint)
    else {
        warn!(
            "Function {} has not defined any HTTP events matching {} {}.",
            endpoint.function_name, endpoint.method, endpoint.path
        );
        return Vec::new();
    };

    if trigger.method.eq_ignore_ascii_case("ANY") {
        ANY_METHOD_EXPANSION
            .iter()
            .map(|method| remove_for_method(&trigger.path, method))
            .collect()
    } else {
        vec![remove_for_method(&trigger.path, &trigger.method)]
    }
}

fn remove_for_method(path: &str, method: &str) -> PatchOperation {
    PatchOperation::remove(format!("/{}", patch_path_for(path, method)))
}
