//! Patch planning for REST-style stages.
//!
//! REST stages are updated through sparse patch operations. A resolved
//! method of `ANY` has no native representation there, so it fans out
//! into the concrete methods the gateway accepts throttling for.

use crate::descriptor::{ApiFlavor, ServiceDescriptor};
use crate::endpoint_locator;
use crate::patch::{patch_path_for, PatchOperation};
use crate::settings::{EndpointThrottlingSettings, GlobalThrottlingSettings};
use tracing::warn;

/// Concrete methods an `ANY` endpoint expands into.
pub const ANY_METHOD_EXPANSION: [&str; 7] =
    ["GET", "DELETE", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"];

/// Stage-wide limits: exactly one replace pair at the wildcard pointer.
pub fn stage_patch(settings: &GlobalThrottlingSettings) -> Vec<PatchOperation> {
    vec![
        PatchOperation::replace(
            "/*/*/throttling/rateLimit",
            settings.max_requests_per_second.wire().to_string(),
        ),
        PatchOperation::replace(
            "/*/*/throttling/burstLimit",
            settings.max_concurrent_requests.wire().to_string(),
        ),
    ]
}

/// Replace pairs for one endpoint, empty when its trigger cannot be
/// resolved.
pub fn endpoint_patch(
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

    let mut patch = Vec::new();
    if trigger.method.eq_ignore_ascii_case("ANY") {
        for method in ANY_METHOD_EXPANSION {
            patch.extend(patch_for_method(&trigger.path, method, endpoint));
        }
    } else {
        patch.extend(patch_for_method(&trigger.path, &trigger.method, endpoint));
    }
    patch
}

/// Full plan for a deployment: stage-wide patch followed by every
/// endpoint patch in settings order.
pub fn plan(
    settings: &GlobalThrottlingSettings,
    descriptor: &ServiceDescriptor,
) -> Vec<PatchOperation> {
    let mut operations = stage_patch(settings);
    for endpoint in &settings.rest_endpoints {
        operations.extend(endpoint_patch(endpoint, descriptor));
    }
    operations
}

fn patch_for_method(
    path: &str,
    method: &str,
    endpoint: &EndpointThrottlingSettings,
) -> Vec<PatchOperation> {
    let patch_path = patch_path_for(path, method);
    vec![
        PatchOperation::replace(
            format!("/{patch_path}/throttling/rateLimit"),
            endpoint.max_requests_per_second.wire().to_string(),
        ),
        PatchOperation::replace(
            format!("/{patch_path}/throttling/burstLimit"),
            endpoint.max_concurrent_requests.wire().to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageOverrides;
    use crate::settings;

    fn resolved(yaml: &str) -> (GlobalThrottlingSettings, ServiceDescriptor) {
        let descriptor = ServiceDescriptor::from_yaml(yaml).unwrap();
        let settings = settings::resolve(
            &descriptor,
            &StageOverrides {
                stage: None,
                region: None,
            },
        )
        .unwrap();
        (settings, descriptor)
    }

    #[test]
    fn test_stage_patch_is_two_replace_operations() {
        let (settings, _) = resolved(
            r#"
throttling:
  maxRequestsPerSecond: 1000
  maxConcurrentRequests: 500
"#,
        );
        let patch = stage_patch(&settings);
        assert_eq!(
            patch,
            vec![
                PatchOperation::replace("/*/*/throttling/rateLimit", "1000"),
                PatchOperation::replace("/*/*/throttling/burstLimit", "500"),
            ]
        );
    }

    #[test]
    fn test_disabled_stage_patch_carries_sentinel() {
        let (settings, _) = resolved(
            r#"
throttling:
  disabled: true
"#,
        );
        let patch = stage_patch(&settings);
        assert_eq!(patch[0].value, "-1");
        assert_eq!(patch[1].value, "-1");
    }

    #[test]
    fn test_endpoint_patch_for_literal_method() {
        let (settings, descriptor) = resolved(
            r#"
throttling:
  maxRequestsPerSecond: 1000
  maxConcurrentRequests: 500
functions:
  create-item:
    events:
      - http:
          method: post
          path: /item/{itemId}
          throttling:
            maxRequestsPerSecond: 100
            maxConcurrentRequests: 50
"#,
        );
        let patch = endpoint_patch(&settings.rest_endpoints[0], &descriptor);
        assert_eq!(
            patch,
            vec![
                PatchOperation::replace("/~1item~1{itemId}/POST/throttling/rateLimit", "100"),
                PatchOperation::replace("/~1item~1{itemId}/POST/throttling/burstLimit", "50"),
            ]
        );
    }

    #[test]
    fn test_any_method_fans_out_to_seven_methods() {
        let (settings, descriptor) = resolved(
            r#"
throttling:
  maxRequestsPerSecond: 1000
  maxConcurrentRequests: 500
functions:
  item:
    events:
      - http:
          method: any
          path: /item
          throttling:
            maxRequestsPerSecond: 500
            maxConcurrentRequests: 250
"#,
        );
        let patch = endpoint_patch(&settings.rest_endpoints[0], &descriptor);
        assert_eq!(patch.len(), 14);
        for method in ANY_METHOD_EXPANSION {
            assert!(patch.contains(&PatchOperation::replace(
                format!("/~1item/{method}/throttling/rateLimit"),
                "500"
            )));
            assert!(patch.contains(&PatchOperation::replace(
                format!("/~1item/{method}/throttling/burstLimit"),
                "250"
            )));
        }
    }

    #[test]
    fn test_unresolvable_endpoint_contributes_no_operations() {
        let (mut settings, descriptor) = resolved(
            r#"
throttling:
  maxRequestsPerSecond: 1000
functions:
  get-item:
    events:
      - http:
          method: get
          path: /item
          throttling:
            maxRequestsPerSecond: 100
"#,
        );
        settings.rest_endpoints[0].path = "/other".to_string();
        assert!(endpoint_patch(&settings.rest_endpoints[0], &descriptor).is_empty());
    }

    #[test]
    fn test_plan_prepends_stage_patch() {
        let (settings, descriptor) = resolved(
            r#"
throttling:
  maxRequestsPerSecond: 1000
  maxConcurrentRequests: 500
functions:
  get-item:
    events:
      - http:
          method: get
          path: /item
          throttling:
            maxRequestsPerSecond: 100
"#,
        );
        let plan = plan(&settings, &descriptor);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].path, "/*/*/throttling/rateLimit");
        assert_eq!(plan[1].path, "/*/*/throttling/burstLimit");
        assert_eq!(plan[2].path, "/~1item/GET/throttling/rateLimit");
        assert_eq!(plan[2].value, "100");
        // burst inherited from the global settings
        assert_eq!(plan[3].value, "500");
    }

    #[test]
    fn test_planning_is_idempotent() {
        let (settings, descriptor) = resolved(
            r#"
throttling:
  maxRequestsPerSecond: 1000
functions:
  item:
    events:
      - http:
          method: any
          path: /item
          throttling:
            disabled: true
"#,
        );
        let first = plan(&settings, &descriptor);
        let second = plan(&settings, &descriptor);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
