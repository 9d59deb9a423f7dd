//! Lookup of the trigger event backing an endpoint throttling entry.

use crate::descriptor::{ApiFlavor, HttpEndpoint, TriggerEvent};
use crate::settings::EndpointThrottlingSettings;

/// Find the trigger event on `events` matching the endpoint's
/// `(method, path)` for the given API flavor.
///
/// Shorthand (`"GET /items"`) and structured events normalize to the
/// same pair before comparison. Methods compare case-insensitively;
/// paths compare exactly, tolerating a missing leading slash on either
/// side. Returns `None` when nothing matches; the caller logs and
/// skips the endpoint.
pub fn locate(
    events: &[TriggerEvent],
    flavor: ApiFlavor,
    want: &EndpointThrottlingSettings,
) -> Option<HttpEndpoint> {
    events
        .iter()
        .filter_map(|event| event.event_of(flavor))
        .filter_map(|def| def.endpoint())
        .find(|endpoint| {
            paths_match(&endpoint.path, &want.path)
                && endpoint.method.eq_ignore_ascii_case(&want.method)
        })
}

fn paths_match(a: &str, b: &str) -> bool {
    a.strip_prefix('/').unwrap_or(a) == b.strip_prefix('/').unwrap_or(b)
}
