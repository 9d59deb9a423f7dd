//! Serde model of the YAML service descriptor.
//!
//! The descriptor carries far more than throttling concerns (runtime,
//! packaging, IAM, ...); everything this tool does not consume is
//! ignored during deserialization. Function declaration order is
//! preserved because endpoint settings are planned in descriptor order.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Top-level service descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub provider: Provider,
    /// Global throttling block. Absent entirely when the service
    /// declares no throttling intent, which makes the whole tool a
    /// no-op for that deployment.
    #[serde(default)]
    pub throttling: Option<ThrottlingConfig>,
    #[serde(default)]
    pub functions: IndexMap<String, FunctionConfig>,
}

/// Deployment coordinates, with the framework's own fallbacks.
#[derive(Debug, Clone, Deserialize)]
pub struct Provider {
    #[serde(default = "Provider::default_stage")]
    pub stage: String,
    #[serde(default = "Provider::default_region")]
    pub region: String,
}

impl Provider {
    fn default_stage() -> String {
        "dev".to_string()
    }

    fn default_region() -> String {
        "us-east-1".to_string()
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self {
            stage: Self::default_stage(),
            region: Self::default_region(),
        }
    }
}

/// The service-wide throttling block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottlingConfig {
    pub max_requests_per_second: Option<u32>,
    pub max_concurrent_requests: Option<u32>,
    /// Disables throttling for the whole stage. Endpoints with explicit
    /// numeric overrides keep them.
    #[serde(default)]
    pub disabled: bool,
}

/// One function entry under `functions:`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionConfig {
    /// Explicit deployed name; the map key is used when absent.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub events: Vec<TriggerEvent>,
}

/// A single trigger event. Only the two HTTP flavors are modeled;
/// any other event kind deserializes to a struct with both fields
/// empty and is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    #[serde(default)]
    pub http: Option<HttpEventDef>,
    #[serde(default)]
    pub http_api: Option<HttpEventDef>,
}

impl TriggerEvent {
    /// The event definition for the given API flavor, if this event
    /// belongs to it.
    pub fn event_of(&self, flavor: ApiFlavor) -> Option<&HttpEventDef> {
        match flavor {
            ApiFlavor::Rest => self.http.as_ref(),
            ApiFlavor::HttpApi => self.http_api.as_ref(),
        }
    }
}

/// Discriminates the two gateway flavors, which use incompatible
/// route-key formats and update protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    Rest,
    HttpApi,
}

/// An HTTP trigger definition, either shorthand (`"GET /items"`) or
/// structured. Shorthand events cannot carry a throttling block.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HttpEventDef {
    Shorthand(String),
    Structured(HttpEventSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEventSpec {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub throttling: Option<EndpointThrottlingConfig>,
}

/// Per-endpoint throttling overrides as declared on a trigger event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointThrottlingConfig {
    pub max_requests_per_second: Option<u32>,
    pub max_concurrent_requests: Option<u32>,
    #[serde(default)]
    pub disabled: bool,
}

/// Normalized `(method, path)` pair shared by both event forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpoint {
    pub method: String,
    pub path: String,
}

impl HttpEventDef {
    /// Normalizes shorthand and structured forms to a `(method, path)`
    /// pair. Returns `None` for a shorthand string that is not two
    /// whitespace-separated parts.
    pub fn endpoint(&self) -> Option<HttpEndpoint> {
        match self {
            HttpEventDef::Shorthand(s) => {
                let mut parts = s.split_whitespace();
                let method = parts.next()?;
                let path = parts.next()?;
                Some(HttpEndpoint {
                    method: method.to_string(),
                    path: path.to_string(),
                })
            }
            HttpEventDef::Structured(spec) => Some(HttpEndpoint {
                method: spec.method.clone(),
                path: spec.path.clone(),
            }),
        }
    }

    /// The throttling block, if this event declares one.
    pub fn throttling(&self) -> Option<&EndpointThrottlingConfig> {
        match self {
            HttpEventDef::Shorthand(_) => None,
            HttpEventDef::Structured(spec) => spec.throttling.as_ref(),
        }
    }
}

impl ServiceDescriptor {
    /// Load a descriptor from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::DescriptorRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse a descriptor from a YAML string.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Look up a function by its declaration key, or by its explicit
    /// deployed `name:` when one was declared.
    pub fn function(&self, name: &str) -> Option<&FunctionConfig> {
        self.functions.get(name).or_else(|| {
            self.functions
                .values()
                .find(|f| f.name.as_deref() == Some(name))
        })
    }
}
