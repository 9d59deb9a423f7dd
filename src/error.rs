use std::path::PathBuf;

/// Errors surfaced by the throttling updater.
///
/// Planner logic never fails; everything here comes from reading the
/// service descriptor or from the gateway transport. Gateway rejections
/// propagate to the caller untouched, so a failed chunk aborts the run
/// while already-applied chunks stay in place.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read service descriptor {}: {source}", path.display())]
    DescriptorRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse service descriptor: {0}")]
    DescriptorParse(#[from] serde_yaml::Error),

    #[error("failed to encode stage update: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway rejected stage update with status {status}: {body}")]
    GatewayRejected { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, Error>;
