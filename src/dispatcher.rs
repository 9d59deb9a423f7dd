//! Batched, strictly sequential dispatch of stage updates.

use crate::error::Result;
use crate::gateway::{GatewayClient, HttpApiStageUpdate, RestStageUpdate};
use tracing::info;

/// The gateway rejects stage updates carrying more operations than
/// this in a single request.
pub const MAX_PATCH_OPERATIONS_PER_STAGE_UPDATE: usize = 80;

/// Send a REST-style update, splitting the patch list into contiguous
/// chunks of at most [`MAX_PATCH_OPERATIONS_PER_STAGE_UPDATE`]
/// operations.
///
/// Chunks are awaited one at a time in order. Later chunks may touch
/// the same pointer paths as earlier ones, so concurrent or reordered
/// submission would race at the gateway. A rejected chunk propagates
/// immediately; chunks already sent stay applied.
pub async fn dispatch_rest_update(
    client: &dyn GatewayClient,
    update: RestStageUpdate,
    action: &str,
) -> Result<()> {
    dispatch_rest_update_chunked(
        client,
        update,
        action,
        MAX_PATCH_OPERATIONS_PER_STAGE_UPDATE,
    )
    .await
}

pub async fn dispatch_rest_update_chunked(
    client: &dyn GatewayClient,
    update: RestStageUpdate,
    action: &str,
    chunk_size: usize,
) -> Result<()> {
    let RestStageUpdate {
        rest_api_id,
        stage_name,
        patch_operations,
    } = update;

    let chunks: Vec<Vec<_>> = if patch_operations.len() > chunk_size {
        patch_operations
            .chunks(chunk_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    } else {
        vec![patch_operations]
    };

    let total = chunks.len();
    for (index, chunk) in chunks.into_iter().enumerate() {
        info!(
            "{} API Gateway throttling settings ({} of {}).",
            action,
            index + 1,
            total
        );
        client
            .update_rest_stage(&RestStageUpdate {
                rest_api_id: rest_api_id.clone(),
                stage_name: stage_name.clone(),
                patch_operations: chunk,
            })
            .await?;
    }

    info!("Done {} API Gateway throttling settings.", action.to_lowercase());
    Ok(())
}

/// Send an HTTP-style update. The protocol takes the full route map
/// atomically, so there is nothing to chunk.
pub async fn dispatch_http_api_update(
    client: &dyn GatewayClient,
    update: HttpApiStageUpdate,
) -> Result<()> {
    info!("Updating HTTP API throttling settings.");
    client.update_http_api_stage(&update).await?;
    info!("Done updating HTTP API throttling settings.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingClient;
    use crate::patch::PatchOperation;

    fn operations(count: usize) -> Vec<PatchOperation> {
        (0..count)
            .map(|i| PatchOperation::replace(format!("/~1p{i}/GET/throttling/rateLimit"), "100"))
            .collect()
    }

    fn update_of(operations: Vec<PatchOperation>) -> RestStageUpdate {
        RestStageUpdate {
            rest_api_id: "api123".to_string(),
            stage_name: "devstage".to_string(),
            patch_operations: operations,
        }
    }

    #[tokio::test]
    async fn test_small_update_is_sent_in_one_request() {
        let client = RecordingClient::new();
        dispatch_rest_update(&client, update_of(operations(80)), "Updating")
            .await
            .unwrap();
        let calls = client.rest_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].patch_operations.len(), 80);
    }

    #[tokio::test]
    async fn test_large_update_is_chunked_in_order() {
        let planned = operations(102);
        let client = RecordingClient::new();
        dispatch_rest_update(&client, update_of(planned.clone()), "Updating")
            .await
            .unwrap();

        let calls = client.rest_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].patch_operations.len(), 80);
        assert_eq!(calls[1].patch_operations.len(), 22);
        for call in &calls {
            assert_eq!(call.rest_api_id, "api123");
            assert_eq!(call.stage_name, "devstage");
        }

        let replayed: Vec<_> = calls
            .into_iter()
            .flat_map(|call| call.patch_operations)
            .collect();
        assert_eq!(replayed, planned);
    }

    #[tokio::test]
    async fn test_failed_chunk_propagates_and_keeps_sent_chunks() {
        let client = RecordingClient::failing_after(1);
        let result = dispatch_rest_update(&client, update_of(operations(102)), "Updating").await;
        assert!(result.is_err());
        assert_eq!(client.rest_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_chunk_size() {
        let client = RecordingClient::new();
        dispatch_rest_update_chunked(&client, update_of(operations(10)), "Resetting", 3)
            .await
            .unwrap();
        let sizes: Vec<_> = client
            .rest_calls()
            .iter()
            .map(|call| call.patch_operations.len())
            .collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }
}
