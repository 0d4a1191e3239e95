//! Segment loading: one listing request, then a bounded fan-out of detail
//! requests joined back into listing order.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::catalog::{CatalogSegment, CreatureDetail, CreatureSummary};
use crate::error::LoadError;

pub const DEFAULT_DETAIL_CONCURRENCY: usize = 64;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_segment(&self, segment: &CatalogSegment)
        -> Result<Vec<CreatureSummary>, LoadError>;

    async fn fetch_detail(&self, summary: &CreatureSummary) -> Result<CreatureDetail, LoadError>;
}

/// Fetch a whole segment. Any failure drops the batch; completion order of
/// the detail requests never affects the order of the result.
pub async fn load_segment(
    source: Arc<dyn CatalogSource>,
    segment: &CatalogSegment,
    concurrency: usize,
) -> Result<Vec<CreatureDetail>, LoadError> {
    let summaries = source.list_segment(segment).await?;
    if summaries.is_empty() {
        return Ok(Vec::new());
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = JoinSet::new();
    for (position, summary) in summaries.into_iter().enumerate() {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| LoadError::Task("detail semaphore closed".to_string()))?;
            let detail = source.fetch_detail(&summary).await?;
            Ok::<_, LoadError>((position, detail))
        });
    }

    let mut slots: Vec<Option<CreatureDetail>> = vec![None; join_set.len()];
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Ok((position, detail))) => slots[position] = Some(detail),
            Ok(Err(error)) => {
                join_set.abort_all();
                return Err(error);
            }
            Err(error) => {
                join_set.abort_all();
                return Err(LoadError::Task(error.to_string()));
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| LoadError::Task("detail slot left empty".to_string())))
        .collect()
}
