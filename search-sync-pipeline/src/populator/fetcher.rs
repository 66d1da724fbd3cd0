//! Record sources for bulk population.

use async_trait::async_trait;
use std::any::Any;

use crate::errors::PipelineError;

/// A paged source of records.
///
/// Pages are addressed by offset and limit; the source should stay stable
/// for the duration of one populate run so that pages neither skip nor
/// repeat records.
#[async_trait]
pub trait PopulationFetcher: Send + Sync {
    /// The record type produced by the source.
    type Entity: Any + Send + Sync;

    /// Total number of records.
    async fn entity_count(&self) -> Result<usize, PipelineError>;

    /// Records in `[offset, offset + limit)`. The last page may be shorter.
    async fn fetch_entities(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Self::Entity>, PipelineError>;
}

/// A record source over an in-memory vector.
#[derive(Debug, Clone, Default)]
pub struct VecFetcher<E> {
    entities: Vec<E>,
}

impl<E> VecFetcher<E> {
    pub fn new(entities: Vec<E>) -> Self {
        Self { entities }
    }
}

#[async_trait]
impl<E> PopulationFetcher for VecFetcher<E>
where
    E: Any + Clone + Send + Sync,
{
    type Entity = E;

    async fn entity_count(&self) -> Result<usize, PipelineError> {
        Ok(self.entities.len())
    }

    async fn fetch_entities(&self, offset: usize, limit: usize) -> Result<Vec<E>, PipelineError> {
        Ok(self
            .entities
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vec_fetcher_pages() {
        let fetcher = VecFetcher::new((0..7).collect::<Vec<u32>>());

        assert_eq!(fetcher.entity_count().await.unwrap(), 7);
        assert_eq!(fetcher.fetch_entities(0, 3).await.unwrap(), vec![0, 1, 2]);
        assert_eq!(fetcher.fetch_entities(6, 3).await.unwrap(), vec![6]);
        assert!(fetcher.fetch_entities(9, 3).await.unwrap().is_empty());
    }
}
