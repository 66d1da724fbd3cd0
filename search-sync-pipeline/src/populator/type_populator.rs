//! Bulk population of one type.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use crate::populator::{NoProgress, PopulationFetcher, ProgressSink};
use crate::transformer::TransformerManager;
use search_sync_repository::Type;
use search_sync_shared::Document;

/// Backfills a type from a record source, one page at a time.
///
/// Each page is fetched, transformed and written before the next one is
/// fetched, so at most one page of records and documents is alive at once.
/// Every page write is a commit point: when a run fails, pages written before
/// the failure stay written.
pub struct Populator<F> {
    doc_type: Arc<Type>,
    fetcher: F,
    transformers: Arc<TransformerManager>,
}

impl<F: PopulationFetcher> Populator<F> {
    pub fn new(doc_type: Arc<Type>, fetcher: F, transformers: Arc<TransformerManager>) -> Self {
        Self {
            doc_type,
            fetcher,
            transformers,
        }
    }

    pub fn doc_type(&self) -> &Arc<Type> {
        &self.doc_type
    }

    /// Populate without progress reporting.
    pub async fn populate(&self, batch_size: usize) -> Result<usize, PipelineError> {
        self.populate_with_progress(batch_size, &mut NoProgress)
            .await
    }

    /// Populate the type, reporting progress in source records.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of documents written
    /// * `Err(PipelineError::InvalidBatchSize)` - If `batch_size` is zero
    /// * `Err(PipelineError)` - The first fetch, transform or write failure
    #[instrument(
        skip(self, progress),
        fields(index = %self.doc_type.index_id(), type_name = %self.doc_type.name())
    )]
    pub async fn populate_with_progress<P>(
        &self,
        batch_size: usize,
        progress: &mut P,
    ) -> Result<usize, PipelineError>
    where
        P: ProgressSink + ?Sized,
    {
        if batch_size == 0 {
            return Err(PipelineError::InvalidBatchSize);
        }

        let count = self.fetcher.entity_count().await?;
        if count == 0 {
            info!("Record source is empty, nothing to populate");
            return Ok(0);
        }

        info!(count, batch_size, "Populating");
        progress.start(count);

        let mut document_count = 0;
        let mut offset = 0;

        while offset < count {
            let entities = self.fetcher.fetch_entities(offset, batch_size).await?;
            let batch = self.transform_entities(&entities)?;
            self.doc_type.put_documents(&batch).await?;

            progress.advance(entities.len());
            document_count += batch.len();

            debug!(
                offset,
                entities = entities.len(),
                documents = batch.len(),
                "Batch written"
            );

            offset += batch_size;
        }

        progress.finish();
        info!(documents = document_count, "Population finished");

        Ok(document_count)
    }

    fn transform_entities(&self, entities: &[F::Entity]) -> Result<Vec<Document>, PipelineError> {
        let mut documents = Vec::with_capacity(entities.len());

        for entity in entities {
            documents.extend(self.transformers.transform_to_documents(
                entity,
                self.doc_type.index_id(),
                self.doc_type.name(),
            )?);
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::populator::VecFetcher;
    use crate::transformer::transformer_fn;
    use async_trait::async_trait;
    use search_sync_repository::{Index, MemoryStore};
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Book {
        id: u32,
        editions: u32,
    }

    fn books(n: u32) -> Vec<Book> {
        (1..=n).map(|id| Book { id, editions: 1 }).collect()
    }

    /// Mock fetcher that records every page request.
    struct RecordingFetcher {
        books: Vec<Book>,
        pages: Mutex<Vec<(usize, usize)>>,
        fail_at_offset: Option<usize>,
    }

    impl RecordingFetcher {
        fn new(books: Vec<Book>) -> Self {
            Self {
                books,
                pages: Mutex::new(Vec::new()),
                fail_at_offset: None,
            }
        }
    }

    #[async_trait]
    impl PopulationFetcher for RecordingFetcher {
        type Entity = Book;

        async fn entity_count(&self) -> Result<usize, PipelineError> {
            Ok(self.books.len())
        }

        async fn fetch_entities(&self, offset: usize, limit: usize) -> Result<Vec<Book>, PipelineError> {
            self.pages.lock().await.push((offset, limit));
            if self.fail_at_offset == Some(offset) {
                return Err(PipelineError::fetch("connection reset"));
            }
            Ok(self.books.iter().skip(offset).take(limit).cloned().collect())
        }
    }

    /// Progress sink that records every call.
    #[derive(Default)]
    struct RecordingProgress {
        started: Option<usize>,
        steps: Vec<usize>,
        finished: bool,
    }

    impl ProgressSink for RecordingProgress {
        fn start(&mut self, total: usize) {
            self.started = Some(total);
        }

        fn advance(&mut self, step: usize) {
            self.steps.push(step);
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    fn library_type(store: Arc<MemoryStore>) -> Arc<Type> {
        Index::new("library", store, Value::Null, vec![("book".to_string(), json!({}))])
            .get_type("book")
            .unwrap()
    }

    /// One document per edition; books with zero editions are skipped.
    fn edition_transformers() -> Arc<TransformerManager> {
        let mut manager = TransformerManager::new();
        manager.register_transformer(
            transformer_fn(|book: &Book| {
                Ok((0..book.editions)
                    .map(|edition| Document::new(format!("{}-{}", book.id, edition), Map::new()))
                    .collect())
            }),
            "library",
            "book",
        );
        Arc::new(manager)
    }

    #[tokio::test]
    async fn test_empty_source_never_starts_progress() {
        let store = Arc::new(MemoryStore::new());
        let populator = Populator::new(
            library_type(store.clone()),
            RecordingFetcher::new(vec![]),
            edition_transformers(),
        );
        let mut progress = RecordingProgress::default();

        let written = populator.populate_with_progress(10, &mut progress).await.unwrap();

        assert_eq!(written, 0);
        assert!(progress.started.is_none());
        assert!(progress.steps.is_empty());
        assert!(!progress.finished);
        assert!(populator.fetcher.pages.lock().await.is_empty());
        assert_eq!(store.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_pages_follow_entity_count() {
        let store = Arc::new(MemoryStore::new());
        let populator = Populator::new(
            library_type(store.clone()),
            RecordingFetcher::new(books(7)),
            edition_transformers(),
        );
        let mut progress = RecordingProgress::default();

        let written = populator.populate_with_progress(3, &mut progress).await.unwrap();

        assert_eq!(
            *populator.fetcher.pages.lock().await,
            vec![(0, 3), (3, 3), (6, 3)]
        );
        assert_eq!(progress.started, Some(7));
        assert_eq!(progress.steps, vec![3, 3, 1]);
        assert!(progress.finished);
        assert_eq!(written, 7);
        assert_eq!(store.documents("library", "book").await.len(), 7);
        assert_eq!(store.write_calls(), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_page() {
        let store = Arc::new(MemoryStore::new());
        let populator = Populator::new(
            library_type(store),
            RecordingFetcher::new(books(6)),
            edition_transformers(),
        );

        populator.populate(3).await.unwrap();

        assert_eq!(*populator.fetcher.pages.lock().await, vec![(0, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_progress_counts_records_not_documents() {
        let store = Arc::new(MemoryStore::new());
        let mut catalogue = books(4);
        catalogue[0].editions = 3;
        catalogue[1].editions = 0;
        catalogue[2].editions = 0;

        let populator = Populator::new(
            library_type(store.clone()),
            RecordingFetcher::new(catalogue),
            edition_transformers(),
        );
        let mut progress = RecordingProgress::default();

        let written = populator.populate_with_progress(2, &mut progress).await.unwrap();

        // First page fans out to 3 documents, second page has one skip.
        assert_eq!(progress.steps, vec![2, 2]);
        assert_eq!(written, 4);
        assert_eq!(store.documents("library", "book").await.len(), 4);
    }

    #[tokio::test]
    async fn test_page_without_documents_still_advances() {
        let store = Arc::new(MemoryStore::new());
        let mut catalogue = books(4);
        for book in catalogue.iter_mut().take(2) {
            book.editions = 0;
        }

        let populator = Populator::new(
            library_type(store.clone()),
            RecordingFetcher::new(catalogue),
            edition_transformers(),
        );
        let mut progress = RecordingProgress::default();

        let written = populator.populate_with_progress(2, &mut progress).await.unwrap();

        assert_eq!(progress.steps, vec![2, 2]);
        assert_eq!(written, 2);
        // The empty first page never reaches the store.
        assert_eq!(store.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_committed_pages() {
        let store = Arc::new(MemoryStore::new());
        let mut fetcher = RecordingFetcher::new(books(7));
        fetcher.fail_at_offset = Some(3);

        let populator = Populator::new(library_type(store.clone()), fetcher, edition_transformers());
        let mut progress = RecordingProgress::default();

        let result = populator.populate_with_progress(3, &mut progress).await;

        assert!(matches!(result, Err(PipelineError::FetchError(_))));
        assert_eq!(store.documents("library", "book").await.len(), 3);
        assert_eq!(progress.steps, vec![3]);
        assert!(!progress.finished);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let populator = Populator::new(
            library_type(Arc::new(MemoryStore::new())),
            VecFetcher::new(books(2)),
            edition_transformers(),
        );

        let result = populator.populate(0).await;
        assert!(matches!(result, Err(PipelineError::InvalidBatchSize)));
    }

    #[tokio::test]
    async fn test_missing_transformer_aborts() {
        let store = Arc::new(MemoryStore::new());
        let populator = Populator::new(
            library_type(store.clone()),
            VecFetcher::new(books(2)),
            Arc::new(TransformerManager::new()),
        );

        let result = populator.populate(1).await;
        assert!(matches!(result, Err(PipelineError::NoTransformerRegistered { .. })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_dyn_progress_sink() {
        let store = Arc::new(MemoryStore::new());
        let populator = Populator::new(
            library_type(store),
            VecFetcher::new(books(5)),
            edition_transformers(),
        );
        let calls = Arc::new(AtomicUsize::new(0));

        struct Counting(Arc<AtomicUsize>);
        impl ProgressSink for Counting {
            fn start(&mut self, _total: usize) {}
            fn advance(&mut self, step: usize) {
                self.0.fetch_add(step, Ordering::SeqCst);
            }
            fn finish(&mut self) {}
        }

        let mut sink: Box<dyn ProgressSink> = Box::new(Counting(calls.clone()));
        populator
            .populate_with_progress(2, sink.as_mut())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
