//! Transformer module for the search sync pipeline.
//!
//! Turns records into search documents.

mod manager;

pub use manager::{RegisteredTransformer, TransformerManager};

use search_sync_shared::Document;
use std::any::Any;
use std::marker::PhantomData;
use thiserror::Error;

/// Failure raised by a transformer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransformError(String);

impl TransformError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

/// Converts one record into zero or more documents.
///
/// Returning an empty vector means "this record does not belong in the
/// index"; returning several documents fans the record out. Only the id and
/// body matter: the registry places each document at the index/type the
/// transformer was registered for.
pub trait Transformer: Send + Sync + 'static {
    /// The record type this transformer handles.
    type Entity: Any + Send + Sync;

    fn transform(&self, entity: &Self::Entity) -> Result<Vec<Document>, TransformError>;
}

/// A [`Transformer`] backed by a closure.
pub struct FnTransformer<E, F> {
    f: F,
    _entity: PhantomData<fn(&E)>,
}

/// Wrap a closure as a transformer for records of type `E`.
pub fn transformer_fn<E, F>(f: F) -> FnTransformer<E, F>
where
    E: Any + Send + Sync,
    F: Fn(&E) -> Result<Vec<Document>, TransformError> + Send + Sync + 'static,
{
    FnTransformer {
        f,
        _entity: PhantomData,
    }
}

impl<E, F> Transformer for FnTransformer<E, F>
where
    E: Any + Send + Sync,
    F: Fn(&E) -> Result<Vec<Document>, TransformError> + Send + Sync + 'static,
{
    type Entity = E;

    fn transform(&self, entity: &E) -> Result<Vec<Document>, TransformError> {
        (self.f)(entity)
    }
}
