//! Index and type handles plus the index registry.

mod doc_type;
mod handle;
mod manager;

pub use doc_type::Type;
pub use handle::Index;
pub use manager::IndexManager;
