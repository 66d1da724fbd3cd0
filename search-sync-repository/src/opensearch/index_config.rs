//! Mapping of logical index/type coordinates onto OpenSearch indices.
//!
//! OpenSearch has no mapping types, so every (index, type) pair is stored in
//! its own physical index. Creation bodies carry the logical index's raw
//! settings and the type's mappings.

/// Name of the physical OpenSearch index backing an index/type pair.
pub fn physical_index_name(index_name: &str, type_name: &str) -> String {
    format!("{}_{}", index_name, type_name).to_lowercase()
}
