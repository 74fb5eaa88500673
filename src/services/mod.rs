//! Service layer.
//!
//! Domain logic separated from UI concerns, so the CLI only renders the
//! events a service emits.

pub mod keyword_merge;

pub use keyword_merge::{KeywordMergeService, MergeEvent, MergeRequest, MergeRun};
