//! Shared utility functions.
//!
//! - `format`: human-readable byte sizes
//! - `naming`: output file naming (sanitising, indexed split names)
//! - `status`: the `[OK]` / `[INFO]` / `[WARN]` status lines printed during a run

mod format;
mod naming;
mod status;

pub use format::{format_size, mb_to_bytes};
pub use naming::{indexed_output_path, safe_output_name};
pub use status::{print_status, Status};
