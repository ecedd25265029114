//! Detran-RJ fine lookup: page automation plus result extraction.
//!
//! - [`detran`]: the linear automation sequence (navigate, frame, fill,
//!   captcha token injection, submit, wait, extract)
//! - [`extract`]: fixed-layout results-table parsing
//! - [`types`]: the extracted [`types::FineRecord`]

pub mod detran;
pub mod extract;
pub mod types;

pub use detran::{run_lookup, LookupError};
pub use extract::{extract_fine_record, ExtractError};
pub use types::FineRecord;
