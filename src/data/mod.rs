//! Corpus loading, example building, and vocabulary management.
//!
//! ## Submodules
//!
//! - [`vocab`] — Character vocabulary with a reserved boundary code
//! - [`samples`] — Name-to-example conversion for next-character prediction

pub mod samples;
pub mod vocab;

pub use samples::{build_examples, clean_name, count_examples, load_names, train_eval_split};
pub use vocab::{Vocabulary, BOUNDARY, BOUNDARY_CODE};
