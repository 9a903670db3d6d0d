//! Grammar for SIESTA standard output logs.
//!
//! The whole-file grammar captures run metadata, an optional single-point
//! region, an optional geometry-optimization region split into steps, and
//! finally the calculation patterns applied to the entire log.

mod grammar;
pub mod names;

use crate::text::Extraction;

pub fn extract_output(text: &str) -> Extraction {
    grammar::OUTPUT_GRAMMAR.extract(text)
}
