//! Parser for SIESTA run logs.
//!
//! [`SiestaParser`] reads a log, the input deck it references and the
//! density-of-states table beside it, and maps them onto typed [`Archive`]
//! records.

pub mod archive;
pub mod domain;
pub mod mapping;
pub mod modules;
pub mod text;

pub use archive::Archive;
pub use domain::{ParseWarning, ParserConfig, ParserResult, RunMode, SiestaError};
pub use mapping::{ParseOutcome, SiestaParser};
