use super::{ParserResult, SiestaError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_DOS_FILE_NAME: &str = "dos";

/// Knobs for a single parse invocation. Every field has a default so a
/// partial JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    pub dos_file_name: String,
    pub read_input_deck: bool,
    pub read_dos: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            dos_file_name: DEFAULT_DOS_FILE_NAME.to_string(),
            read_input_deck: true,
            read_dos: true,
        }
    }
}

impl ParserConfig {
    pub fn from_json_str(source: &str) -> ParserResult<Self> {
        serde_json::from_str(source).map_err(|source| {
            SiestaError::input_validation(
                "INPUT.CONFIG_PARSE",
                format!("failed to parse parser configuration: {}", source),
            )
        })
    }

    pub fn from_json_file(path: &Path) -> ParserResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| {
            SiestaError::io_system(
                "IO.CONFIG_READ",
                format!(
                    "failed to read parser configuration '{}': {}",
                    path.display(),
                    source
                ),
            )
        })?;
        Self::from_json_str(&source)
    }
}
