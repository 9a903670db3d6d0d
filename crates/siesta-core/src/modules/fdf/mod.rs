//! SIESTA FDF input decks: `label value [unit]` lines and
//! `%block NAME ... %endblock NAME` tables.

mod model;
mod parser;

pub use model::{FdfBlock, FdfDeck, FdfGeometry, FdfParameter, FdfValue, normalize_label};

use crate::domain::{ParserResult, SiestaError};
use std::fs;
use std::path::Path;

/// Extracts every parameter and block; never fails on unrecognised lines.
pub fn parse_fdf(source: &str) -> FdfDeck {
    parser::parse_deck(source)
}

pub fn read_fdf_file(path: &Path) -> ParserResult<FdfDeck> {
    let source = fs::read_to_string(path).map_err(|source| {
        SiestaError::io_system(
            "IO.FDF_READ",
            format!("failed to read FDF deck '{}': {}", path.display(), source),
        )
    })?;
    Ok(parse_fdf(&source))
}

#[cfg(test)]
mod tests {
    use super::{FdfValue, read_fdf_file};
    use crate::domain::ErrorCategory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn deck_file_is_read_from_disk() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("si.fdf");
        fs::write(&path, "NumberOfAtoms 8\n").expect("deck should be written");

        let deck = read_fdf_file(&path).expect("deck should parse");
        assert_eq!(deck.value("numberofatoms"), Some(&FdfValue::Int(8)));
    }

    #[test]
    fn missing_deck_file_is_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = read_fdf_file(&temp.path().join("absent.fdf")).expect_err("read should fail");
        assert_eq!(error.category(), ErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.FDF_READ");
    }
}
