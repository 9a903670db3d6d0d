use crate::archive::Archive;
use crate::domain::{ParserResult, SiestaError};
use std::fs;
use std::path::Path;

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

/// Writes the archive as pretty JSON, creating parent directories.
pub fn write_archive_json(path: &Path, archive: &Archive) -> ParserResult<()> {
    let json = archive.to_json_pretty()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| {
            SiestaError::io_system(
                "IO.ARCHIVE_DIRECTORY",
                format!(
                    "failed to create archive directory '{}': {}",
                    parent.display(),
                    source
                ),
            )
        })?;
    }
    write_text_artifact(path, &json).map_err(|source| {
        SiestaError::io_system(
            "IO.ARCHIVE_WRITE",
            format!("failed to write archive '{}': {}", path.display(), source),
        )
    })
}
