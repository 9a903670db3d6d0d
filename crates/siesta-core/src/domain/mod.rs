pub mod config;
pub mod errors;
pub mod units;

pub use config::{DEFAULT_DOS_FILE_NAME, ParserConfig};
pub use errors::{ErrorCategory, ParserResult, SiestaError};
pub use units::{BOHR_IN_ANGSTROM, Quantity, Unit};

use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    SinglePoint,
    GeometryOptimization,
    #[default]
    FinalOnly,
}

impl RunMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SinglePoint => "single_point",
            Self::GeometryOptimization => "geometry_optimization",
            Self::FinalOnly => "final_only",
        }
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// How atomic coordinates in a block or log section are expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateFormat {
    Angstrom,
    Bohr,
    Fractional,
    ScaledCartesian,
    Unknown(String),
}

impl CoordinateFormat {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "ang" | "angstrom" | "notscaledcartesianang" => Self::Angstrom,
            "bohr" | "notscaledcartesianbohr" => Self::Bohr,
            "fractional" | "scaledbylatticevectors" => Self::Fractional,
            "scaled" | "scaledcartesian" => Self::ScaledCartesian,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A non-fatal problem met while extracting; logged and kept on the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<ParseWarning>,
}

impl Diagnostics {
    pub fn warn(&mut self, code: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(code, "{}", message);
        self.warnings.push(ParseWarning { code, message });
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }

    pub fn into_warnings(self) -> Vec<ParseWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::{CoordinateFormat, Diagnostics, RunMode};

    #[test]
    fn coordinate_format_labels_are_case_insensitive() {
        assert_eq!(CoordinateFormat::from_label("Ang"), CoordinateFormat::Angstrom);
        assert_eq!(CoordinateFormat::from_label("BOHR"), CoordinateFormat::Bohr);
        assert_eq!(
            CoordinateFormat::from_label("ScaledByLatticeVectors"),
            CoordinateFormat::Fractional
        );
        assert_eq!(
            CoordinateFormat::from_label(" scaledcartesian "),
            CoordinateFormat::ScaledCartesian
        );
        assert_eq!(
            CoordinateFormat::from_label("scaled"),
            CoordinateFormat::ScaledCartesian
        );
        assert_eq!(
            CoordinateFormat::from_label("crystal"),
            CoordinateFormat::Unknown("crystal".to_string())
        );
    }

    #[test]
    fn diagnostics_keep_warnings_in_order() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.warn("DOS.READ", "first");
        diagnostics.warn("XC.UNKNOWN", "second");

        assert!(diagnostics.has_code("XC.UNKNOWN"));
        assert!(!diagnostics.has_code("IO.MAINFILE_READ"));
        let codes: Vec<_> = diagnostics.warnings().iter().map(|w| w.code).collect();
        assert_eq!(codes, ["DOS.READ", "XC.UNKNOWN"]);
    }

    #[test]
    fn run_mode_defaults_to_final_only() {
        assert_eq!(RunMode::default(), RunMode::FinalOnly);
        assert_eq!(RunMode::GeometryOptimization.to_string(), "geometry_optimization");
    }
}
