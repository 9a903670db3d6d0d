//! Maps a SIESTA log onto archive records.
//!
//! The log is extracted once with the whole-file grammar. Depending on which
//! regions matched, each geometry-optimization step or the single-point
//! region yields one system and one calculation, and a final aggregate pair
//! is always built from the whole file.

mod calculation;
mod dos;
mod method;
mod system;

use crate::archive::{Archive, Program, Run, TimeRun, Workflow};
use crate::domain::{Diagnostics, ParseWarning, ParserConfig, ParserResult, RunMode, SiestaError};
use crate::modules::fdf::{FdfDeck, parse_fdf, read_fdf_file};
use crate::modules::output::{extract_output, names};
use crate::text::Extraction;
use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;
use tracing::debug;

pub(crate) const PROGRAM_NAME: &str = "Siesta";
const RUN_TIME_FORMAT: &str = "%d-%b-%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub archive: Archive,
    pub warnings: Vec<ParseWarning>,
    pub run_mode: RunMode,
}

/// Shared inputs for every region mapped out of one log.
pub(crate) struct MappingContext<'a> {
    pub whole: &'a Extraction,
    pub deck: Option<&'a FdfDeck>,
}

impl MappingContext<'_> {
    /// Atom count from the region, else from anywhere in the log.
    pub fn atom_count(&self, region: &Extraction) -> Option<usize> {
        region
            .int(names::NUMBER_OF_ATOMS)
            .or_else(|| self.whole.int(names::NUMBER_OF_ATOMS))
            .and_then(|count| usize::try_from(count).ok())
    }

    pub fn nspin(&self) -> i64 {
        self.whole.int(names::NSPIN).unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SiestaParser {
    config: ParserConfig,
}

impl SiestaParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parses the log at `path`. Only an unreadable log is an error; every
    /// other problem is reported as a warning on the outcome.
    pub fn parse(&self, path: &Path) -> ParserResult<ParseOutcome> {
        let text = fs::read_to_string(path).map_err(|source| {
            SiestaError::io_system(
                "IO.MAINFILE_READ",
                format!("failed to read SIESTA log '{}': {}", path.display(), source),
            )
        })?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Ok(self.parse_text(&text, directory))
    }

    /// Parses log text whose auxiliary files live in `directory`.
    pub fn parse_text(&self, text: &str, directory: &Path) -> ParseOutcome {
        let mut diagnostics = Diagnostics::default();
        let extraction = extract_output(text);

        let mut run = map_run_metadata(&extraction, &mut diagnostics);
        let deck = if self.config.read_input_deck {
            load_input_deck(&extraction, directory, &mut diagnostics)
        } else {
            None
        };
        run.methods.push(method::map_method(
            &extraction,
            deck.as_ref(),
            text,
            &mut diagnostics,
        ));

        let context = MappingContext {
            whole: &extraction,
            deck: deck.as_ref(),
        };
        let run_mode = detect_run_mode(&extraction);
        let workflow = match run_mode {
            RunMode::GeometryOptimization => {
                let steps = extraction
                    .record(names::GEOMETRY_OPTIMIZATION)
                    .into_iter()
                    .flat_map(|optimization| optimization.records(names::STEP));
                for step in steps {
                    push_configuration(&mut run, step, &context, &mut diagnostics);
                }
                Some(Workflow::GeometryOptimization)
            }
            RunMode::SinglePoint => {
                if let Some(region) = extraction.record(names::SINGLE_POINT) {
                    push_configuration(&mut run, region, &context, &mut diagnostics);
                }
                Some(Workflow::SinglePoint)
            }
            RunMode::FinalOnly => None,
        };

        let final_index = push_configuration(&mut run, &extraction, &context, &mut diagnostics);
        if self.config.read_dos {
            let path = directory.join(&self.config.dos_file_name);
            run.calculations[final_index].dos_electronic =
                dos::read_dos_curves(&path, context.nspin(), &mut diagnostics);
        }

        debug!(
            run_mode = %run_mode,
            systems = run.systems.len(),
            calculations = run.calculations.len(),
            warnings = diagnostics.warnings().len(),
            "mapped SIESTA log"
        );

        ParseOutcome {
            archive: Archive { run, workflow },
            warnings: diagnostics.into_warnings(),
            run_mode,
        }
    }
}

/// Geometry optimization needs at least one step region; it wins over a
/// single-point region when both matched.
pub fn detect_run_mode(extraction: &Extraction) -> RunMode {
    let steps = extraction
        .record(names::GEOMETRY_OPTIMIZATION)
        .map_or(0, |optimization| optimization.records(names::STEP).count());
    if steps > 0 {
        RunMode::GeometryOptimization
    } else if extraction.contains(names::SINGLE_POINT) {
        RunMode::SinglePoint
    } else {
        RunMode::FinalOnly
    }
}

/// Appends a system and the calculation referencing it; returns the
/// calculation index.
fn push_configuration(
    run: &mut Run,
    region: &Extraction,
    context: &MappingContext<'_>,
    diagnostics: &mut Diagnostics,
) -> usize {
    run.systems.push(system::map_system(region, context, diagnostics));
    let mut calculation = calculation::map_calculation(region, context);
    calculation.system_ref = Some(run.systems.len() - 1);
    run.calculations.push(calculation);
    run.calculations.len() - 1
}

fn map_run_metadata(extraction: &Extraction, diagnostics: &mut Diagnostics) -> Run {
    let header = extraction.record(names::HEADER);
    let header_text = |name: &str| header.and_then(|h| h.text(name)).map(str::to_string);

    Run {
        program: header_text(names::PROGRAM_VERSION).map(|version| Program {
            name: PROGRAM_NAME.to_string(),
            version,
        }),
        n_nodes: extraction.int(names::N_NODES),
        arch: header_text(names::ARCH),
        compiler_version: header_text(names::COMPILER_VERSION),
        compiler_flags: header_text(names::COMPILER_FLAGS),
        parallel: header.and_then(|h| h.flag(names::PARALLEL)),
        time_run: TimeRun {
            date_start: run_timestamp(extraction.text(names::RUN_START), diagnostics),
            date_end: run_timestamp(extraction.text(names::RUN_END), diagnostics),
        },
        ..Run::default()
    }
}

/// Seconds since the Unix epoch, reading the log's wall-clock time as UTC.
pub(crate) fn parse_run_timestamp(raw: &str) -> Option<f64> {
    NaiveDateTime::parse_from_str(raw.trim(), RUN_TIME_FORMAT)
        .ok()
        .map(|time| time.and_utc().timestamp() as f64)
}

fn run_timestamp(raw: Option<&str>, diagnostics: &mut Diagnostics) -> Option<f64> {
    let raw = raw?;
    let timestamp = parse_run_timestamp(raw);
    if timestamp.is_none() {
        diagnostics.warn(
            "RUN.TIMESTAMP",
            format!("unrecognised run timestamp '{}'", raw),
        );
    }
    timestamp
}

/// The input dump embedded in the log, else the dumped deck next to it.
fn load_input_deck(
    extraction: &Extraction,
    directory: &Path,
    diagnostics: &mut Diagnostics,
) -> Option<FdfDeck> {
    if let Some(dump) = extraction.text(names::INPUT_DATA_FILE) {
        return Some(parse_fdf(dump));
    }
    let file_name = extraction.text(names::DUMPED_INPUT_FILE)?;
    match read_fdf_file(&directory.join(file_name)) {
        Ok(deck) => Some(deck),
        Err(error) => {
            diagnostics.warn("FDF.READ", error.message());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SiestaParser, detect_run_mode, parse_run_timestamp};
    use crate::domain::{ErrorCategory, ParserConfig, RunMode};
    use crate::modules::output::extract_output;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn run_timestamps_are_read_as_utc() {
        assert_eq!(
            parse_run_timestamp("12-MAR-2021 10:15:32"),
            Some(1_615_544_132.0)
        );
        assert_eq!(parse_run_timestamp("yesterday"), None);
    }

    #[test]
    fn unreadable_log_is_fatal() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = SiestaParser::default()
            .parse(&temp.path().join("missing.out"))
            .expect_err("missing log should fail");
        assert_eq!(error.category(), ErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.MAINFILE_READ");
    }

    #[test]
    fn run_mode_is_final_only_without_regions() {
        assert_eq!(
            detect_run_mode(&extract_output("siesta: E_KS(eV) =   -1.0\n")),
            RunMode::FinalOnly
        );
    }

    #[test]
    fn dumped_input_file_is_read_from_log_directory() {
        let temp = TempDir::new().expect("tempdir should be created");
        fs::write(
            temp.path().join("INPUT_TMP.12345"),
            "SystemLabel si\nXC.authors PBE\n",
        )
        .expect("deck should be written");
        let outcome = SiestaParser::default()
            .parse_text("reinit: Dumped input in INPUT_TMP.12345\n", temp.path());
        let method = &outcome.archive.run.methods[0];
        assert!(method.input_parameters.contains_key("SystemLabel"));
        assert_eq!(method.dft.xc_functional.exchange[0].name, "GGA_X_PBE");
    }

    #[test]
    fn missing_dumped_input_file_is_a_warning() {
        let outcome = SiestaParser::default().parse_text(
            "reinit: Dumped input in INPUT_TMP.0\n",
            Path::new("/nonexistent-siesta-dir"),
        );
        assert!(outcome.warnings.iter().any(|w| w.code == "FDF.READ"));
        assert!(outcome.archive.run.methods[0].input_parameters.is_empty());
    }

    #[test]
    fn disabled_dos_leaves_final_calculation_without_curves() {
        let temp = TempDir::new().expect("tempdir should be created");
        fs::write(temp.path().join("dos"), "0.0 1.0\n").expect("dos should be written");
        let parser = SiestaParser::new(ParserConfig {
            read_dos: false,
            ..ParserConfig::default()
        });
        let outcome = parser.parse_text("siesta: E_KS(eV) =   -1.0\n", temp.path());
        assert!(outcome.archive.run.calculations[0].dos_electronic.is_empty());
    }
}
