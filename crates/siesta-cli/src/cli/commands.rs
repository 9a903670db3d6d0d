use super::CliError;
use anyhow::Context;
use serde::Serialize;
use siesta_core::SiestaParser;
use siesta_core::archive::Archive;
use siesta_core::domain::{ParseWarning, ParserConfig};
use siesta_core::modules::fdf::{FdfBlock, FdfGeometry, FdfValue, read_fdf_file};
use siesta_core::modules::serialization::write_archive_json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub(super) struct ParseArgs {
    /// SIESTA output log
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Write the archive JSON here instead of printing the full report
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Parser configuration JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Density-of-states file name, relative to the log directory
    #[arg(long, value_name = "NAME")]
    dos_file: Option<String>,

    /// Skip the density-of-states file
    #[arg(long)]
    no_dos: bool,

    /// Ignore the input deck embedded in or referenced by the log
    #[arg(long)]
    no_input_deck: bool,
}

#[derive(clap::Args)]
pub(super) struct FdfArgs {
    /// FDF input deck
    #[arg(value_name = "DECK")]
    deck: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseReport<'a> {
    run_mode: &'static str,
    warnings: &'a [ParseWarning],
    #[serde(skip_serializing_if = "Option::is_none")]
    archive: Option<&'a Archive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
}

#[derive(Serialize)]
struct FdfReport<'a> {
    parameters: BTreeMap<String, FdfValue>,
    blocks: &'a [FdfBlock],
    geometry: FdfGeometry,
}

pub(super) fn run_parse_command(args: ParseArgs) -> Result<i32, CliError> {
    let config = parser_config(&args)?;
    let outcome = SiestaParser::new(config)
        .parse(&args.log)
        .map_err(CliError::Parse)?;

    if let Some(output) = &args.output {
        write_archive_json(output, &outcome.archive).map_err(CliError::Parse)?;
    }

    let report = ParseReport {
        run_mode: outcome.run_mode.as_str(),
        warnings: &outcome.warnings,
        archive: args.output.is_none().then_some(&outcome.archive),
        output: args.output.as_deref(),
    };
    print_json(&report)?;
    Ok(0)
}

pub(super) fn run_fdf_command(args: FdfArgs) -> Result<i32, CliError> {
    let deck = read_fdf_file(&args.deck).map_err(CliError::Parse)?;
    let report = FdfReport {
        parameters: deck.parameter_map(),
        blocks: deck.blocks(),
        geometry: deck.geometry(),
    };
    print_json(&report)?;
    Ok(0)
}

fn parser_config(args: &ParseArgs) -> Result<ParserConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => ParserConfig::from_json_file(path).map_err(CliError::Parse)?,
        None => ParserConfig::default(),
    };
    if let Some(name) = &args.dos_file {
        config.dos_file_name = name.clone();
    }
    if args.no_dos {
        config.read_dos = false;
    }
    if args.no_input_deck {
        config.read_input_deck = false;
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ParseArgs, parser_config};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn parse_args(config: Option<PathBuf>) -> ParseArgs {
        ParseArgs {
            log: PathBuf::from("siesta.out"),
            output: None,
            config,
            dos_file: None,
            no_dos: false,
            no_input_deck: false,
        }
    }

    #[test]
    fn flags_override_config_file() {
        let temp = TempDir::new().expect("tempdir should be created");
        let config_path = temp.path().join("config.json");
        fs::write(&config_path, r#"{ "dosFileName": "si.DOS", "readDos": true }"#)
            .expect("config should be written");

        let mut args = parse_args(Some(config_path));
        args.no_dos = true;
        let config = parser_config(&args).expect("config should load");
        assert_eq!(config.dos_file_name, "si.DOS");
        assert!(!config.read_dos);
        assert!(config.read_input_deck);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let temp = TempDir::new().expect("tempdir should be created");
        let args = parse_args(Some(temp.path().join("absent.json")));
        assert!(parser_config(&args).is_err());
        assert!(fs::read_dir(temp.path()).expect("readable").next().is_none());
    }
}
