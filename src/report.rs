use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_tally::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::{make_default_id, resolve_columns, RawTable};

pub mod config_reader;
mod dedupe;
mod io_common;
mod io_csv;
mod io_xlsx;
mod output;

/// Writing to this path prints the summary instead.
pub const STDOUT: &str = "stdout";

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading the header of CSV file {path}"))]
    CsvHeader { source: csv::Error, path: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path}: {reason}"))]
    EmptyExcel { path: String, reason: String },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("No column contains {needle:?}. Columns found: {available:?}"))]
    MissingColumn {
        needle: String,
        available: Vec<String>,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid survey rules: {source}"))]
    Tabulation { source: SurveyErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum InputType {
    Csv,
    Xlsx,
}

fn input_type(settings: &ReportSettings, input_path: &str) -> ReportResult<InputType> {
    match settings.input_type.as_deref() {
        Some("csv") => Ok(InputType::Csv),
        Some("xlsx") => Ok(InputType::Xlsx),
        Some(x) => whatever!("unknown input type: {:?} (expected csv or xlsx)", x),
        None if input_path.to_lowercase().ends_with(".xlsx") => Ok(InputType::Xlsx),
        None => Ok(InputType::Csv),
    }
}

fn read_survey_table(settings: &ReportSettings, input_path: &str) -> ReportResult<RawTable> {
    let it = input_type(settings, input_path)?;
    info!("Attempting to read {:?} file {:?}", it, input_path);
    match it {
        InputType::Csv => io_csv::read_csv_table(input_path),
        InputType::Xlsx => {
            io_xlsx::read_xlsx_table(input_path, settings.excel_worksheet_name.as_deref())
        }
    }
}

/// Reads the survey export and computes the summary document.
pub fn build_report(settings: &ReportSettings) -> ReportResult<JSValue> {
    let input_path = match settings.input_file.clone() {
        Some(p) => p,
        None => whatever!("no input file: pass --input or set inputFile in the configuration"),
    };

    let source = output::fingerprint(&input_path)?;
    let table = read_survey_table(settings, &input_path)?;
    info!(
        "Read {} rows from {:?} ({} skipped)",
        table.records.len(),
        input_path,
        table.skipped_rows
    );

    let mapping = resolve_columns(&table.headers, &settings.columns)?;
    debug!("build_report: columns: {:?}", mapping);

    let records = match (settings.deduplicate_by_email, mapping.email, mapping.timestamp) {
        (true, Some(email_idx), Some(timestamp_idx)) => {
            dedupe::deduplicate_by_email(table.records, email_idx, timestamp_idx)
        }
        (true, _, _) => {
            info!("No email or timestamp column, duplicate submissions are kept");
            table.records
        }
        (false, _, _) => table.records,
    };

    let default_id = make_default_id(&input_path);
    let rows: Vec<SurveyRow> = records
        .iter()
        .map(|r| mapping.to_row(r, default_id(r.lineno)))
        .collect();

    let result = run_survey_stats(&rows, &settings.rules).context(TabulationSnafu {})?;
    Ok(output::build_summary_js(
        &result,
        table.skipped_rows,
        &source,
    ))
}

fn settings_from_args(args: &Args) -> ReportResult<ReportSettings> {
    let mut settings = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root: PathBuf = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            config.resolve(&root)?
        }
        None => ReportSettings::default(),
    };

    // The command line takes precedence over the configuration file.
    if let Some(x) = &args.input {
        settings.input_file = Some(x.clone());
    }
    if let Some(x) = &args.input_type {
        settings.input_type = Some(x.clone());
    }
    if let Some(x) = &args.excel_worksheet_name {
        settings.excel_worksheet_name = Some(x.clone());
    }
    if let Some(x) = &args.out {
        settings.output_json = Some(x.clone());
    }
    if let Some(x) = &args.js_out {
        settings.output_js = Some(x.clone());
    }
    if let Some(x) = &args.js_variable {
        check_js_identifier(x)?;
        settings.js_variable_name = x.clone();
    }
    Ok(settings)
}

fn check_reference(summary_path: &str, pretty_js_stats: &str) -> ReportResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", summary_path);
    Ok(())
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    let settings = settings_from_args(args)?;
    info!("settings: {:?}", settings);

    let result_js = build_report(&settings)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match settings.output_json.as_deref() {
        Some(STDOUT) => println!("{}", pretty_js_stats),
        Some(path) => output::write_json(path, &pretty_js_stats)?,
        // Nothing else is written: print the summary.
        None if settings.output_js.is_none() => println!("{}", pretty_js_stats),
        None => {}
    }
    if let Some(path) = settings.output_js.as_deref() {
        output::write_js(path, &settings.js_variable_name, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        check_reference(summary_p, &pretty_js_stats)?;
    }

    Ok(())
}

#[cfg(test)]
fn run_report_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
    use snafu::ErrorCompat;

    let _ = env_logger::builder().is_test(true).try_init();
    let test_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");
    info!("Running test {}", test_name);
    let args = Args {
        config: Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        reference: Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        out: None,
        js_out: None,
        js_variable: None,
        input: None,
        input_type: None,
        excel_worksheet_name: None,
        verbose: false,
    };
    let res = run_report(&args);
    if let Err(e) = &res {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e) {
            eprintln!("trace: {}", bt);
        }
    }
    assert!(res.is_ok(), "test {} failed", test_name);
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    run_report_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
