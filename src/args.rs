use clap::Parser;

/// This program turns the answers of a community feedback survey into the data files of a dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey export and the outputs.
    /// All the keys are optional, see the manual of survey_tally for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the expected summary in JSON format. If provided, surveyrpt will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the summary will also be written as a JavaScript file
    /// that assigns the summary to a constant.
    #[clap(long, value_parser)]
    pub js_out: Option<String>,

    /// (default surveyData) The name of the constant in the JavaScript file.
    #[clap(long, value_parser)]
    pub js_variable: Option<String>,

    /// (file path) The survey export. Setting this option overrides the path that may be specified
    /// with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
