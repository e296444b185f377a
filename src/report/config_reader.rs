use crate::report::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_JS_VARIABLE: &str = "surveyData";

/// Header substrings locating each answer. All of them are optional in the
/// configuration file: the defaults follow the community survey form.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ColumnSettings {
    pub country: Option<String>,
    #[serde(rename = "communicationPreference")]
    pub communication_preference: Option<String>,
    #[serde(rename = "circleRating")]
    pub circle_rating: Option<String>,
    #[serde(rename = "circleFeedback")]
    pub circle_feedback: Option<String>,
    #[serde(rename = "communityGoals")]
    pub community_goals: Option<String>,
    #[serde(rename = "eventTypes")]
    pub event_types: Option<String>,
    #[serde(rename = "contentPreferences")]
    pub content_preferences: Option<String>,
    #[serde(rename = "interestGroups")]
    pub interest_groups: Option<String>,
    #[serde(rename = "contributionInterests")]
    pub contribution_interests: Option<String>,
    pub involvement: Option<String>,
    pub suggestions: Option<String>,
    #[serde(rename = "valueRatingPrefix")]
    pub value_rating_prefix: Option<String>,
    pub email: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(rename = "inputFile")]
    pub input_file: Option<String>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "outputJson")]
    pub output_json: Option<String>,
    #[serde(rename = "outputJs")]
    pub output_js: Option<String>,
    #[serde(rename = "jsVariableName")]
    pub js_variable_name: Option<String>,
    #[serde(default)]
    pub columns: ColumnSettings,
    #[serde(rename = "topCountries")]
    pub top_countries: Option<usize>,
    #[serde(rename = "countryAliases")]
    pub country_aliases: Option<BTreeMap<String, String>>,
    #[serde(rename = "affirmativeAnswer")]
    pub affirmative_answer: Option<String>,
    #[serde(rename = "deduplicateByEmail")]
    pub deduplicate_by_email: Option<bool>,
    #[serde(rename = "freeTextDelimiters")]
    pub free_text_delimiters: Option<String>,
}

/// The header substrings, once the defaults are filled in.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnNeedles {
    pub country: String,
    pub communication_preference: String,
    pub circle_rating: String,
    pub circle_feedback: String,
    pub community_goals: String,
    pub event_types: String,
    pub content_preferences: String,
    pub interest_groups: String,
    pub contribution_interests: String,
    pub involvement: String,
    pub suggestions: String,
    pub value_rating_prefix: String,
    /// Matched without case.
    pub email: String,
    /// Matched without case.
    pub timestamp: String,
}

impl Default for ColumnNeedles {
    fn default() -> Self {
        ColumnNeedles {
            country: "What country are you based in".to_string(),
            communication_preference: "What is your preferred way to receive updates".to_string(),
            circle_rating: "How would you rate you experience of Circle".to_string(),
            circle_feedback: "Please share your reasoning behind your rating for Circle"
                .to_string(),
            community_goals: "What are the top 1-3 things you hope to gain".to_string(),
            event_types: "To help us plan, what types of events".to_string(),
            content_preferences: "What kind of content / articles / resources".to_string(),
            interest_groups: "If we were to create interest-based groups".to_string(),
            contribution_interests: "How would you be interested in contributing".to_string(),
            involvement: "Would you like us to inform you with specific ways".to_string(),
            suggestions: "Do you have any other comments, questions or suggestion".to_string(),
            value_rating_prefix: "How valuable do you find the following aspects".to_string(),
            email: "email".to_string(),
            timestamp: "timestamp".to_string(),
        }
    }
}

impl ColumnSettings {
    pub fn needles(&self) -> ColumnNeedles {
        let d = ColumnNeedles::default();
        let pick = |o: &Option<String>, default: String| o.clone().unwrap_or(default);
        ColumnNeedles {
            country: pick(&self.country, d.country),
            communication_preference: pick(
                &self.communication_preference,
                d.communication_preference,
            ),
            circle_rating: pick(&self.circle_rating, d.circle_rating),
            circle_feedback: pick(&self.circle_feedback, d.circle_feedback),
            community_goals: pick(&self.community_goals, d.community_goals),
            event_types: pick(&self.event_types, d.event_types),
            content_preferences: pick(&self.content_preferences, d.content_preferences),
            interest_groups: pick(&self.interest_groups, d.interest_groups),
            contribution_interests: pick(&self.contribution_interests, d.contribution_interests),
            involvement: pick(&self.involvement, d.involvement),
            suggestions: pick(&self.suggestions, d.suggestions),
            value_rating_prefix: pick(&self.value_rating_prefix, d.value_rating_prefix),
            email: pick(&self.email, d.email),
            timestamp: pick(&self.timestamp, d.timestamp),
        }
    }
}

/// Everything needed to produce a report.
///
/// The paths coming from a configuration file are already resolved against the
/// directory of the file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub input_file: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub output_json: Option<String>,
    pub output_js: Option<String>,
    pub js_variable_name: String,
    pub columns: ColumnNeedles,
    pub rules: SurveyRules,
    pub deduplicate_by_email: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            input_file: None,
            input_type: None,
            excel_worksheet_name: None,
            output_json: None,
            output_js: None,
            js_variable_name: DEFAULT_JS_VARIABLE.to_string(),
            columns: ColumnNeedles::default(),
            rules: SurveyRules::default(),
            deduplicate_by_email: true,
        }
    }
}

impl ReportConfig {
    pub fn resolve(&self, root: &Path) -> ReportResult<ReportSettings> {
        let js_variable_name = self
            .js_variable_name
            .clone()
            .unwrap_or_else(|| DEFAULT_JS_VARIABLE.to_string());
        check_js_identifier(&js_variable_name)?;

        let rules = SurveyRules {
            top_countries: self.top_countries,
            country_aliases: self
                .country_aliases
                .iter()
                .flat_map(|m| m.iter())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            affirmative_answer: self
                .affirmative_answer
                .clone()
                .unwrap_or_else(|| DEFAULT_AFFIRMATIVE_ANSWER.to_string()),
            free_text_delimiters: match &self.free_text_delimiters {
                Some(s) => s.chars().collect(),
                None => DEFAULT_DELIMITERS.to_vec(),
            },
        };

        Ok(ReportSettings {
            input_file: self.input_file.as_ref().map(|p| resolve_path(root, p)),
            input_type: self.input_type.clone(),
            excel_worksheet_name: self.excel_worksheet_name.clone(),
            output_json: self.output_json.as_ref().map(|p| resolve_path(root, p)),
            output_js: self.output_js.as_ref().map(|p| resolve_path(root, p)),
            js_variable_name,
            columns: self.columns.needles(),
            rules,
            deduplicate_by_email: self.deduplicate_by_email.unwrap_or(true),
        })
    }
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// "stdout" is not a path.
fn resolve_path(root: &Path, p: &str) -> String {
    if p == STDOUT {
        return p.to_string();
    }
    let full: PathBuf = root.join(p);
    full.as_path().display().to_string()
}

pub fn check_js_identifier(name: &str) -> ReportResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if !valid {
        whatever!("not a valid JavaScript variable name: {:?}", name)
    }
    Ok(())
}
