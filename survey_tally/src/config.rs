// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The free-text questions of the community survey.
///
/// Each question has its own ordered list of themes, see [crate::themes].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Question {
    /// What members hope to gain from the community.
    CommunityGoals,
    /// The reasoning behind the rating of the Circle platform.
    CircleFeedback,
    /// The kind of content, articles or resources members want.
    ContentPreferences,
    /// Interest-based groups members would join.
    InterestGroups,
    /// Any other comments, questions or suggestions.
    Suggestions,
}

impl Question {
    pub const ALL: [Question; 5] = [
        Question::CommunityGoals,
        Question::CircleFeedback,
        Question::ContentPreferences,
        Question::InterestGroups,
        Question::Suggestions,
    ];

    /// The stable key of the question in the report document.
    pub fn key(&self) -> &'static str {
        match self {
            Question::CommunityGoals => "community_goals",
            Question::CircleFeedback => "circle_feedback",
            Question::ContentPreferences => "content_preferences",
            Question::InterestGroups => "interest_groups",
            Question::Suggestions => "suggestions",
        }
    }
}

/// The answers of one respondent, as read from one line of the input.
///
/// All the values are kept raw: blank cells are `None` or empty strings,
/// ratings are not parsed yet. Normalization happens in [crate::run_survey_stats].
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SurveyRow {
    pub id: String,
    pub country: Option<String>,
    pub communication_preference: Option<String>,
    pub circle_rating: Option<String>,
    pub involvement: Option<String>,
    pub event_interests: Option<String>,
    pub contribution_interests: Option<String>,
    /// (aspect, answer) pairs of the value rating grid.
    pub value_ratings: Vec<(String, String)>,
    pub free_text: Vec<(Question, String)>,
}

// ******** Output data structures *********

/// The sentiment attached to a single response.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategorizedResponse {
    pub text: String,
    pub category: String,
    pub sentiment: Sentiment,
}

/// Categorized responses for one question.
///
/// All the themes of the question are listed in their matching order, including
/// the ones that did not receive any response.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionStats {
    pub question: Question,
    pub themes: Vec<(String, Vec<CategorizedResponse>)>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SurveyResult {
    pub total_responses: u64,
    /// Non-empty ratings that could not be read as a number.
    pub skipped_ratings: u64,
    pub countries: Vec<(String, u64)>,
    /// Number of recognized countries (the unknown bucket is not counted).
    pub countries_count: u64,
    pub communication_preferences: Vec<(String, u64)>,
    pub circle_ratings: Vec<(String, u64)>,
    pub avg_circle_rating: f64,
    pub contribution_percentage: u64,
    pub value_ratings: Vec<(String, Vec<(String, u64)>)>,
    pub event_preferences: Vec<(String, u64)>,
    pub contribution_preferences: Vec<(String, u64)>,
    pub question_stats: Vec<QuestionStats>,
}

/// Errors that prevent the tabulation from starting.
///
/// Problems in the data itself are never errors: they fall back to the
/// `Other`, `Neutral` and `Unknown` buckets or are skipped.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SurveyErrors {
    EmptyDelimiters,
    ZeroTopCountries,
}

impl Error for SurveyErrors {}

impl Display for SurveyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyErrors::EmptyDelimiters => {
                write!(f, "at least one free text delimiter is required")
            }
            SurveyErrors::ZeroTopCountries => {
                write!(f, "the country limit must be at least 1")
            }
        }
    }
}

// ********* Configuration **********

/// Free text answers are split on line breaks unless configured otherwise.
pub const DEFAULT_DELIMITERS: &[char] = &['\n'];

pub const DEFAULT_AFFIRMATIVE_ANSWER: &str = "Yes";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyRules {
    /// Only keep the largest countries in the tally. All of them when `None`.
    pub top_countries: Option<usize>,
    /// Extra (alias, canonical name) pairs for the country normalization.
    /// The alias is compared after normalization (lowercase, plain letters).
    pub country_aliases: Vec<(String, String)>,
    /// The answer to the involvement question that counts as a yes.
    pub affirmative_answer: String,
    pub free_text_delimiters: Vec<char>,
}

impl Default for SurveyRules {
    fn default() -> Self {
        SurveyRules {
            top_countries: None,
            country_aliases: Vec::new(),
            affirmative_answer: DEFAULT_AFFIRMATIVE_ANSWER.to_string(),
            free_text_delimiters: DEFAULT_DELIMITERS.to_vec(),
        }
    }
}
