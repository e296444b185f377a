// Column lookup and row assembly, shared by the CSV and Excel readers.

use std::path::Path;

use crate::report::*;

/// One response of the export, before the columns are interpreted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRecord {
    /// The position of the response in the export, starting at 1.
    pub lineno: usize,
    pub cells: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
    /// Lines that could not be read.
    pub skipped_rows: u64,
}

/// Where each answer lives in a record.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnMapping {
    pub country: usize,
    pub communication_preference: usize,
    pub circle_rating: usize,
    pub circle_feedback: usize,
    pub community_goals: usize,
    pub event_types: usize,
    pub content_preferences: usize,
    pub interest_groups: usize,
    pub contribution_interests: usize,
    pub involvement: usize,
    pub suggestions: usize,
    /// (column, aspect) for every column of the value rating grid.
    pub value_ratings: Vec<(usize, String)>,
    pub email: Option<usize>,
    pub timestamp: Option<usize>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// The first header containing the needle.
pub fn find_column(headers: &[String], needle: &str) -> Option<usize> {
    headers.iter().position(|h| h.contains(needle))
}

fn find_column_ignore_case(headers: &[String], needle: &str) -> Option<usize> {
    let needle = needle.to_lowercase();
    headers
        .iter()
        .position(|h| h.to_lowercase().contains(needle.as_str()))
}

fn require_column(headers: &[String], needle: &str) -> ReportResult<usize> {
    match find_column(headers, needle) {
        Some(idx) => Ok(idx),
        None => MissingColumnSnafu {
            needle,
            available: headers.to_vec(),
        }
        .fail(),
    }
}

/// The columns of the value grid: `Question? [Aspect]` gives `Aspect`.
pub fn value_rating_columns(headers: &[String], prefix: &str) -> Vec<(usize, String)> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.contains(prefix))
        .map(|(idx, h)| (idx, aspect_name(h)))
        .collect()
}

fn aspect_name(header: &str) -> String {
    match (header.find('['), header.rfind(']')) {
        (Some(start), Some(end)) if start < end => header[start + 1..end].trim().to_string(),
        _ => header.trim().to_string(),
    }
}

pub fn resolve_columns(headers: &[String], needles: &ColumnNeedles) -> ReportResult<ColumnMapping> {
    let mapping = ColumnMapping {
        country: require_column(headers, &needles.country)?,
        communication_preference: require_column(headers, &needles.communication_preference)?,
        circle_rating: require_column(headers, &needles.circle_rating)?,
        circle_feedback: require_column(headers, &needles.circle_feedback)?,
        community_goals: require_column(headers, &needles.community_goals)?,
        event_types: require_column(headers, &needles.event_types)?,
        content_preferences: require_column(headers, &needles.content_preferences)?,
        interest_groups: require_column(headers, &needles.interest_groups)?,
        contribution_interests: require_column(headers, &needles.contribution_interests)?,
        involvement: require_column(headers, &needles.involvement)?,
        suggestions: require_column(headers, &needles.suggestions)?,
        value_ratings: value_rating_columns(headers, &needles.value_rating_prefix),
        email: find_column_ignore_case(headers, &needles.email),
        timestamp: find_column_ignore_case(headers, &needles.timestamp),
    };
    if mapping.value_ratings.is_empty() {
        warn!(
            "No value rating column found (looking for {:?})",
            needles.value_rating_prefix
        );
    }
    Ok(mapping)
}

impl ColumnMapping {
    pub fn to_row(&self, record: &RawRecord, id: String) -> SurveyRow {
        let cell = |idx: usize| record.cells.get(idx).cloned();
        let text = |question: Question, idx: usize| cell(idx).map(|s| (question, s));
        SurveyRow {
            id,
            country: cell(self.country),
            communication_preference: cell(self.communication_preference),
            circle_rating: cell(self.circle_rating),
            involvement: cell(self.involvement),
            event_interests: cell(self.event_types),
            contribution_interests: cell(self.contribution_interests),
            value_ratings: self
                .value_ratings
                .iter()
                .filter_map(|(idx, aspect)| cell(*idx).map(|s| (aspect.clone(), s)))
                .collect(),
            free_text: [
                text(Question::CommunityGoals, self.community_goals),
                text(Question::CircleFeedback, self.circle_feedback),
                text(Question::ContentPreferences, self.content_preferences),
                text(Question::InterestGroups, self.interest_groups),
                text(Question::Suggestions, self.suggestions),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey_headers() -> Vec<String> {
        [
            "Timestamp",
            "Email Address",
            "What country are you based in?",
            "What is your preferred way to receive updates from the community?",
            "How would you rate you experience of Circle (our community platform)?",
            "Please share your reasoning behind your rating for Circle",
            "What are the top 1-3 things you hope to gain from the community?",
            "How valuable do you find the following aspects of the ALX community? [Online Events (e.g., webinars, workshops)]",
            "To help us plan, what types of events would you like to attend?",
            "What kind of content / articles / resources would you like to see?",
            "If we were to create interest-based groups, which would you join?",
            "How would you be interested in contributing to the community?",
            "Would you like us to inform you with specific ways to get involved?",
            "Do you have any other comments, questions or suggestions?",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn default_columns_are_found() {
        let m = resolve_columns(&survey_headers(), &ColumnNeedles::default()).unwrap();
        assert_eq!(m.email, Some(1));
        assert_eq!(m.timestamp, Some(0));
        assert_eq!(m.country, 2);
        assert_eq!(m.circle_rating, 4);
        assert_eq!(m.circle_feedback, 5);
        assert_eq!(m.suggestions, 13);
        assert_eq!(
            m.value_ratings,
            vec![(7, "Online Events (e.g., webinars, workshops)".to_string())]
        );
    }

    #[test]
    fn missing_column_lists_headers() {
        let mut headers = survey_headers();
        headers.remove(3);
        match resolve_columns(&headers, &ColumnNeedles::default()) {
            Err(ReportError::MissingColumn { needle, available }) => {
                assert_eq!(needle, "What is your preferred way to receive updates");
                assert_eq!(available.len(), 13);
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn optional_columns() {
        let headers: Vec<String> = survey_headers().into_iter().skip(2).collect();
        let m = resolve_columns(&headers, &ColumnNeedles::default()).unwrap();
        assert_eq!(m.email, None);
        assert_eq!(m.timestamp, None);
        assert_eq!(m.country, 0);
    }

    #[test]
    fn aspects() {
        assert_eq!(aspect_name("How valuable? [ Networking ]"), "Networking");
        assert_eq!(aspect_name("No brackets"), "No brackets");
    }

    #[test]
    fn record_to_row() {
        let headers = survey_headers();
        let m = resolve_columns(&headers, &ColumnNeedles::default()).unwrap();
        let mut cells: Vec<String> = vec![String::new(); headers.len()];
        cells[2] = "Kenya".to_string();
        cells[7] = "Very valuable".to_string();
        cells[13] = "More meetups".to_string();
        let row = m.to_row(&RawRecord { lineno: 3, cells }, "x".to_string());
        assert_eq!(row.id, "x");
        assert_eq!(row.country, Some("Kenya".to_string()));
        assert_eq!(row.communication_preference, Some(String::new()));
        assert_eq!(
            row.value_ratings,
            vec![(
                "Online Events (e.g., webinars, workshops)".to_string(),
                "Very valuable".to_string()
            )]
        );
        assert_eq!(row.free_text.len(), 5);
        assert_eq!(
            row.free_text[4],
            (Question::Suggestions, "More meetups".to_string())
        );
    }

    #[test]
    fn default_ids() {
        let f = make_default_id("/data/survey.csv");
        assert_eq!(f(12), "survey.csv-00000012");
    }
}
