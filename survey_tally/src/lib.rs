mod config;
pub mod builder;
pub mod manual;
pub mod normalize;
pub mod sentiment;
pub mod themes;

use log::{debug, info, warn};

use std::collections::BTreeMap;

pub use crate::config::*;
use crate::normalize::{CountryNormalizer, Tally, UNKNOWN_COUNTRY};
use crate::sentiment::analyze_sentiment;
use crate::themes::{
    categorize, count_mentions, split_free_text, theme_labels, CONTRIBUTION_MENTIONS,
    EVENT_MENTIONS,
};

// **** Private structures ****

// The ratings, kept in tenths to be sorted and compared exactly.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct RatingKey(i64);

impl RatingKey {
    fn label(&self) -> String {
        format!("{:.1}", (self.0 as f64) / 10.0)
    }
}

#[derive(Debug, Default)]
struct RatingStats {
    sum: f64,
    count: u64,
    skipped: u64,
    tally: BTreeMap<RatingKey, u64>,
}

impl RatingStats {
    fn add(&mut self, row_id: &str, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        match trimmed.parse::<f64>() {
            Ok(x) if x.is_finite() => {
                self.sum += x;
                self.count += 1;
                let key = RatingKey((x * 10.0).round() as i64);
                *self.tally.entry(key).or_insert(0) += 1;
            }
            _ => {
                warn!(
                    "row {}: skipping rating {:?}: not a number",
                    row_id, trimmed
                );
                self.skipped += 1;
            }
        }
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round_ties_even_to(self.sum / (self.count as f64), 1)
    }
}

fn round_ties_even_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round_ties_even() / scale
}

fn percentage(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((part as f64) / (total as f64) * 100.0).round_ties_even() as u64
}

fn check_rules(rules: &SurveyRules) -> Result<(), SurveyErrors> {
    if rules.free_text_delimiters.is_empty() {
        return Err(SurveyErrors::EmptyDelimiters);
    }
    if rules.top_countries == Some(0) {
        return Err(SurveyErrors::ZeroTopCountries);
    }
    Ok(())
}

/// Runs the whole tabulation over the rows of a survey.
///
/// Arguments:
/// * `rows` the answers of each respondent
/// * `rules` the options that govern normalization and splitting
///
/// Malformed values never make this function fail: blank answers are not counted,
/// unreadable ratings are skipped, unknown countries go to the `Unknown` bucket,
/// responses without a theme go to `Other`.
pub fn run_survey_stats(
    rows: &[SurveyRow],
    rules: &SurveyRules,
) -> Result<SurveyResult, SurveyErrors> {
    info!("Processing {:?} rows, rules: {:?}", rows.len(), rules);
    check_rules(rules)?;

    let countries_normalizer = CountryNormalizer::new(&rules.country_aliases);
    let affirmative = rules.affirmative_answer.trim().to_lowercase();

    let mut countries = Tally::new();
    let mut communication = Tally::new();
    let mut ratings = RatingStats::default();
    let mut involved: u64 = 0;
    let mut value_ratings: BTreeMap<String, Tally> = BTreeMap::new();
    let mut events = Tally::new();
    let mut contributions = Tally::new();
    let mut responses: BTreeMap<Question, Vec<CategorizedResponse>> = BTreeMap::new();

    for row in rows.iter() {
        debug!("run_survey_stats: row {:?}", row);
        if let Some(raw) = row.country.as_deref().filter(|s| !s.trim().is_empty()) {
            match countries_normalizer.canonical_country(raw) {
                Some(country) => countries.add_label(&country),
                None => {
                    debug!("row {}: unrecognized country {:?}", row.id, raw);
                    countries.add_label(UNKNOWN_COUNTRY);
                }
            }
        }
        if let Some(raw) = row.communication_preference.as_deref() {
            communication.add(raw);
        }
        if let Some(raw) = row.circle_rating.as_deref() {
            ratings.add(&row.id, raw);
        }
        if let Some(raw) = row.involvement.as_deref() {
            if raw.trim().to_lowercase() == affirmative {
                involved += 1;
            }
        }
        for (aspect, answer) in row.value_ratings.iter() {
            value_ratings
                .entry(aspect.clone())
                .or_default()
                .add(answer);
        }
        if let Some(raw) = row.event_interests.as_deref() {
            count_mentions(EVENT_MENTIONS, raw, &mut events);
        }
        if let Some(raw) = row.contribution_interests.as_deref() {
            count_mentions(CONTRIBUTION_MENTIONS, raw, &mut contributions);
        }
        for (question, text) in row.free_text.iter() {
            for fragment in split_free_text(text, &rules.free_text_delimiters) {
                let category = categorize(*question, &fragment);
                let sentiment = analyze_sentiment(&fragment);
                responses
                    .entry(*question)
                    .or_default()
                    .push(CategorizedResponse {
                        text: fragment,
                        category: category.to_string(),
                        sentiment,
                    });
            }
        }
    }

    let total_responses = rows.len() as u64;

    let mut country_counts = countries.to_sorted();
    if let Some(limit) = rules.top_countries {
        country_counts.truncate(limit);
    }
    let countries_count = country_counts
        .iter()
        .filter(|(label, _)| label != UNKNOWN_COUNTRY)
        .count() as u64;

    let question_stats: Vec<QuestionStats> = Question::ALL
        .iter()
        .map(|q| {
            let all = responses.remove(q).unwrap_or_default();
            let themes = theme_labels(*q)
                .into_iter()
                .map(|label| {
                    let in_theme: Vec<CategorizedResponse> = all
                        .iter()
                        .filter(|r| r.category == label)
                        .cloned()
                        .collect();
                    (label.to_string(), in_theme)
                })
                .collect();
            QuestionStats {
                question: *q,
                themes,
            }
        })
        .collect();

    let res = SurveyResult {
        total_responses,
        skipped_ratings: ratings.skipped,
        countries: country_counts,
        countries_count,
        communication_preferences: communication.to_sorted(),
        circle_ratings: ratings
            .tally
            .iter()
            .map(|(k, c)| (k.label(), *c))
            .collect(),
        avg_circle_rating: ratings.average(),
        contribution_percentage: percentage(involved, total_responses),
        value_ratings: value_ratings
            .iter()
            .map(|(aspect, t)| (aspect.clone(), t.to_sorted()))
            .collect(),
        event_preferences: events.to_sorted(),
        contribution_preferences: contributions.to_sorted(),
        question_stats,
    };

    info!(
        "Processed {} rows: {} countries, average rating {}, {} skipped ratings",
        res.total_responses, res.countries_count, res.avg_circle_rating, res.skipped_ratings
    );
    for qs in res.question_stats.iter() {
        for (theme, rs) in qs.themes.iter() {
            debug!("{}: {:>5} {}", qs.question.key(), rs.len(), theme);
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn row_with_country(id: &str, country: &str) -> SurveyRow {
        SurveyRow {
            id: id.to_string(),
            country: Some(country.to_string()),
            ..SurveyRow::default()
        }
    }

    #[test]
    fn three_rows_countries() {
        init();
        let rows = vec![
            row_with_country("1", "Kenya"),
            row_with_country("2", "Kenya "),
            row_with_country("3", "Ghana"),
        ];
        let res = run_survey_stats(&rows, &SurveyRules::default()).unwrap();
        assert_eq!(
            res.countries,
            vec![("Kenya".to_string(), 2), ("Ghana".to_string(), 1)]
        );
        assert_eq!(res.countries_count, 2);
        assert_eq!(res.total_responses, 3);
    }

    #[test]
    fn tally_sum_matches_non_empty_cells() {
        init();
        let prefs = ["Email", " email", "", "WhatsApp", "   "];
        let rows: Vec<SurveyRow> = prefs
            .iter()
            .enumerate()
            .map(|(idx, p)| SurveyRow {
                id: idx.to_string(),
                communication_preference: Some(p.to_string()),
                country: Some(if idx == 0 { "gmail.com" } else { "" }.to_string()),
                ..SurveyRow::default()
            })
            .collect();
        let res = run_survey_stats(&rows, &SurveyRules::default()).unwrap();
        let total: u64 = res.communication_preferences.iter().map(|p| p.1).sum();
        assert_eq!(total, 3);
        // A non-empty but unreadable country is still counted, as unknown.
        assert_eq!(res.countries, vec![(UNKNOWN_COUNTRY.to_string(), 1)]);
        assert_eq!(res.countries_count, 0);
    }

    #[test]
    fn not_applicable_countries_are_unknown() {
        init();
        let rows = vec![
            row_with_country("1", "Mālī"),
            row_with_country("2", "N/A"),
            row_with_country("3", "-"),
            row_with_country("4", "None"),
            row_with_country("5", "Mali"),
        ];
        let res = run_survey_stats(&rows, &SurveyRules::default()).unwrap();
        assert_eq!(
            res.countries,
            vec![
                (UNKNOWN_COUNTRY.to_string(), 3),
                ("Mali".to_string(), 2)
            ]
        );
        assert_eq!(res.countries_count, 1);
    }

    #[test]
    fn ratings_and_percentages() {
        init();
        let data = [("4", "Yes"), ("5", "no"), ("abc", "yes "), ("", "")];
        let rows: Vec<SurveyRow> = data
            .iter()
            .enumerate()
            .map(|(idx, (rating, inv))| SurveyRow {
                id: idx.to_string(),
                circle_rating: Some(rating.to_string()),
                involvement: Some(inv.to_string()),
                ..SurveyRow::default()
            })
            .collect();
        let res = run_survey_stats(&rows, &SurveyRules::default()).unwrap();
        assert_eq!(
            res.circle_ratings,
            vec![("4.0".to_string(), 1), ("5.0".to_string(), 1)]
        );
        assert_eq!(res.avg_circle_rating, 4.5);
        assert_eq!(res.skipped_ratings, 1);
        assert_eq!(res.contribution_percentage, 50);
    }

    #[test]
    fn free_text_is_split_and_categorized() {
        init();
        let rows = vec![SurveyRow {
            id: "1".to_string(),
            free_text: vec![
                (
                    Question::CircleFeedback,
                    "The app is great\n\nToo slow and frustrating\n".to_string(),
                ),
                (Question::Suggestions, "   ".to_string()),
            ],
            ..SurveyRow::default()
        }];
        let res = run_survey_stats(&rows, &SurveyRules::default()).unwrap();
        let circle = &res.question_stats[1];
        assert_eq!(circle.question, Question::CircleFeedback);
        let positive_ux = &circle.themes[0];
        assert_eq!(positive_ux.0, "Positive User Experience");
        assert_eq!(
            positive_ux.1,
            vec![CategorizedResponse {
                text: "The app is great".to_string(),
                category: "Positive User Experience".to_string(),
                sentiment: Sentiment::Positive,
            }]
        );
        let performance = &circle.themes[1];
        assert_eq!(performance.1.len(), 1);
        assert_eq!(performance.1[0].sentiment, Sentiment::Negative);

        let all_texts: Vec<&str> = res
            .question_stats
            .iter()
            .flat_map(|qs| qs.themes.iter())
            .flat_map(|(_, rs)| rs.iter())
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(all_texts.len(), 2);
        assert!(all_texts.iter().all(|t| !t.trim().is_empty()));
    }

    #[test]
    fn identical_input_identical_output() {
        init();
        let rows = vec![
            row_with_country("1", "Lagos, Nigeria"),
            row_with_country("2", "Accra"),
            row_with_country("3", "nigeria"),
        ];
        let r1 = run_survey_stats(&rows, &SurveyRules::default()).unwrap();
        let r2 = run_survey_stats(&rows, &SurveyRules::default()).unwrap();
        assert_eq!(r1, r2);
        let mut reversed = rows.clone();
        reversed.reverse();
        let r3 = run_survey_stats(&reversed, &SurveyRules::default()).unwrap();
        assert_eq!(r1.countries, r3.countries);
    }

    #[test]
    fn top_countries_limit() {
        init();
        let rows = vec![
            row_with_country("1", "Kenya"),
            row_with_country("2", "Kenya"),
            row_with_country("3", "Ghana"),
            row_with_country("4", "Egypt"),
        ];
        let rules = SurveyRules {
            top_countries: Some(2),
            ..SurveyRules::default()
        };
        let res = run_survey_stats(&rows, &rules).unwrap();
        assert_eq!(
            res.countries,
            vec![("Kenya".to_string(), 2), ("Egypt".to_string(), 1)]
        );
    }

    #[test]
    fn invalid_rules() {
        let rules = SurveyRules {
            free_text_delimiters: vec![],
            ..SurveyRules::default()
        };
        assert_eq!(
            run_survey_stats(&[], &rules),
            Err(SurveyErrors::EmptyDelimiters)
        );
        let rules = SurveyRules {
            top_countries: Some(0),
            ..SurveyRules::default()
        };
        assert_eq!(
            run_survey_stats(&[], &rules),
            Err(SurveyErrors::ZeroTopCountries)
        );
    }

    #[test]
    fn empty_survey() {
        let res = run_survey_stats(&[], &SurveyRules::default()).unwrap();
        assert_eq!(res.total_responses, 0);
        assert_eq!(res.avg_circle_rating, 0.0);
        assert_eq!(res.contribution_percentage, 0);
        assert_eq!(res.question_stats.len(), 5);
    }
}
