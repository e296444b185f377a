// Assembly of the summary document, and the JSON and JavaScript writers.

use crate::report::io_common::simplify_file_name;
use crate::report::*;

/// Where the summary comes from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceInfo {
    pub file: String,
    pub sha256: String,
}

pub fn fingerprint(path: &str) -> ReportResult<SourceInfo> {
    let bytes = fs::read(path).context(OpeningInputSnafu { path })?;
    Ok(SourceInfo {
        file: simplify_file_name(path),
        sha256: sha256::digest(bytes.as_slice()),
    })
}

fn counts_to_json(counts: &[(String, u64)]) -> JSMap<String, JSValue> {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (label, count) in counts.iter() {
        m.insert(label.clone(), json!(count));
    }
    m
}

fn question_stats_to_json(question_stats: &[QuestionStats]) -> JSMap<String, JSValue> {
    let mut questions: JSMap<String, JSValue> = JSMap::new();
    for qs in question_stats.iter() {
        let mut themes: JSMap<String, JSValue> = JSMap::new();
        for (theme, responses) in qs.themes.iter() {
            let l: Vec<JSValue> = responses
                .iter()
                .map(|r| {
                    json!({
                        "text": r.text,
                        "category": r.category,
                        "sentiment": r.sentiment.as_str()
                    })
                })
                .collect();
            themes.insert(theme.clone(), JSValue::Array(l));
        }
        questions.insert(qs.question.key().to_string(), JSValue::Object(themes));
    }
    questions
}

pub fn build_summary_js(rs: &SurveyResult, skipped_rows: u64, source: &SourceInfo) -> JSValue {
    let mut value_ratings: JSMap<String, JSValue> = JSMap::new();
    for (aspect, counts) in rs.value_ratings.iter() {
        value_ratings.insert(aspect.clone(), JSValue::Object(counts_to_json(counts)));
    }

    json!({
        "stats": {
            "total_responses": rs.total_responses,
            "countries_count": rs.countries_count,
            "avg_circle_rating": rs.avg_circle_rating,
            "contribution_percentage": rs.contribution_percentage,
            "skipped_rows": skipped_rows,
            "skipped_ratings": rs.skipped_ratings,
        },
        "countries": counts_to_json(&rs.countries),
        "communication_preferences": counts_to_json(&rs.communication_preferences),
        "circle_ratings": counts_to_json(&rs.circle_ratings),
        "value_ratings": value_ratings,
        "event_preferences": counts_to_json(&rs.event_preferences),
        "contribution_preferences": counts_to_json(&rs.contribution_preferences),
        "categorized_responses": question_stats_to_json(&rs.question_stats),
        "source": {
            "file": source.file,
            "sha256": source.sha256,
        },
    })
}

fn write_file(path: &str, contents: &str) -> ReportResult<()> {
    fs::write(path, contents).context(WritingOutputSnafu { path })?;
    info!("Wrote {}", path);
    Ok(())
}

pub fn write_json(path: &str, pretty_js: &str) -> ReportResult<()> {
    write_file(path, format!("{}\n", pretty_js).as_str())
}

pub fn render_js(variable_name: &str, pretty_js: &str) -> String {
    format!("const {} = {};\n", variable_name, pretty_js)
}

pub fn write_js(path: &str, variable_name: &str, pretty_js: &str) -> ReportResult<()> {
    write_file(path, render_js(variable_name, pretty_js).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_tally::builder::Builder;

    fn source() -> SourceInfo {
        SourceInfo {
            file: "survey.csv".to_string(),
            sha256: "00".to_string(),
        }
    }

    #[test]
    fn every_theme_is_listed() {
        let res = run_survey_stats(&[], &SurveyRules::default()).unwrap();
        let js = build_summary_js(&res, 0, &source());
        let questions = js["categorized_responses"].as_object().unwrap();
        assert_eq!(questions.len(), 5);
        for (_, themes) in questions.iter() {
            let themes = themes.as_object().unwrap();
            assert_eq!(themes.len(), 6);
            assert_eq!(themes["Other"], json!([]));
        }
        assert_eq!(js["stats"]["avg_circle_rating"], json!(0.0));
        assert_eq!(js["countries"], json!({}));
    }

    #[test]
    fn responses_and_counts() {
        let mut builder = Builder::new(&SurveyRules::default()).unwrap();
        builder
            .respondent("1")
            .country("Accra")
            .circle_rating("4")
            .answer(Question::Suggestions, "Fix the app bugs");
        builder.respondent("2").country("ghana").circle_rating("5");
        let res = builder.finish().unwrap();
        let js = build_summary_js(&res, 2, &source());
        assert_eq!(js["countries"], json!({"Ghana": 2}));
        assert_eq!(js["circle_ratings"], json!({"4.0": 1, "5.0": 1}));
        assert_eq!(js["stats"]["avg_circle_rating"], json!(4.5));
        assert_eq!(js["stats"]["skipped_rows"], json!(2));
        assert_eq!(
            js["categorized_responses"]["suggestions"]["Platform & Technical Improvements"],
            json!([{
                "text": "Fix the app bugs",
                "category": "Platform & Technical Improvements",
                "sentiment": "negative"
            }])
        );
        assert_eq!(js["source"], json!({"file": "survey.csv", "sha256": "00"}));
    }

    #[test]
    fn js_rendering() {
        assert_eq!(
            render_js("surveyData", "{\n  \"a\": 1\n}"),
            "const surveyData = {\n  \"a\": 1\n};\n"
        );
    }

    #[test]
    fn unicode_is_not_escaped() {
        let js = json!({"country": "Côte d'Ivoire"});
        let s = serde_json::to_string_pretty(&js).unwrap();
        assert!(s.contains("Côte d'Ivoire"));
    }

    #[test]
    fn fingerprint_of_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("survey.csv");
        fs::write(&p, "abc").unwrap();
        let info = fingerprint(p.to_str().unwrap()).unwrap();
        assert_eq!(info.file, "survey.csv");
        assert_eq!(
            info.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn write_errors() {
        let res = write_json("/nonexistent/dir/out.json", "{}");
        assert!(matches!(res, Err(ReportError::WritingOutput { .. })));
    }
}
