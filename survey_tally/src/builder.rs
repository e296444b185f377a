pub use crate::config::*;

/// A builder for adding survey answers one respondent at a time.
///
/// ```
/// pub use survey_tally::builder::Builder;
/// pub use survey_tally::{Question, SurveyRules};
/// # use survey_tally::SurveyErrors;
///
/// let mut builder = Builder::new(&SurveyRules::default())?;
///
/// builder
///     .respondent("r1")
///     .country("Kenya ")
///     .circle_rating("4")
///     .answer(Question::Suggestions, "More local meetups please\nFix the slow app");
/// builder.respondent("r2").country("kenya");
///
/// let res = builder.finish()?;
/// assert_eq!(res.countries, vec![("Kenya".to_string(), 2)]);
/// assert_eq!(res.total_responses, 2);
///
/// # Ok::<(), SurveyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: SurveyRules,
    pub(crate) _rows: Vec<SurveyRow>,
}

/// Fills the answers of the respondent that was just added.
pub struct RowBuilder<'a> {
    row: &'a mut SurveyRow,
}

impl Builder {
    pub fn new(rules: &SurveyRules) -> Result<Builder, SurveyErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _rows: Vec::new(),
        })
    }

    /// Sets the country aliases. See [SurveyRules::country_aliases].
    pub fn country_aliases(self, aliases: &[(String, String)]) -> Result<Builder, SurveyErrors> {
        Ok(Builder {
            _rules: SurveyRules {
                country_aliases: aliases.to_vec(),
                ..self._rules
            },
            _rows: self._rows,
        })
    }

    /// Starts a new respondent.
    pub fn respondent(&mut self, id: &str) -> RowBuilder<'_> {
        self._rows.push(SurveyRow {
            id: id.to_string(),
            ..SurveyRow::default()
        });
        let idx = self._rows.len() - 1;
        RowBuilder {
            row: &mut self._rows[idx],
        }
    }

    /// Adds a complete row.
    pub fn add_row(&mut self, row: &SurveyRow) -> Result<(), SurveyErrors> {
        self._rows.push(row.clone());
        Ok(())
    }

    pub fn finish(&self) -> Result<SurveyResult, SurveyErrors> {
        crate::run_survey_stats(&self._rows, &self._rules)
    }
}

impl<'a> RowBuilder<'a> {
    pub fn country(self, s: &str) -> RowBuilder<'a> {
        self.row.country = Some(s.to_string());
        self
    }

    pub fn communication_preference(self, s: &str) -> RowBuilder<'a> {
        self.row.communication_preference = Some(s.to_string());
        self
    }

    pub fn circle_rating(self, s: &str) -> RowBuilder<'a> {
        self.row.circle_rating = Some(s.to_string());
        self
    }

    pub fn involvement(self, s: &str) -> RowBuilder<'a> {
        self.row.involvement = Some(s.to_string());
        self
    }

    pub fn event_interests(self, s: &str) -> RowBuilder<'a> {
        self.row.event_interests = Some(s.to_string());
        self
    }

    pub fn contribution_interests(self, s: &str) -> RowBuilder<'a> {
        self.row.contribution_interests = Some(s.to_string());
        self
    }

    pub fn value_rating(self, aspect: &str, answer: &str) -> RowBuilder<'a> {
        self.row
            .value_ratings
            .push((aspect.to_string(), answer.to_string()));
        self
    }

    /// Adds a free text answer. It may contain several responses, see
    /// [SurveyRules::free_text_delimiters].
    pub fn answer(self, question: Question, text: &str) -> RowBuilder<'a> {
        self.row.free_text.push((question, text.to_string()));
        self
    }
}
