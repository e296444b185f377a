//! Lexicon-based sentiment of free text responses.

use crate::config::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "love",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "fantastic",
    "awesome",
    "good",
    "nice",
    "helpful",
    "useful",
    "valuable",
    "appreciate",
    "thank",
    "grateful",
    "enjoy",
    "happy",
    "satisfied",
    "perfect",
    "outstanding",
    "impressive",
    "beneficial",
    "effective",
    "successful",
    "easy",
    "smooth",
    "clear",
    "convenient",
    "accessible",
    "friendly",
    "supportive",
    "inspiring",
];

const NEGATIVE_WORDS: &[&str] = &[
    "hate",
    "terrible",
    "awful",
    "horrible",
    "bad",
    "poor",
    "disappointing",
    "frustrated",
    "annoying",
    "difficult",
    "hard",
    "confusing",
    "slow",
    "lag",
    "laggy",
    "broken",
    "issue",
    "problem",
    "bug",
    "error",
    "fail",
    "failure",
    "crash",
    "crashing",
    "freeze",
    "freezes",
    "freezing",
    "stuck",
    "impossible",
    "useless",
    "waste",
    "boring",
    "unhappy",
    "dissatisfied",
    "concerned",
    "worry",
    "unfortunately",
    "sadly",
    "unresponsive",
];

// Negations and complaint phrases. They add to the negative score.
const NEGATIVE_PHRASES: &[&str] = &[
    "not good",
    "not great",
    "not helpful",
    "not useful",
    "no value",
    "no good",
    "don't like",
    "do not like",
    "doesn't work",
    "doesnt work",
    "can't",
    "cant ",
    "cannot ",
    "hard to",
    "difficult to",
    "too slow",
    "very slow",
    "so slow",
    "keeps crashing",
    "keeps crushing",
];

// Requests and suggestions: they pull the response towards neutral.
const IMPROVEMENT_WORDS: &[&str] = &[
    "improve",
    "better",
    "enhance",
    "upgrade",
    "suggest",
    "recommend",
    "would like",
    "hope",
    "wish",
    "could",
    "should",
    "need",
    "want",
    "feature",
    "add",
    "include",
    "provide",
];

/// How many entries of each word list occur in a response.
///
/// Every entry is counted at most once, however many times it appears.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct SentimentScores {
    pub positive: u32,
    pub negative: u32,
    pub improvement: u32,
}

fn count_present(words: &[&str], text: &str) -> u32 {
    words.iter().filter(|w| text.contains(*w)).count() as u32
}

pub fn sentiment_scores(text: &str) -> SentimentScores {
    let lower = text.to_lowercase();
    SentimentScores {
        positive: count_present(POSITIVE_WORDS, &lower),
        negative: count_present(NEGATIVE_WORDS, &lower) + count_present(NEGATIVE_PHRASES, &lower),
        improvement: count_present(IMPROVEMENT_WORDS, &lower),
    }
}

impl SentimentScores {
    /// The list with the strictly highest score wins. Any tie at the top,
    /// including no match at all, is neutral.
    pub fn sentiment(&self) -> Sentiment {
        let SentimentScores {
            positive,
            negative,
            improvement,
        } = *self;
        if positive > negative && positive > improvement {
            Sentiment::Positive
        } else if negative > positive && negative > improvement {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

pub fn analyze_sentiment(text: &str) -> Sentiment {
    sentiment_scores(text).sentiment()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_words_only() {
        assert_eq!(
            analyze_sentiment("This is great and helpful"),
            Sentiment::Positive
        );
    }

    #[test]
    fn negative_words_only() {
        assert_eq!(
            analyze_sentiment("Too slow and frustrating"),
            Sentiment::Negative
        );
        assert_eq!(
            sentiment_scores("Too slow and frustrating"),
            SentimentScores {
                positive: 0,
                negative: 2,
                improvement: 0
            }
        );
    }

    #[test]
    fn no_listed_words() {
        assert_eq!(analyze_sentiment("Kenya"), Sentiment::Neutral);
        assert_eq!(analyze_sentiment(""), Sentiment::Neutral);
    }

    #[test]
    fn ties_are_neutral() {
        // One positive (good), one negative (bad).
        assert_eq!(analyze_sentiment("good but bad"), Sentiment::Neutral);
        // "not good" contains "good": one positive, one negative phrase.
        assert_eq!(analyze_sentiment("Not good"), Sentiment::Neutral);
    }

    #[test]
    fn suggestions_outweigh_praise() {
        // great: 1 positive. wish, feature: 2 improvements.
        assert_eq!(
            analyze_sentiment("Great, I wish there was a feature for this"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn words_are_counted_once() {
        assert_eq!(sentiment_scores("slow slow slow").negative, 1);
    }
}
