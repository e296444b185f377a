//! Keyword themes for the free text questions, and keyword mentions for the
//! multi-label answers (event types, contribution preferences).

use crate::config::Question;
use crate::normalize::Tally;

/// The fallback theme of every question.
pub const OTHER_THEME: &str = "Other";

/// A theme and the substrings that trigger it. Substrings are lowercase.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ThemeGroup {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

const COMMUNITY_GOALS: &[ThemeGroup] = &[
    ThemeGroup {
        label: "Career Development & Job Opportunities",
        keywords: &[
            "job",
            "career",
            "opportunity",
            "employment",
            "professional development",
            "interview",
            "resume",
            "hire",
            "position",
        ],
    },
    ThemeGroup {
        label: "Networking & Community Building",
        keywords: &[
            "network",
            "connect",
            "community",
            "friendship",
            "relationship",
            "collaborate",
            "partnership",
        ],
    },
    ThemeGroup {
        label: "Skill Development & Learning",
        keywords: &[
            "skill",
            "learn",
            "knowledge",
            "education",
            "training",
            "course",
            "expertise",
            "development",
            "upskill",
        ],
    },
    ThemeGroup {
        label: "Business & Entrepreneurship",
        keywords: &[
            "business",
            "startup",
            "entrepreneur",
            "fund",
            "investment",
            "scale",
            "venture",
            "cofounder",
        ],
    },
    ThemeGroup {
        label: "Mentorship & Guidance",
        keywords: &["mentor", "guidance", "advice", "support", "help", "coaching"],
    },
];

const CIRCLE_FEEDBACK: &[ThemeGroup] = &[
    ThemeGroup {
        label: "Positive User Experience",
        keywords: &[
            "love",
            "great",
            "good",
            "easy",
            "nice",
            "excellent",
            "wonderful",
            "amazing",
            "helpful",
            "useful",
        ],
    },
    ThemeGroup {
        label: "Performance Issues",
        keywords: &[
            "slow",
            "load",
            "lag",
            "freeze",
            "crash",
            "speed",
            "fast",
            "performance",
        ],
    },
    ThemeGroup {
        label: "Content Organization",
        keywords: &["content", "post", "organize", "structure", "format", "layout"],
    },
    ThemeGroup {
        label: "Navigation & Usability",
        keywords: &[
            "navigate",
            "find",
            "search",
            "menu",
            "interface",
            "design",
            "user experience",
        ],
    },
    ThemeGroup {
        label: "Feature Requests",
        keywords: &[
            "feature",
            "add",
            "need",
            "want",
            "suggest",
            "improve",
            "enhancement",
        ],
    },
];

const CONTENT_PREFERENCES: &[ThemeGroup] = &[
    ThemeGroup {
        label: "Career Tips & Opportunities",
        keywords: &[
            "career",
            "job",
            "opportunity",
            "interview",
            "resume",
            "professional",
        ],
    },
    ThemeGroup {
        label: "Technical Skills & AI Content",
        keywords: &[
            "ai",
            "tech",
            "coding",
            "programming",
            "development",
            "software",
            "web3",
            "data",
            "analytics",
        ],
    },
    ThemeGroup {
        label: "Industry Trends & Leadership",
        keywords: &[
            "trend",
            "industry",
            "leader",
            "leadership",
            "business",
            "innovation",
        ],
    },
    ThemeGroup {
        label: "Personal Development",
        keywords: &["personal", "motivation", "inspiration", "growth", "mindset"],
    },
    ThemeGroup {
        label: "Educational Resources",
        keywords: &["education", "learn", "tutorial", "guide", "course", "training"],
    },
];

const INTEREST_GROUPS: &[ThemeGroup] = &[
    ThemeGroup {
        label: "Developer & Tech Groups",
        keywords: &[
            "developer",
            "programming",
            "coding",
            "software",
            "web",
            "mobile",
            "frontend",
            "backend",
        ],
    },
    ThemeGroup {
        label: "Data Science & Analytics",
        keywords: &["data", "analytics", "science", "statistics", "analysis"],
    },
    ThemeGroup {
        label: "AI & Machine Learning",
        keywords: &[
            "ai",
            "artificial intelligence",
            "machine learning",
            "ml",
            "deep learning",
        ],
    },
    ThemeGroup {
        label: "Business & Finance",
        keywords: &[
            "business",
            "finance",
            "accounting",
            "investment",
            "marketing",
            "sales",
        ],
    },
    ThemeGroup {
        label: "Design & Creative",
        keywords: &["design", "ui", "ux", "creative", "art", "graphics"],
    },
];

const SUGGESTIONS: &[ThemeGroup] = &[
    ThemeGroup {
        label: "Platform & Technical Improvements",
        keywords: &[
            "platform",
            "app",
            "website",
            "technical",
            "slow",
            "bug",
            "fix",
            "improve",
            "interface",
        ],
    },
    ThemeGroup {
        label: "Community Structure & Organization",
        keywords: &[
            "community",
            "group",
            "organize",
            "structure",
            "channel",
            "discussion",
        ],
    },
    ThemeGroup {
        label: "Opportunities & Accessibility",
        keywords: &[
            "opportunity",
            "scholarship",
            "job",
            "access",
            "available",
            "fair",
            "equal",
        ],
    },
    ThemeGroup {
        label: "Mentorship & Support",
        keywords: &["mentor", "support", "help", "guidance", "coaching", "advice"],
    },
    ThemeGroup {
        label: "Content & Resources",
        keywords: &["content", "resource", "material", "course", "learning"],
    },
];

/// The themes of a question, in matching order. `Other` is not part of the list.
pub fn theme_groups(question: Question) -> &'static [ThemeGroup] {
    match question {
        Question::CommunityGoals => COMMUNITY_GOALS,
        Question::CircleFeedback => CIRCLE_FEEDBACK,
        Question::ContentPreferences => CONTENT_PREFERENCES,
        Question::InterestGroups => INTEREST_GROUPS,
        Question::Suggestions => SUGGESTIONS,
    }
}

/// All the theme labels of a question, `Other` last.
pub fn theme_labels(question: Question) -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = theme_groups(question).iter().map(|g| g.label).collect();
    labels.push(OTHER_THEME);
    labels
}

/// The first theme with a keyword contained in the response, or `Other`.
pub fn categorize(question: Question, text: &str) -> &'static str {
    let lower = text.trim().to_lowercase();
    theme_groups(question)
        .iter()
        .find(|g| g.keywords.iter().any(|k| lower.contains(k)))
        .map(|g| g.label)
        .unwrap_or(OTHER_THEME)
}

/// Splits a free text answer into its individual responses.
///
/// Fragments are trimmed. Blank fragments are dropped.
pub fn split_free_text(text: &str, delimiters: &[char]) -> Vec<String> {
    text.split(|c: char| delimiters.contains(&c))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

// ******** Mentions *********

/// A label counted once for each answer that mentions any of its needles.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct MentionRule {
    pub label: &'static str,
    pub needles: &'static [&'static str],
}

pub const EVENT_MENTIONS: &[MentionRule] = &[
    MentionRule {
        label: "Skill-building Workshops",
        needles: &["skill", "workshop"],
    },
    MentionRule {
        label: "Career Development",
        needles: &["career", "networking"],
    },
    MentionRule {
        label: "Expert Q&A",
        needles: &["q&a", "expert"],
    },
    MentionRule {
        label: "Local Meetups",
        needles: &["meetup", "local"],
    },
    MentionRule {
        label: "Social Hangouts",
        needles: &["social", "hangout"],
    },
    MentionRule {
        label: "Presentations",
        needles: &["presentation", "showcase"],
    },
];

pub const CONTRIBUTION_MENTIONS: &[MentionRule] = &[
    MentionRule {
        label: "Content Sharing",
        needles: &["content", "sharing", "article"],
    },
    MentionRule {
        label: "Mentoring",
        needles: &["mentor"],
    },
    MentionRule {
        label: "Event Hosting",
        needles: &["host", "event"],
    },
    MentionRule {
        label: "Moderating",
        needles: &["moderat"],
    },
    MentionRule {
        label: "Not Ready Yet",
        needles: &["not ready", "attend"],
    },
];

/// Adds to the tally every label mentioned in the answer. Returns the number of
/// labels that matched.
pub fn count_mentions(rules: &[MentionRule], answer: &str, tally: &mut Tally) -> usize {
    let lower = answer.to_lowercase();
    let mut matched = 0;
    for rule in rules.iter() {
        if rule.needles.iter().any(|n| lower.contains(n)) {
            tally.add_label(rule.label);
            matched += 1;
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_group_wins() {
        // "job" (career) is listed before "network".
        assert_eq!(
            categorize(Question::CommunityGoals, "A job and a network"),
            "Career Development & Job Opportunities"
        );
        assert_eq!(
            categorize(Question::CommunityGoals, "Meet new people in the COMMUNITY"),
            "Networking & Community Building"
        );
    }

    #[test]
    fn no_match_is_other() {
        assert_eq!(categorize(Question::CircleFeedback, "Meh."), OTHER_THEME);
        assert_eq!(categorize(Question::Suggestions, "Thanks!"), OTHER_THEME);
    }

    #[test]
    fn performance_feedback() {
        assert_eq!(
            categorize(Question::CircleFeedback, "It takes forever to load"),
            "Performance Issues"
        );
    }

    #[test]
    fn every_question_ends_with_other() {
        for q in Question::ALL {
            let labels = theme_labels(q);
            assert_eq!(labels.len(), 6);
            assert_eq!(labels.last(), Some(&OTHER_THEME));
        }
    }

    #[test]
    fn split_drops_blank_fragments() {
        assert_eq!(
            split_free_text("Jobs\n\n  \r\nMentors \n", &['\n']),
            vec!["Jobs".to_string(), "Mentors".to_string()]
        );
        assert!(split_free_text(" \n ", &['\n']).is_empty());
        assert_eq!(
            split_free_text("a; b", &['\n', ';']),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn mentions_are_multi_label() {
        let mut t = Tally::new();
        let n = count_mentions(
            EVENT_MENTIONS,
            "Skill-building workshops, Expert Q&A sessions",
            &mut t,
        );
        assert_eq!(n, 2);
        count_mentions(EVENT_MENTIONS, "Workshops on skills", &mut t);
        assert_eq!(
            t.to_sorted(),
            vec![
                ("Skill-building Workshops".to_string(), 2),
                ("Expert Q&A".to_string(), 1)
            ]
        );
    }

    #[test]
    fn contribution_mentions() {
        let mut t = Tally::new();
        count_mentions(
            CONTRIBUTION_MENTIONS,
            "I'm not ready yet, I'll attend first",
            &mut t,
        );
        assert_eq!(t.to_sorted(), vec![("Not Ready Yet".to_string(), 1)]);
    }
}
