//! Normalization of categorical answers and tallies.
//!
//! Two flavours of normalization are implemented:
//! - the generic one, used for all the single choice answers: whitespace and case
//!   are not significant.
//! - the country one, which also resolves cities, abbreviations and common typos
//!   to a canonical country name.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// The bucket for country answers that could not be recognized.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Trims and collapses the whitespace of an answer.
///
/// Returns `None` for blank answers.
pub fn clean_label(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<&str>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct Bucket {
    count: u64,
    spellings: BTreeMap<String, u64>,
}

impl Bucket {
    // Most frequent spelling, the smallest one on ties.
    fn label(&self) -> String {
        let mut best: Option<(&String, u64)> = None;
        for (spelling, count) in self.spellings.iter() {
            match best {
                Some((_, c)) if c >= *count => {}
                _ => best = Some((spelling, *count)),
            }
        }
        best.map(|(s, _)| s.clone()).unwrap_or_default()
    }
}

/// Counts of answers, bucketed case-insensitively.
///
/// The result does not depend on the order in which the answers are added.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Tally {
    buckets: BTreeMap<String, Bucket>,
}

impl Tally {
    pub fn new() -> Tally {
        Tally::default()
    }

    /// Adds a raw answer. Blank answers are ignored and `false` is returned.
    pub fn add(&mut self, raw: &str) -> bool {
        match clean_label(raw) {
            Some(label) => {
                self.add_label(&label);
                true
            }
            None => false,
        }
    }

    /// Adds an answer that is already in canonical form.
    pub fn add_label(&mut self, label: &str) {
        let bucket = self.buckets.entry(label.to_lowercase()).or_default();
        bucket.count += 1;
        *bucket.spellings.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.buckets.values().map(|b| b.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The counts, largest first. Equal counts are sorted by label.
    pub fn to_sorted(&self) -> Vec<(String, u64)> {
        let mut res: Vec<(String, u64)> = self
            .buckets
            .values()
            .map(|b| (b.label(), b.count))
            .collect();
        res.sort_by(|(l1, c1), (l2, c2)| c2.cmp(c1).then_with(|| l1.cmp(l2)));
        res
    }
}

// ******** Countries *********

const KNOWN_COUNTRIES: &[&str] = &[
    "Algeria",
    "Angola",
    "Benin",
    "Botswana",
    "Burkina Faso",
    "Burundi",
    "Cabo Verde",
    "Cameroon",
    "Central African Republic",
    "Chad",
    "Comoros",
    "Congo",
    "Democratic Republic of Congo",
    "Côte d'Ivoire",
    "Djibouti",
    "Egypt",
    "Equatorial Guinea",
    "Eritrea",
    "Eswatini",
    "Ethiopia",
    "Gabon",
    "Gambia",
    "Ghana",
    "Guinea",
    "Guinea-Bissau",
    "Kenya",
    "Lesotho",
    "Liberia",
    "Libya",
    "Madagascar",
    "Malawi",
    "Mali",
    "Mauritania",
    "Mauritius",
    "Morocco",
    "Mozambique",
    "Namibia",
    "Niger",
    "Nigeria",
    "Rwanda",
    "Sao Tome and Principe",
    "Senegal",
    "Seychelles",
    "Sierra Leone",
    "Somalia",
    "South Africa",
    "South Sudan",
    "Sudan",
    "Tanzania",
    "Togo",
    "Tunisia",
    "Uganda",
    "Zambia",
    "Zimbabwe",
    // Outside of the continent but common enough in the answers.
    "United States",
    "United Kingdom",
    "Canada",
    "Germany",
    "France",
    "Saudi Arabia",
    "United Arab Emirates",
    "Brazil",
    "Vietnam",
    "Hungary",
    "Belgium",
    "South Korea",
    "Turkey",
    "Türkiye",
];

// Ordered: the containment fallback returns the first city found.
const CITY_TO_COUNTRY: &[(&str, &str)] = &[
    ("lagos", "Nigeria"),
    ("abuja", "Nigeria"),
    ("ogun", "Nigeria"),
    ("ogun state", "Nigeria"),
    ("imo", "Nigeria"),
    ("imo state", "Nigeria"),
    ("nairobi", "Kenya"),
    ("nairobi metropolitan area", "Kenya"),
    ("mombasa", "Kenya"),
    ("kericho", "Kenya"),
    ("accra", "Ghana"),
    ("kumasi", "Ghana"),
    ("cape town", "South Africa"),
    ("johannesburg", "South Africa"),
    ("durban", "South Africa"),
    ("pretoria", "South Africa"),
    ("kigali", "Rwanda"),
    ("cairo", "Egypt"),
    ("alexandria", "Egypt"),
    ("addis ababa", "Ethiopia"),
    ("casablanca", "Morocco"),
    ("rabat", "Morocco"),
    ("kampala", "Uganda"),
    ("lusaka", "Zambia"),
    ("harare", "Zimbabwe"),
    ("bulawayo", "Zimbabwe"),
    ("gaborone", "Botswana"),
    ("windhoek", "Namibia"),
    ("abidjan", "Côte d'Ivoire"),
    ("yamoussoukro", "Côte d'Ivoire"),
    ("kinshasa", "Democratic Republic of Congo"),
    ("lubumbashi", "Democratic Republic of Congo"),
    ("tunis", "Tunisia"),
    ("riyadh", "Saudi Arabia"),
    ("jeddah", "Saudi Arabia"),
    ("dubai", "United Arab Emirates"),
    ("abu dhabi", "United Arab Emirates"),
    ("victoria", "Seychelles"),
    ("antananarivo", "Madagascar"),
    ("porto-novo", "Benin"),
    ("porto novo", "Benin"),
    ("cotonou", "Benin"),
    ("bissau", "Guinea-Bissau"),
    ("bangui", "Central African Republic"),
    ("monrovia", "Liberia"),
    ("freetown", "Sierra Leone"),
    ("lilongwe", "Malawi"),
    ("blantyre", "Malawi"),
    ("dodoma", "Tanzania"),
    ("dar es salaam", "Tanzania"),
    ("yaounde", "Cameroon"),
    ("douala", "Cameroon"),
    ("nouakchott", "Mauritania"),
    ("mbabane", "Eswatini"),
    ("maseru", "Lesotho"),
];

const CANONICAL_NAME_FIXES: &[(&str, &str)] = &[
    ("cote divoire", "Côte d'Ivoire"),
    ("cote d ivoire", "Côte d'Ivoire"),
    ("cote d'ivoire", "Côte d'Ivoire"),
    ("uae", "United Arab Emirates"),
    ("uk", "United Kingdom"),
    ("usa", "United States"),
    ("us", "United States"),
    ("britain", "United Kingdom"),
    ("england", "United Kingdom"),
    ("sa", "South Africa"),
    ("rsa", "South Africa"),
    ("ken", "Kenya"),
    ("keny", "Kenya"),
    ("kennya", "Kenya"),
    ("ghan", "Ghana"),
    ("egy", "Egypt"),
    ("ethi", "Ethiopia"),
    ("rwan", "Rwanda"),
    ("moro", "Morocco"),
    ("maroc", "Morocco"),
    ("marocco", "Morocco"),
    ("zimb", "Zimbabwe"),
    ("tanz", "Tanzania"),
    ("zamb", "Zambia"),
    ("camer", "Cameroon"),
    ("nig", "Nigeria"),
];

const NON_COUNTRY_EXACT: &[&str] = &[
    "tourism and hospitality",
    "country",
    "marketing",
    // Not applicable answers: "N/A", "n.a", "none", ...
    "na",
    "n a",
    "none",
    "nil",
    "not applicable",
];

const NON_COUNTRY_SUBSTR: &[&str] = &[
    "gmail", "yahoo", "outlook", "hotmail", "mail", "gmailcom", "yahoocom", "email", "com",
    "http", "https",
];

// Substrings that disqualify the title-cased fallback.
const FALLBACK_JUNK: &[&str] = &[
    "@",
    "job",
    "career",
    "skill",
    "network",
    "opportunity",
    "thanks",
    "gmail",
    "mail",
];

const FUZZY_CUTOFF: f64 = 0.8;

static NIGERIA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnigeria\b").unwrap());

// Whole-word patterns of the known countries, longest names first so that
// "South Sudan" is found before "Sudan".
static COUNTRY_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let mut countries: Vec<&'static str> = KNOWN_COUNTRIES.to_vec();
    countries.sort_by_key(|c| std::cmp::Reverse(c.chars().count()));
    countries
        .into_iter()
        .map(|c| {
            let pattern = format!(r"\b{}\b", regex::escape(&fold_accents(&c.to_lowercase())));
            (Regex::new(&pattern).unwrap(), c)
        })
        .collect()
});

// Compatibility decomposition, then the combining marks are dropped.
fn fold_accents(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Reduces a free-form location to lowercase plain letters, spaces, commas,
/// apostrophes and hyphens.
pub fn normalize_location(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            _ => c,
        })
        .collect();
    let folded = fold_accents(&replaced.to_lowercase());
    let kept: String = folded
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace() || matches!(c, ',' | '\'' | '-'))
        .collect();
    kept.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Title case: every letter following a non-letter is capitalized.
pub fn title_case(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                res.extend(c.to_lowercase());
            } else {
                res.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            res.push(c);
            prev_is_letter = false;
        }
    }
    res
}

// Longest common block of a[alo..ahi] and b[blo..bhi]. Earliest block wins on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);
    // Length of the match ending at a[i - 1], b[j - 1], indexed by j + 1.
    let mut prev: Vec<usize> = vec![0; b.len() + 1];
    for i in alo..ahi {
        let mut cur: Vec<usize> = vec![0; b.len() + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > bestsize {
                    besti = i + 1 - k;
                    bestj = j + 1 - k;
                    bestsize = k;
                }
            }
        }
        prev = cur;
    }
    (besti, bestj, bestsize)
}

fn matching_chars(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> usize {
    let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
    if k == 0 {
        return 0;
    }
    let mut total = k;
    if alo < i && blo < j {
        total += matching_chars(a, b, alo, i, blo, j);
    }
    if i + k < ahi && j + k < bhi {
        total += matching_chars(a, b, i + k, ahi, j + k, bhi);
    }
    total
}

/// Similarity between two strings, between 0 and 1.
///
/// This is the gestalt pattern matching ratio: twice the number of matching
/// characters divided by the total number of characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    let ac: Vec<char> = a.chars().collect();
    let bc: Vec<char> = b.chars().collect();
    let total = ac.len() + bc.len();
    if total == 0 {
        return 1.0;
    }
    let m = matching_chars(&ac, &bc, 0, ac.len(), 0, bc.len());
    2.0 * (m as f64) / (total as f64)
}

fn closest_country(candidate: &str) -> Option<&'static str> {
    let mut best: Option<(f64, &'static str)> = None;
    for country in KNOWN_COUNTRIES.iter() {
        let score = similarity(candidate, country);
        if score < FUZZY_CUTOFF {
            continue;
        }
        best = match best {
            Some((s, c)) if s > score || (s == score && c > *country) => Some((s, c)),
            _ => Some((score, *country)),
        };
    }
    best.map(|(_, c)| c)
}

/// Resolves country answers to canonical country names.
#[derive(Debug, Clone)]
pub struct CountryNormalizer {
    aliases: HashMap<String, String>,
}

impl Default for CountryNormalizer {
    fn default() -> Self {
        CountryNormalizer::new(&[])
    }
}

impl CountryNormalizer {
    /// Builds a normalizer with additional (alias, canonical name) entries.
    /// The extra entries take precedence over the built-in ones.
    pub fn new(extra_aliases: &[(String, String)]) -> CountryNormalizer {
        let mut aliases: HashMap<String, String> = CANONICAL_NAME_FIXES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (alias, canonical) in extra_aliases.iter() {
            aliases.insert(normalize_location(alias), canonical.clone());
        }
        CountryNormalizer { aliases }
    }

    /// The canonical name of the country, or `None` if the answer is blank or
    /// does not look like a country.
    pub fn canonical_country(&self, raw: &str) -> Option<String> {
        let normalized = normalize_location(raw);
        if normalized.is_empty() {
            return None;
        }
        if NON_COUNTRY_EXACT.contains(&normalized.as_str())
            || NON_COUNTRY_SUBSTR.iter().any(|bad| normalized.contains(bad))
        {
            debug!("canonical_country: rejected {:?}", raw);
            return None;
        }

        if let Some(best) = self.best_match(&normalized) {
            return Some(best);
        }

        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if (1..=3).contains(&tokens.len())
            && tokens.iter().any(|t| t.chars().any(|c| c.is_alphabetic()))
            && normalized.chars().count() <= 30
            && !FALLBACK_JUNK.iter().any(|bad| normalized.contains(bad))
        {
            return Some(title_case(&tokens.join(" ")));
        }
        debug!("canonical_country: no match for {:?}", raw);
        None
    }

    fn best_match(&self, normalized: &str) -> Option<String> {
        // "City, Country": the last part is usually the country.
        let parts: Vec<&str> = normalized
            .split(',')
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        let text: &str = if parts.len() >= 2 {
            parts[parts.len() - 1]
        } else {
            normalized
        };

        if let Some((_, country)) = CITY_TO_COUNTRY.iter().find(|(city, _)| *city == text) {
            return Some(country.to_string());
        }
        if let Some(country) = self.aliases.get(text) {
            return Some(country.clone());
        }
        // Niger would shadow Nigeria otherwise.
        if NIGERIA_RE.is_match(text) {
            return Some("Nigeria".to_string());
        }
        for (re, country) in COUNTRY_PATTERNS.iter() {
            if re.is_match(text) {
                return Some(country.to_string());
            }
        }
        if let Some(country) = closest_country(&title_case(text)) {
            return Some(country.to_string());
        }
        CITY_TO_COUNTRY
            .iter()
            .find(|(city, _)| text.contains(city))
            .map(|(_, country)| country.to_string())
    }
}
