//! Rule-based extraction of RFP fields
//!
//! Each field is recovered by an ordered list of regular expressions. Rules
//! are tried in order and the first one that yields a valid value wins, so
//! strict labeled forms take precedence over permissive bare ones.

use crate::config::ExtractorConfig;
use crate::normalize::{
    currency_from_symbol, magnitude_multiplier, normalize_date, parse_amount, DateShape,
};
use crate::types::{ExtractionResult, RequirementCandidate};
use regex::{Captures, Regex};
use rfpilot_domain::{Category, Priority};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

const MONTH_NAMES: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

const NUMERIC_DATE: &str = r"(\d{1,4}[/-]\d{1,2}[/-]\d{2,4})\b";

const AMOUNT: &str = r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";

const INLINE_SUFFIX: &str = r"(?:\s*(million|billion|bn|m|b)\b)?";

const CURRENCY_TOKEN: &str = r"(?:[$€£¥]|\b(?:USD|EUR|GBP|JPY|CAD|AUD|CHF|CNY|INR|MXN)\b)";

const RANGE_SEPARATOR: &str = r"\s*(?:to|and|-|–)\s*";

const MANDATORY_KEYWORDS: [&str; 4] = ["must", "shall", "required", "mandatory"];

struct DateRule {
    pattern: Regex,
    shape: DateShape,
}

static DEADLINE_RULES: LazyLock<Vec<DateRule>> = LazyLock::new(|| {
    let month_name_date = format!(
        r"((?:{months})\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}|\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{months}),?\s+\d{{4}})",
        months = MONTH_NAMES
    );

    let mut rules = Vec::new();
    for label in [r"deadline", r"due\s+date", r"submission\s+date"] {
        let prefix = format!(r"(?i)\b{}\s*[:\-]?\s*", label);
        rules.push(DateRule {
            pattern: Regex::new(&format!("{}{}", prefix, month_name_date))
                .expect("labeled month-name date pattern should compile"),
            shape: DateShape::MonthName,
        });
        rules.push(DateRule {
            pattern: Regex::new(&format!("{}{}", prefix, NUMERIC_DATE))
                .expect("labeled numeric date pattern should compile"),
            shape: DateShape::Numeric,
        });
    }

    // Last resort: any day-first date token
    rules.push(DateRule {
        pattern: Regex::new(r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{4})\b")
            .expect("bare date pattern should compile"),
        shape: DateShape::Numeric,
    });

    rules
});

static LABELED_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bbudget\b[^\d\n]{{0,40}}?{cur}?\s*{amount}{suffix}{sep}{cur}?\s*{amount}",
        cur = CURRENCY_TOKEN,
        amount = AMOUNT,
        suffix = INLINE_SUFFIX,
        sep = RANGE_SEPARATOR,
    ))
    .expect("labeled budget range pattern should compile")
});

static BARE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){cur}\s*{amount}{suffix}{sep}{cur}?\s*{amount}",
        cur = CURRENCY_TOKEN,
        amount = AMOUNT,
        suffix = INLINE_SUFFIX,
        sep = RANGE_SEPARATOR,
    ))
    .expect("bare budget range pattern should compile")
});

static LABELED_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bbudget\b[^\d\n]{{0,40}}?{cur}?\s*{amount}",
        cur = CURRENCY_TOKEN,
        amount = AMOUNT,
    ))
    .expect("labeled budget pattern should compile")
});

static TRAILING_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?i:(million|billion|bn|m|b))\b").expect("magnitude suffix pattern should compile")
});

static CURRENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(USD|EUR|GBP|JPY|CAD|AUD|CHF|CNY|INR|MXN)\b|([$€£¥])")
        .expect("currency pattern should compile")
});

static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*[●•▪◦\-\*]\s+(.+)$").expect("bullet pattern should compile")
});

static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:\d{1,2}[.)]|[a-z][.)])\s+(.+)$").expect("numbered pattern should compile")
});

static KEYWORD_SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[^.\n]*\b(?:must|shall|required|mandatory)\b[^.\n]*")
        .expect("keyword sentence pattern should compile")
});

// Checked in order; anything unmatched is Technical
static CATEGORY_RULES: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    [
        (
            Category::Compliance,
            r"(?i)\b(?:complian\w*|comply|regulat\w*|gdpr|hipaa|legal|legislation|iso|audit\w*|standards?)\b",
        ),
        (
            Category::Financial,
            r"(?i)\b(?:pric\w*|payments?|invoic\w*|costs?|budget\w*|insurance|financ\w*|fees?|bond)\b",
        ),
        (
            Category::Qualification,
            r"(?i)\b(?:experience\w*|certifi\w*|qualifi\w*|years?|staff\w*|personnel|team|references?|expertise|accredit\w*)\b",
        ),
        (
            Category::Deliverable,
            r"(?i)\b(?:deliver\w*|reports?|reporting|documentation|milestones?|prototype|training|handover)\b",
        ),
        (
            Category::Operational,
            r"(?i)\b(?:support|maintenan\w*|sla|uptime|availability|24/7|on-call|service levels?|operat\w*|monitor\w*|backups?)\b",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        (
            category,
            Regex::new(pattern).expect("category pattern should compile"),
        )
    })
    .collect()
});

/// Regex-driven extractor for deadline, budget, currency and requirements
///
/// Never fails: a field no rule matches is left empty. The same input always
/// yields the same output.
///
/// # Examples
///
/// ```
/// use rfpilot_extractor::PatternExtractor;
///
/// let extractor = PatternExtractor::default();
/// let result = extractor.extract("Deadline: 15/11/2025\nBudget: €1.5M to €3.2M");
///
/// assert_eq!(result.deadline.as_deref(), Some("2025-11-15"));
/// assert_eq!(result.budget_min, Some(1_500_000.0));
/// assert_eq!(result.budget_max, Some(3_200_000.0));
/// assert_eq!(result.currency.as_deref(), Some("EUR"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternExtractor {
    config: ExtractorConfig,
}

impl PatternExtractor {
    /// Create an extractor using the given length bounds and caps
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract every field the rules can recover from `text`
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let (budget_min, budget_max) = self.extract_budget(text);
        let requirements = self.extract_requirements(text);

        let result = ExtractionResult {
            deadline: extract_deadline(text),
            budget_min,
            budget_max,
            currency: extract_currency(text),
            requirements,
            ..ExtractionResult::default()
        };

        debug!(
            "Pattern extraction: deadline={:?}, budget={:?}..{:?}, currency={:?}, {} requirements",
            result.deadline,
            result.budget_min,
            result.budget_max,
            result.currency,
            result.requirements.len()
        );

        result
    }

    fn extract_budget(&self, text: &str) -> (Option<f64>, Option<f64>) {
        for pattern in [&*LABELED_RANGE, &*BARE_RANGE] {
            if let Some(caps) = pattern.captures(text) {
                let (Some(low), Some(high)) = (amount_at(&caps, 1), amount_at(&caps, 3)) else {
                    continue;
                };
                let inline = caps.get(2).map(|m| m.as_str());
                let trailing = self.trailing_suffix(text, &caps);

                // A lone trailing suffix covers the whole range
                let (low_scale, high_scale) = match (inline, trailing.as_deref()) {
                    (None, Some(suffix)) => {
                        let scale = magnitude_multiplier(suffix);
                        (scale, scale)
                    }
                    (inline, trailing) => (
                        inline.map_or(1.0, magnitude_multiplier),
                        trailing.map_or(1.0, magnitude_multiplier),
                    ),
                };
                return (Some(low * low_scale), Some(high * high_scale));
            }
        }

        if let Some(caps) = LABELED_SINGLE.captures(text) {
            if let Some(value) = amount_at(&caps, 1) {
                let scale = self
                    .trailing_suffix(text, &caps)
                    .map_or(1.0, |suffix| magnitude_multiplier(&suffix));
                return (None, Some(value * scale));
            }
        }

        (None, None)
    }

    /// Magnitude suffix right after the match, on the same line
    fn trailing_suffix(&self, text: &str, caps: &Captures<'_>) -> Option<String> {
        let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let window: String = text[end..]
            .chars()
            .take_while(|c| *c != '\n')
            .take(self.config.magnitude_window)
            .collect();

        TRAILING_SUFFIX
            .captures(&window)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn extract_requirements(&self, text: &str) -> Vec<RequirementCandidate> {
        let bullets = BULLET_LINE
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()));
        let numbered = NUMBERED_LINE
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()));
        let sentences = KEYWORD_SENTENCE
            .find_iter(text)
            .map(|m| strip_list_marker(m.as_str()));

        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for raw in bullets.chain(numbered).chain(sentences) {
            let normalized = normalize_requirement(raw);
            let len = normalized.chars().count();
            if len < self.config.min_requirement_len || len > self.config.max_requirement_len {
                continue;
            }
            if seen.insert(normalized.clone()) {
                kept.push(normalized);
            }
            if kept.len() >= self.config.max_requirements {
                break;
            }
        }

        kept.into_iter().map(classify_requirement).collect()
    }
}

fn extract_deadline(text: &str) -> Option<String> {
    DEADLINE_RULES.iter().find_map(|rule| {
        rule.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| normalize_date(m.as_str(), rule.shape))
    })
}

fn extract_currency(text: &str) -> Option<String> {
    let caps = CURRENCY_PATTERN.captures(text)?;
    if let Some(code) = caps.get(1) {
        return Some(code.as_str().to_string());
    }
    caps.get(2)
        .and_then(|symbol| currency_from_symbol(symbol.as_str()))
        .map(str::to_string)
}

fn amount_at(caps: &Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group).and_then(|m| parse_amount(m.as_str()))
}

/// Drop a single leading list marker; the rest of the text is kept as written
fn strip_list_marker(raw: &str) -> &str {
    let trimmed = raw.trim_start();
    trimmed
        .strip_prefix(|c: char| "●•▪◦-*".contains(c))
        .unwrap_or(trimmed)
}

/// Collapse whitespace and strip trailing punctuation
fn normalize_requirement(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| ".;,".contains(c) || c.is_whitespace())
        .to_string()
}

fn classify_requirement(text: String) -> RequirementCandidate {
    let category = CATEGORY_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(&text))
        .map(|(category, _)| *category)
        .unwrap_or_default();

    let lower = text.to_lowercase();
    let is_mandatory = MANDATORY_KEYWORDS.iter().any(|kw| lower.contains(kw));

    RequirementCandidate {
        text,
        category,
        priority: if is_mandatory {
            Priority::High
        } else {
            Priority::Medium
        },
        is_mandatory,
    }
}
