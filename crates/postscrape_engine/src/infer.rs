//! Field heuristics over free-form post text. Every function returns the
//! empty string when nothing matches.
use std::collections::BTreeSet;
use std::sync::LazyLock;

use postscrape_core::WorkplaceMode;
use regex::Regex;

const ROLE_NOUNS: &[&str] = &[
    "developer",
    "engineer",
    "designer",
    "manager",
    "analyst",
    "specialist",
    "consultant",
    "assistant",
    "architect",
    "lead",
    "intern",
];

pub const QUALIFICATION_KEYWORDS: &[&str] = &[
    "qualification",
    "requirements",
    "must have",
    "should have",
    "education",
];

pub const SKILL_KEYWORDS: &[&str] = &["skills", "tech stack", "technologies", "experience with"];

const SECTION_LINES: usize = 4;
const MIN_PHONE_LEN: usize = 7;
const CURRENCY: &str = r"(?:\$|€|£|₹|USD|PKR|INR|EUR|GBP|AED)";

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:job title|title|position|role|opening|hiring for)\s*[:\-]\s*([^\n•\-]{3,80})")
        .expect("title pattern")
});
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:location|based in)\s*[:\-]\s*([^\n•\-]{2,80})").expect("location pattern")
});
static LINE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n•]").expect("split"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern")
});
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("url pattern"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-\s]?)?(?:\(?\d{2,4}\)?[-\s]?)?\d{3,4}[-\s]?\d{3,4}")
        .expect("phone pattern")
});
static SALARY_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(&format!(
            r"(?i){CURRENCY}\s?\d[\d,]*(?:\s?-\s?{CURRENCY}?\s?\d[\d,]*)?"
        ))
        .expect("currency salary pattern"),
        Regex::new(r"(?i)\d[\d,]*\s?(?:per year|per annum|per month|per hour)")
            .expect("periodic salary pattern"),
    ]
});

fn lines(text: &str) -> impl Iterator<Item = &str> {
    LINE_SPLIT_RE.split(text)
}

pub fn job_title(text: &str) -> String {
    if let Some(captures) = TITLE_RE.captures(text) {
        return captures[1].trim().to_string();
    }
    lines(text)
        .find(|line| {
            let lowered = line.to_lowercase();
            ROLE_NOUNS.iter().any(|noun| lowered.contains(noun))
        })
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

pub fn location(text: &str) -> String {
    if let Some(captures) = LOCATION_RE.captures(text) {
        return captures[1].trim().to_string();
    }
    lines(text)
        .find(|line| line.to_lowercase().contains("location"))
        .map(|line| match line.split_once(':') {
            Some((_, rest)) => rest.trim().to_string(),
            None => line.trim().to_string(),
        })
        .unwrap_or_default()
}

/// Ordered classifier; the first matching predicate wins.
pub fn employment_type(text: &str) -> String {
    let lowered = text.to_lowercase();
    let rules: [(&[&str], &str); 4] = [
        (&["full-time", "full time"], "Full-time"),
        (&["part-time", "part time"], "Part-time"),
        (&["contract"], "Contract"),
        (&["intern"], "Internship"),
    ];
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(_, label)| label.to_string())
        .unwrap_or_default()
}

pub fn workplace_mode(text: &str) -> WorkplaceMode {
    let lowered = text.to_lowercase();
    let rules: [(&[&str], WorkplaceMode); 3] = [
        (&["remote"], WorkplaceMode::Remote),
        (&["hybrid"], WorkplaceMode::Hybrid),
        (&["on-site", "onsite"], WorkplaceMode::OnSite),
    ];
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(_, mode)| *mode)
        .unwrap_or_default()
}

/// Up to four non-empty lines starting at the first keyword (in list order)
/// that occurs in `text`, joined by single spaces.
pub fn section_excerpt(text: &str, keywords: &[&str]) -> String {
    let lowered = text.to_ascii_lowercase();
    let Some(start) = keywords.iter().find_map(|keyword| lowered.find(keyword)) else {
        return String::new();
    };
    text[start..]
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(SECTION_LINES)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Emails, then URLs, then phone numbers. Each group is deduplicated and
/// sorted; empty groups are left out.
pub fn contact_details(text: &str) -> String {
    let emails: BTreeSet<&str> = EMAIL_RE.find_iter(text).map(|m| m.as_str()).collect();
    let urls: BTreeSet<&str> = URL_RE.find_iter(text).map(|m| m.as_str()).collect();
    let phones: BTreeSet<&str> = PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|phone| phone.chars().count() >= MIN_PHONE_LEN)
        .collect();

    [emails, urls, phones]
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(|group| group.into_iter().collect::<Vec<_>>().join(";"))
        .collect::<Vec<_>>()
        .join(";")
}

pub fn salary(text: &str) -> String {
    SALARY_RES
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_title_wins_over_role_noun_line() {
        let text = "Senior engineer wanted\nPosition: Backend Developer\nApply now";
        assert_eq!(job_title(text), "Backend Developer");
    }

    #[test]
    fn location_without_colon_returns_whole_line() {
        assert_eq!(location("Great team\nLocation TBD soon"), "Location TBD soon");
    }

    #[test]
    fn excerpt_follows_keyword_list_order() {
        let text = "Skills: Rust\nTokio\nRequirements: 3 years";
        assert_eq!(
            section_excerpt(text, QUALIFICATION_KEYWORDS),
            "Requirements: 3 years"
        );
    }
}
