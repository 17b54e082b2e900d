use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::super::domain::{Evidence, Relevance};

/// Visa vocabulary tested case-insensitively against visible page text.
pub(crate) const KEYWORDS: [&str; 8] = [
    "OPT",
    "CPT",
    "F-1",
    "international student",
    "visa sponsorship",
    "work authorization",
    "E-Verify",
    "H-1B",
];

pub(crate) const EXCERPT_WINDOW: usize = 200;

static HIDDEN_BLOCKS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->").ok()
});
static TAGS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<[/!?]?[A-Za-z][^>]*>").ok());
static TITLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").ok());

/// Turn a fetched page into evidence when it mentions any tracked keyword.
pub(crate) fn analyze_page(url: &str, html: &str, captured_at: DateTime<Utc>) -> Option<Evidence> {
    let text = visible_text(html);
    let found = matched_keywords(&text);
    if found.is_empty() {
        return None;
    }

    let relevance = if found.len() >= 2 {
        Relevance::High
    } else {
        Relevance::Medium
    };

    Some(Evidence {
        url: url.to_string(),
        title: page_title(html).unwrap_or_else(|| url.to_string()),
        excerpt: excerpt_around(&text, &found, EXCERPT_WINDOW),
        captured_at,
        relevance,
    })
}

/// Strip script/style content and markup, leaving the text a reader would see.
pub(crate) fn visible_text(html: &str) -> String {
    let without_hidden = match HIDDEN_BLOCKS.as_ref() {
        Some(regex) => regex.replace_all(html, " ").into_owned(),
        None => html.to_string(),
    };
    let without_tags = match TAGS.as_ref() {
        Some(regex) => regex.replace_all(&without_hidden, " ").into_owned(),
        None => without_hidden,
    };
    decode_entities(&without_tags)
}

pub(crate) fn page_title(html: &str) -> Option<String> {
    let captures = TITLE.as_ref()?.captures(html)?;
    let raw = captures.get(1)?.as_str();
    let title = decode_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Keywords present in `text`, in vocabulary order. Substring test, not word-aware.
pub(crate) fn matched_keywords(text: &str) -> Vec<&'static str> {
    let lowered = text.to_ascii_lowercase();
    KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lowered.contains(&keyword.to_ascii_lowercase()))
        .collect()
}

/// Window of `window` characters centered on the first occurrence of the first
/// matched keyword.
pub(crate) fn excerpt_around(text: &str, keywords: &[&str], window: usize) -> String {
    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let half = window / 2;

    for keyword in keywords {
        let Some(index) = lowered.find(&keyword.to_ascii_lowercase()) else {
            continue;
        };

        let start = text[..index]
            .char_indices()
            .rev()
            .take(half)
            .last()
            .map_or(index, |(offset, _)| offset);
        let end = text[index..]
            .char_indices()
            .nth(half)
            .map_or(text.len(), |(offset, _)| index + offset);
        let mut excerpt = text[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if start > 0 {
            excerpt.insert_str(0, "...");
        }
        if end < text.len() {
            excerpt.push_str("...");
        }
        return excerpt;
    }

    String::new()
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAREERS_PAGE: &str = r#"<html><head><title>Careers at Acme</title>
        <style>.opt { color: red }</style>
        <script>var cpt = "F-1";</script></head>
        <body><h1>Join us</h1><p>We welcome international students on OPT &amp; CPT.</p></body></html>"#;

    #[test]
    fn visible_text_drops_script_and_style() {
        let text = visible_text(CAREERS_PAGE);
        assert!(text.contains("Join us"));
        assert!(text.contains("OPT & CPT"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("var cpt"));
    }

    #[test]
    fn page_with_several_keywords_is_high_relevance() {
        let evidence = analyze_page("https://acme.org/careers", CAREERS_PAGE, Utc::now())
            .expect("keywords found");

        assert_eq!(evidence.title, "Careers at Acme");
        assert_eq!(evidence.relevance, Relevance::High);
        assert!(evidence.excerpt.contains("OPT"));
        assert!(!evidence.excerpt.starts_with("..."));
    }

    #[test]
    fn page_with_single_keyword_is_medium_relevance() {
        let html = "<p>All hires are verified through E-Verify.</p>";
        let evidence =
            analyze_page("https://acme.org/about", html, Utc::now()).expect("keyword found");

        assert_eq!(evidence.relevance, Relevance::Medium);
        assert_eq!(evidence.title, "https://acme.org/about");
    }

    #[test]
    fn page_without_keywords_yields_nothing() {
        let html = "<title>About</title><p>We build furniture.</p>";
        assert!(analyze_page("https://acme.org/about", html, Utc::now()).is_none());
    }

    #[test]
    fn excerpt_is_truncated_with_ellipses() {
        let filler = "lorem ipsum ".repeat(40);
        let text = format!("{filler} sponsorship for H-1B workers {filler}");
        let excerpt = excerpt_around(&text, &["H-1B"], EXCERPT_WINDOW);

        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.contains("H-1B"));
        assert!(excerpt.len() <= EXCERPT_WINDOW + 6);
    }

    #[test]
    fn excerpt_centers_on_first_listed_keyword() {
        let text = "CPT details first. Later text mentions OPT.";
        let excerpt = excerpt_around(text, &["OPT", "CPT"], 10);

        assert!(excerpt.contains("OPT"));
    }

    #[test]
    fn keyword_matching_is_case_insensitive_substring() {
        assert_eq!(matched_keywords("Adoption of new options"), vec!["OPT"]);
        assert!(matched_keywords("plain text").is_empty());
    }

    #[test]
    fn excerpt_respects_multibyte_boundaries() {
        let text = format!("{}OPT{}", "é".repeat(120), "ü".repeat(120));
        let excerpt = excerpt_around(&text, &["OPT"], EXCERPT_WINDOW);
        assert!(excerpt.contains("OPT"));
    }

    #[test]
    fn excerpt_window_counts_characters_not_bytes() {
        let accents = "é".repeat(300);
        let text = format!("{accents} OPT {accents}");

        let excerpt = excerpt_around(&text, &["OPT"], EXCERPT_WINDOW);

        assert!(excerpt.starts_with("...") && excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), EXCERPT_WINDOW + 6);
        assert!(excerpt.contains(" OPT "));
    }

    #[test]
    fn bare_angle_bracket_keeps_following_text() {
        let html = "<p>Salary < 50k. OPT and CPT students welcome > apply now</p>";

        let text = visible_text(html);

        assert!(text.contains("Salary < 50k. OPT and CPT students welcome > apply now"));
        let evidence =
            analyze_page("https://acme.org/jobs", html, Utc::now()).expect("keywords kept");
        assert_eq!(evidence.relevance, Relevance::High);
    }
}
