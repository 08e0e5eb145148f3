use regex::Regex;
use std::sync::OnceLock;

/// Hard ceiling applied to raw input before any other processing (cost control)
const RAW_CEILING: usize = 6000;

/// Per-section ceiling, also the whole-text fallback length
const SECTION_LIMIT: usize = 600;

/// Final ceiling for the condensed summary
pub const SUMMARY_LIMIT: usize = 900;

/// Marker appended whenever a truncation actually cut text
const ELLIPSIS: char = '…';

/// Canonical sections worth keeping from a job posting
const SECTION_HEADERS: &[&str] = &["about the role", "responsibilities", "requirements"];

fn section_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SECTION_HEADERS
            .iter()
            .map(|header| {
                let re = Regex::new(&format!(r"(?i){}[:\s]*", regex::escape(header)))
                    .expect("section header pattern is valid");
                (*header, re)
            })
            .collect()
    })
}

fn header_like_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A short capitalized line, optionally ending with a colon
        Regex::new(r"(?m)^[ \t]*[A-Z][A-Za-z0-9 /&'\-]{2,60}:?[ \t]*$")
            .expect("header line pattern is valid")
    })
}

/// Cut `text` to at most `limit` characters without splitting a word
///
/// The cut falls back to the nearest preceding whitespace and an ellipsis
/// marker is appended whenever anything was removed.
pub fn truncate_at_word_boundary(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let window: String = text.chars().take(limit).collect();
    let cut = match window.rfind(char::is_whitespace) {
        Some(idx) => window[..idx].trim_end().to_string(),
        // Single unbroken word longer than the limit; nothing better to cut at
        None => window,
    };

    format!("{}{}", cut, ELLIPSIS)
}

/// Condense a job posting into a bounded summary of its salient sections
///
/// Looks for the canonical sections and keeps each one up to the next
/// capitalized header-like line, bounded per section. Falls back to the
/// start of the whole text when no section matches.
pub fn condense(job_text: &str) -> String {
    let text: String = if job_text.chars().count() > RAW_CEILING {
        job_text.chars().take(RAW_CEILING).collect()
    } else {
        job_text.to_string()
    };

    let mut sections: Vec<String> = Vec::new();
    for (header, pattern) in section_patterns() {
        if let Some(body) = extract_section(&text, pattern) {
            tracing::debug!("matched section '{}' ({} chars)", header, body.len());
            sections.push(truncate_at_word_boundary(&body, SECTION_LIMIT));
        }
    }

    let combined = if sections.is_empty() {
        truncate_at_word_boundary(&text, SECTION_LIMIT)
    } else {
        sections.join("\n\n")
    };

    truncate_at_word_boundary(&combined, SUMMARY_LIMIT)
}

/// Text following the header match, bounded at the next header-like line
fn extract_section(text: &str, pattern: &Regex) -> Option<String> {
    let m = pattern.find(text)?;
    let rest = &text[m.end()..];
    let end = header_like_line()
        .find(rest)
        .map(|h| h.start())
        .unwrap_or(rest.len());
    let body = rest[..end].trim();

    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}
