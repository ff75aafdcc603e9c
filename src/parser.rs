//! Recovers the SUBJECT / BODY / TONE / INTENT sections from free-form model output.
//!
//! Two passes: a pattern match over the whole text, then a line scan that
//! tolerates separator layouts the pattern rejects. Neither pass ever yields a
//! record with an empty section.
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::model::ParsedEmail;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("response does not contain non-empty SUBJECT, BODY, TONE and INTENT sections")]
    MissingSections,
}

static SECTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)SUBJECT:\s*(.+?)\s+BODY:\s*(.+?)\s+TONE:\s*(.+?)\s+INTENT:\s*(.+?)\s*$")
        .expect("valid sections pattern")
});

const LABELS: [(&str, Section); 4] = [
    ("SUBJECT:", Section::Subject),
    ("BODY:", Section::Body),
    ("TONE:", Section::Tone),
    ("INTENT:", Section::Intent),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Subject,
    Body,
    Tone,
    Intent,
}

/// Parse raw backend text, trying the pattern pass first.
pub fn parse(raw: &str) -> Result<ParsedEmail, ParseError> {
    parse_pattern(raw)
        .or_else(|| parse_line_scan(raw))
        .ok_or(ParseError::MissingSections)
}

/// Pattern pass. Text after INTENT is kept as part of the intent section.
pub fn parse_pattern(raw: &str) -> Option<ParsedEmail> {
    let caps = SECTIONS.captures(raw.trim())?;
    let field = |i: usize| caps.get(i).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
    build(field(1), field(2), field(3), field(4))
}

/// Line-scan pass. A line whose trimmed, uppercased text starts with a label
/// opens that section; the remainder after its first `:` is the first content
/// line. Other lines extend the open section. Lines before any label are dropped.
pub fn parse_line_scan(raw: &str) -> Option<ParsedEmail> {
    let mut fields: [String; 4] = Default::default();
    let mut current: Option<Section> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in raw.trim().lines() {
        let upper = line.trim().to_uppercase();
        let opened = LABELS
            .iter()
            .find(|(label, _)| upper.starts_with(label))
            .map(|(_, section)| *section);

        match opened {
            Some(section) => {
                commit(&mut fields, current, &buffer);
                current = Some(section);
                buffer.clear();
                let inline = line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("");
                if !inline.is_empty() {
                    buffer.push(inline);
                }
            }
            None if current.is_some() => buffer.push(line),
            None => {}
        }
    }
    commit(&mut fields, current, &buffer);

    let [subject, body, tone, intent] = fields;
    build(subject, body, tone, intent)
}

// An empty buffer never overwrites what an earlier occurrence of the label captured.
fn commit(fields: &mut [String; 4], section: Option<Section>, buffer: &[&str]) {
    if let Some(section) = section {
        if !buffer.is_empty() {
            fields[section as usize] = buffer.join("\n").trim().to_string();
        }
    }
}

fn build(subject: String, body: String, tone: String, intent: String) -> Option<ParsedEmail> {
    if subject.is_empty() || body.is_empty() || tone.is_empty() || intent.is_empty() {
        return None;
    }
    Some(ParsedEmail {
        subject,
        body,
        tone,
        intent,
    })
}
