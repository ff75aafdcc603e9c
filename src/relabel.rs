//! Reshape a generated table into a two-column `label,text` training file.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TextMode {
    /// Body only.
    #[default]
    Body,
    /// `Subject: <subject>` followed by a blank line and the body.
    SubjectBody,
}

#[derive(Debug, Deserialize)]
struct SourceRow {
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LabeledRow {
    pub label: String,
    pub text: String,
}

pub fn label_row(label: &str, subject: &str, body: &str, mode: TextMode) -> LabeledRow {
    let (subject, body) = (subject.trim(), body.trim());
    let text = match mode {
        TextMode::Body => body.to_string(),
        TextMode::SubjectBody => format!("Subject: {}\n\n{}", subject, body),
    };
    LabeledRow {
        label: label.to_string(),
        text,
    }
}

/// Stream `input` into `output`, returning the number of rows written.
pub fn relabel(input: &Path, output: &Path, label: &str, mode: TextMode) -> Result<usize> {
    if label.trim().is_empty() {
        return Err(anyhow!("label must be non-empty"));
    }
    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut written = 0;
    for row in reader.deserialize::<SourceRow>() {
        let row = row.with_context(|| format!("malformed row in {}", input.display()))?;
        writer.serialize(label_row(label, &row.subject, &row.body, mode))?;
        written += 1;
    }
    // An empty input still yields a header.
    if written == 0 {
        writer.write_record(["label", "text"])?;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmailRecord;
    use crate::table::TableFile;
    use tempfile::tempdir;

    #[test]
    fn label_row_modes() {
        let row = label_row("onboarding", " Welcome ", "Dear Sam,\nHi.\n", TextMode::Body);
        assert_eq!(row.text, "Dear Sam,\nHi.");
        let row = label_row("onboarding", "Welcome", "Dear Sam", TextMode::SubjectBody);
        assert_eq!(row.text, "Subject: Welcome\n\nDear Sam");
        assert_eq!(row.label, "onboarding");
    }

    #[test]
    fn relabel_generated_table() {
        let td = tempdir().unwrap();
        let input = td.path().join("in.csv");
        let output = td.path().join("out.csv");
        let (table, _) = TableFile::initialize(&input).unwrap();
        for (id, body) in [(1, "First, body"), (2, "Second\nbody")] {
            table
                .append(&EmailRecord {
                    id,
                    subject: format!("S{id}"),
                    body: body.into(),
                    tone: "t".into(),
                    intent: "i".into(),
                })
                .unwrap();
        }

        let n = relabel(&input, &output, "candidate_application", TextMode::Body).unwrap();
        assert_eq!(n, 2);
        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            text,
            "label,text\ncandidate_application,\"First, body\"\ncandidate_application,\"Second\nbody\"\n"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let td = tempdir().unwrap();
        let input = td.path().join("in.csv");
        let output = td.path().join("out.csv");
        TableFile::initialize(&input).unwrap();
        assert_eq!(relabel(&input, &output, "x", TextMode::Body).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "label,text\n");
    }

    #[test]
    fn blank_label_rejected() {
        let td = tempdir().unwrap();
        let p = td.path().join("in.csv");
        assert!(relabel(&p, &p, " ", TextMode::Body).is_err());
    }
}
