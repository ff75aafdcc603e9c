use serde::{Deserialize, Serialize};

/// Sampling knobs forwarded to the backend; omitted from the request when unset.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl SamplingOptions {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.top_p.is_none()
    }
}

/// One backend call's inputs, built per attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub role: String,
    pub adjective: String,
    pub prompt: String,
    pub system: String,
    pub sampling: SamplingOptions,
}

/// The four text sections recovered from a backend response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedEmail {
    pub subject: String,
    pub body: String,
    pub tone: String,
    pub intent: String,
}

impl ParsedEmail {
    pub fn with_id(self, id: u64) -> EmailRecord {
        EmailRecord {
            id,
            subject: self.subject,
            body: self.body,
            tone: self.tone,
            intent: self.intent,
        }
    }
}

/// A row of the table file. Field order is the column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailRecord {
    pub id: u64,
    pub subject: String,
    pub body: String,
    pub tone: String,
    pub intent: String,
}

/// Why a single attempt did not produce an accepted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    Backend,
    Parse,
    Duplicate,
}

impl AttemptFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptFailure::Backend => "backend_failure",
            AttemptFailure::Parse => "parse_failure",
            AttemptFailure::Duplicate => "duplicate_content",
        }
    }
}

/// Terminal state of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Accepted { attempts: u32 },
    Exhausted { failures: Vec<AttemptFailure> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub start_id: u64,
    /// Id the next run would start from.
    pub next_id: u64,
    pub requested: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Failed items with at least one unparsable response kept on disk.
    pub unparsable: u64,
    pub stopped: bool,
}

impl RunSummary {
    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }
}
