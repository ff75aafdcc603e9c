use serde::{Deserialize, Serialize};

use crate::model::SamplingOptions;

/// Body of a non-streaming generate call.
#[derive(Serialize, Debug)]
pub struct GenerateBody<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "SamplingOptions::is_empty")]
    pub options: SamplingOptions,
}

#[derive(Deserialize, Debug)]
pub struct GenerateResp {
    pub response: String,
}
