use serde::{Deserialize, Serialize};

use crate::llm::Summary;

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummarizeResponse {
    pub headline: String,
    pub bullets: Vec<String>,
}

impl From<Summary> for SummarizeResponse {
    fn from(summary: Summary) -> Self {
        Self {
            headline: summary.headline,
            bullets: summary.bullets,
        }
    }
}
