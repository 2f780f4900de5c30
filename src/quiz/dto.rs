use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
    pub title: &'a str,
    pub source_text: &'a str,
    pub count: u32,
    pub avoid_list: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

/// A question as the service returns it. Older deployments send the answer
/// text instead of its index.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer_index: Option<usize>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceError {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest<'a> {
    pub title: &'a str,
    pub source_text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeResponse {
    #[serde(default)]
    pub summary: String,
}
