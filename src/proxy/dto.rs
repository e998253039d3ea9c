use serde::{Deserialize, Serialize};

/// Body of `POST /api/query`, forwarded to `<backend>/query`.
#[derive(Debug, Deserialize, Serialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: String,
}

/// Body of `POST /api/analyze`, forwarded to `<backend>/analyze`.
#[derive(Debug, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub repo_url: String,
}
