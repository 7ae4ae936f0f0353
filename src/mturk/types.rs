use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters for a new task (HIT).
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub reward: f64,
    pub max_assignments: u32,
    pub lifetime_seconds: u64,
    pub assignment_duration_seconds: u64,
    pub auto_approval_seconds: u64,
    /// HTMLQuestion XML document.
    pub question: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTask {
    pub hit_id: String,
    pub group_id: String,
    pub preview_url: String,
}

/// A published task with its submitted responses.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub description: String,
    pub reward: String,
    pub status: String,
    pub qual_requirements: Vec<Value>,
    pub assignments_available: u32,
    pub assignments_completed: u32,
    pub created: Option<String>,
    pub expires: Option<String>,
    pub responses: Vec<Response>,
}

/// One worker's submitted answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub assignment_id: String,
    pub worker_id: String,
    pub answers: Map<String, Value>,
}

// --- MTurk requester API (JSON 1.1) wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateHitRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub keywords: &'a str,
    pub reward: String,
    pub max_assignments: u32,
    pub lifetime_in_seconds: u64,
    pub assignment_duration_in_seconds: u64,
    pub auto_approval_delay_in_seconds: u64,
    pub question: &'a str,
}

impl<'a> From<&'a TaskRequest> for CreateHitRequest<'a> {
    fn from(req: &'a TaskRequest) -> Self {
        Self {
            title: &req.title,
            description: &req.description,
            keywords: &req.keywords,
            reward: format_reward(req.reward),
            max_assignments: req.max_assignments,
            lifetime_in_seconds: req.lifetime_seconds,
            assignment_duration_in_seconds: req.assignment_duration_seconds,
            auto_approval_delay_in_seconds: req.auto_approval_seconds,
            question: &req.question,
        }
    }
}

/// Rewards go over the wire as a dollar string, e.g. "0.50".
pub fn format_reward(reward: f64) -> String {
    format!("{:.2}", reward)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateHitResponse {
    #[serde(rename = "HIT")]
    pub hit: Hit,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListHitsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListHitsResponse {
    #[serde(rename = "HITs", default)]
    pub hits: Vec<Hit>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Hit {
    #[serde(rename = "HITId")]
    pub hit_id: String,
    #[serde(rename = "HITGroupId", default)]
    pub hit_group_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reward: String,
    #[serde(rename = "HITStatus", default)]
    pub hit_status: String,
    #[serde(default)]
    pub qualification_requirements: Vec<Value>,
    #[serde(default)]
    pub number_of_assignments_available: u32,
    #[serde(default)]
    pub number_of_assignments_completed: u32,
    /// Epoch seconds.
    pub creation_time: Option<f64>,
    pub expiration: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListAssignmentsRequest<'a> {
    #[serde(rename = "HITId")]
    pub hit_id: &'a str,
    pub assignment_statuses: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListAssignmentsResponse {
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Assignment {
    pub assignment_id: String,
    pub worker_id: String,
    /// QuestionFormAnswers XML.
    #[serde(default)]
    pub answer: String,
}

/// Error body returned by the JSON protocol.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(rename = "__type", default)]
    pub error_type: String,
    #[serde(alias = "Message", default)]
    pub message: String,
}
