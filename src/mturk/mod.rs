pub mod answer;
pub mod auth;
pub mod question;
pub mod rest;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use types::{CreatedTask, Response, Task, TaskRequest};

pub const REGION: &str = "us-east-1";
pub const SERVICE: &str = "mturk-requester";
pub const TARGET_PREFIX: &str = "MTurkRequesterServiceV20170117";
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Which marketplace environment a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Sandbox,
    Production,
}

impl Endpoint {
    pub fn api_url(self) -> &'static str {
        match self {
            Endpoint::Sandbox => "https://mturk-requester-sandbox.us-east-1.amazonaws.com",
            Endpoint::Production => "https://mturk-requester.us-east-1.amazonaws.com",
        }
    }

    /// Worker-facing preview link for a HIT group.
    pub fn preview_url(self, group_id: &str) -> String {
        let host = match self {
            Endpoint::Sandbox => "workersandbox",
            Endpoint::Production => "worker",
        };
        format!("https://{}.mturk.com/mturk/preview?groupId={}", host, group_id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Sandbox => "sandbox",
            Endpoint::Production => "production",
        }
    }
}

#[async_trait]
pub trait Marketplace: Send + Sync {
    async fn create_task(&self, endpoint: Endpoint, request: &TaskRequest) -> Result<CreatedTask>;

    /// Every task on the account, each with its submitted responses.
    async fn list_tasks(&self, endpoint: Endpoint) -> Result<Vec<Task>>;

    /// Submitted responses for one task.
    async fn fetch_responses(&self, endpoint: Endpoint, hit_id: &str) -> Result<Vec<Response>>;
}
