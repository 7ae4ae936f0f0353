use super::answer::decode_answers;
use super::auth::AwsSigner;
use super::types::*;
use super::{Endpoint, Marketplace, REGION, SERVICE, TARGET_PREFIX};
use crate::paginate::{collect_pages, Page};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

const PAGE_SIZE: u32 = 100;
const SUBMITTED: &[&str] = &["Submitted"];

pub struct MTurkRest {
    client: Client,
    signer: Option<AwsSigner>,
    /// Sends every endpoint's calls here instead of the AWS hosts.
    base_url: Option<String>,
}

impl MTurkRest {
    /// Client for both endpoints. Empty credentials are accepted here so the
    /// menu can start; every call then fails until the config is filled out.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .build()
            .context("failed to build HTTP client")?;
        let signer = (!access_key_id.is_empty() && !secret_access_key.is_empty())
            .then(|| AwsSigner::new(access_key_id, secret_access_key, REGION, SERVICE));
        Ok(Self {
            client,
            signer,
            base_url: None,
        })
    }

    pub fn with_base_url(access_key_id: &str, secret_access_key: &str, base_url: &str) -> Result<Self> {
        let mut rest = Self::new(access_key_id, secret_access_key)?;
        rest.base_url = Some(base_url.trim_end_matches('/').to_string());
        Ok(rest)
    }

    fn api_url(&self, endpoint: Endpoint) -> &str {
        self.base_url.as_deref().unwrap_or(endpoint.api_url())
    }

    /// Signed JSON 1.1 call to `operation`.
    async fn call<Req, Resp>(&self, endpoint: Endpoint, operation: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let signer = self
            .signer
            .as_ref()
            .context("AWS credentials are not set in the config")?;

        let url = Url::parse(self.api_url(endpoint)).context("invalid MTurk endpoint URL")?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => anyhow::bail!("MTurk endpoint URL has no host: {}", url),
        };
        let payload = serde_json::to_vec(body)
            .with_context(|| format!("failed to encode {} request", operation))?;
        let target = format!("{}.{}", TARGET_PREFIX, operation);
        let headers = signer.headers(&host, &target, &payload, Utc::now());

        let mut req = self.client.post(url).body(payload);
        for (k, v) in &headers {
            req = req.header(k, v);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("MTurk {} request failed", operation))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|e| format!("{}: {}", e.error_type, e.message))
                .unwrap_or(body);
            anyhow::bail!("MTurk {} on {} failed ({}): {}", operation, endpoint.label(), status, detail);
        }
        resp.json()
            .await
            .with_context(|| format!("failed to parse {} response", operation))
    }

    async fn list_hits_page(&self, endpoint: Endpoint, next_token: Option<String>) -> Result<Page<Hit>> {
        let req = ListHitsRequest {
            next_token,
            max_results: PAGE_SIZE,
        };
        let resp: ListHitsResponse = self.call(endpoint, "ListHITs", &req).await?;
        Ok(Page::new(resp.hits, resp.next_token))
    }

    async fn list_assignments_page(
        &self,
        endpoint: Endpoint,
        hit_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<Assignment>> {
        let req = ListAssignmentsRequest {
            hit_id,
            assignment_statuses: SUBMITTED,
            next_token,
            max_results: PAGE_SIZE,
        };
        let resp: ListAssignmentsResponse = self.call(endpoint, "ListAssignmentsForHIT", &req).await?;
        Ok(Page::new(resp.assignments, resp.next_token))
    }
}

#[async_trait]
impl Marketplace for MTurkRest {
    async fn create_task(&self, endpoint: Endpoint, request: &TaskRequest) -> Result<CreatedTask> {
        let body = CreateHitRequest::from(request);
        let resp: CreateHitResponse = self.call(endpoint, "CreateHIT", &body).await?;
        let created = CreatedTask {
            preview_url: endpoint.preview_url(&resp.hit.hit_group_id),
            hit_id: resp.hit.hit_id,
            group_id: resp.hit.hit_group_id,
        };
        tracing::info!(
            endpoint = endpoint.label(),
            hit_id = %created.hit_id,
            group_id = %created.group_id,
            "created HIT"
        );
        Ok(created)
    }

    async fn list_tasks(&self, endpoint: Endpoint) -> Result<Vec<Task>> {
        let hits = collect_pages(|token| self.list_hits_page(endpoint, token)).await?;

        let mut tasks = Vec::with_capacity(hits.len());
        for hit in hits {
            let responses = self.fetch_responses(endpoint, &hit.hit_id).await?;
            tasks.push(Task {
                id: hit.hit_id,
                group_id: hit.hit_group_id,
                title: hit.title,
                description: hit.description,
                reward: hit.reward,
                status: hit.hit_status,
                qual_requirements: hit.qualification_requirements,
                assignments_available: hit.number_of_assignments_available,
                assignments_completed: hit.number_of_assignments_completed,
                created: hit.creation_time.and_then(epoch_to_rfc3339),
                expires: hit.expiration.and_then(epoch_to_rfc3339),
                responses,
            });
        }
        tracing::debug!(endpoint = endpoint.label(), count = tasks.len(), "listed HITs");
        Ok(tasks)
    }

    async fn fetch_responses(&self, endpoint: Endpoint, hit_id: &str) -> Result<Vec<Response>> {
        let assignments =
            collect_pages(|token| self.list_assignments_page(endpoint, hit_id, token)).await?;

        assignments
            .into_iter()
            .map(|a| {
                let answers = decode_answers(&a.answer)
                    .with_context(|| format!("assignment {} has an unreadable answer", a.assignment_id))?;
                Ok(Response {
                    assignment_id: a.assignment_id,
                    worker_id: a.worker_id,
                    answers,
                })
            })
            .collect()
    }
}

fn epoch_to_rfc3339(secs: f64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs as i64, 0).map(|dt| dt.to_rfc3339())
}
