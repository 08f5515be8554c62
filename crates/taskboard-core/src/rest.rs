use anyhow::{Context, anyhow, bail};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Url};
use taskboard_shared::{TaskDto, TaskId, TaskInsert, TaskPatch};
use tracing::{debug, instrument};

use crate::table::TaskTable;

pub const DEFAULT_TABLE: &str = "tasks";

/// Where the hosted table lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub url: String,
    pub api_key: String,
    pub table: String,
}

impl RemoteSettings {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

/// PostgREST client for the `tasks` table (the REST surface Supabase exposes).
#[derive(Debug, Clone)]
pub struct RestTable {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl RestTable {
    pub fn new(settings: &RemoteSettings) -> anyhow::Result<Self> {
        let base = settings.url.trim().trim_end_matches('/');
        if base.is_empty() {
            bail!("remote url is not configured (set remote.url or TASKBOARD_URL)");
        }
        if settings.api_key.trim().is_empty() {
            bail!("remote api key is not configured (set remote.key or TASKBOARD_KEY)");
        }
        let table = settings.table.trim();
        if table.is_empty() {
            bail!("remote table name cannot be empty");
        }

        let endpoint = Url::parse(&format!("{base}/rest/v1/{table}"))
            .with_context(|| format!("invalid remote url: {}", settings.url))?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key: settings.api_key.trim().to_string(),
        })
    }

    fn url(&self, query: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(&self, request: RequestBuilder, op: &str) -> anyhow::Result<String> {
        let response = request
            .send()
            .await
            .with_context(|| format!("{op}: request to remote table failed"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("{op}: failed reading response body"))?;

        debug!(op, status = %status, body_len = body.len(), "remote table responded");

        if !status.is_success() {
            return Err(anyhow!("{op}: remote table returned {status}: {body}"));
        }
        Ok(body)
    }
}

fn id_filter(id: &TaskId) -> String {
    format!("eq.{id}")
}

impl TaskTable for RestTable {
    #[instrument(skip(self))]
    async fn list_all(&self) -> anyhow::Result<Option<Vec<TaskDto>>> {
        let url = self.url(&[("select", "*"), ("order", "created_at.desc")]);
        let body = self.send(self.request(Method::GET, url), "list").await?;
        serde_json::from_str(&body).context("list: failed decoding task rows")
    }

    #[instrument(skip(self, row), fields(title_len = row.title.len()))]
    async fn insert_one(&self, row: TaskInsert) -> anyhow::Result<Option<TaskDto>> {
        let payload = serde_json::to_string(&[row]).context("insert: failed encoding row")?;
        let url = self.url(&[("select", "*")]);
        let request = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .body(payload);
        let body = self.send(request, "insert").await?;

        let rows: Option<Vec<TaskDto>> =
            serde_json::from_str(&body).context("insert: failed decoding inserted row")?;
        Ok(rows.and_then(|rows| rows.into_iter().next()))
    }

    #[instrument(skip(self, patch))]
    async fn update_one(&self, id: &TaskId, patch: TaskPatch) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&patch).context("update: failed encoding patch")?;
        let filter = id_filter(id);
        let url = self.url(&[("id", filter.as_str())]);
        let request = self.request(Method::PATCH, url).body(payload);
        self.send(request, "update").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_one(&self, id: &TaskId) -> anyhow::Result<()> {
        let filter = id_filter(id);
        let url = self.url(&[("id", filter.as_str())]);
        self.send(self.request(Method::DELETE, url), "delete").await?;
        Ok(())
    }
}
