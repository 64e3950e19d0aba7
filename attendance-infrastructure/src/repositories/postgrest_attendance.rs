use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use attendance_domain::ports::{AttendanceRepository, ATTENDANCE_COLLECTION};
use attendance_domain::{AttendanceRecord, DatastoreConfig, NewAttendanceRecord};

/// `attendance_records` on a PostgREST endpoint (the hosted datastore's REST
/// surface).
pub struct PostgrestAttendanceRepository {
    client: Client,
    table_url: String,
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
}

impl PostgrestAttendanceRepository {
    pub fn new(config: &DatastoreConfig) -> Result<Self> {
        let base = config
            .datastore_url
            .as_deref()
            .ok_or_else(|| anyhow!("datastore_url not configured"))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            table_url: format!(
                "{}/rest/v1/{}",
                base.trim_end_matches('/'),
                ATTENDANCE_COLLECTION
            ),
            key: config.datastore_key.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let Some(key) = &self.key else {
            return request;
        };
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", key)) {
            headers.insert(AUTHORIZATION, value);
        }
        request.headers(headers)
    }
}

#[async_trait]
impl AttendanceRepository for PostgrestAttendanceRepository {
    async fn insert(&self, record: &NewAttendanceRecord) -> Result<AttendanceRecord> {
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&[record]);
        let response = ensure_success(self.authorized(request).send().await?).await?;
        let mut rows: Vec<AttendanceRecord> = response
            .json()
            .await
            .context("unexpected insert response")?;
        if rows.is_empty() {
            return Err(anyhow!("datastore returned no inserted row"));
        }
        Ok(rows.swap_remove(0))
    }

    async fn count(&self) -> Result<u64> {
        let request = self
            .client
            .head(&self.table_url)
            .query(&[("select", "*")])
            .header("Prefer", "count=exact");
        let response = ensure_success(self.authorized(request).send().await?).await?;
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range_total)
            .unwrap_or(0);
        debug!("attendance_records count probe: total={}", total);
        Ok(total)
    }

    async fn find_by_registration(
        &self,
        event_name: &str,
        registration_number: &str,
    ) -> Result<Option<AttendanceRecord>> {
        let request = self.client.get(&self.table_url).query(&[
            ("select", "*".to_string()),
            ("registration_number", format!("eq.{}", registration_number)),
            ("event_name", format!("eq.{}", event_name)),
            ("limit", "1".to_string()),
        ]);
        let response = ensure_success(self.authorized(request).send().await?).await?;
        let rows: Vec<AttendanceRecord> = response
            .json()
            .await
            .context("unexpected lookup response")?;
        Ok(rows.into_iter().next())
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PostgrestErrorBody>(&body)
        .ok()
        .and_then(|err| err.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| status.to_string());
    Err(anyhow!(message))
}

/// `0-24/3573` or `*/0` -> the part after the slash.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}
