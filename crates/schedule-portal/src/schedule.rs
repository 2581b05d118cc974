use bytes::Bytes;
use chrono::NaiveDate;
use reqwest::header;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::PortalConfig;
use crate::cookies::CookieSet;
use crate::error::{PortalError, Step};
use crate::extract::{extract_schedule_context, ScheduleContext};
use crate::http::{classify, with_cookies, Hop, PortalHttp};

/// Filters block of the classes request. Only the date varies per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFilters {
    pub date: String,
    pub location_id: Value,
    pub instructor_ids: Vec<Value>,
    pub studio_ids: Vec<Value>,
    pub category_ids: Vec<Value>,
}

impl ScheduleFilters {
    pub fn new(date: NaiveDate, location_id: Value) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            location_id,
            instructor_ids: Vec::new(),
            studio_ids: Vec::new(),
            category_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassesRequest {
    pub account_id: Value,
    pub filters: ScheduleFilters,
    pub instructors: Vec<Value>,
    pub areas: Vec<Value>,
    pub branches: Vec<Value>,
}

impl ClassesRequest {
    /// `location_override` wins over the first scraped branch.
    pub fn new(context: ScheduleContext, location_override: Option<&str>, date: NaiveDate) -> Self {
        let location_id = match location_override {
            Some(id) => Value::String(id.to_string()),
            None => context.first_branch_id().cloned().unwrap_or(Value::Null),
        };

        Self {
            account_id: context.account_id,
            filters: ScheduleFilters::new(date, location_id),
            instructors: context.instructors,
            areas: context.areas,
            branches: context.branches,
        }
    }
}

/// Raw upstream body, relayed to the browser untouched.
#[derive(Debug, Clone)]
pub struct UpstreamBody {
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct ScheduleProxy {
    http: PortalHttp,
    config: PortalConfig,
}

impl ScheduleProxy {
    pub fn new(http: PortalHttp, config: PortalConfig) -> Self {
        Self { http, config }
    }

    /// Scrape the schedule page for identifiers, then fetch the classes for `date`.
    pub async fn fetch_classes(
        &self,
        cookies: &CookieSet,
        date: NaiveDate,
    ) -> Result<UpstreamBody, PortalError> {
        let context = self.load_context(cookies).await?;
        let payload = ClassesRequest::new(context, self.config.location_id.as_deref(), date);
        debug!(
            "Fetching classes for {} at location {}",
            payload.filters.date, payload.filters.location_id
        );

        let url = self.http.url(&self.config.classes_path)?;
        let request = self.http.following().post(url).json(&payload);
        let response = with_cookies(request, cookies).send().await?;

        let response = landed(response, Step::FetchClasses)?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        debug!("Relaying {} bytes of schedule data", body.len());
        Ok(UpstreamBody { content_type, body })
    }

    async fn load_context(&self, cookies: &CookieSet) -> Result<ScheduleContext, PortalError> {
        let url = self.http.url(&self.config.schedule_page_path)?;
        let response = with_cookies(self.http.following().get(url), cookies)
            .send()
            .await?;

        let html = landed(response, Step::SchedulePage)?.text().await?;
        extract_schedule_context(&html).ok_or(PortalError::MissingScheduleContext)
    }
}

/// Only a 2xx is usable on the schedule path.
fn landed(response: reqwest::Response, step: Step) -> Result<reqwest::Response, PortalError> {
    match classify(response, step)? {
        Hop::Landed(response) => Ok(response),
        hop => Err(PortalError::UnexpectedStatus {
            step,
            status: hop.status(),
        }),
    }
}
