//! Scraping of values the portal only exposes inside HTML.
//!
//! Both extractors return `None` instead of failing so callers decide how
//! a missing value is handled.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Name of the hidden anti-forgery form field.
pub const VERIFICATION_TOKEN_FIELD: &str = "__RequestVerificationToken";

static TOKEN_INPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<input\b[^>]*\bname\s*=\s*["']__RequestVerificationToken["'][^>]*>"#)
        .expect("valid token input regex")
});

static VALUE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)(?:^|\s)value\s*=\s*["']([^"']*)["']"#).expect("valid value attribute regex")
});

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("valid script regex")
});

static SCHEDULE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\bvar\s+|\blet\s+|\bconst\s+|\bwindow\.)?\bscheduleConfig\s*=\s*")
        .expect("valid schedule marker regex")
});

/// Value of the anti-forgery token embedded in the login form.
pub fn extract_verification_token(html: &str) -> Option<String> {
    let input = TOKEN_INPUT.find(html)?;
    let value = VALUE_ATTR.captures(input.as_str())?;
    Some(value[1].to_string())
}

/// Identifiers the classes endpoint needs, scraped from the schedule page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleContext {
    pub account_id: Value,
    #[serde(default)]
    pub instructors: Vec<Value>,
    #[serde(default)]
    pub areas: Vec<Value>,
    #[serde(default)]
    pub branches: Vec<Value>,
}

impl ScheduleContext {
    /// `id` of the first branch, if any.
    pub fn first_branch_id(&self) -> Option<&Value> {
        self.branches.first().and_then(|branch| branch.get("id"))
    }
}

/// Parse the `scheduleConfig` object assigned inside a `<script>` block.
pub fn extract_schedule_context(html: &str) -> Option<ScheduleContext> {
    SCRIPT_BLOCK
        .captures_iter(html)
        .filter_map(|script| script.get(1))
        .find_map(|script| {
            let body = script.as_str();
            SCHEDULE_MARKER
                .find_iter(body)
                .find_map(|marker| parse_leading_object(&body[marker.end()..]))
        })
}

/// Parse the JSON object at the start of `text`, ignoring whatever follows it.
fn parse_leading_object(text: &str) -> Option<ScheduleContext> {
    let mut values = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    let value = values.next()?.ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}
