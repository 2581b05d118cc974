use reqwest::cookie::Cookie;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Upstream cookies accumulated across the login choreography.
///
/// Later `Set-Cookie` values overwrite earlier ones with the same name.
/// Serializes as a plain `{name: value}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieSet(BTreeMap<String, String>);

impl CookieSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Present with a non-empty value.
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge every `Set-Cookie` of the response into the set. A cookie the
    /// server clears (empty value, `Max-Age=0` or past expiry) is removed.
    /// Returns how many cookies were taken.
    pub fn merge_response(&mut self, response: &Response) -> usize {
        let mut merged = 0;
        for cookie in response.cookies() {
            if is_cleared(&cookie) {
                self.remove(cookie.name());
            } else {
                self.insert(cookie.name(), cookie.value());
                merged += 1;
            }
        }
        merged
    }

    pub fn extend(&mut self, other: CookieSet) {
        self.0.extend(other.0);
    }

    /// Value for an outgoing `Cookie` header, `None` when empty.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        Some(pairs.join("; "))
    }
}

fn is_cleared(cookie: &Cookie<'_>) -> bool {
    cookie.value().is_empty()
        || cookie.max_age().is_some_and(|age| age.is_zero())
        || cookie.expires().is_some_and(|at| at <= SystemTime::now())
}

impl FromIterator<(String, String)> for CookieSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
