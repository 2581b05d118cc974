//! HTTP plumbing shared by the login and schedule calls.
//!
//! The portal signals login success with a redirect, so a 3xx is a normal
//! outcome here and is returned as [`Hop::Redirected`] rather than an error.

use reqwest::{header, redirect, Client, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::config::PortalConfig;
use crate::cookies::CookieSet;
use crate::error::{PortalError, Step};

/// Classified upstream response.
#[derive(Debug)]
pub enum Hop {
    /// 2xx
    Landed(Response),
    /// 3xx, with the raw `Location` header if one was sent.
    Redirected {
        location: Option<String>,
        response: Response,
    },
}

impl Hop {
    pub fn status(&self) -> StatusCode {
        match self {
            Hop::Landed(response) => response.status(),
            Hop::Redirected { response, .. } => response.status(),
        }
    }
}

/// Sort a response into [`Hop`] or a step-tagged error.
pub fn classify(response: Response, step: Step) -> Result<Hop, PortalError> {
    let status = response.status();

    if status.is_success() {
        return Ok(Hop::Landed(response));
    }

    if status.is_redirection() {
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        return Ok(Hop::Redirected { location, response });
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(PortalError::Unauthorized { step });
    }

    Err(PortalError::UnexpectedStatus { step, status })
}

/// Resolve a `Location` value; relative paths join against `base`.
pub fn resolve_location(base: &Url, location: &str) -> Result<Url, PortalError> {
    Ok(base.join(location)?)
}

/// The two clients the flow needs: one that never follows redirects and one
/// that follows a bounded number of them.
#[derive(Clone)]
pub struct PortalHttp {
    base: Url,
    manual: Client,
    following: Client,
}

impl PortalHttp {
    pub fn new(config: &PortalConfig) -> Result<Self, PortalError> {
        let base = Url::parse(&config.base_url)?;

        let manual = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        let following = Client::builder()
            .redirect(redirect::Policy::limited(config.login_redirect_limit))
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base,
            manual,
            following,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for a configured path.
    pub fn url(&self, path: &str) -> Result<Url, PortalError> {
        resolve_location(&self.base, path)
    }

    /// Client that hands every 3xx back to the caller.
    pub fn manual(&self) -> &Client {
        &self.manual
    }

    /// Client that follows redirects up to the configured limit.
    pub fn following(&self) -> &Client {
        &self.following
    }
}

/// Attach the cookie set as a single `Cookie` header.
pub fn with_cookies(request: RequestBuilder, cookies: &CookieSet) -> RequestBuilder {
    match cookies.header_value() {
        Some(value) => request.header(header::COOKIE, value),
        None => request,
    }
}
