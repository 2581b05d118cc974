use async_trait::async_trait;
use chrono::NaiveDate;

use crate::auth::AuthFlow;
use crate::config::PortalConfig;
use crate::cookies::CookieSet;
use crate::error::PortalError;
use crate::http::PortalHttp;
use crate::schedule::{ScheduleProxy, UpstreamBody};

/// Operations the proxy server needs from the portal.
#[async_trait]
pub trait Portal: Send + Sync {
    /// Run the login choreography. `InvalidCredentials` when the auth cookie
    /// never appears.
    async fn login(&self, username: &str, password: &str) -> Result<CookieSet, PortalError>;

    /// Fetch the class list for `date` with previously obtained cookies.
    async fn fetch_classes(
        &self,
        cookies: &CookieSet,
        date: NaiveDate,
    ) -> Result<UpstreamBody, PortalError>;
}

#[derive(Clone)]
pub struct PortalClient {
    auth: AuthFlow,
    schedule: ScheduleProxy,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self, PortalError> {
        let http = PortalHttp::new(&config)?;
        Ok(Self {
            auth: AuthFlow::new(http.clone(), config.clone()),
            schedule: ScheduleProxy::new(http, config),
        })
    }
}

#[async_trait]
impl Portal for PortalClient {
    async fn login(&self, username: &str, password: &str) -> Result<CookieSet, PortalError> {
        self.auth.login(username, password).await
    }

    async fn fetch_classes(
        &self,
        cookies: &CookieSet,
        date: NaiveDate,
    ) -> Result<UpstreamBody, PortalError> {
        self.schedule.fetch_classes(cookies, date).await
    }
}
