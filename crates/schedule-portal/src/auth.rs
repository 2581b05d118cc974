//! Login choreography against the portal.
//!
//! 1. seed tracking cookies
//! 2. find-account, following up to `find_account_attempts` redirects by hand
//! 3. login page (auto redirects), scrape the anti-forgery token
//! 4. submit credentials without following the success redirect
//! 5. the auth cookie decides the outcome

use tracing::{debug, info, warn};

use crate::config::PortalConfig;
use crate::cookies::CookieSet;
use crate::error::{PortalError, Step};
use crate::extract::{extract_verification_token, VERIFICATION_TOKEN_FIELD};
use crate::http::{classify, resolve_location, with_cookies, Hop, PortalHttp};
use crate::tracking::tracking_cookies;

#[derive(Clone)]
pub struct AuthFlow {
    http: PortalHttp,
    config: PortalConfig,
}

impl AuthFlow {
    pub fn new(http: PortalHttp, config: PortalConfig) -> Self {
        Self { http, config }
    }

    /// Exchange credentials for the portal's authentication cookies.
    pub async fn login(&self, username: &str, password: &str) -> Result<CookieSet, PortalError> {
        let mut cookies = tracking_cookies();

        self.find_account(&mut cookies).await?;
        let token = self.load_login_page(username, &mut cookies).await?;
        self.submit_credentials(&token, username, password, &mut cookies)
            .await?;

        if !cookies.has_value(&self.config.auth_cookie) {
            warn!(
                "Login response did not set auth cookie {}",
                self.config.auth_cookie
            );
            return Err(PortalError::InvalidCredentials);
        }

        info!("Portal login succeeded with {} cookies", cookies.len());
        Ok(cookies)
    }

    /// Step 2. Running out of attempts is not an error; the flow continues
    /// with whatever cookies were collected.
    async fn find_account(&self, cookies: &mut CookieSet) -> Result<(), PortalError> {
        let mut url = self.http.url(&self.config.find_account_path)?;

        for attempt in 1..=self.config.find_account_attempts {
            let request = with_cookies(self.http.manual().get(url.clone()), cookies);
            let response = request.send().await?;
            cookies.merge_response(&response);

            match classify(response, Step::FindAccount)? {
                Hop::Landed(_) => {
                    debug!("find-account landed on attempt {}", attempt);
                    return Ok(());
                }
                Hop::Redirected {
                    location: Some(location),
                    ..
                } => {
                    url = resolve_location(self.http.base(), &location)?;
                    debug!("find-account redirected to {} (attempt {})", url, attempt);
                }
                Hop::Redirected { location: None, .. } => {
                    warn!("find-account redirect without Location header");
                    return Ok(());
                }
            }
        }

        debug!(
            "find-account still redirecting after {} attempts, continuing",
            self.config.find_account_attempts
        );
        Ok(())
    }

    /// Step 3. Returns the anti-forgery token, empty when the page has none.
    async fn load_login_page(
        &self,
        username: &str,
        cookies: &mut CookieSet,
    ) -> Result<String, PortalError> {
        let url = self.http.url(&self.config.login_page_path)?;
        let request = self
            .http
            .following()
            .get(url)
            .query(&[("username", username)]);
        let response = with_cookies(request, cookies).send().await?;
        cookies.merge_response(&response);

        let html = match classify(response, Step::LoginPage)? {
            Hop::Landed(response) => response.text().await?,
            hop => {
                return Err(PortalError::UnexpectedStatus {
                    step: Step::LoginPage,
                    status: hop.status(),
                });
            }
        };

        match extract_verification_token(&html) {
            Some(token) => Ok(token),
            None => {
                warn!("Login page has no {} field", VERIFICATION_TOKEN_FIELD);
                Ok(String::new())
            }
        }
    }

    /// Step 4. Both 2xx and 3xx are accepted; the portal reports success by
    /// redirecting.
    async fn submit_credentials(
        &self,
        token: &str,
        username: &str,
        password: &str,
        cookies: &mut CookieSet,
    ) -> Result<(), PortalError> {
        let url = self.http.url(&self.config.login_submit_path)?;
        let form = [
            (VERIFICATION_TOKEN_FIELD, token),
            ("Username", username),
            ("Password", password),
            ("RememberMe", "true"),
        ];

        let request = self.http.manual().post(url).form(&form);
        let response = with_cookies(request, cookies).send().await?;
        let merged = cookies.merge_response(&response);

        match classify(response, Step::SubmitCredentials)? {
            Hop::Redirected { location, .. } => {
                debug!(
                    "Credentials accepted with redirect to {:?}, {} cookies set",
                    location, merged
                );
            }
            Hop::Landed(_) => {
                debug!("Credentials submit returned 2xx, {} cookies set", merged);
            }
        }

        Ok(())
    }
}
