//! Portal error types

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Upstream call that produced a response or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FindAccount,
    LoginPage,
    SubmitCredentials,
    SchedulePage,
    FetchClasses,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindAccount => "find-account",
            Self::LoginPage => "login-page",
            Self::SubmitCredentials => "submit-credentials",
            Self::SchedulePage => "schedule-page",
            Self::FetchClasses => "fetch-classes",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{step} returned unexpected status {status}")]
    UnexpectedStatus { step: Step, status: StatusCode },

    #[error("{step} was rejected as unauthorized")]
    Unauthorized { step: Step },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Schedule page did not contain the embedded schedule configuration")]
    MissingScheduleContext,

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl PortalError {
    /// True when the upstream refused the cached cookies.
    pub fn is_session_rejected(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
