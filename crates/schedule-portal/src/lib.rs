//! # Schedule Portal
//!
//! Client for the third-party scheduling portal: replays the browser login
//! choreography to obtain authentication cookies, and issues the schedule
//! call with those cookies.

pub mod auth;
pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extract;
pub mod http;
pub mod schedule;
pub mod tracking;

pub use client::{Portal, PortalClient};
pub use config::PortalConfig;
pub use cookies::CookieSet;
pub use error::{PortalError, Step};
pub use schedule::UpstreamBody;
