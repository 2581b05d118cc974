pub mod health;
pub mod login;
pub mod schedule;
pub mod session;
