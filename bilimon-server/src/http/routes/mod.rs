//! Route handlers organized by resource

pub mod health;
pub mod videos;
pub mod cookies;
pub mod monitor;
pub mod run;
pub mod connector;
