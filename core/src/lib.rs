//! Mission Control core: API client, session gate, polling and page state
//! for the agent fleet dashboard.

pub mod actions;
pub mod api;
pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod poll;
pub mod routes;
pub mod session;
pub mod view;
