//! Sleeper module - read-only client for the Sleeper fantasy API

pub mod messages;
pub mod rest;

pub use rest::SleeperRestClient;
