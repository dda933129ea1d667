#![doc = "The `todo_client` library crate."]
#![doc = ""]
#![doc = "Client side of the to-do list application: the REST API client, the persisted session,"]
#![doc = "the login/registration and task controllers, and the page layer that turns user events"]
#![doc = "into view updates. It is used by the `todo` binary (`main.rs`)."]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pages;
pub mod storage;
pub mod tasks;
pub mod view;

pub use crate::error::ClientError;
