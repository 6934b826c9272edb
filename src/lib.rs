//! Core of a single-page personal blog: post/comment/contact storage,
//! hash routing, markdown-lite rendering and the event-driven controller.

pub mod app;
pub mod boot;
pub mod cli;
pub mod config;
pub mod content;
pub mod db;
pub mod fetch;
pub mod models;
pub mod render;
pub mod router;
pub mod store;
