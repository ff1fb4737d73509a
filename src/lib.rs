//! Basecamp-style projects, todo lists and message boards on a WordPress REST host.
//!
//! The host platform owns every entity. This crate fetches the flat REST
//! collections, joins them into per-page view models, and dispatches the
//! create/update mutations the pages offer.
//!
//! - [`registry`]: the content types and taxonomies the host exposes.
//! - [`client`]: typed access to the host's generic REST contract.
//! - [`views`]: cross-entity assembly of the page view models.
//! - [`dispatch`]: form validation, mutations and view refresh.
//! - [`render`]: plain-text rendering of assembled pages.
//! - [`api`] and [`db`]: a local sandbox implementing the host contract.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod models;
pub mod registry;
pub mod render;
pub mod views;
