//! # Gym Lottery Backend
//!
//! Weekly lottery for a university climbing gym's limited places.
//!
//! Students register during the week for the next draw window. When the
//! configured cutoff passes (Monday 05:00, Europe/Bucharest, by default) the
//! closed window's pool is drawn once: up to 15 winners, then up to 10
//! reserves from the rest, and the pool is cleared. There is no timer; the
//! draw is triggered by whichever request first observes the closed window.
//!
//! ## Architecture
//!
//! - [`models`]: draw windows, registrants, results and the weekly schedule
//! - [`services`]: registration, the draw engine, admin and overview logic
//! - [`db`]: repository traits with in-memory and Postgres backends
//! - [`config`]: `lottery.toml` and environment configuration
//! - [`http`]: axum JSON API (feature `http-server`)

// RepositoryError carries structured context
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
