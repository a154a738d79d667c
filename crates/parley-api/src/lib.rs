//! HTTP front end for Parley.
//!
//! Prompts are submitted as jobs and their results polled later; see
//! [`app::build_router`] for the route table.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
