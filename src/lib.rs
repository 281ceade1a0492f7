// src/lib.rs
//! Health reporting for Cassandra clusters.
//!
//! A [`health::Checker`] runs against a [`session::CqlSession`] supplied by the
//! host application. [`health::HealthIndicator`] and
//! [`health::ReactiveHealthIndicator`] adapt checkers to the host's health
//! endpoint and turn every failure into a `DOWN` report.
pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod session;
