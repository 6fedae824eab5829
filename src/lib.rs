#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod aggregator;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod handler;
pub mod healthcheck;
pub mod port;
pub mod report;
pub mod resolver;
pub mod scorer;

pub use healthcheck::healthcheck_with_port;
