//! Library crate for tagger-port-rs exposing reusable modules.
pub mod activation;
pub mod config;
pub mod orchestrator;
pub mod page;
pub mod ports;
pub mod probe;
pub mod scanner;
pub mod types;
