//! Naive Bayes match prediction and train fare statistics.

pub mod app;
pub mod bayes;
pub mod cli;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;
pub mod tickets;
