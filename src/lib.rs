//! Synthetic email dataset generation: prompt a local model, parse its output
//! into SUBJECT / BODY / TONE / INTENT records, drop duplicate bodies, and
//! append the rest to a resumable CSV table.

pub mod backend;
pub mod config;
pub mod dedupe;
pub mod export;
pub mod generator;
pub mod journal;
pub mod logging;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod relabel;
pub mod stop;
pub mod table;
