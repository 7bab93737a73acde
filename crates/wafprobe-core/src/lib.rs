pub mod config;
pub mod logging;

pub mod outcome;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod search;
