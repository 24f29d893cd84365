pub mod config;
pub mod equity;
pub mod model;
pub mod notice;
pub mod output;
pub mod report;
pub mod state;
