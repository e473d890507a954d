pub mod app;
pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod identifier;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod similarity;
