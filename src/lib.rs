pub mod analyzers;
pub mod config;
pub mod error;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod series;
