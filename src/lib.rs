pub mod baseline;
pub mod config;
pub mod error;
pub mod filename;
pub mod frame;
pub mod horizon;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod rank;
pub mod selector;
pub mod table;
