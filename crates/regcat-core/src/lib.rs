pub mod config;
pub mod error;
pub mod logging;

// Core: pagination, completion-ordered partial results, windowed fan-out.
pub mod fanout;
pub mod pager;
pub mod partial;

// Registry transport and the catalog operations built on it.
pub mod catalog;
pub mod registry;

pub use error::TransportError;
