pub mod cli;
pub mod config;
pub mod gemini;
pub mod github;
pub mod load_config;

pub use cli::{run, Cli};
