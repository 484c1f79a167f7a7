pub mod commands;
mod logging;

pub use commands::{Cli, Commands, SearchArgs, run};
