//! Command-line interface of `pytrace-probes`

mod args;

pub use args::{Args, Command};
