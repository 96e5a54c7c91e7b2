//! Error types for the terminal host.
//!
//! The simulation itself never fails; these cover start-up and terminal I/O.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A command-line setting is out of range
    #[error("invalid setting {name}: {value}")]
    InvalidSetting {
        /// Setting name as given on the command line
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Terminal or log file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tracing subscriber could not be installed
    #[error("logging setup failed: {0}")]
    Logging(String),
}
