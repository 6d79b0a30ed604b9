//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

use std::io::{self, Write};

use food_miniapp_client::AppError;
use thiserror::Error;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<askama::Error> for CliError {
    fn from(err: askama::Error) -> Self {
        Self::App(AppError::Render(err))
    }
}

impl CliError {
    /// Log the error, capturing it to Sentry when reportable.
    pub fn report(&self) {
        match self {
            Self::App(err) => err.report(),
            Self::Output(err) => tracing::error!(error = %err, "Failed to write output"),
        }
    }
}

/// Write `text` to stdout, ending with a newline.
pub fn emit(text: &str) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
