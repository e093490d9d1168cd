//! Quill binary entry point.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match quill::cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            quill::ui::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
