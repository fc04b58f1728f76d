use certpulse::{cli, error, tls};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tls::ensure_crypto_provider();

    match cli::start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(error::exit_code(&e))
        }
    }
}
