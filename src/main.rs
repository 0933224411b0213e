//! Static bundle server for the meshwave page.
//!
//! Serves the index document at `/` and everything else from the document
//! root, with color-coded request logging.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> std::process::ExitCode {
    use meshwave::{cli::Cli, colors::RequestFields, server, state::ServerConfig};
    use std::process::ExitCode;
    use tracing::{Level, error, info};

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .fmt_fields(RequestFields)
        .init();

    let args: Cli = argh::from_env();
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
        }
    };

    match server::run(ServerConfig::from(args), shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
