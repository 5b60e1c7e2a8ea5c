// src/main.rs

use detect_runner::{cli, logging, report, run};

#[tokio::main]
async fn main() {
    logging::init_logging().unwrap_or_else(|e| eprintln!("detect-runner: {e:#}"));

    let args = cli::parse();
    match run(args).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("detect-runner error: {err}");
            std::process::exit(report::exit_code_for_error(&err));
        }
    }
}
