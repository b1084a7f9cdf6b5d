use clap::Parser;
use html2png::{load_config, setup_logging, Cli, CliRunner, ErrorSeverity, RenderError, USAGE};
use tracing::{debug, error, warn};

#[tokio::main]
async fn main() {
    // Parse CLI arguments; usage errors exit with 1, --help/--version with 0
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    if let Err(e) = setup_logging(args.verbose) {
        eprintln!("Failed to set up logging: {e}");
    }

    debug!("Starting html2png v{}", env!("CARGO_PKG_VERSION"));

    let runner = match load_config(&args)
        .await
        .and_then(|config| CliRunner::new(config, &args))
    {
        Ok(runner) => runner,
        Err(e) => fail(e),
    };

    match runner.run().await {
        Ok(report) => println!("{}", report.message()),
        Err(e) => fail(e),
    }
}

fn fail(e: RenderError) -> ! {
    match e.severity() {
        ErrorSeverity::Critical | ErrorSeverity::High => error!("Conversion failed: {}", e),
        ErrorSeverity::Medium | ErrorSeverity::Low => warn!("Conversion aborted: {}", e),
    }

    eprintln!("Error: {e}");
    if e.is_usage() {
        eprintln!("{USAGE}");
    }
    std::process::exit(e.exit_code());
}
