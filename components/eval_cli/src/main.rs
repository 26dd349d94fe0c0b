//! safe-eval
//!
//! Entry point for the expression evaluator. Parses CLI arguments,
//! configures logging from `RUST_LOG` and delegates to the Runtime.

use clap::Parser as ClapParser;
use eval_cli::{Cli, CliError, Runtime};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = Runtime::new().with_disasm(cli.disasm).with_json(cli.json);

    if cli.is_interactive() {
        if let Err(e) = runtime.repl() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let outcome = match (&cli.file, &cli.eval) {
        (Some(file), _) => runtime.execute_file(file),
        (None, Some(code)) => runtime.execute_string(code),
        (None, None) => return,
    };

    match outcome {
        Ok(value) => println!("{}", runtime.render(&value)),
        Err(CliError::Io(e)) => {
            eprintln!(
                "Error: Could not read file '{}': {}",
                cli.file.as_deref().unwrap_or_default(),
                e
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Uncaught {}", e);
            std::process::exit(1);
        }
    }
}
