//! Command line arguments

use clap::Parser as ClapParser;

/// Evaluate expressions against a sandboxed environment
#[derive(Debug, ClapParser)]
#[command(name = "safe-eval", version)]
pub struct Cli {
    /// Evaluate inline source
    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    pub eval: Option<String>,

    /// Evaluate the contents of a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<String>,

    /// Print the compiled bytecode before evaluating
    #[arg(short, long)]
    pub disasm: bool,

    /// Print the result as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl Cli {
    /// True when neither `--eval` nor `--file` was given
    pub fn is_interactive(&self) -> bool {
        self.eval.is_none() && self.file.is_none()
    }
}
