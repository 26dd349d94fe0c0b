//! REPL (Read-Eval-Print Loop) implementation

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::CliResult;
use crate::runtime::Runtime;

/// What the loop should do after a line
#[derive(Debug, PartialEq)]
enum Step {
    /// Print this text and keep reading
    Print(String),
    /// Keep reading without output
    Continue,
    /// Leave the loop
    Exit,
}

/// Run the interactive REPL until `.exit` or end of input
pub fn run_repl(runtime: &Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()?;

    println!("safe-eval {}", env!("CARGO_PKG_VERSION"));
    println!("Type an expression, or .help for commands.");

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                match handle_line(runtime, &line) {
                    Step::Print(text) => println!("{}", text),
                    Step::Continue => {}
                    Step::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Press Ctrl-D or type .exit to quit");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Evaluate one line of input or run a dot command
fn handle_line(runtime: &Runtime, line: &str) -> Step {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Step::Continue;
    }
    if trimmed.starts_with('.') {
        return handle_command(runtime, trimmed);
    }
    match runtime.execute_string(line) {
        Ok(value) => Step::Print(runtime.render(&value)),
        Err(e) => Step::Print(format!("Uncaught {}", e)),
    }
}

/// Handle special REPL commands
fn handle_command(runtime: &Runtime, command: &str) -> Step {
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    match name {
        ".exit" => Step::Exit,
        ".help" => Step::Print(
            [
                "REPL Commands:",
                "  .help           Show this help message",
                "  .disasm <expr>  Show the bytecode compiled for an expression",
                "  .exit           Exit the REPL",
            ]
            .join("\n"),
        ),
        ".disasm" => match runtime.disassemble(rest.trim()) {
            Ok(listing) => Step::Print(listing.trim_end().to_string()),
            Err(e) => Step::Print(format!("Uncaught {}", e)),
        },
        _ => Step::Print(format!(
            "Unknown command: {}\nType .help for available commands",
            name
        )),
    }
}
