//! The interactive shell (§3, §5): reads lines from stdin and hands each to
//! [`interpreter::dispatch_line`] until `quit` (or EOF) stops it.

pub mod interpreter;
pub mod memory;

use std::io::{self, BufRead, Write};

use crate::kernel::Kernel;

const PROMPT: &str = "$ ";

/// Runs the read-eval loop to completion. Returns once `quit` has been
/// issued outside of any script, or stdin is exhausted — the same thing a
/// redirected `mysh < script.txt` invocation relies on to terminate
/// gracefully rather than hanging on a prompt no one will answer.
pub fn run(kernel: &mut Kernel) {
    println!("Shell version 1.0 loaded!");
    println!("Enter 'help' to display all available commands");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while kernel.shell_running {
        print!("{}", PROMPT);
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                log::warn!("stdin read error: {}", e);
                break;
            },
            None => break, // EOF: redirected input ran out.
        };

        interpreter::dispatch_line(kernel, &line);
    }
}
