//! Error types surfaced by the core subsystems.
//!
//! Mirrors the style of `d7abi::process::Error`: a plain `enum` with a
//! hand-written `Display` impl, no `thiserror`/`anyhow`.

use std::fmt;
use std::io;

/// Errors that can occur while launching a script into the paging system.
#[derive(Debug)]
pub enum LaunchError {
    /// The named script file does not exist or could not be opened.
    FileNotFound(String),
    /// Pagination produced more pages than there are frames in RAM.
    TooLarge(String),
    /// A page fault during preload found no victim frame to evict.
    NoVictim(String),
    /// An I/O error while reading the script or writing the backing store.
    Io(io::Error),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LaunchError::FileNotFound(name) => {
                write!(f, "Error: Script '{}' not found", name)
            },
            LaunchError::TooLarge(name) => write!(
                f,
                "Error: Script '{}' could not be loaded since it has more than {} instructions!",
                name,
                crate::config::RAM_SIZE
            ),
            LaunchError::NoVictim(name) => write!(
                f,
                "Error: Script '{}' could not be loaded because a victim frame could not be found!",
                name
            ),
            LaunchError::Io(e) => write!(f, "Error: {}", e),
        }
    }
}

impl From<io::Error> for LaunchError {
    fn from(e: io::Error) -> Self {
        LaunchError::Io(e)
    }
}

/// Errors the interpreter reports for malformed or disallowed commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    HelpTakesNoArgs,
    QuitTakesNoArgs,
    ClearmemTakesNoArgs,
    SetArity,
    PrintArity,
    RunArity,
    ExecArityLow,
    ExecArityHigh,
    ExecRecursion,
    RecursionDepth,
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShellError::HelpTakesNoArgs => {
                write!(f, "Error: The 'help' command cannot take parameters!")
            },
            ShellError::QuitTakesNoArgs => {
                write!(f, "Error: The 'quit' command cannot take parameters!")
            },
            ShellError::ClearmemTakesNoArgs => {
                write!(f, "Error: The 'clearmem' command cannot take parameters!")
            },
            ShellError::SetArity => {
                write!(f, "Error: The 'set' command must take exactly two parameters!")
            },
            ShellError::PrintArity => {
                write!(f, "Error: The 'print' command must take exactly one parameter!")
            },
            ShellError::RunArity => {
                write!(f, "Error: The 'run' command must take exactly one parameter!")
            },
            ShellError::ExecArityLow => {
                write!(f, "Error: The 'exec' command must take at least one parameter!")
            },
            ShellError::ExecArityHigh => write!(
                f,
                "Error: The 'exec' command cannot take more than three parameters!"
            ),
            ShellError::ExecRecursion => {
                write!(f, "Error: Recursive 'exec' calls are not supported!")
            },
            ShellError::RecursionDepth => write!(
                f,
                "Error: Maximum recursion depth ({}) reached",
                crate::config::SCRIPT_STACK_DEPTH
            ),
        }
    }
}
