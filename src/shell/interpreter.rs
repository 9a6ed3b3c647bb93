//! Interpreter dispatch (§6, §7): turns one line of text into a side effect.
//!
//! Shared by three callers: the interactive shell loop, `run`'s non-paged
//! file reader, and the scheduler's per-instruction dispatch inside `exec`.
//! All three just hand a line to [`dispatch_line`] and check the kernel's
//! quit flags afterward — the same flat structure `interpreter.c` uses.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LaunchError, ShellError};
use crate::kernel::{Kernel, ScriptKind};
use crate::scheduler;

/// Tokenizes and dispatches a single line. Blank lines (after trimming) are
/// ignored.
pub fn dispatch_line(kernel: &mut Kernel, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let (cmd, args) = words.split_first().expect("non-empty after trim");

    match *cmd {
        "help" => cmd_help(args),
        "quit" => cmd_quit(kernel, args),
        "clearmem" => cmd_clearmem(kernel, args),
        "set" => cmd_set(kernel, args),
        "print" => cmd_print(kernel, args),
        "run" => cmd_run(kernel, args),
        "exec" => cmd_exec(kernel, args),
        other => println!("Error: Unknown command '{}'", other),
    }
}

fn cmd_help(args: &[&str]) {
    if !args.is_empty() {
        println!("{}", ShellError::HelpTakesNoArgs);
        return;
    }
    println!("help\t\t\t\tDisplays all available commands");
    println!("quit\t\t\t\tExits the shell or the script with \"Bye!\"");
    println!("clearmem\t\t\tClears the shell memory");
    println!("set VAR STRING\t\t\tAssigns STRING to variable VAR in shell memory");
    println!("print VAR\t\t\tDisplays the value assigned to variable VAR");
    println!("run SCRIPT.TXT\t\t\tExecutes the file SCRIPT.TXT");
    println!("exec S1.TXT S2.TXT S3.TXT\tExecutes up to three files concurrently");
}

fn cmd_quit(kernel: &mut Kernel, args: &[&str]) {
    if !args.is_empty() {
        println!("{}", ShellError::QuitTakesNoArgs);
        return;
    }
    println!("Bye!");
    match kernel.script_stack.last() {
        Some(ScriptKind::Run) => kernel.quit_running_script = true,
        Some(ScriptKind::Exec) => kernel.quit_executing_script = true,
        None => kernel.shell_running = false,
    }
}

fn cmd_clearmem(kernel: &mut Kernel, args: &[&str]) {
    if !args.is_empty() {
        println!("{}", ShellError::ClearmemTakesNoArgs);
        return;
    }
    kernel.shell_memory.clear();
    println!("Shell memory cleared!");
}

fn cmd_set(kernel: &mut Kernel, args: &[&str]) {
    if args.len() != 2 {
        println!("{}", ShellError::SetArity);
        return;
    }
    kernel.shell_memory.set(args[0], args[1]);
}

fn cmd_print(kernel: &mut Kernel, args: &[&str]) {
    if args.len() != 1 {
        println!("{}", ShellError::PrintArity);
        return;
    }
    let value = kernel.shell_memory.get(args[0]);
    if value.is_empty() {
        println!("Error: Variable '{}' not found", args[0]);
    } else {
        println!("{}", value);
    }
}

fn cmd_run(kernel: &mut Kernel, args: &[&str]) {
    if args.len() != 1 {
        println!("{}", ShellError::RunArity);
        return;
    }
    if !kernel.push_script(ScriptKind::Run) {
        println!("{}", ShellError::RecursionDepth);
        return;
    }
    run_file(kernel, args[0]);
    kernel.pop_script();
}

/// Reads `path` line by line, dispatching each one exactly like the shell
/// prompt would — unbounded by pages, since `run` is explicitly non-paged
/// (§4, external interfaces).
fn run_file(kernel: &mut Kernel, path: &str) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => {
            println!("Error: script '{}' not found", path);
            return;
        },
    };
    let mut reader = BufReader::new(file);
    loop {
        let mut buf = String::new();
        let read = match reader.read_line(&mut buf) {
            Ok(n) => n,
            Err(_) => break,
        };
        if read == 0 {
            break;
        }
        dispatch_line(kernel, &buf);
        if kernel.quit_running_script {
            kernel.quit_running_script = false;
            break;
        }
    }
}

fn cmd_exec(kernel: &mut Kernel, args: &[&str]) {
    if args.is_empty() {
        println!("{}", ShellError::ExecArityLow);
        return;
    }
    if args.len() > 3 {
        println!("{}", ShellError::ExecArityHigh);
        return;
    }
    if kernel.executing_script {
        println!("{}", ShellError::ExecRecursion);
        return;
    }
    if !kernel.push_script(ScriptKind::Exec) {
        println!("{}", ShellError::RecursionDepth);
        return;
    }
    kernel.executing_script = true;

    // All named scripts are checked for existence before any of them is
    // loaded, so a later missing file never leaves earlier ones half-paged.
    for name in args {
        if !Path::new(name).exists() {
            println!("{}", LaunchError::FileNotFound((*name).to_string()));
            kernel.ram.clear_all();
            kernel.ready_queue.clear();
            kernel.executing_script = false;
            kernel.pop_script();
            return;
        }
    }

    for name in args {
        if let Err(e) = kernel.launch(Path::new(name)) {
            println!("{}", e);
            kernel.ram.clear_all();
            kernel.ready_queue.clear();
            kernel.executing_script = false;
            kernel.pop_script();
            return;
        }
    }

    scheduler::run(kernel);

    kernel.ram.clear_all();
    kernel.ready_queue.clear();
    kernel.executing_script = false;
    kernel.pop_script();
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test boots into its own temporary backing-store directory so
    // parallel test threads don't fight over the default `BackingStore`
    // path in the working directory.
    fn boot() -> (Kernel, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let kernel = Kernel::boot_in(&dir.path().join("BackingStore")).unwrap();
        (kernel, dir)
    }

    #[test]
    fn set_and_print_round_trip() {
        let (mut kernel, _dir) = boot();
        cmd_set(&mut kernel, &["x", "10"]);
        assert_eq!(kernel.shell_memory.get("x"), "10");
    }

    #[test]
    fn quit_outside_any_script_stops_the_shell() {
        let (mut kernel, _dir) = boot();
        cmd_quit(&mut kernel, &[]);
        assert!(!kernel.shell_running);
    }

    #[test]
    fn quit_inside_run_sets_quit_running_script() {
        let (mut kernel, _dir) = boot();
        kernel.push_script(ScriptKind::Run);
        cmd_quit(&mut kernel, &[]);
        assert!(kernel.quit_running_script);
        assert!(kernel.shell_running);
    }

    #[test]
    fn exec_with_too_many_args_is_rejected() {
        let (mut kernel, _dir) = boot();
        cmd_exec(&mut kernel, &["a", "b", "c", "d"]);
        assert!(kernel.ready_queue.is_empty());
    }

    #[test]
    fn nested_exec_is_rejected() {
        let (mut kernel, _dir) = boot();
        kernel.executing_script = true;
        cmd_exec(&mut kernel, &["anything.txt"]);
        assert!(kernel.ready_queue.is_empty());
    }
}
