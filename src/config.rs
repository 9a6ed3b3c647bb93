//! Tunable constants shared by every subsystem.
//!
//! The reference source scatters these as per-file `enum { ... }` blocks
//! (`cpu.h`, `pcb.h`, `shellmemory.c`, `interpreter.c`). Gathering them here
//! makes the whole tunable surface visible at a glance.

/// Maximum length of a single instruction line, in characters.
pub const INSTRUCTION_SIZE: usize = 1000;

/// Instructions per page (equivalently, slots per frame).
pub const PAGE_SIZE: usize = 4;

/// Total instruction slots in RAM.
pub const RAM_SIZE: usize = 40;

/// Number of frames in RAM (`RAM_SIZE / PAGE_SIZE`).
pub const FRAME_COUNT: usize = RAM_SIZE / PAGE_SIZE;

/// Instructions dispatched per scheduler quantum.
pub const QUANTUM: usize = 2;

/// Maximum depth of the script call stack (nested `run`/`exec`).
pub const SCRIPT_STACK_DEPTH: usize = 200;

/// Number of variables the shell memory can hold.
pub const SHELL_MEMORY_CAPACITY: usize = 1000;

/// Name of the backing-store directory, relative to the working directory.
pub const BACKING_STORE_DIR: &str = "BackingStore";
