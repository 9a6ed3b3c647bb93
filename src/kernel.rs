//! Process-wide state (§9 Design Notes).
//!
//! The reference source keeps all of this as global statics, each guarded
//! ad hoc. This crate is single-threaded and runs no interrupts, so there is
//! nothing for a lock to protect against; `d7os` itself only reaches for
//! `lazy_static!` + `spin::Mutex` because it is running on bare metal with
//! real concurrent interrupt handlers. Here everything collapses into one
//! `Kernel` value threaded through the scheduler and shell explicitly.

use std::path::Path;

use crate::backing_store::BackingStore;
use crate::config::{BACKING_STORE_DIR, QUANTUM};
use crate::cpu::Cpu;
use crate::error::LaunchError;
use crate::memory_manager::MemoryManager;
use crate::pcb::Pcb;
use crate::ram::Ram;
use crate::ready_queue::ReadyQueue;
use crate::shell::memory::ShellMemory;

/// Which kind of script context a stack frame represents, for `quit`'s
/// context-sensitive behavior and for bounding nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// A non-paged, recursively-read `run` file.
    Run,
    /// A paged script dispatched by the scheduler under `exec`.
    Exec,
}

/// All process-wide state: RAM, the ready queue, the memory manager, the
/// one simulated CPU, shell memory, and the bookkeeping `run`/`exec` need to
/// nest and unwind correctly.
pub struct Kernel {
    pub ram: Ram,
    pub ready_queue: ReadyQueue,
    pub memory_manager: MemoryManager,
    pub cpu: Cpu,
    pub shell_memory: ShellMemory,

    /// `false` once `quit` is invoked outside of any script context.
    pub shell_running: bool,

    /// Stack of active `run`/`exec` contexts, in call order. Bounded by
    /// `SCRIPT_STACK_DEPTH`; `quit`'s behavior depends on what's on top.
    pub script_stack: Vec<ScriptKind>,

    /// Set when a nested `run` should unwind back to its own caller.
    pub quit_running_script: bool,
    /// Set when the scheduler should stop dispatching the script currently
    /// executing.
    pub quit_executing_script: bool,
    /// `true` while a script is running under `exec`; blocks recursive
    /// `exec` calls (§6).
    pub executing_script: bool,
}

impl Kernel {
    /// Boots a fresh kernel: clears any stale backing store and starts with
    /// empty RAM and an empty ready queue.
    pub fn boot() -> std::io::Result<Self> {
        Self::boot_in(Path::new(BACKING_STORE_DIR))
    }

    /// Like [`boot`](Self::boot), but with the backing-store directory at
    /// an explicit path. Exists so tests can run concurrently without
    /// fighting over the default `BackingStore` directory in the working
    /// directory.
    pub fn boot_in(root: &Path) -> std::io::Result<Self> {
        let backing_store = BackingStore::create(root)?;
        Ok(Self {
            ram: Ram::new(),
            ready_queue: ReadyQueue::new(),
            memory_manager: MemoryManager::new(backing_store),
            cpu: Cpu::new(QUANTUM),
            shell_memory: ShellMemory::new(),
            shell_running: true,
            script_stack: Vec::new(),
            quit_running_script: false,
            quit_executing_script: false,
            executing_script: false,
        })
    }

    /// Tears the kernel down: the backing store directory is removed by
    /// `BackingStore`'s `Drop` impl when `self` goes out of scope. Returns an
    /// error code the same way `shutDown()` does in the reference source,
    /// for `main` to fold into the process exit code.
    pub fn shutdown(self) -> i32 {
        log::info!("kernel shutting down");
        0
    }

    /// Pushes a new script context, enforcing `SCRIPT_STACK_DEPTH`.
    ///
    /// On overflow, flags whichever contexts are currently active to quit
    /// (mirroring `stopAllScripts`) rather than pushing past the limit.
    pub fn push_script(&mut self, kind: ScriptKind) -> bool {
        if self.script_stack.len() >= crate::config::SCRIPT_STACK_DEPTH {
            self.stop_all_scripts();
            return false;
        }
        self.script_stack.push(kind);
        true
    }

    pub fn pop_script(&mut self) {
        self.script_stack.pop();
    }

    /// Unwinds every active script context: flags both quit flags so every
    /// nested `run`/`exec` loop notices on its next check, and wipes RAM and
    /// the ready queue, since whatever was executing can no longer be
    /// trusted to finish cleanly.
    pub fn stop_all_scripts(&mut self) {
        self.quit_running_script = true;
        self.quit_executing_script = true;
        self.ram.clear_all();
        self.ready_queue.clear();
    }

    /// Splits `path` into pages, builds its PCB, preloads up to two pages,
    /// and enqueues it.
    ///
    /// Preloading happens before enqueueing, matching the invariant the
    /// memory manager's victim search relies on: the PCB being faulted must
    /// not itself be a member of the ready queue (§4.E, §4.G). The
    /// observable outcome is the same as enqueueing first: a brand new PCB
    /// owns no frames yet, so it can neither be chosen nor excluded as a
    /// victim during its own preload.
    pub fn launch(&mut self, path: &Path) -> Result<(), LaunchError> {
        let (pid, pages_max) = self.memory_manager.paginate(path)?;
        let mut pcb = Pcb::new(pid, pages_max);

        let preload_pages = pages_max.min(2);
        for page_index in 0..preload_pages {
            self.memory_manager
                .fault(&mut self.ram, &mut self.ready_queue, &mut pcb, page_index)?;
        }

        self.ready_queue.enqueue(pcb);
        Ok(())
    }
}
