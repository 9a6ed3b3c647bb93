//! Process control blocks (§3, §4.C).

use std::fmt;
use std::num::NonZeroU64;

use crate::config::FRAME_COUNT;

/// Process identity, unique within a kernel session.
///
/// Stored as a `NonZeroU64` so `Option<ProcessId>` stays one word, the same
/// trick `d7abi::process::ProcessId` uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(NonZeroU64);

impl ProcessId {
    /// The first PID a kernel session ever assigns.
    pub const fn first() -> Self {
        Self(unsafe { NonZeroU64::new_unchecked(1) })
    }

    /// The next PID after this one. Only used by the PID counter itself.
    pub fn next(self) -> Self {
        Self(NonZeroU64::new(self.0.get() + 1).expect("process id overflow"))
    }

    pub const fn as_u64(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sentinel for "this page is not currently resident in any frame".
pub const NOT_RESIDENT: i32 = -1;

/// A process control block: per-script execution state, including a private
/// page table.
#[derive(Debug, Clone)]
pub struct Pcb {
    pub pid: ProcessId,
    /// Total pages the script was split into. `1 <= pages_max <= FRAME_COUNT`.
    pub pages_max: usize,
    /// `page_table[i]` is the frame holding page `i`, or [`NOT_RESIDENT`].
    pub page_table: Vec<i32>,
    /// Index of the page currently being executed, in `[0, pages_max]`.
    pub pc_page: usize,
    /// Next slot within the current page to execute, in `[0, PAGE_SIZE]`.
    pub pc_offset: usize,
}

impl Pcb {
    /// Constructs a new PCB: `pc_page = pc_offset = 0`, every page table
    /// entry [`NOT_RESIDENT`].
    pub fn new(pid: ProcessId, pages_max: usize) -> Self {
        assert!(
            (1..=FRAME_COUNT).contains(&pages_max),
            "pages_max {} out of range",
            pages_max
        );
        Self {
            pid,
            pages_max,
            page_table: vec![NOT_RESIDENT; FRAME_COUNT],
            pc_page: 0,
            pc_offset: 0,
        }
    }

    /// Frame currently backing `pc_page`, if resident.
    pub fn current_frame(&self) -> Option<usize> {
        let entry = self.page_table[self.pc_page];
        if entry == NOT_RESIDENT {
            None
        } else {
            Some(entry as usize)
        }
    }

    /// `true` if any page table entry maps to `frame`.
    pub fn owns_frame(&self, frame: usize) -> bool {
        self.page_table.iter().any(|&f| f == frame as i32)
    }

    /// Releases every frame this PCB still owns back to `ram`, clearing
    /// them to empty. Called whenever a PCB is destroyed (terminated,
    /// faulted out, or reaped by `quit`) so the frame becomes eligible for
    /// [`MemoryManager::find_free_frame`](crate::memory_manager::MemoryManager::find_free_frame)
    /// again and so [`MemoryManager::find_victim`](crate::memory_manager::MemoryManager::find_victim)
    /// never hands back a frame with no live owner (§4.C).
    pub fn release_frames(&mut self, ram: &mut crate::ram::Ram) {
        for entry in &mut self.page_table {
            if *entry != NOT_RESIDENT {
                ram.clear_frame(*entry as usize);
                *entry = NOT_RESIDENT;
            }
        }
    }
}
