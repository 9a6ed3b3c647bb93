//! The paging memory manager (§4.E): pagination, frame allocation, victim
//! selection, page-in, and page-table maintenance.

use std::fs;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::backing_store::BackingStore;
use crate::config::{FRAME_COUNT, INSTRUCTION_SIZE, PAGE_SIZE};
use crate::error::LaunchError;
use crate::pcb::{Pcb, ProcessId, NOT_RESIDENT};
use crate::ram::Ram;
use crate::ready_queue::ReadyQueue;

/// Owns the backing store, the PID counter, and the entropy source used for
/// victim selection.
///
/// Seeded the way `d7os::random` seeds its kernel-wide RNG (a `SmallRng`
/// behind `SeedableRng`), but drawn from the host's own entropy rather than
/// `rdtsc`, since this runs as an ordinary process.
pub struct MemoryManager {
    backing_store: BackingStore,
    rng: SmallRng,
    next_pid: ProcessId,
}

impl MemoryManager {
    pub fn new(backing_store: BackingStore) -> Self {
        Self {
            backing_store,
            rng: SmallRng::from_entropy(),
            next_pid: ProcessId::first(),
        }
    }

    fn allocate_pid(&mut self) -> ProcessId {
        let pid = self.next_pid;
        self.next_pid = self.next_pid.next();
        pid
    }

    /// Splits `path` into pages under a freshly allocated PID, writing them
    /// to the backing store. Returns the PID and the derived `pages_max`.
    pub fn paginate(&mut self, path: &Path) -> Result<(ProcessId, usize), LaunchError> {
        let name = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LaunchError::FileNotFound(name.clone())
            } else {
                LaunchError::Io(e)
            }
        })?;

        let lines = split_lines_keep_terminators(&content, INSTRUCTION_SIZE);

        // Reproduces `countTotalPages`'s quirk: a zero-byte file is still
        // counted as holding one line, because the C loop's `beforeEOF`
        // starts `!= '\n'` even when nothing is ever read. See REDESIGN
        // FLAGS (d) in SPEC_FULL.md — this project matches it rather than
        // "fixing" it, since nothing downstream depends on the distinction.
        let line_count_for_paging = if lines.is_empty() { 1 } else { lines.len() };
        let pages_max = (line_count_for_paging + PAGE_SIZE - 1) / PAGE_SIZE;

        if pages_max > FRAME_COUNT {
            return Err(LaunchError::TooLarge(name));
        }

        let pid = self.allocate_pid();

        let mut chunks: Vec<Vec<String>> =
            lines.chunks(PAGE_SIZE).map(|c| c.to_vec()).collect();
        while chunks.len() < pages_max {
            chunks.push(Vec::new());
        }

        for (page_index, chunk) in chunks.iter().enumerate() {
            self.backing_store.write_page(pid, page_index, chunk)?;
        }

        Ok((pid, pages_max))
    }

    /// First-fit scan for a frame whose first slot is empty.
    pub fn find_free_frame(&self, ram: &Ram) -> Option<usize> {
        (0..FRAME_COUNT).find(|&f| ram.frame_is_free(f))
    }

    /// Picks a frame not owned by `pcb` to evict.
    ///
    /// Seeds a uniformly random candidate, then probes forward
    /// (`v = ((v % F) + 1) % F`) until landing on a frame `pcb` doesn't own.
    /// Bounded to `FRAME_COUNT + 1` probes so a PCB that already owns every
    /// frame (`pages_max == FRAME_COUNT`, fully resident) fails cleanly
    /// instead of looping forever — the guard the reference source is
    /// missing (§9b).
    pub fn find_victim(&mut self, pcb: &Pcb) -> Option<usize> {
        let f = FRAME_COUNT;
        let mut v = self.rng.gen_range(0..f);
        for _ in 0..=f {
            v = ((v % f) + 1) % f;
            if !pcb.owns_frame(v) {
                return Some(v);
            }
        }
        None
    }

    /// Reads `"<PID>.<page_index>.txt"` into `frame`.
    pub fn load_page(
        &self, ram: &mut Ram, pid: ProcessId, page_index: usize, frame: usize,
    ) -> Result<(), LaunchError> {
        let lines = self.backing_store.read_page(pid, page_index)?;
        ram.load_frame(frame, &lines);
        Ok(())
    }

    /// Clears `frame` from whichever other live PCB owns it, then records
    /// `frame` as holding `page_index` for `pcb`.
    fn update_page_table(
        &self, ready_queue: &mut ReadyQueue, pcb: &mut Pcb, page_index: usize, frame: usize,
        is_victim: bool,
    ) {
        if is_victim {
            let owner = ready_queue
                .iter_mut()
                .find(|q| q.owns_frame(frame))
                .expect("victim frame has no owner: page-table invariant violated");
            let victim_page = owner
                .page_table
                .iter()
                .position(|&f| f == frame as i32)
                .unwrap();
            owner.page_table[victim_page] = NOT_RESIDENT;
        }
        pcb.page_table[page_index] = frame as i32;
    }

    /// Services a page fault for `pcb`: finds a free or victim frame, loads
    /// the page, and updates page tables.
    ///
    /// `pcb` must not currently be a member of `ready_queue` (the scheduler
    /// always dequeues before faulting its running PCB, and the launcher
    /// faults before enqueueing) — this is what gives the self-exclusion
    /// guarantee in [`find_victim`](Self::find_victim) its meaning: a
    /// process can never evict itself mid-page (§4.G).
    pub fn fault(
        &mut self, ram: &mut Ram, ready_queue: &mut ReadyQueue, pcb: &mut Pcb, page_index: usize,
    ) -> Result<(), LaunchError> {
        let (frame, is_victim) = match self.find_free_frame(ram) {
            Some(f) => (f, false),
            None => match self.find_victim(pcb) {
                Some(f) => (f, true),
                None => {
                    return Err(LaunchError::NoVictim(pcb.pid.to_string()));
                },
            },
        };

        log::debug!(
            "pid {}: loading page {} into frame {} (victim={})",
            pcb.pid,
            page_index,
            frame,
            is_victim
        );

        self.load_page(ram, pcb.pid, page_index, frame)?;
        self.update_page_table(ready_queue, pcb, page_index, frame, is_victim);
        Ok(())
    }
}

/// Splits `content` into lines, each keeping its trailing `\n` except
/// possibly the last (if the file didn't end with one). A zero-byte input
/// yields zero lines. Each line is truncated to `max_len` characters, since
/// instructions are bounded to `L` characters (§3).
fn split_lines_keep_terminators(content: &str, max_len: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            lines.push(truncate(&content[start..=i], max_len));
            start = i + 1;
        }
    }
    if start < content.len() {
        lines.push(truncate(&content[start..], max_len));
    }
    lines
}

fn truncate(line: &str, max_len: usize) -> String {
    if line.len() <= max_len {
        line.to_string()
    } else {
        line[..max_len].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mm() -> (MemoryManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = BackingStore::create(dir.path().join("BackingStore")).unwrap();
        (MemoryManager::new(store), dir)
    }

    #[test]
    fn paginate_three_line_file_is_one_page() {
        let (mut mm, dir) = mm();
        let script = dir.path().join("a.txt");
        fs::write(&script, "A\nB\nC\n").unwrap();
        let (_, pages_max) = mm.paginate(&script).unwrap();
        assert_eq!(pages_max, 1);
    }

    #[test]
    fn paginate_six_line_file_is_two_pages() {
        let (mut mm, dir) = mm();
        let script = dir.path().join("x.txt");
        fs::write(&script, "1\n2\n3\n4\n5\n6\n").unwrap();
        let (_, pages_max) = mm.paginate(&script).unwrap();
        assert_eq!(pages_max, 2);
    }

    #[test]
    fn paginate_missing_file_is_not_found() {
        let (mut mm, dir) = mm();
        let missing = dir.path().join("nope.txt");
        match mm.paginate(&missing) {
            Err(LaunchError::FileNotFound(_)) => {},
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn paginate_too_large_file_is_rejected() {
        let (mut mm, dir) = mm();
        let script = dir.path().join("huge.txt");
        let content: String = (0..(FRAME_COUNT * PAGE_SIZE + 1))
            .map(|i| format!("line{}\n", i))
            .collect();
        fs::write(&script, content).unwrap();
        match mm.paginate(&script) {
            Err(LaunchError::TooLarge(_)) => {},
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn empty_file_paginates_to_a_single_empty_page() {
        let (mut mm, dir) = mm();
        let script = dir.path().join("empty.txt");
        fs::write(&script, "").unwrap();
        let (pid, pages_max) = mm.paginate(&script).unwrap();
        assert_eq!(pages_max, 1);
        let lines = mm.backing_store.read_page(pid, 0).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn find_free_frame_is_first_fit() {
        let (mm, _dir) = mm();
        let mut ram = Ram::new();
        ram.load_frame(0, &["A\n".to_string()]);
        assert_eq!(mm.find_free_frame(&ram), Some(1));
    }

    #[test]
    fn find_victim_excludes_callers_own_frames() {
        let (mut mm, _dir) = mm();
        let mut pcb = Pcb::new(ProcessId::first(), FRAME_COUNT - 1);
        for i in 0..FRAME_COUNT - 1 {
            pcb.page_table[i] = i as i32;
        }
        // pcb owns every frame except the last one.
        let victim = mm.find_victim(&pcb);
        assert_eq!(victim, Some(FRAME_COUNT - 1));
    }

    #[test]
    fn find_victim_fails_when_caller_owns_every_frame() {
        let (mut mm, _dir) = mm();
        let mut pcb = Pcb::new(ProcessId::first(), FRAME_COUNT);
        for i in 0..FRAME_COUNT {
            pcb.page_table[i] = i as i32;
        }
        assert_eq!(mm.find_victim(&pcb), None);
    }
}
