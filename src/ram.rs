//! Simulated RAM: a fixed array of `FRAME_COUNT * PAGE_SIZE` instruction
//! slots (§3, §4.B).

use crate::config::{FRAME_COUNT, PAGE_SIZE, RAM_SIZE};

/// Fixed-size RAM. A slot is either empty (`None`) or holds one instruction
/// line (`Some(String)`).
#[derive(Debug)]
pub struct Ram {
    slots: Vec<Option<String>>,
}

impl Ram {
    /// Boots RAM zero-filled (i.e. every slot empty).
    pub fn new() -> Self {
        Self {
            slots: vec![None; RAM_SIZE],
        }
    }

    pub fn slot_get(&self, index: usize) -> Option<&str> {
        self.slots[index].as_deref()
    }

    pub fn slot_set(&mut self, index: usize, line: String) {
        self.slots[index] = Some(line);
    }

    pub fn slot_clear(&mut self, index: usize) {
        self.slots[index] = None;
    }

    /// Resets every slot to empty.
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// `true` if the frame's first slot is empty, i.e. the frame is free.
    pub fn frame_is_free(&self, frame: usize) -> bool {
        self.slot_get(frame * PAGE_SIZE).is_none()
    }

    /// Clears every slot belonging to `frame`.
    pub fn clear_frame(&mut self, frame: usize) {
        for s in 0..PAGE_SIZE {
            self.slot_clear(frame * PAGE_SIZE + s);
        }
    }

    /// Writes `lines` into `frame`, clearing any trailing slots the page
    /// didn't fill.
    pub fn load_frame(&mut self, frame: usize, lines: &[String]) {
        for s in 0..PAGE_SIZE {
            match lines.get(s) {
                Some(line) => self.slot_set(frame * PAGE_SIZE + s, line.clone()),
                None => self.slot_clear(frame * PAGE_SIZE + s),
            }
        }
    }

    pub fn frame_count(&self) -> usize {
        FRAME_COUNT
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boots_zero_filled() {
        let ram = Ram::new();
        for i in 0..RAM_SIZE {
            assert!(ram.slot_get(i).is_none());
        }
    }

    #[test]
    fn load_frame_clears_unfilled_tail() {
        let mut ram = Ram::new();
        ram.load_frame(0, &["A\n".to_string(), "B\n".to_string()]);
        assert_eq!(ram.slot_get(0), Some("A\n"));
        assert_eq!(ram.slot_get(1), Some("B\n"));
        assert!(ram.slot_get(2).is_none());
        assert!(ram.slot_get(3).is_none());
    }

    #[test]
    fn frame_is_free_checks_first_slot_only() {
        let mut ram = Ram::new();
        assert!(ram.frame_is_free(1));
        ram.slot_set(4, "X\n".to_string());
        assert!(!ram.frame_is_free(1));
    }

    #[test]
    fn clear_all_empties_every_slot() {
        let mut ram = Ram::new();
        ram.load_frame(2, &["A\n".to_string()]);
        ram.clear_all();
        for i in 0..RAM_SIZE {
            assert!(ram.slot_get(i).is_none());
        }
    }
}
