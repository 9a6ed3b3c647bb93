//! The simulated CPU (§3, §4.F): a tiny register set and a fetch step that
//! the scheduler drives one instruction at a time.

use crate::config::{FRAME_COUNT, PAGE_SIZE};
use crate::ram::Ram;

/// What fetching the next instruction produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Fetch {
    /// An instruction line, ready to dispatch.
    Instruction(String),
    /// The current frame has nothing left to offer: `offset` reached
    /// `PAGE_SIZE`, or the slot at `offset` is empty.
    ///
    /// Deliberately decoupled from any "this line looks like EOF" content
    /// sniffing (missing trailing newline, blank line) — the reference
    /// source conflates the two and ends up declaring end-of-frame on every
    /// full page's last instruction, since it also strips that line's
    /// newline when writing it (§9c). Emptiness of the *next* slot is the
    /// only signal used here.
    EndOfFrame,
    /// The register state itself is invalid (`ip` out of range, or `offset`
    /// past `PAGE_SIZE`). Distinct from `EndOfFrame`: this means the
    /// scheduler handed the CPU a corrupt context, not that a page legitimately
    /// ran out of instructions.
    Error,
}

/// `(IP, offset, IR, quantum)` — the whole of the simulated machine state
/// (§3). There is exactly one `Cpu`; the scheduler reloads `ip`/`offset` from
/// a PCB before each quantum and writes them back after.
#[derive(Debug)]
pub struct Cpu {
    /// Frame number currently mapped as the instruction pointer.
    pub ip: i32,
    /// Slot offset within that frame, in `[0, PAGE_SIZE]`.
    pub offset: usize,
    /// Most recently fetched instruction text.
    pub ir: String,
    /// Instructions dispatched per quantum.
    pub quantum: usize,
}

impl Cpu {
    pub fn new(quantum: usize) -> Self {
        Self {
            ip: -1,
            offset: 0,
            ir: String::new(),
            quantum,
        }
    }

    /// Loads the CPU's IP/offset from a PCB's saved program counter ahead of
    /// a quantum.
    pub fn load_context(&mut self, frame: usize, offset: usize) {
        self.ip = frame as i32;
        self.offset = offset;
    }

    /// Reads the instruction at the current `(ip, offset)` without advancing
    /// anything. Call [`advance`](Self::advance) after dispatching it.
    pub fn fetch(&self, ram: &Ram) -> Fetch {
        if self.ip < 0 || self.ip as usize >= FRAME_COUNT || self.offset > PAGE_SIZE {
            return Fetch::Error;
        }
        if self.offset == PAGE_SIZE {
            return Fetch::EndOfFrame;
        }
        let index = self.ip as usize * PAGE_SIZE + self.offset;
        match ram.slot_get(index) {
            Some(line) => {
                Fetch::Instruction(line.to_string())
            },
            None => Fetch::EndOfFrame,
        }
    }

    /// Advances past the instruction just fetched.
    pub fn advance(&mut self) {
        self.offset += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_returns_instruction_then_end_of_frame() {
        let mut ram = Ram::new();
        ram.load_frame(0, &["A\n".to_string()]);
        let mut cpu = Cpu::new(2);
        cpu.load_context(0, 0);
        assert_eq!(cpu.fetch(&ram), Fetch::Instruction("A\n".to_string()));
        cpu.advance();
        assert_eq!(cpu.fetch(&ram), Fetch::EndOfFrame);
    }

    #[test]
    fn fetch_errors_on_invalid_ip() {
        let ram = Ram::new();
        let mut cpu = Cpu::new(2);
        cpu.load_context(0, 0);
        cpu.ip = -1;
        assert_eq!(cpu.fetch(&ram), Fetch::Error);
    }

    #[test]
    fn fetch_end_of_frame_at_offset_equal_page_size() {
        let ram = Ram::new();
        let mut cpu = Cpu::new(2);
        cpu.load_context(0, crate::config::PAGE_SIZE);
        assert_eq!(cpu.fetch(&ram), Fetch::EndOfFrame);
    }
}
