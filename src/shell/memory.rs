//! Flat `VAR -> STRING` shell memory (§3, external interface "Shell
//! Memory"). Grounded on `shellmemory.c`: a fixed-capacity array of pairs,
//! linear-scanned on every lookup, silently refusing new keys once full.

use crate::config::SHELL_MEMORY_CAPACITY;

#[derive(Debug, Default)]
pub struct ShellMemory {
    vars: Vec<(String, String)>,
}

impl ShellMemory {
    pub fn new() -> Self {
        Self {
            vars: Vec::with_capacity(SHELL_MEMORY_CAPACITY),
        }
    }

    /// Sets `var` to `value`, overwriting any existing binding. A no-op if
    /// `var` is new and the store is already at capacity — the reference
    /// source drops the write silently rather than erroring, and nothing in
    /// the interpreter surfaces that failure either.
    pub fn set(&mut self, var: &str, value: &str) {
        if let Some(slot) = self.vars.iter_mut().find(|(k, _)| k == var) {
            slot.1 = value.to_string();
            return;
        }
        if self.vars.len() >= SHELL_MEMORY_CAPACITY {
            return;
        }
        self.vars.push((var.to_string(), value.to_string()));
    }

    /// Looks up `var`. Absent variables resolve to the empty string, matching
    /// `ValueOfVar`'s fallback.
    pub fn get(&self, var: &str) -> &str {
        self.vars
            .iter()
            .find(|(k, _)| k == var)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut mem = ShellMemory::new();
        mem.set("x", "10");
        assert_eq!(mem.get("x"), "10");
    }

    #[test]
    fn missing_var_is_empty_string() {
        let mem = ShellMemory::new();
        assert_eq!(mem.get("nope"), "");
    }

    #[test]
    fn set_overwrites_existing_binding() {
        let mut mem = ShellMemory::new();
        mem.set("x", "1");
        mem.set("x", "2");
        assert_eq!(mem.get("x"), "2");
    }

    #[test]
    fn clear_empties_store() {
        let mut mem = ShellMemory::new();
        mem.set("x", "1");
        mem.clear();
        assert_eq!(mem.get("x"), "");
    }

    #[test]
    fn full_store_silently_rejects_new_vars() {
        let mut mem = ShellMemory::new();
        for i in 0..SHELL_MEMORY_CAPACITY {
            mem.set(&format!("v{}", i), "x");
        }
        mem.set("overflow", "y");
        assert_eq!(mem.get("overflow"), "");
        // Existing bindings remain updatable even once full.
        mem.set("v0", "updated");
        assert_eq!(mem.get("v0"), "updated");
    }
}
