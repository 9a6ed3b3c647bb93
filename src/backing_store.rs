//! The on-disk backing store: one file per page, `"<PID>.<pageIndex>.txt"`.
//!
//! The store is authoritative; RAM is a cache of it (§3, §4.A). The
//! [`MemoryManager`](crate::memory_manager::MemoryManager) is the only
//! writer, the page-in path is the only reader.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::config::{INSTRUCTION_SIZE, PAGE_SIZE};
use crate::pcb::ProcessId;

/// Scoped handle to the `BackingStore` directory.
///
/// Created empty at boot (deleting any prior directory of the same name),
/// removed at shutdown. Backing-store files written during a failed `exec`
/// are not cleaned up early; the reference source leaks them too (§8,
/// scenario 5), and they are only ever reclaimed wholesale at shutdown.
pub struct BackingStore {
    root: PathBuf,
}

impl BackingStore {
    /// Creates the backing-store directory, removing any pre-existing one.
    pub fn create<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        if root.exists() {
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn page_path(&self, pid: ProcessId, page_index: usize) -> PathBuf {
        self.root.join(format!("{}.{}.txt", pid.as_u64(), page_index))
    }

    /// Writes one page file, truncating up to `PAGE_SIZE` lines from `lines`.
    ///
    /// Only a *full* page (exactly `PAGE_SIZE` lines) has the trailing
    /// newline of its final line stripped, matching
    /// `memorymanager.c::launcher`'s byte-for-byte behavior: the source
    /// suppresses `\n` only when writing the page's last slot
    /// (`i == PAGE_SIZE - 1`), which is only reached on a full page. A
    /// short final page (fewer than `PAGE_SIZE` lines, because the file
    /// ended) keeps every line's newline as-is. This is permitted by the
    /// spec to be either way as long as the reader tolerates both (§4.E);
    /// matching it exactly just avoids an unnecessary divergence.
    pub fn write_page(
        &self, pid: ProcessId, page_index: usize, lines: &[String],
    ) -> io::Result<()> {
        let path = self.page_path(pid, page_index);
        let mut file = fs::File::create(path)?;
        let strip_last_newline = lines.len() == PAGE_SIZE;
        for (i, line) in lines.iter().enumerate() {
            let is_last = i == lines.len() - 1;
            if is_last && strip_last_newline && line.ends_with('\n') {
                file.write_all(line[..line.len() - 1].as_bytes())?;
            } else {
                file.write_all(line.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Reads up to `PAGE_SIZE` lines from a page file.
    ///
    /// Returns fewer than `PAGE_SIZE` lines if the page was short (i.e. the
    /// last page of a script). Each returned line retains its trailing `\n`
    /// except possibly the final one, mirroring `loadPage`'s use of
    /// `fgets`.
    pub fn read_page(&self, pid: ProcessId, page_index: usize) -> io::Result<Vec<String>> {
        let path = self.page_path(pid, page_index);
        let file = fs::File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut lines = Vec::with_capacity(PAGE_SIZE);
        for _ in 0..PAGE_SIZE {
            let mut buf = String::new();
            let read = reader.read_line(&mut buf)?;
            if read == 0 {
                break;
            }
            buf.truncate(buf.len().min(INSTRUCTION_SIZE));
            lines.push(buf);
        }
        Ok(lines)
    }

    /// Returns the (unopened) path a page file would live at, for tests.
    #[cfg(test)]
    pub fn path_for(&self, pid: ProcessId, page_index: usize) -> PathBuf {
        self.page_path(pid, page_index)
    }
}

impl Drop for BackingStore {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackingStore::create(dir.path().join("BackingStore")).unwrap();
        let pid = ProcessId::first();
        let lines = vec!["A\n".to_string(), "B\n".to_string(), "C\n".to_string()];
        store.write_page(pid, 0, &lines).unwrap();
        let read_back = store.read_page(pid, 0).unwrap();
        assert_eq!(read_back.len(), 3);
        assert_eq!(read_back[0], "A\n");
        assert_eq!(read_back[1], "B\n");
    }

    #[test]
    fn short_page_reads_fewer_than_page_size_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackingStore::create(dir.path().join("BackingStore")).unwrap();
        let pid = ProcessId::first();
        store.write_page(pid, 0, &["only one\n".to_string()]).unwrap();
        let read_back = store.read_page(pid, 0).unwrap();
        assert_eq!(read_back.len(), 1);
    }

    #[test]
    fn create_removes_prior_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BackingStore");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("stale.txt"), b"leftover").unwrap();
        let store = BackingStore::create(&path).unwrap();
        assert!(!path.join("stale.txt").exists());
        drop(store);
        assert!(!path.exists());
    }
}
