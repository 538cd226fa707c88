// File: ./src/storage.rs
// Locked, atomic and no-clobber file writes.
use anyhow::Result;
use fs2::FileExt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct LocalStorage;

impl LocalStorage {
    /// Sidecar lock file path: `config.toml` -> `config.toml.lock`.
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        FileExt::unlock(&file)?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Creates `path` and writes `contents`, failing with
    /// `ErrorKind::AlreadyExists` instead of overwriting.
    pub fn write_new<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;
        file.write_all(contents.as_ref())?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_write_new_refuses_to_clobber() {
        let ctx = TestContext::new();
        let path = ctx.root.join("a.ics");
        LocalStorage::write_new(&path, "first").unwrap();
        let err = LocalStorage::write_new(&path, "second").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn test_locking_concurrency() {
        let ctx = TestContext::new();
        let file_path = ctx.root.join("lock_test.txt");
        let path_ref = Arc::new(file_path.clone());
        fs::write(&file_path, "0").unwrap();

        let mut handles = vec![];
        for _ in 0..8 {
            let p = path_ref.clone();
            handles.push(thread::spawn(move || {
                LocalStorage::with_lock(&p, || {
                    let num: i32 = fs::read_to_string(&*p)?.parse()?;
                    std::thread::sleep(std::time::Duration::from_millis(5));
                    LocalStorage::atomic_write(&*p, (num + 1).to_string())?;
                    Ok(())
                })
                .unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "8");
    }
}
