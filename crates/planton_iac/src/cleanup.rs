//! Finalizers run when an invocation ends.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

type Finalizer = Box<dyn FnOnce() -> io::Result<()> + Send>;

/// Registered finalizers, run in reverse registration order.
///
/// Running is idempotent: each finalizer runs at most once. Anything still
/// registered when the context is dropped runs then.
#[derive(Default)]
pub struct CleanupContext {
    finalizers: Vec<(String, Finalizer)>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, label: impl Into<String>, finalizer: F)
    where
        F: FnOnce() -> io::Result<()> + Send + 'static,
    {
        let label = label.into();
        debug!("Registered cleanup: {}", label);
        self.finalizers.push((label, Box::new(finalizer)));
    }

    /// Remove `path` (file or directory tree) at cleanup.
    pub fn remove_path(&mut self, path: impl AsRef<Path>) {
        let path: PathBuf = path.as_ref().to_path_buf();
        let label = format!("remove {}", path.display());
        self.register(label, move || remove_if_exists(&path));
    }

    pub fn len(&self) -> usize {
        self.finalizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finalizers.is_empty()
    }

    /// Run every pending finalizer; returns how many failed.
    ///
    /// Failures are logged and do not stop the remaining finalizers.
    pub fn run(&mut self) -> usize {
        let mut failures = 0;
        while let Some((label, finalizer)) = self.finalizers.pop() {
            match finalizer() {
                Ok(()) => debug!("Cleanup done: {}", label),
                Err(e) => {
                    failures += 1;
                    warn!("Cleanup failed ({}): {}", label, e);
                }
            }
        }
        failures
    }
}

impl Drop for CleanupContext {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for CleanupContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.finalizers.iter().map(|(l, _)| l.as_str()).collect();
        f.debug_struct("CleanupContext").field("pending", &labels).finish()
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.exists() {
        fs::remove_file(path)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = CleanupContext::new();
        for i in 0..3 {
            let order = Arc::clone(&order);
            ctx.register(format!("step {}", i), move || {
                order.lock().unwrap().push(i);
                Ok(())
            });
        }

        assert_eq!(ctx.run(), 0);
        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_run_is_idempotent() {
        let count = Arc::new(Mutex::new(0));
        let mut ctx = CleanupContext::new();
        let c = Arc::clone(&count);
        ctx.register("count", move || {
            *c.lock().unwrap() += 1;
            Ok(())
        });

        ctx.run();
        ctx.run();
        drop(ctx);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_failures_do_not_stop_others() {
        let ran = Arc::new(Mutex::new(false));
        let mut ctx = CleanupContext::new();
        let r = Arc::clone(&ran);
        ctx.register("first", move || {
            *r.lock().unwrap() = true;
            Ok(())
        });
        ctx.register("broken", || Err(io::Error::new(io::ErrorKind::Other, "boom")));

        assert_eq!(ctx.run(), 1);
        assert!(*ran.lock().unwrap());
    }

    #[test]
    fn test_remove_path_on_drop() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("copy");
        fs::create_dir_all(dir.join("nested")).unwrap();
        let file = temp.path().join("stack-input.yaml");
        fs::write(&file, "target: {}").unwrap();

        {
            let mut ctx = CleanupContext::new();
            ctx.remove_path(&dir);
            ctx.remove_path(&file);
            ctx.remove_path(temp.path().join("never-created"));
        }

        assert!(!dir.exists());
        assert!(!file.exists());
    }
}
