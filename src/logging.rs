//! Log setup.
//!
//! The terminal belongs to the UI, so logs go to a file.  Verbosity comes
//! from `RUST_LOG` and defaults to `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_to_file() {
        let path = std::env::temp_dir().join(format!("news-explorer-test-{}.log", std::process::id()));
        init(&path).unwrap();
        tracing::error!("hello from the test");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("hello from the test"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let path = Path::new("/nonexistent-dir/for/sure/news-explorer.log");
        let err = init(path).unwrap_err();
        assert!(err.to_string().contains("opening log file"));
    }
}
