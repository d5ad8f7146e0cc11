use std::{collections::BTreeMap, io::Write};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

/// Files produced by a generation run, keyed by absolute path.
/// Nothing touches the disk until [`OutputFiles::write`].
#[derive(Debug, Default)]
pub struct OutputFiles {
    files: BTreeMap<Utf8PathBuf, String>,
}

impl OutputFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<Utf8PathBuf>, contents: String) {
        self.files.insert(path.into(), contents);
    }

    pub fn get(&self, path: impl AsRef<Utf8Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files.keys().map(Utf8PathBuf::as_path)
    }

    /// Write every file whose contents changed. Returns the paths written.
    pub fn write(&self) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let mut written = vec![];
        for (path, contents) in &self.files {
            if write_if_changed(path, contents)? {
                written.push(path.clone());
            }
        }
        Ok(written)
    }
}

/// Replace `path` with `contents` unless it already holds exactly that.
///
/// The new contents go to a temporary file next to `path` which is then
/// renamed over it, so readers never see a partial file. Returns whether
/// the file was written.
pub fn write_if_changed(path: &Utf8Path, contents: &str) -> anyhow::Result<bool> {
    match std::fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => {
            info!(%path, "no changes detected, keeping file");
            return Ok(false);
        }
        Ok(_) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => {
            return Err(error).with_context(|| format!("reading file at `{path}`"));
        }
    }

    let dir_path = match path.parent() {
        Some(dir_path) if !dir_path.as_str().is_empty() => dir_path,
        _ => Utf8Path::new("."),
    };
    std::fs::create_dir_all(dir_path)
        .with_context(|| format!("creating directory at `{dir_path}`"))?;

    let mut file = tempfile::NamedTempFile::new_in(dir_path)
        .with_context(|| format!("creating temporary file in `{dir_path}`"))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("writing temporary file for `{path}`"))?;
    file.persist(path)
        .with_context(|| format!("replacing file at `{path}`"))?;

    info!(%path, "wrote file");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_only_on_change() -> anyhow::Result<()> {
        let dir = temp_dir::TempDir::new()?;
        let root = Utf8Path::from_path(dir.path()).expect("utf-8 temp dir");
        let path = root.join("nested/dir/file.txt");

        assert!(write_if_changed(&path, "one")?);
        assert!(!write_if_changed(&path, "one")?);
        assert!(write_if_changed(&path, "two")?);
        assert_eq!(std::fs::read_to_string(&path)?, "two");
        Ok(())
    }
}
