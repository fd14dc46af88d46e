//! Collision-free `{base}_v{n}.{ext}` artifact naming and all-or-nothing writes.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use common::error::EvalError;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Rename attempts before giving up on claiming a versioned slot.
const MAX_CLAIM_ATTEMPTS: usize = 16;

/// A versioned artifact location: `{dir}/{base}_v{sequence}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPath {
    dir: PathBuf,
    base: String,
    sequence: u32,
    extension: String,
}

impl ArtifactPath {
    pub fn new(dir: &Path, base: &str, sequence: u32, extension: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            base: base.to_string(),
            sequence,
            extension: extension.to_string(),
        }
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn file_name(&self) -> String {
        format!("{}_v{}.{}", self.base, self.sequence, self.extension)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

/// Lowest-numbered slot (starting at 1) with no file on disk.
///
/// Only a snapshot: another writer may claim the slot before it is used.
/// [`write_versioned`] closes that window with a no-clobber rename.
pub fn next_available(dir: &Path, base: &str, extension: &str) -> io::Result<ArtifactPath> {
    let mut sequence = 1u32;
    loop {
        let candidate = ArtifactPath::new(dir, base, sequence, extension);
        if !candidate.path().try_exists()? {
            return Ok(candidate);
        }
        sequence = sequence.checked_add(1).ok_or_else(|| {
            io::Error::other(format!(
                "no free version slot for {base} in {}",
                dir.display()
            ))
        })?;
    }
}

/// Render an artifact into a temporary file beside its destination and move
/// it into the next free versioned slot without overwriting anything.
///
/// `render` receives the scratch path to write and the slot being claimed.
/// If the slot is taken before the rename lands, the scan repeats and the
/// artifact is rendered again for the new slot.
pub fn write_versioned<F>(
    dir: &Path,
    base: &str,
    extension: &str,
    mut render: F,
) -> Result<ArtifactPath, EvalError>
where
    F: FnMut(&Path, &ArtifactPath) -> Result<(), EvalError>,
{
    for _ in 0..MAX_CLAIM_ATTEMPTS {
        let slot = next_available(dir, base, extension)?;
        let scratch = scratch_file(dir, base, extension)?;
        render(scratch.path(), &slot)?;

        match scratch.persist_noclobber(slot.path()) {
            Ok(_) => return Ok(slot),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(slot = %slot, "Version slot claimed concurrently; rescanning");
            }
            Err(err) => return Err(err.error.into()),
        }
    }

    Err(EvalError::VersionConflict(format!(
        "could not claim a free {base}_v{{n}}.{extension} slot in {} after {MAX_CLAIM_ATTEMPTS} attempts",
        dir.display()
    )))
}

/// Render into a scratch file and atomically replace `path` with it.
pub fn write_replacing<F>(path: &Path, render: F) -> Result<(), EvalError>
where
    F: FnOnce(&Path) -> Result<(), EvalError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("artifact");
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let scratch = scratch_file(dir, stem, extension)?;
    render(scratch.path())?;
    scratch.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Hidden scratch file that keeps the real extension so renderers can infer the format.
fn scratch_file(dir: &Path, base: &str, extension: &str) -> io::Result<NamedTempFile> {
    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{extension}")
    };
    Builder::new()
        .prefix(&format!(".{base}-"))
        .suffix(&suffix)
        .tempfile_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_text(text: &str) -> impl FnMut(&Path, &ArtifactPath) -> Result<(), EvalError> + '_ {
        move |path, _| Ok(fs::write(path, text)?)
    }

    #[test]
    fn empty_directory_starts_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let slot = next_available(dir.path(), "confusion_matrix", "png").unwrap();
        assert_eq!(slot.sequence(), 1);
        assert_eq!(slot.path(), dir.path().join("confusion_matrix_v1.png"));
    }

    #[test]
    fn fills_the_lowest_gap() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report_v1.json"), "{}").unwrap();
        fs::write(dir.path().join("report_v3.json"), "{}").unwrap();
        fs::write(dir.path().join("report_v2.csv"), "").unwrap();

        let slot = next_available(dir.path(), "report", "json").unwrap();
        assert_eq!(slot.sequence(), 2);
    }

    #[test]
    fn bases_are_versioned_independently() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("confusion_matrix_v1.png"), "").unwrap();

        let slot = next_available(dir.path(), "model_metadata", "json").unwrap();
        assert_eq!(slot.sequence(), 1);
    }

    #[test]
    fn sequential_writes_are_distinct_and_gapless() {
        let dir = tempfile::tempdir().unwrap();
        let mut sequences = Vec::new();
        for _ in 0..5 {
            let slot = write_versioned(dir.path(), "report", "txt", write_text("body")).unwrap();
            assert!(slot.path().exists());
            sequences.push(slot.sequence());
        }
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn never_overwrites_a_claimed_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut rendered_for = Vec::new();
        let slot = write_versioned(dir.path(), "report", "txt", |path, slot| {
            rendered_for.push(slot.sequence());
            if rendered_for.len() == 1 {
                // Another writer grabs the slot between the scan and the rename.
                fs::write(slot.path(), "other writer")?;
            }
            Ok(fs::write(path, format!("version {}", slot.sequence()))?)
        })
        .unwrap();

        assert_eq!(rendered_for, vec![1, 2]);
        assert_eq!(slot.sequence(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("report_v1.txt")).unwrap(),
            "other writer"
        );
        assert_eq!(fs::read_to_string(slot.path()).unwrap(), "version 2");
    }

    #[test]
    fn failed_render_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_versioned(dir.path(), "report", "txt", |path, _| {
            fs::write(path, "partial")?;
            Err(EvalError::Render("boom".into()))
        });

        assert!(matches!(result, Err(EvalError::Render(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn replacing_write_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("metrics.csv");

        write_replacing(&path, |scratch| Ok(fs::write(scratch, "a,b")?)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b");
    }

    #[test]
    fn replacing_write_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest_metrics.json");
        fs::write(&path, "old").unwrap();

        write_replacing(&path, |scratch| Ok(fs::write(scratch, "new")?)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
