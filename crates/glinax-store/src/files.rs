use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::Result;

/// Directory of JSON artifacts, one file per data domain.
#[derive(Debug, Clone)]
pub struct JsonArtifacts {
    dir: PathBuf,
}

impl JsonArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replaces the artifact `name` with `value` rendered as pretty JSON.
    pub fn write<T>(&self, name: &str, value: &T) -> Result<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        let mut batch = self.batch()?;
        batch.stage(name, value)?;
        let mut paths = batch.commit()?;
        Ok(paths.remove(0))
    }

    /// Starts a set of artifacts that replace their targets together.
    pub fn batch(&self) -> Result<ArtifactBatch> {
        fs_err::create_dir_all(&self.dir)?;
        Ok(ArtifactBatch {
            dir: self.dir.clone(),
            staged: Vec::new(),
        })
    }
}

struct Staged {
    file: NamedTempFile,
    target: PathBuf,
    previous: Option<Vec<u8>>,
}

/// Artifacts rendered into temporary files next to their targets.
///
/// Nothing is visible until [`ArtifactBatch::commit`]. Dropping the batch
/// discards every staged file.
pub struct ArtifactBatch {
    dir: PathBuf,
    staged: Vec<Staged>,
}

impl ArtifactBatch {
    pub fn stage<T>(&mut self, name: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let target = self.dir.join(name);
        let previous = match fs_err::metadata(&target) {
            Ok(meta) if meta.is_dir() => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} is a directory", target.display()),
                )
                .into());
            }
            Ok(_) => Some(fs_err::read(&target)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let mut file = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut file, value)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;

        self.staged.push(Staged {
            file,
            target,
            previous,
        });
        Ok(())
    }

    /// Renames every staged file over its target.
    ///
    /// If a rename fails, the targets already replaced get their previous
    /// content back before the error is returned.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut done: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::new();
        for staged in self.staged {
            match staged.file.persist(&staged.target) {
                Ok(_) => {
                    log::debug!("Wrote {}", staged.target.display());
                    done.push((staged.target, staged.previous));
                }
                Err(e) => {
                    restore(&self.dir, &done);
                    return Err(e.error.into());
                }
            }
        }
        Ok(done.into_iter().map(|(path, _)| path).collect())
    }
}

fn restore(dir: &Path, replaced: &[(PathBuf, Option<Vec<u8>>)]) {
    for (target, previous) in replaced.iter().rev() {
        let outcome = match previous {
            Some(content) => NamedTempFile::new_in(dir)
                .and_then(|mut file| file.write_all(content).map(|_| file))
                .and_then(|file| file.persist(target).map(|_| ()).map_err(|e| e.error)),
            None => fs_err::remove_file(target),
        };
        if let Err(e) = outcome {
            log::error!("Couldn't restore {}: {}", target.display(), e);
        }
    }
}
