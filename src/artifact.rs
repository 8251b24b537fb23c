// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Artifact writing shared by the SVG and Markdown renderers.
//!
//! Artifacts are fully overwritten on each run; consumers read them as static
//! assets, so no atomic replace is attempted.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path
};

use crate::error::{self, Error};

/// Writes rendered contents to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`] when directories or the file cannot be
/// created or written.
pub fn write_artifact(path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| error::artifact_io_error(parent, source))?;
    }

    let file = File::create(path).map_err(|source| error::artifact_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|source| error::artifact_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::artifact_io_error(path, source))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::write_artifact;
    use crate::error::Error;

    #[test]
    fn write_artifact_creates_parent_directories() {
        let temp = tempdir().expect("failed to create tempdir");
        let path = temp.path().join("generated/nested/devotion.svg");

        write_artifact(&path, "<svg/>").expect("write succeeds");

        assert_eq!(fs::read_to_string(&path).expect("artifact readable"), "<svg/>");
    }

    #[test]
    fn write_artifact_overwrites_existing_file() {
        let temp = tempdir().expect("failed to create tempdir");
        let path = temp.path().join("devotion.md");
        fs::write(&path, "old").expect("failed to seed file");

        write_artifact(&path, "new").expect("write succeeds");

        assert_eq!(fs::read_to_string(&path).expect("artifact readable"), "new");
    }

    #[test]
    fn write_artifact_propagates_directory_errors() {
        let temp = tempdir().expect("failed to create tempdir");
        let blocking_file = temp.path().join("blocked");
        fs::write(&blocking_file, "").expect("failed to create placeholder");

        let path = blocking_file.join("devotion.svg");
        let error = write_artifact(&path, "<svg/>").expect_err("expected io failure");

        assert!(matches!(error, Error::ArtifactIo { .. }));
    }
}
