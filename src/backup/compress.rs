use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use thiserror::Error;
use zip::{CompressionMethod, ZipWriter, result::ZipError, write::SimpleFileOptions};

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

/// Packs everything below `directory` into the zip file `target`, with paths relative to
/// `directory`. Returns the number of files packed.
pub fn compress_directory(directory: &Path, target: &Path) -> Result<usize, CompressError> {
    debug!("compressing {} into {}", directory.display(), target.display());
    let write_error = |source: ZipError| CompressError::Write {
        path: target.to_path_buf(),
        source,
    };
    let file = File::create(target).map_err(|e| write_error(e.into()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    let mut pending = vec![directory.to_path_buf()];
    while let Some(current) = pending.pop() {
        for path in sorted_entries(&current)? {
            let name = entry_name(directory, &path);
            if path.is_dir() {
                trace!("adding directory {name}");
                zip.add_directory(format!("{name}/"), options)
                    .map_err(write_error)?;
                pending.push(path);
            } else {
                trace!("adding {name}");
                zip.start_file(name, options).map_err(write_error)?;
                let mut source = File::open(&path).map_err(|source| CompressError::Read {
                    path: path.clone(),
                    source,
                })?;
                io::copy(&mut source, &mut zip).map_err(|e| write_error(e.into()))?;
                files += 1;
            }
        }
    }
    zip.finish().map_err(write_error)?;
    Ok(files)
}

fn sorted_entries(directory: &Path) -> Result<Vec<PathBuf>, CompressError> {
    let read_error = |source: io::Error| CompressError::Read {
        path: directory.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(directory)
        .map_err(read_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    entries.sort();
    Ok(entries)
}

fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::io::Read as _;

    use assertables::*;
    use rstest::*;
    use tempfile::{TempDir, tempdir};
    use zip::ZipArchive;

    use super::*;

    #[fixture]
    fn temp_dir() -> TempDir {
        assert_ok!(tempdir())
    }

    #[rstest]
    fn test_directory_contents_are_packed_recursively(temp_dir: TempDir) {
        let source = temp_dir.path().join("backup");
        assert_ok!(fs::create_dir_all(source.join("nested")));
        assert_ok!(fs::write(source.join("email_1_a.eml"), b"first"));
        assert_ok!(fs::write(source.join("nested/email_2_b.eml"), b"second"));
        let target = temp_dir.path().join("backup.zip");

        let packed = assert_ok!(compress_directory(&source, &target));

        assert_eq!(packed, 2);
        let mut archive = assert_ok!(ZipArchive::new(assert_ok!(File::open(&target))));
        let mut names: Vec<String> = archive.file_names().map(ToString::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["email_1_a.eml", "nested/", "nested/email_2_b.eml"]);
        let mut content = String::new();
        assert_ok!(
            assert_ok!(archive.by_name("nested/email_2_b.eml")).read_to_string(&mut content)
        );
        assert_eq!(content, "second");
    }

    #[rstest]
    fn test_missing_directory_is_error(temp_dir: TempDir) {
        let result = compress_directory(
            &temp_dir.path().join("missing"),
            &temp_dir.path().join("out.zip"),
        );

        assert!(matches!(result, Err(CompressError::Read { .. })));
    }
}
