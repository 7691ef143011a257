// Report bundle extraction

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

/// Unpack `archive` into `dest`, creating `dest` if needed.
///
/// Existing files are overwritten. Entries whose path would land outside
/// `dest` (absolute paths, `..` components) abort the extraction.
pub fn extract(archive: &Path, dest: &Path) -> Result<PathBuf, String> {
    if !archive.exists() {
        return Err(format!("Archive not found: {}", archive.display()));
    }

    let file = File::open(archive)
        .map_err(|e| format!("Failed to open archive '{}': {}", archive.display(), e))?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| format!("Failed to read archive '{}': {}", archive.display(), e))?;

    fs::create_dir_all(dest)
        .map_err(|e| format!("Failed to create '{}': {}", dest.display(), e))?;

    let mut files = 0usize;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| format!("Failed to read archive entry {}: {}", i, e))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(format!(
                "Archive entry '{}' escapes the destination directory",
                entry.name()
            ));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| format!("Failed to create '{}': {}", out_path.display(), e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }
        let mut out = File::create(&out_path)
            .map_err(|e| format!("Failed to create '{}': {}", out_path.display(), e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| format!("Failed to extract '{}': {}", out_path.display(), e))?;
        files += 1;
    }

    log::info!("extracted {} file(s) from '{}' to '{}'", files, archive.display(), dest.display());
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_creates_destination() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a.xls", b"one"), ("nested/b.xls", b"two")]);

        let dest = dir.path().join("out").join("unzipped");
        let got = extract(&archive, &dest).unwrap();

        assert_eq!(got, dest);
        assert_eq!(fs::read(dest.join("a.xls")).unwrap(), b"one");
        assert_eq!(fs::read(dest.join("nested").join("b.xls")).unwrap(), b"two");
    }

    #[test]
    fn test_extract_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a.xls", b"fresh")]);
        let dest = dir.path().join("unzipped");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.xls"), b"stale contents").unwrap();

        extract(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join("a.xls")).unwrap(), b"fresh");
    }

    #[test]
    fn test_extract_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract(&dir.path().join("nope.zip"), &dir.path().join("out")).unwrap_err();
        assert!(err.contains("Archive not found"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_extract_rejects_escaping_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../evil.xls", b"x")]);

        let dest = dir.path().join("unzipped");
        let err = extract(&archive, &dest).unwrap_err();
        assert!(err.contains("escapes"));
        assert!(!dir.path().join("evil.xls").exists());
    }

    #[test]
    fn test_extract_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("plain.zip");
        fs::write(&archive, b"not a zip").unwrap();
        let err = extract(&archive, &dir.path().join("out")).unwrap_err();
        assert!(err.starts_with("Failed to read archive"));
    }
}
