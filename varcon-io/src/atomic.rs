use std::ffi::OsStr;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{IoError, Result};
use crate::format::OutputFormat;

///
/// Write a file atomically: the content is produced into a temporary file in
/// the destination directory, then renamed over `path` once `write` succeeded.
///
/// Paths ending in `.gz` are gzip-compressed. Parent directories are created.
///
/// # Arguments
/// - path: the final location of the file
/// - write: callback producing the file content
///
pub fn publish<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let path = path.as_ref();
    if path.file_name().is_none() {
        return Err(IoError::InvalidPath(path.to_path_buf()));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&parent)?;

    // dropping the temp file on any early return removes it
    let tmp = NamedTempFile::new_in(&parent)?;
    {
        let mut buffered = BufWriter::new(tmp.as_file());
        if path.extension() == Some(OsStr::new("gz")) {
            let mut encoder = GzEncoder::new(&mut buffered, Compression::default());
            write(&mut encoder)?;
            encoder.finish()?;
        } else {
            write(&mut buffered)?;
        }
        buffered.flush()?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| IoError::Publish {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

///
/// Serialize a value as JSON or YAML and publish it atomically.
///
pub fn publish_serialized<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
    format: OutputFormat,
) -> Result<()> {
    // serialize up front so a serialization failure never touches the disk
    let content = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        _ => {
            let mut s = serde_json::to_string_pretty(value)?;
            s.push('\n');
            s
        }
    };
    publish(path, |w| w.write_all(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Read;

    use flate2::read::MultiGzDecoder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_publish_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.tsv");

        publish(&path, |w| writeln!(w, "x\ty")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "x\ty\n");
    }

    #[rstest]
    fn test_publish_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv.gz");

        publish(&path, |w| writeln!(w, "hello")).unwrap();

        let mut decoded = String::new();
        MultiGzDecoder::new(fs::File::open(&path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "hello\n");
    }

    #[rstest]
    fn test_failed_write_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        fs::write(&path, "previous\n").unwrap();

        let result = publish(&path, |w| {
            writeln!(w, "partial")?;
            Err(std::io::Error::other("boom"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous\n");
        // no stray temporary file is left next to the output
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[rstest]
    fn test_publish_serialized_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        publish_serialized(&path, &vec![1, 2, 3], OutputFormat::Json).unwrap();

        let parsed: Vec<u32> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }
}
