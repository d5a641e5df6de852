use std::io::{self, ErrorKind, Read, Write};
use std::path::{Component, Path};

use crc32fast::Hasher;
use tempfile::{Builder, TempPath};
use tracing::debug;

use crate::util::{Result, Status};

/// Buffer size used to drain a resource into its target file
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 100 * 1024;

/// A library file materialized on disk.
///
/// The file is removed when this value (or the [`TempPath`] taken from it)
/// is dropped, so every early return after extraction cleans up.
#[derive(Debug)]
pub(crate) struct ExtractedFile {
    pub path: TempPath,
    pub size: u64,
    pub crc32: u32,
}

/// Copies `reader` into `writer` in `buffer_size` chunks until the reader is
/// drained. Returns the byte count and the CRC32 of what was written.
pub(crate) fn copy_stream<R, W>(reader: &mut R, writer: &mut W, buffer_size: usize) -> io::Result<(u64, u32)>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut hasher = Hasher::new();
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    writer.flush()?;

    Ok((total, hasher.finalize()))
}

/// Rejects library file names that are not a single plain path component,
/// so the extracted file always lands directly inside the target directory.
pub(crate) fn check_file_name(file_name: &str) -> Result<()> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Status::invalid_argument(format!(
            "library file name must be a plain file name, got {file_name:?}"
        ))),
    }
}

/// Materializes `resource` as a uniquely named file.
///
/// Without `target_dir` the file goes to the system temp directory; with it,
/// the file is created inside that directory with `file_name` as the prefix
/// of its unique name, so concurrent extractions never share a path.
pub(crate) fn extract_to_file(
    resource: &mut dyn Read,
    file_name: &str,
    target_dir: Option<&Path>,
    buffer_size: usize,
) -> Result<ExtractedFile> {
    check_file_name(file_name)?;
    let (stem, suffix) = match file_name.rfind('.') {
        Some(dot) => (&file_name[..dot], &file_name[dot..]),
        None => (file_name, ""),
    };
    let mut builder = Builder::new();
    builder.prefix(stem).suffix(suffix);

    let created = match target_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    let mut file = created.map_err(|e| {
        Status::io_error_at(target_dir.unwrap_or(&std::env::temp_dir()), e)
    })?;
    let path = file.path().to_path_buf();
    debug!(path = %path.display(), "extracting native library");

    if !path.exists() {
        return Err(Status::io_error(format!(
            "{} does not exist after creation",
            path.display()
        )));
    }

    let (size, crc32) = copy_stream(resource, file.as_file_mut(), buffer_size)
        .map_err(|e| Status::io_error_at(&path, e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| Status::io_error_at(&path, e))?;

    // Closes the output handle; the path keeps delete-on-drop.
    let path = file.into_temp_path();
    Ok(ExtractedFile { path, size, crc32 })
}
