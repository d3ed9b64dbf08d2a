use crate::config::Config;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, success, warning};
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Write `src` as the single entry of a new zip archive at `dest`.
pub fn zip_file(src: &Path, dest: &Path) -> AppResult<()> {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Other(format!("not a file: {}", src.display())))?;

    let file = fs::File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut f = fs::File::open(src)?;
    zip.start_file(name, options).map_err(std::io::Error::other)?;
    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;
    Ok(())
}

/// Write `src` into a gzip-compressed tarball at `dest`.
#[cfg(unix)]
fn tar_gz_file(src: &Path, dest: &Path) -> AppResult<()> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let name = src
        .file_name()
        .ok_or_else(|| AppError::Other(format!("not a file: {}", src.display())))?;

    let file = fs::File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut archive = tar::Builder::new(encoder);
    archive.append_path_with_name(src, name)?;
    archive.into_inner()?.finish()?;
    Ok(())
}

/// Compress a backup copy: tar.gz on Unix, zip elsewhere.
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    #[cfg(unix)]
    {
        let out = PathBuf::from(format!("{}.tar.gz", path.display()));
        tar_gz_file(path, &out)?;
        Ok(out)
    }
    #[cfg(not(unix))]
    {
        let out = path.with_extension("zip");
        zip_file(path, &out)?;
        Ok(out)
    }
}

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database to `dest_file`, optionally compressing it.
    /// Returns the final path, or `None` when the user declined to overwrite.
    pub fn backup(
        pool: &mut DbPool,
        cfg: &Config,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<Option<PathBuf>> {
        let src = Path::new(&cfg.database);
        let dest = Path::new(dest_file);

        if !src.exists() {
            return Err(AppError::not_found("Database", src.display()));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        if dest.exists() && !force && !confirm(format!("'{}' already exists. Overwrite?", dest.display()))? {
            warning("Backup cancelled.");
            return Ok(None);
        }

        // flush the WAL so the copy is complete
        pool.conn.execute_batch("PRAGMA wal_checkpoint(FULL);").ok();
        fs::copy(src, dest)?;

        let final_path = if compress {
            let compressed = compress_backup(dest)?;
            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Failed to remove uncompressed backup: {e}"));
            }
            compressed
        } else {
            dest.to_path_buf()
        };

        success(format!("Backup created: {}", final_path.display()));
        audit(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress { "Backup created and compressed" } else { "Backup created" },
        );

        Ok(Some(final_path))
    }
}
