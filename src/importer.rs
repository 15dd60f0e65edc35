use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use zip::ZipArchive;

pub struct ImportStats {
    pub total: usize,
    pub staged: usize,
    pub errors: usize,
}

impl ImportStats {
    pub fn print(&self) {
        println!(
            "Imported {} archives ({} staged, {} errors).",
            self.total, self.staged, self.errors
        );
    }
}

/// Stage the first .html member of every zip archive into the
/// documentations directory, then move the consumed archive out of the
/// way. Per-archive failures are logged and skipped.
pub fn import_zips(zips_dir: &Path, docs_dir: &Path, archives_dir: &Path) -> Result<ImportStats> {
    fs::create_dir_all(docs_dir)
        .with_context(|| format!("creating {}", docs_dir.display()))?;
    fs::create_dir_all(archives_dir)
        .with_context(|| format!("creating {}", archives_dir.display()))?;

    let mut stats = ImportStats {
        total: 0,
        staged: 0,
        errors: 0,
    };

    let mut zip_paths = list_files_with_extension(zips_dir, "zip")?;
    zip_paths.sort();
    if zip_paths.is_empty() {
        info!("no zip file found in {}", zips_dir.display());
        return Ok(stats);
    }

    for path in zip_paths {
        stats.total += 1;
        match stage_archive(&path, docs_dir) {
            Ok(Some(name)) => {
                info!("staged {} from {}", name, path.display());
                stats.staged += 1;
            }
            Ok(None) => warn!("no .html file found in {}", path.display()),
            Err(e) => {
                error!("failed to stage {}: {:#}", path.display(), e);
                stats.errors += 1;
                continue;
            }
        }
        if let Some(file_name) = path.file_name() {
            if let Err(e) = move_file(&path, &archives_dir.join(file_name)) {
                error!("failed to archive {}: {:#}", path.display(), e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

fn stage_archive(zip_path: &Path, docs_dir: &Path) -> Result<Option<String>> {
    let file = File::open(zip_path).with_context(|| format!("opening {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.name().to_lowercase().ends_with(".html") {
            continue;
        }
        let file_name = Path::new(entry.name())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.name().to_string());
        let dst = docs_dir.join(&file_name);
        let mut out =
            File::create(&dst).with_context(|| format!("creating {}", dst.display()))?;
        io::copy(&mut entry, &mut out)?;
        return Ok(Some(file_name));
    }

    Ok(None)
}

pub fn list_files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("reading {}", dir.display())),
    };
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext));
        if matches {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Rename, falling back to copy+delete across filesystems.
pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
    if fs::rename(src, dst).is_err() {
        fs::copy(src, dst).with_context(|| format!("copying {}", src.display()))?;
        fs::remove_file(src).with_context(|| format!("removing {}", src.display()))?;
    }
    Ok(())
}
