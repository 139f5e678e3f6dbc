// File loading, saving, backups and document discovery for hosts.
// The engine itself never does I/O; these helpers sit next to it.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::error::{EditError, Result};
use crate::session::EditSession;

#[derive(Debug, Clone, Copy)]
pub struct SaveOpts {
    pub pretty: bool,
    pub trailing_newline: bool,
    /// Zip the existing file next to it before overwriting.
    pub backup: bool,
}

impl Default for SaveOpts {
    fn default() -> Self {
        Self {
            pretty: true,
            trailing_newline: true,
            backup: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOpts {
    /// Only match files with this exact name (e.g. `package.json`).
    pub file_name: Option<String>,
    pub max_depth: usize,
}

impl Default for ScanOpts {
    fn default() -> Self {
        Self {
            file_name: None,
            max_depth: 8,
        }
    }
}

const SKIP_DIRS: &[&str] = &["node_modules", ".git", "target"];

pub fn load_file(path: &Path) -> Result<EditSession> {
    let data = fs::read(path).map_err(|e| EditError::io(path, e))?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(EditError::InvalidDocument("empty file".into()));
    }
    let session = EditSession::from_slice(&data)?;
    tracing::debug!(path = %path.display(), "loaded document");
    Ok(session)
}

pub fn to_text(value: &Value, opts: &SaveOpts) -> Result<String> {
    let mut s = if opts.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    if opts.trailing_newline {
        s.push('\n');
    }
    Ok(s)
}

/// Writes `value` to `path`. Returns the backup archive if one was made.
pub fn save_file(path: &Path, value: &Value, opts: &SaveOpts) -> Result<Option<PathBuf>> {
    let text = to_text(value, opts)?;
    let backup = if opts.backup && path.is_file() {
        Some(backup_file(path)?)
    } else {
        None
    };
    fs::write(path, text).map_err(|e| EditError::io(path, e))?;
    tracing::info!(path = %path.display(), "saved document");
    Ok(backup)
}

// Zip backup of a single file (non-destructive), placed next to it
pub fn backup_file(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(EditError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"),
        ));
    }
    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();

    let data = fs::read(path).map_err(|e| EditError::io(path, e))?;
    let (dest, file) = create_unique(parent, &format!("{}_{}", stem, ts))?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.json".to_string());
    zip.start_file(name, options)?;
    zip.write_all(&data).map_err(|e| EditError::io(&dest, e))?;
    zip.finish()?;
    tracing::info!(backup = %dest.display(), "created backup");
    Ok(dest)
}

// Opens `<base>.zip`, or `<base>_1.zip`, `<base>_2.zip`, ... if taken.
// Existing archives are never truncated.
fn create_unique(dir: &Path, base: &str) -> Result<(PathBuf, fs::File)> {
    let mut n = 0u32;
    loop {
        let name = if n == 0 {
            format!("{}.zip", base)
        } else {
            format!("{}_{}.zip", base, n)
        };
        let dest = dir.join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&dest) {
            Ok(file) => return Ok((dest, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && n < 1000 => n += 1,
            Err(e) => return Err(EditError::io(&dest, e)),
        }
    }
}

/// `.json` files under `dir`, sorted, skipping dependency and VCS folders.
pub fn find_documents(dir: &Path, opts: &ScanOpts) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(EditError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }
    let mut out = Vec::new();
    let walker = WalkDir::new(dir)
        .max_depth(opts.max_depth)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir()
                    && e.file_name().to_str().is_some_and(|n| SKIP_DIRS.contains(&n)))
        });
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let p = entry.path();
        let matches = match &opts.file_name {
            Some(name) => p.file_name().and_then(|s| s.to_str()) == Some(name.as_str()),
            None => p.extension().and_then(|s| s.to_str()) == Some("json"),
        };
        if matches {
            out.push(p.to_path_buf());
        }
    }
    out.sort();
    Ok(out)
}
