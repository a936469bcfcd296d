use crate::config;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Global storage root (absolute), from `config::storage_root()`.
/// If relative in env, resolve against current_dir().
pub fn storage_root() -> PathBuf {
    let root = config::storage_root();
    let p = PathBuf::from(root);
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

// ─── Evidence image paths ───────────────────────────────────────────
//
// The content store is path-addressed: the location of an evidence image is
// fully determined by course name, meeting label, and student NIM. Only the
// final filename comes from the attendance record.

/// Per-student evidence folder:
/// {STORAGE_ROOT}/faces/{course}/{meeting}/{nim}
pub fn student_evidence_dir(course: &str, meeting: &str, nim: &str) -> PathBuf {
    storage_root()
        .join("faces")
        .join(course)
        .join(meeting)
        .join(nim)
}

/// Face capture path: .../{nim}/{filename}
pub fn face_image_path(course: &str, meeting: &str, nim: &str, filename: &str) -> PathBuf {
    student_evidence_dir(course, meeting, nim).join(filename)
}

/// Room capture path: .../{nim}/ruangan/{filename}
pub fn room_image_path(course: &str, meeting: &str, nim: &str, filename: &str) -> PathBuf {
    student_evidence_dir(course, meeting, nim)
        .join("ruangan")
        .join(filename)
}
