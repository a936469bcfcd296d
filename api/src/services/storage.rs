//! Evidence storage for presence submissions.
//!
//! Face and room photos are written under
//! `{STORAGE_ROOT}/faces/{course}/{meeting}/{nim}/`, named by the submission
//! timestamp in milliseconds. The face upload must succeed for a submission
//! to be recorded; the room photo is best-effort.

use std::io;
use std::path::PathBuf;
use util::paths;

/// Fallback URLs served to the lecturer view when an evidence file is
/// missing or was never captured.
pub const DEFAULT_FACE_URL: &str = "/default-face.png";
pub const DEFAULT_ROOM_URL: &str = "/default-room.png";

pub async fn save_face_image(
    course: &str,
    meeting: &str,
    nim: &str,
    filename: &str,
    bytes: &[u8],
) -> io::Result<PathBuf> {
    let path = paths::face_image_path(course, meeting, nim, filename);
    paths::ensure_parent_dir(&path)?;
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

pub async fn save_room_image(
    course: &str,
    meeting: &str,
    nim: &str,
    filename: &str,
    bytes: &[u8],
) -> io::Result<PathBuf> {
    let path = paths::room_image_path(course, meeting, nim, filename);
    paths::ensure_parent_dir(&path)?;
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Reads a stored face photo, or `None` if it does not exist.
pub async fn load_face_image(
    course: &str,
    meeting: &str,
    nim: &str,
    filename: &str,
) -> Option<Vec<u8>> {
    let path = paths::face_image_path(course, meeting, nim, filename);
    tokio::fs::read(&path).await.ok()
}

/// Reads a stored room photo, or `None` if it does not exist.
pub async fn load_room_image(
    course: &str,
    meeting: &str,
    nim: &str,
    filename: &str,
) -> Option<Vec<u8>> {
    let path = paths::room_image_path(course, meeting, nim, filename);
    tokio::fs::read(&path).await.ok()
}
