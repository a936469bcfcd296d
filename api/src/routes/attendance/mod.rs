//! Attendance session handlers, mounted under
//! `/api/courses/{course_name}/meetings/{meeting_id}/session`.

pub mod common;
pub mod get;
pub mod post;
