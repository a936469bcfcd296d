use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID.
    pub sub: i64,
    /// Student number (or staff number for lecturers). Presence submissions
    /// always use this value, never a NIM supplied in the request body.
    pub nim: String,
    pub lecturer: bool,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);
