pub mod email;
pub mod face;
pub mod geocode;
pub mod storage;
