pub mod attempts;
pub mod attendance;
pub mod eligibility;
pub mod geofence;
pub mod session_clock;
pub mod subnet;
