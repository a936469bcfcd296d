mod attendance_test;
mod auth_test;
mod client_ip_test;
mod courses_test;
mod health_test;
