//! Routes under `/api/courses`.
//!
//! Course names are unique and double as route keys, so every nested path
//! addresses a course by name rather than by numeric ID. A meeting hosts at
//! most one attendance session, reached through the `/session` subtree.

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};

use crate::auth::guards::{allow_lecturer, allow_student};
use crate::routes::attendance;
use crate::state::AppState;

pub mod get;
pub mod post;
pub mod put;

use get::{get_course, list_courses};
use post::{create_course, create_meeting, create_session};
use put::set_meeting_topic;

pub fn courses_routes() -> Router<AppState> {
    let lecturer = Router::new()
        .route("/", post(create_course))
        .route("/{course_name}/meetings", post(create_meeting))
        .route(
            "/{course_name}/meetings/{meeting_id}/topic",
            put(set_meeting_topic),
        )
        .route(
            "/{course_name}/meetings/{meeting_id}/session",
            post(create_session),
        )
        .route(
            "/{course_name}/meetings/{meeting_id}/session/records",
            get(attendance::get::list_records),
        )
        .route(
            "/{course_name}/meetings/{meeting_id}/session/records/{nim}/face",
            get(attendance::get::get_face_evidence),
        )
        .route(
            "/{course_name}/meetings/{meeting_id}/session/records/{nim}/room",
            get(attendance::get::get_room_evidence),
        )
        .route_layer(from_fn(allow_lecturer));

    let student = Router::new()
        .route(
            "/{course_name}/meetings/{meeting_id}/session/present",
            post(attendance::post::mark_present),
        )
        .route(
            "/{course_name}/meetings/{meeting_id}/session/absent",
            post(attendance::post::mark_absent),
        )
        .route_layer(from_fn(allow_student));

    Router::new()
        .route("/", get(list_courses))
        .route("/{course_name}", get(get_course))
        .route(
            "/{course_name}/meetings/{meeting_id}/session",
            get(attendance::get::get_session),
        )
        .merge(lecturer)
        .merge(student)
}
