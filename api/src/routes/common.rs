use crate::response::ApiResponse;
use axum::{
    Json,
    extract::ConnectInfo,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::net::SocketAddr;

/// Resolves the client's IP address: the first entry of `x-forwarded-for`
/// when present (the service normally sits behind a reverse proxy),
/// otherwise the peer address of the connection.
pub fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .unwrap_or_else(|| addr.ip().to_string())
}

#[derive(Serialize, Default)]
pub struct ClientIpResponse {
    pub ip: String,
}

/// GET /api/client-ip
///
/// Echoes the caller's resolved IP address. The attendance page uses this
/// to pre-check whether the campus WiFi path is worth offering.
pub async fn get_client_ip(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let ip = client_ip(&headers, addr);
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            ClientIpResponse { ip },
            "Client IP resolved",
        )),
    )
}
