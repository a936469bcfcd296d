use crate::services::face::FaceClient;
use crate::services::geocode::GeocodeClient;
use sea_orm::DatabaseConnection;
use services::attempts::AttemptTracker;
use services::geofence::Geofence;
use std::sync::Arc;

/// Shared application state handed to every route handler.
///
/// Cloning is cheap: the database connection and HTTP clients are internally
/// reference-counted, and the geofence and attempt tracker are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    geofence: Arc<Geofence>,
    attempts: Arc<AttemptTracker>,
    face: FaceClient,
    geocode: GeocodeClient,
}

impl AppState {
    /// Builds the state with the geofence and external clients taken from
    /// configuration.
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_clients(
            db,
            Geofence::from_config(),
            FaceClient::from_config(),
            GeocodeClient::from_config(),
        )
    }

    /// Builds the state with explicit collaborators. Used by tests to point
    /// the clients at stub endpoints.
    pub fn with_clients(
        db: DatabaseConnection,
        geofence: Geofence,
        face: FaceClient,
        geocode: GeocodeClient,
    ) -> Self {
        Self {
            db,
            geofence: Arc::new(geofence),
            attempts: Arc::new(AttemptTracker::new()),
            face,
            geocode,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn geofence(&self) -> &Geofence {
        &self.geofence
    }

    pub fn attempts(&self) -> &AttemptTracker {
        &self.attempts
    }

    pub fn face(&self) -> &FaceClient {
        &self.face
    }

    pub fn geocode(&self) -> &GeocodeClient {
        &self.geocode
    }
}
