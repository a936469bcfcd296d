//! Client for the external face-recognition service.
//!
//! The service exposes two endpoints: `/register-face` to enroll reference
//! photos for a student, and `/recognize-face` to match a captured photo
//! against the trained model. Its verdict is treated as untrusted input;
//! the eligibility gate re-checks the predicted label and confidence.

use reqwest::multipart::{Form, Part};
use services::eligibility::FaceMatch;
use util::config;

#[derive(Clone)]
pub struct FaceClient {
    http: reqwest::Client,
    base_url: String,
}

impl FaceClient {
    pub fn from_config() -> Self {
        Self::new(config::face_api_url())
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Submits a captured photo for recognition against `nim`'s enrollment.
    pub async fn recognize(&self, nim: &str, image: Vec<u8>) -> Result<FaceMatch, reqwest::Error> {
        let part = Part::bytes(image)
            .file_name("capture.jpg")
            .mime_str("image/jpeg")?;

        let form = Form::new()
            .text("nim", nim.to_owned())
            .part("image", part);

        self.http
            .post(format!("{}/recognize-face", self.base_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<FaceMatch>()
            .await
    }

    /// Enrolls reference photos for a student. All photos must be accepted
    /// for enrollment to count as successful.
    pub async fn enroll(&self, nim: &str, images: Vec<Vec<u8>>) -> Result<(), reqwest::Error> {
        for (i, image) in images.into_iter().enumerate() {
            let part = Part::bytes(image)
                .file_name(format!("face-{i}.jpg"))
                .mime_str("image/jpeg")?;

            let form = Form::new()
                .text("nim", nim.to_owned())
                .part("image", part);

            self.http
                .post(format!("{}/register-face", self.base_url))
                .multipart(form)
                .send()
                .await?
                .error_for_status()?;
        }
        Ok(())
    }
}
