//! Email service for attendance notifications.
//!
//! Sends a confirmation email after a presence record has been written,
//! using SMTP over Gmail via the `lettre` crate. Sending is fire-and-forget
//! from the caller's perspective: a failed send is logged and never rolls
//! back the record.

use lettre::{
    AsyncTransport, Tokio1Executor,
    message::{Message, MultiPart, SinglePart, header},
    transport::smtp::{AsyncSmtpTransport, authentication::Credentials},
};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use once_cell::sync::Lazy;
use util::config;

/// Global SMTP client instance configured for Gmail.
///
/// Initialized lazily on first use from configuration. The client uses TLS
/// on port 587 and authenticated submission.
static SMTP_CLIENT: Lazy<AsyncSmtpTransport<Tokio1Executor>> = Lazy::new(|| {
    let username = config::gmail_username();
    let password = config::gmail_app_password();

    let tls_parameters =
        TlsParameters::new("smtp.gmail.com".to_string()).expect("Failed to create TLS parameters");

    AsyncSmtpTransport::<Tokio1Executor>::relay("smtp.gmail.com")
        .expect("Failed to create SMTP transport")
        .port(587)
        .tls(Tls::Required(tls_parameters))
        .credentials(Credentials::new(username, password))
        .build()
});

/// Service for handling email-related operations.
pub struct EmailService;

impl EmailService {
    /// Sends a presence confirmation email to a student.
    ///
    /// The email names the course, the meeting, and the recorded time, and
    /// links to the post-attendance feedback form.
    pub async fn send_presence_email(
        to_email: &str,
        student_name: &str,
        course_name: &str,
        meeting_label: &str,
        recorded_at: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let from_email = config::gmail_username();
        let from_name = config::email_from_name();
        let feedback_url = config::feedback_form_url();

        let email = Message::builder()
            .from(format!("{} <{}>", from_name, from_email).parse()?)
            .to(to_email.parse()?)
            .subject(format!("Presensi Berhasil - {}", course_name))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(format!(
                                "Halo {student_name},\n\n\
                                Presensi Anda untuk {course_name} ({meeting_label}) \
                                pada {recorded_at} telah tercatat.\n\n\
                                Mohon isi form umpan balik perkuliahan berikut:\n\
                                {feedback_url}\n\n\
                                Terima kasih,\n\
                                {from_name}"
                            )),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<!DOCTYPE html>
                                <html>
                                <head>
                                    <style>
                                        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
                                        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
                                        .button {{
                                            display: inline-block;
                                            padding: 10px 20px;
                                            background-color: #007bff;
                                            color: #ffffff !important;
                                            text-decoration: none;
                                            border-radius: 5px;
                                            margin: 20px 0;
                                            font-weight: bold;
                                        }}
                                    </style>
                                </head>
                                <body>
                                    <div class="container">
                                        <h2>Presensi Berhasil</h2>
                                        <p>Halo {student_name},</p>
                                        <p>Presensi Anda untuk <strong>{course_name}</strong> ({meeting_label}) pada {recorded_at} telah tercatat.</p>
                                        <p>Mohon isi form umpan balik perkuliahan berikut:</p>
                                        <a href="{feedback_url}" class="button">Isi Form Umpan Balik</a>
                                        <p>Terima kasih,<br>{from_name}</p>
                                    </div>
                                </body>
                                </html>"#
                            )),
                    ),
            )?;

        SMTP_CLIENT.send(email).await?;
        Ok(())
    }
}
