//! Consent document endpoint.
//!
//! `POST /documents/consent` takes the form fields as JSON and answers
//! with the rendered PDF.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::ConsentConfig;
use crate::consent::{self, ConsentForm, Signature};

pub const CONSENT_PATH: &str = "/documents/consent";

const PDF_FILENAME: &str = "consentimiento.pdf";

#[derive(Debug, Clone, Deserialize)]
pub struct ConsentRequest {
    pub patient_name: String,
    pub responsible_name: String,
    pub initials: String,
    /// `data:image/png;base64,...` as produced by a signature pad.
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ConsentRequest {
    fn into_form(self, clinic_name: &str) -> ConsentForm {
        let mut form = ConsentForm::new(self.patient_name, self.responsible_name, self.initials)
            .with_clinic(clinic_name);
        if let Some(data_url) = self.signature.filter(|s| !s.is_empty()) {
            form = form.with_signature(Signature::DataUrl(data_url));
        }
        if let Some(date) = self.date {
            form = form.with_date(date);
        }
        form
    }
}

#[derive(Debug, Serialize)]
struct DocumentFailure {
    error: &'static str,
    details: String,
}

fn failure(details: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(DocumentFailure {
            error: "Document generation failed",
            details,
        }),
    )
        .into_response()
}

pub async fn consent_document(
    State(config): State<Arc<ConsentConfig>>,
    Json(request): Json<ConsentRequest>,
) -> Response {
    let form = request.into_form(&config.clinic_name);
    let signed = form.signature.is_some();

    let rendered = tokio::task::spawn_blocking(move || consent::generate(&form)).await;
    match rendered {
        Ok(Ok(pdf)) => {
            info!(bytes = pdf.len(), signed, "Consent document generated");
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{PDF_FILENAME}\""),
                    ),
                ],
                pdf,
            )
                .into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "Consent document generation failed");
            failure(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Consent document task failed");
            failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: ConsentRequest = serde_json::from_str(
            r#"{"patient_name":"Ana","responsible_name":"Jess","initials":"A"}"#,
        )
        .unwrap();
        let form = request.into_form("Clinica Sur");
        assert_eq!(form.clinic_name, "Clinica Sur");
        assert!(form.signature.is_none());
    }

    #[test]
    fn test_empty_signature_is_ignored() {
        let request: ConsentRequest = serde_json::from_str(
            r#"{"patient_name":"Ana","responsible_name":"Jess","initials":"A",
                "signature":"","date":"2025-01-02"}"#,
        )
        .unwrap();
        let form = request.into_form("X");
        assert!(form.signature.is_none());
        assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }
}
