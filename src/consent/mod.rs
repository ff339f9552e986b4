//! Consent document generation.
//!
//! # Data Flow
//! ```text
//! ConsentForm (patient, practitioner, initials, signature)
//!     → clauses.rs (fixed wording)
//!     → layout.rs (cursor, wrapping, page breaks) + fonts.rs (metrics)
//!     → signature.rs (PNG → image XObject + soft mask)
//!     → PDF bytes
//! ```
//!
//! # Design Decisions
//! - A signature that cannot be embedded is replaced by placeholder text;
//!   the document is still produced
//! - Generation is synchronous and CPU-bound; async callers use a
//!   blocking task

pub mod clauses;
pub mod fonts;
pub mod layout;
pub mod signature;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

use crate::consent::fonts::Font;
use crate::consent::layout::{Align, Composer, TextStyle, MARGIN};

pub use signature::{Signature, SignatureError, SignatureImage};

const BODY_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 14.0;

const TITLE: TextStyle = TextStyle::new(TITLE_SIZE, Font::Bold, Align::Center);
const HEADING: TextStyle = TextStyle::new(BODY_SIZE, Font::Bold, Align::Left);
const HEADING_CENTERED: TextStyle = TextStyle::new(BODY_SIZE, Font::Bold, Align::Center);
const BODY: TextStyle = TextStyle::new(BODY_SIZE, Font::Regular, Align::Left);
const BODY_CENTERED: TextStyle = TextStyle::new(BODY_SIZE, Font::Regular, Align::Center);

/// The signature block moves to a fresh page below this height.
const SIGNATURE_BLOCK_HEIGHT: f32 = 150.0;
const SIGNATURE_BOX: (f32, f32) = (200.0, 60.0);

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("failed to write PDF: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Everything printed on a consent document.
#[derive(Debug, Clone)]
pub struct ConsentForm {
    pub clinic_name: String,
    /// Practitioner responsible for the treatment.
    pub responsible_name: String,
    pub patient_name: String,
    pub initials: String,
    pub signature: Option<Signature>,
    pub date: NaiveDate,
}

impl ConsentForm {
    /// A form dated today for the default clinic, without signature.
    pub fn new(
        patient_name: impl Into<String>,
        responsible_name: impl Into<String>,
        initials: impl Into<String>,
    ) -> Self {
        Self {
            clinic_name: "JessTherapy".to_string(),
            responsible_name: responsible_name.into(),
            patient_name: patient_name.into(),
            initials: initials.into(),
            signature: None,
            date: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_clinic(mut self, clinic_name: impl Into<String>) -> Self {
        self.clinic_name = clinic_name.into();
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// Render the consent document to PDF bytes.
pub fn generate(form: &ConsentForm) -> Result<Vec<u8>, ConsentError> {
    let mut page = Composer::new();

    page.text(clauses::TITLE, TITLE);
    page.space(10.0);
    page.text(&format!("CLÍNICA: {}", form.clinic_name), HEADING);
    page.text(&format!("RESPONSABLE SANITARIO: {}", form.responsible_name), HEADING);
    page.space(10.0);

    page.text(clauses::DECLARATION_HEADING, HEADING);
    page.text(&clauses::declaration(&form.patient_name, &form.clinic_name), BODY);
    page.space(5.0);

    let last = clauses::CLAUSES.len() - 1;
    for (i, clause) in clauses::CLAUSES.iter().enumerate() {
        page.text(clause.heading, HEADING);
        for paragraph in clause.paragraphs {
            page.text(paragraph, BODY);
        }
        page.space(if i == last { 10.0 } else { 5.0 });
    }

    page.text(clauses::ACCEPTANCE_HEADING, HEADING_CENTERED);
    page.text(clauses::ACCEPTANCE, BODY_CENTERED);
    page.space(20.0);

    page.keep_room(SIGNATURE_BLOCK_HEIGHT);
    let line_y = page.cursor() - SIGNATURE_BOX.1;
    if let Some(signature) = &form.signature {
        if let Err(err) = embed_signature(&mut page, signature, line_y) {
            warn!(error = %err, "Could not embed signature, using placeholder");
            page.text(clauses::SIGNATURE_PLACEHOLDER, BODY);
        }
    }
    page.line((MARGIN, line_y), (MARGIN + SIGNATURE_BOX.0, line_y), 1.0);

    page.space(75.0);
    page.text(clauses::SIGNATURE_CAPTION, HEADING);
    page.text(&format!("Nombre Completo: {}", form.patient_name), BODY);
    page.text(&format!("Iniciales: {}", form.initials), BODY);
    page.text(&format!("Fecha: {}", form.date.format("%d/%m/%Y")), BODY);

    Ok(page.finish("Consentimiento informado")?)
}

fn embed_signature(page: &mut Composer, signature: &Signature, bottom: f32) -> Result<(), SignatureError> {
    let image = signature.decode()?;
    page.image(&image, (MARGIN, bottom), SIGNATURE_BOX)?;
    Ok(())
}
