//! Render a consent document from the command line.
//!
//! ```text
//! consent-pdf --patient "Ana Pérez" --responsible "Jess Gómez" --initials AP \
//!     --signature firma.png --out consentimiento.pdf
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use clinic_gateway::config::ObservabilityConfig;
use clinic_gateway::consent::{self, ConsentForm, Signature};
use clinic_gateway::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "consent-pdf")]
#[command(about = "Render an informed consent document as PDF", long_about = None)]
struct Cli {
    #[arg(long)]
    patient: String,

    /// Practitioner responsible for the treatment.
    #[arg(long)]
    responsible: String,

    #[arg(long)]
    initials: String,

    /// PNG file with the handwritten signature.
    #[arg(long)]
    signature: Option<PathBuf>,

    #[arg(long, default_value = "JessTherapy")]
    clinic: String,

    /// Document date (YYYY-MM-DD); today when omitted.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(short, long, default_value = "consentimiento.pdf")]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&ObservabilityConfig::default());

    let mut form = ConsentForm::new(cli.patient, cli.responsible, cli.initials).with_clinic(cli.clinic);
    if let Some(path) = &cli.signature {
        form = form.with_signature(Signature::Png(std::fs::read(path)?));
    }
    if let Some(date) = cli.date {
        form = form.with_date(date);
    }

    let pdf = consent::generate(&form)?;
    std::fs::write(&cli.out, &pdf)?;
    println!("Wrote {} ({} bytes)", cli.out.display(), pdf.len());
    Ok(())
}
