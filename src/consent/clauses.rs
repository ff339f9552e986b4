//! Fixed wording of the informed consent document.

pub const TITLE: &str = "DOCUMENTO DE CONSENTIMIENTO INFORMADO Y TÉRMINOS DEL SERVICIO";

pub struct Clause {
    pub heading: &'static str,
    pub paragraphs: &'static [&'static str],
}

/// Clause 1 names the patient and the clinic, so it is built per document.
pub const DECLARATION_HEADING: &str = "1. DECLARACIÓN DEL PACIENTE";

pub fn declaration(patient_name: &str, clinic_name: &str) -> String {
    format!(
        "Yo, {patient_name}, declaro que he solicitado servicios de fisioterapia en {clinic_name}. \
         Entiendo que la fisioterapia implica el uso de medios físicos, terapia manual, ejercicio \
         terapéutico y/o agentes electrofísicos."
    )
}

/// Clauses 2 to 7.
pub const CLAUSES: &[Clause] = &[
    Clause {
        heading: "2. EXPLICACIÓN DEL PROCEDIMIENTO",
        paragraphs: &["Se me ha informado que, tras una valoración inicial, se diseñará un plan de \
            tratamiento que puede incluir: movilizaciones, masoterapia, electroterapia, ultrasonido, \
            láser, termoterapia y ejercicio terapéutico."],
    },
    Clause {
        heading: "3. RIESGOS Y BENEFICIOS",
        paragraphs: &["Entiendo los riesgos inherentes (dolor muscular temporal, hematomas leves, \
            irritación cutánea) y los beneficios esperados (mejora funcional, disminución del dolor)."],
    },
    Clause {
        heading: "4. REVOCACIÓN Y DERECHOS",
        paragraphs: &["Entiendo que puedo revocar este consentimiento médico en cualquier momento, \
            deteniendo el tratamiento clínico sin que ello afecte a mi atención futura."],
    },
    Clause {
        heading: "5. PROTECCIÓN DE DATOS",
        paragraphs: &["Autorizo el tratamiento de mis datos personales y de salud con fines \
            asistenciales y administrativos conforme a la ley vigente."],
    },
    Clause {
        heading: "6. CLÁUSULA DE PAQUETES, BONOS Y POLÍTICA DE CANCELACIÓN (IMPORTANTE)",
        paragraphs: &[
            "En caso de que el paciente decida adquirir un paquete o bono de sesiones de tratamiento \
             por adelantado para obtener un precio preferencial, acepta expresamente las siguientes \
             condiciones:",
            "• A) Intransferibilidad: Los paquetes de sesiones son personales e intransferibles. Bajo \
             ningún concepto podrán ser cedidos, donados, ni utilizados por familiares, amigos o \
             terceras personas distintas al paciente firmante.",
            "• B) No Reembolso por Abandono: Si el paciente decide unilateralmente no concluir su \
             tratamiento o abandona las sesiones restantes del paquete adquirido, no se realizarán \
             reembolsos económicos (ni totales ni parciales) por las sesiones no consumidas.",
        ],
    },
    Clause {
        heading: "7. VERACIDAD Y VALIDEZ DE FIRMA",
        paragraphs: &["Declaro que la información de mi historia clínica es verdadera. Acepto firmar \
            este documento mediante medios electrónicos, reconociendo que mi firma digital tiene plena \
            validez legal y vinculante igual a la manuscrita."],
    },
];

pub const ACCEPTANCE_HEADING: &str = "CONFIRMACIÓN Y ACEPTACIÓN";

pub const ACCEPTANCE: &str = "Habiendo leído la información médica y las condiciones administrativas \
    (incluyendo la política de no reembolso), OTORGO MI CONSENTIMIENTO.";

pub const SIGNATURE_CAPTION: &str = "Firma del Paciente / Tutor Legal";

/// Printed in place of a signature that could not be embedded.
pub const SIGNATURE_PLACEHOLDER: &str = "[Error al adjuntar firma]";
