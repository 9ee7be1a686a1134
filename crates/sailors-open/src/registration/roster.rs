use std::io::Write;

use serde::Serialize;

use super::repository::RegistrationRecord;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("unable to encode roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to write roster: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct RosterRow<'a> {
    #[serde(rename = "Registration ID")]
    registration_id: &'a str,
    #[serde(rename = "Full Name")]
    full_name: &'a str,
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Market")]
    market: &'a str,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Categories")]
    categories: String,
    #[serde(rename = "Partner Name")]
    partner_name: &'a str,
    #[serde(rename = "Partner Email")]
    partner_email: &'a str,
    #[serde(rename = "Self-Reported Level")]
    self_reported_level: &'static str,
    #[serde(rename = "Suggested Level")]
    suggested_level: &'static str,
    #[serde(rename = "Submitted At")]
    submitted_at: String,
}

impl<'a> From<&'a RegistrationRecord> for RosterRow<'a> {
    fn from(record: &'a RegistrationRecord) -> Self {
        let draft = &record.draft;
        Self {
            registration_id: &record.registration_id.0,
            full_name: draft.full_name.trim(),
            email: draft.email.trim(),
            market: &draft.market,
            city: &draft.city,
            categories: draft.category_labels().join("; "),
            partner_name: draft.partner_name.trim(),
            partner_email: draft.partner_email.trim(),
            self_reported_level: draft
                .self_reported_level
                .map(|level| level.label())
                .unwrap_or_default(),
            suggested_level: record
                .assessment
                .suggested_level
                .map(|level| level.label())
                .unwrap_or_default(),
            submitted_at: record.submitted_at.to_rfc3339(),
        }
    }
}

/// Write organiser roster rows, one per registration, with a header line.
pub fn write_roster<W: Write>(records: &[RegistrationRecord], writer: W) -> Result<(), RosterError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    if records.is_empty() {
        csv_writer.write_record([
            "Registration ID",
            "Full Name",
            "Email",
            "Market",
            "City",
            "Categories",
            "Partner Name",
            "Partner Email",
            "Self-Reported Level",
            "Suggested Level",
            "Submitted At",
        ])?;
    }

    for record in records {
        csv_writer.serialize(RosterRow::from(record))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn roster_csv(records: &[RegistrationRecord]) -> Result<Vec<u8>, RosterError> {
    let mut buffer = Vec::new();
    write_roster(records, &mut buffer)?;
    Ok(buffer)
}
