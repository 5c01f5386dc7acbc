//! Assembly and display of a patient's complete medical record.

use fhir_client::{Error, FhirClient, QueryParams};
use fhir_core::{BundleView, summary};
use serde_json::Value;

/// One formatted section per resource type.
pub struct MedicalRecord {
    pub patient: String,
    pub conditions: String,
    pub medications: String,
    pub observations: String,
    pub allergies: String,
}

impl MedicalRecord {
    /// Fetch every section concurrently. Failures are isolated: a section
    /// that errors renders its message instead of aborting the others.
    pub async fn fetch(client: &FhirClient, patient_id: &str) -> Self {
        let (patient, observations, conditions, medications, allergies) = tokio::join!(
            client.patient(patient_id),
            client.patient_observations(
                patient_id,
                QueryParams::new().set("_count", 15).set("_sort", "-date"),
            ),
            client.patient_conditions(
                patient_id,
                QueryParams::new()
                    .set("_count", 20)
                    .set("_sort", "-recorded-date"),
            ),
            client.patient_medications(
                patient_id,
                QueryParams::new().set("_count", 20).set("_sort", "-authored"),
            ),
            client.patient_allergies(patient_id, QueryParams::new().set("_count", 10)),
        );

        Self {
            patient: patient_section(patient),
            conditions: bundle_section(
                conditions,
                summary::format_condition,
                "No conditions found for this patient.",
            ),
            medications: bundle_section(
                medications,
                summary::format_medication_request,
                "No medications found for this patient.",
            ),
            observations: bundle_section(
                observations,
                summary::format_observation,
                "No observations found for this patient.",
            ),
            allergies: bundle_section(
                allergies,
                summary::format_allergy,
                "No allergies found for this patient.",
            ),
        }
    }

    /// Print the record in sections.
    pub fn display(&self) {
        let bar = "=".repeat(60);
        println!("\n{}", bar);
        println!("{:^60}", "PATIENT MEDICAL RECORD");
        println!("{}", bar);
        println!("\n[PATIENT INFORMATION]\n{}", self.patient);
        println!("\n{}\n[MEDICAL CONDITIONS]\n{}", bar, self.conditions);
        println!("\n{}\n[MEDICATIONS]\n{}", bar, self.medications);
        println!("\n{}\n[OBSERVATIONS]\n{}", bar, self.observations);
        println!("\n{}\n[ALLERGIES]\n{}", bar, self.allergies);
    }
}

fn patient_section(result: Result<Value, Error>) -> String {
    match result {
        Ok(resource) => summary::format_patient(&resource),
        Err(err) => format!("Unable to fetch patient information: {}", err),
    }
}

/// Render a search Bundle as joined per-resource summaries.
fn bundle_section(
    result: Result<Value, Error>,
    format: fn(&Value) -> String,
    empty_message: &str,
) -> String {
    let bundle = match result {
        Ok(bundle) => bundle,
        Err(err) => return format!("Error retrieving data: {}", err),
    };

    let lines: Vec<String> = BundleView::new(&bundle).resources().map(format).collect();
    if lines.is_empty() {
        empty_message.to_string()
    } else {
        lines.join("\n---\n")
    }
}
