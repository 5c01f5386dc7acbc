//! Display-layer summaries for untyped FHIR resources.
//!
//! Every function is best-effort: missing or oddly shaped fields fall back
//! to an "Unknown ..." placeholder instead of failing, since the server
//! response is never validated upstream.

use serde_json::Value;

/// First `coding[*].display` of a CodeableConcept, falling back to `text`.
fn concept_display<'a>(concept: &'a Value) -> Option<&'a str> {
    concept
        .get("coding")
        .and_then(Value::as_array)
        .and_then(|codings| codings.first())
        .and_then(|coding| coding.get("display"))
        .and_then(Value::as_str)
        .or_else(|| concept.get("text").and_then(Value::as_str))
}

fn str_field<'a>(resource: &'a Value, field: &str) -> Option<&'a str> {
    resource.get(field).and_then(Value::as_str)
}

/// Quantity rendered as `value unit`, e.g. `72 beats/minute`.
fn quantity(q: &Value) -> Option<String> {
    let value = q.get("value")?;
    let unit = q.get("unit").and_then(Value::as_str).unwrap_or_default();
    Some(format!("{} {}", value, unit).trim_end().to_string())
}

/// One-block demographic summary of a Patient resource.
pub fn format_patient(patient: &Value) -> String {
    let name = patient
        .get("name")
        .and_then(Value::as_array)
        .and_then(|names| names.first())
        .map(|n| {
            let given = n
                .get("given")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            let family = n.get("family").and_then(Value::as_str).unwrap_or_default();
            format!("{} {}", given, family).trim().to_string()
        })
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let gender = str_field(patient, "gender").unwrap_or("Unknown");
    let birth_date = str_field(patient, "birthDate").unwrap_or("Unknown");

    let address = patient
        .get("address")
        .and_then(Value::as_array)
        .and_then(|addrs| addrs.first())
        .map(|addr| {
            let line = addr
                .get("line")
                .and_then(Value::as_array)
                .map(|lines| {
                    lines
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            let city = addr.get("city").and_then(Value::as_str).unwrap_or_default();
            let state = addr.get("state").and_then(Value::as_str).unwrap_or_default();
            let postal = addr
                .get("postalCode")
                .and_then(Value::as_str)
                .unwrap_or_default();
            [line, city.into(), format!("{} {}", state, postal).trim().into()]
                .into_iter()
                .filter(|part: &String| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "No address on file".to_string());

    format!(
        "Name: {}\nGender: {}\nBirth Date: {}\nAddress: {}",
        name, gender, birth_date, address
    )
}

/// One-line summary of an Observation: `code: value (date, status)`.
pub fn format_observation(observation: &Value) -> String {
    let code = observation
        .get("code")
        .and_then(concept_display)
        .unwrap_or("Unknown Test");

    let value = observation
        .get("valueQuantity")
        .and_then(quantity)
        .or_else(|| {
            observation
                .get("valueCodeableConcept")
                .and_then(concept_display)
                .map(str::to_string)
        })
        .or_else(|| str_field(observation, "valueString").map(str::to_string))
        .unwrap_or_else(|| "No value recorded".to_string());

    let date = str_field(observation, "effectiveDateTime").unwrap_or("Unknown Date");
    let status = str_field(observation, "status").unwrap_or("unknown");

    format!("{}: {} ({}, {})", code, value, date, status)
}

/// One-line summary of a Condition: `name (Status: ..., Onset: ...)`.
pub fn format_condition(condition: &Value) -> String {
    let name = condition
        .get("code")
        .and_then(concept_display)
        .unwrap_or("Unknown Condition");

    let status = condition
        .get("clinicalStatus")
        .and_then(Value::as_object)
        .and_then(|cs| cs.get("coding"))
        .and_then(Value::as_array)
        .and_then(|codings| codings.first())
        .and_then(|coding| coding.get("code"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let onset = str_field(condition, "onsetDateTime").unwrap_or("Unknown onset");

    format!("{} (Status: {}, Onset: {})", name, status, onset)
}

/// One-line summary of a MedicationRequest.
pub fn format_medication_request(request: &Value) -> String {
    let name = request
        .get("medicationCodeableConcept")
        .and_then(concept_display)
        .unwrap_or("Unknown Medication");

    let dosage = request
        .get("dosageInstruction")
        .and_then(Value::as_array)
        .and_then(|instructions| instructions.first())
        .and_then(|instruction| instruction.get("text"))
        .and_then(Value::as_str)
        .unwrap_or("No dosage information");

    let status = str_field(request, "status").unwrap_or("unknown");

    format!("{} (Dosage: {}, Status: {})", name, dosage, status)
}

/// One-line summary of an AllergyIntolerance.
pub fn format_allergy(allergy: &Value) -> String {
    let name = allergy
        .get("code")
        .and_then(concept_display)
        .unwrap_or("Unknown Allergen");

    let reaction = allergy
        .get("reaction")
        .and_then(Value::as_array)
        .and_then(|reactions| reactions.first())
        .and_then(|reaction| reaction.get("manifestation"))
        .and_then(Value::as_array)
        .and_then(|manifestations| manifestations.first())
        .and_then(concept_display)
        .unwrap_or("Unknown reaction");

    let criticality = str_field(allergy, "criticality").unwrap_or("unknown");

    format!(
        "{} (Reaction: {}, Criticality: {})",
        name, reaction, criticality
    )
}

/// Multi-line summary of an Immunization record.
pub fn format_immunization(immunization: &Value) -> String {
    let vaccine = immunization
        .get("vaccineCode")
        .and_then(concept_display)
        .unwrap_or("Unknown vaccine");

    let date = str_field(immunization, "occurrenceDateTime").unwrap_or("Unknown date");
    let status = str_field(immunization, "status").unwrap_or("unknown");

    let dose = immunization
        .get("doseQuantity")
        .and_then(quantity)
        .unwrap_or_else(|| "Dose information not available".to_string());

    format!(
        "{}\nDate: {}\nStatus: {}\nDose: {}",
        vaccine, date, status, dose
    )
}
