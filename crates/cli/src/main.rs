//! fhir-cli: Interactive FHIR health-records demo.
//!
//! Searches patients by name against the configured FHIR server, then
//! retrieves and displays the complete medical record for a chosen patient.

mod record;

use std::io::Write;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fhir_client::{ClientConfig, FhirClient, QueryParams};
use fhir_core::{BundleView, summary};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    println!("Using FHIR server: {}", config.base_url);
    if config.client_id.is_some() {
        tracing::info!("JWT client-assertion authentication enabled");
    }

    let client = match FhirClient::new(config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to construct FHIR client: {}", err);
            std::process::exit(1);
        }
    };

    // A metadata failure is informational only; searches may still work.
    match client.capability_statement().await {
        Ok(_) => tracing::info!("Fetched server capability statement"),
        Err(err) => tracing::warn!("Could not fetch capability statement: {}", err),
    }

    let bar = "=".repeat(60);
    println!("{}", bar);
    println!("{:^60}", "FHIR INTERACTIVE HEALTH RECORDS");
    println!("{}", bar);
    println!("\nThis application retrieves medical data for patients from a FHIR server.");

    loop {
        let name = prompt("\nEnter patient name to search (or 'q' to quit): ");
        if name.eq_ignore_ascii_case("q") {
            println!("Exiting application.");
            break;
        }
        if name.is_empty() {
            println!("Please enter a valid name.");
            continue;
        }

        println!("\nSearching for patients named '{}'...", name);
        let params = QueryParams::new().set("name", &name).set("_count", 5);
        let bundle = match client.search_patients(params).await {
            Ok(bundle) => bundle,
            Err(err) => {
                eprintln!("Error searching patients: {}", err);
                continue;
            }
        };

        let results = BundleView::new(&bundle);
        if results.is_empty() {
            println!("No patients found with name '{}'.", name);
            println!("Try a different name (common test names: 'Smith', 'Jones', 'Patient')");
            continue;
        }

        println!("\nSearch Results:");
        for resource in results.resources() {
            let id = resource
                .get("id")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Unknown");
            println!("\nPatient ID: {}\n{}", id, summary::format_patient(resource));
        }

        let patient_id =
            prompt("\nEnter the Patient ID from the search results to view complete medical record: ");
        if patient_id.is_empty() {
            println!("No Patient ID provided. Returning to search.");
            continue;
        }

        println!("\nRetrieving complete medical record for Patient ID: {}", patient_id);
        let medical_record = record::MedicalRecord::fetch(&client, &patient_id).await;
        medical_record.display();

        let action = prompt("\nPress Enter to continue or 'q' to quit: ");
        if action.eq_ignore_ascii_case("q") {
            println!("Exiting application.");
            break;
        }
    }
}

/// Print `message` and read one trimmed line from stdin. EOF quits.
fn prompt(message: &str) -> String {
    print!("{}", message);
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => "q".to_string(),
        Ok(_) => line.trim().to_string(),
    }
}
