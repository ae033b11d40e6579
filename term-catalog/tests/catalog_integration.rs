//! End-to-end catalog generation: profile, document, format and write.

mod common;

use std::sync::Arc;

use common::{orders_context, FaultyExecutor};
use tempfile::TempDir;
use term_catalog::catalog::Catalog;
use term_catalog::config::{CatalogConfig, OutputConfig};
use term_catalog::documentation::{CatalogDocumenter, DocumentationConfig, TemplateGenerator};
use term_catalog::formatters::{FormatterConfig, OutputFormat};
use term_catalog::metadata::InformationSchemaSource;
use term_catalog::output::write_catalog;
use term_catalog::profiling::ProfilingOrchestrator;
use term_catalog::warehouse::QueryExecutor;

async fn orders_catalog(executor: Arc<dyn QueryExecutor>) -> Catalog {
    let config = CatalogConfig::default();
    let orchestrator = ProfilingOrchestrator::builder(config.clone())
        .build()
        .unwrap();
    let metadata = InformationSchemaSource::new(executor.clone());
    let records = orchestrator
        .run(&*executor, &metadata, "public", &[])
        .await
        .unwrap();

    let documenter = CatalogDocumenter::new(Arc::new(TemplateGenerator), DocumentationConfig::default())
        .with_profiling_config(config.profiling);
    Catalog::new("public", documenter.document(records).await)
}

#[tokio::test]
async fn test_orders_catalog_json() {
    let catalog = orders_catalog(Arc::new(orders_context())).await;
    assert_eq!(catalog.entries.len(), 5);
    assert_eq!(catalog.summary.tables, 1);
    assert_eq!(catalog.summary.columns, 5);
    assert_eq!(catalog.summary.failed_columns, 0);

    let dir = TempDir::new().unwrap();
    let output = OutputConfig {
        directory: dir.path().to_path_buf(),
        ..Default::default()
    };
    let path = write_catalog(&catalog, &output, FormatterConfig::default()).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("final_data_dictionary_"));
    assert!(name.ends_with(".json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 5);

    let order_sk = &entries[0];
    assert_eq!(order_sk["table_name"], "ORDERS");
    assert_eq!(order_sk["column_name"], "ORDER_SK");
    assert_eq!(order_sk["column_role"], "primary_key");
    assert_eq!(order_sk["business_data_type"], "Identifier");
    assert_eq!(order_sk["sampling"]["mode"], "full");
    assert_eq!(order_sk["profile"]["kind"], "numeric");
    assert_eq!(
        order_sk["table_description"],
        "Records of orders with 5 columns, identified by ORDER_SK, measuring ORDER_AMOUNT."
    );
    assert_eq!(
        order_sk["column_description"],
        "Surrogate key ORDER_SK uniquely identifying each orders record."
    );

    let customer_sk = &entries[1];
    assert_eq!(
        customer_sk["column_description"],
        "Reference from orders to the related customer record via CUSTOMER_SK."
    );

    let status = &entries[3];
    assert_eq!(status["column_name"], "STATUS");
    assert_eq!(
        status["profile"]["sample_values"],
        serde_json::json!(["CLOSED", "OPEN", "SHIPPED"])
    );
    assert_eq!(
        status["column_description"],
        "Categorical attribute STATUS (CLOSED; OPEN; SHIPPED)."
    );
}

#[tokio::test]
async fn test_failed_profile_still_documented() {
    let executor = Arc::new(FaultyExecutor::new(orders_context()).failing_on("\"STATUS\""));
    let catalog = orders_catalog(executor).await;

    assert_eq!(catalog.entries.len(), 5);
    assert_eq!(catalog.summary.failed_columns, 1);
    let status = catalog
        .entries
        .iter()
        .find(|e| e.column_name() == "STATUS")
        .unwrap();
    assert!(status.record.profile.is_failed());
    assert_eq!(status.column_description, "Categorical attribute STATUS.");
}

#[tokio::test]
async fn test_markdown_catalog_file() {
    let catalog = orders_catalog(Arc::new(orders_context())).await;

    let dir = TempDir::new().unwrap();
    let output = OutputConfig {
        directory: dir.path().join("catalogs"),
        format: OutputFormat::Markdown,
        ..Default::default()
    };
    let path = write_catalog(&catalog, &output, FormatterConfig::default()).unwrap();
    assert_eq!(path.extension().unwrap(), "md");

    let markdown = std::fs::read_to_string(&path).unwrap();
    assert!(markdown.contains("# Data Catalog: public"));
    assert!(markdown.contains("## ORDERS"));
    assert!(markdown.contains("| ORDER_SK | Int64 | primary_key | Identifier |"));
    assert!(markdown.contains("CLOSED; OPEN; SHIPPED"));
}
