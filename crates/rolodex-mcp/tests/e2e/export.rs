//! Export tests: inline rendering, persisted artifacts, regeneration.

use super::common::*;
use serde_json::json;

pub async fn test_inline_csv_export(ctx: &TestContext) {
    println!("  🧪 test_inline_csv_export");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(&server, Some(ALICE), "export_network", json!({})).await;
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["format"], "csv");
    assert_eq!(payload["row_count"], 4);

    let content = payload["content"].as_str().unwrap();
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    assert_eq!(reader.records().count(), 4);
    assert!(content.contains("Charles O'Brien"));
    assert!(!content.contains("Alan Turing"));
    // CSV keeps the full `about` text.
    assert!(content.contains("could do far more than arithmetic."));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    println!("     ✓ Inline CSV carries every contact of the tenant only");
}

pub async fn test_file_export_is_keyed_by_fingerprint(ctx: &TestContext) {
    println!("  🧪 test_file_export_is_keyed_by_fingerprint");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(
        &server,
        Some(ALICE),
        "export_network",
        json!({"format": "table", "destination": "file", "file_name": "../../team"}),
    )
    .await;
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["file_name"], "team.md");
    assert_eq!(
        payload["download_url"],
        "https://rolodex.test/exports/team.md"
    );

    let tenant_dir = dir.path().join(tenant(ALICE).fingerprint());
    let written = std::fs::read_to_string(tenant_dir.join("team.md")).unwrap();
    assert!(written.starts_with("| Name"));
    assert!(written.contains("Ada Lovelace"));
    assert!(!written.contains(ALICE));

    let (bob, _) = call(
        &server,
        Some(BOB),
        "export_network",
        json!({"destination": "file"}),
    )
    .await;
    assert_eq!(bob["file_name"], "network.csv");
    assert!(
        dir.path()
            .join(tenant(BOB).fingerprint())
            .join("network.csv")
            .exists()
    );
    assert!(!tenant_dir.join("network.csv").exists());

    println!("     ✓ Artifacts land in the caller's own directory");
}

pub async fn test_empty_network_export(ctx: &TestContext) {
    println!("  🧪 test_empty_network_export");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, is_error) = call(
        &server,
        Some(CAROL),
        "export_network",
        json!({"destination": "file"}),
    )
    .await;
    assert!(!is_error);
    assert_eq!(payload["status"], "empty");
    assert_eq!(payload["row_count"], 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    println!("     ✓ Empty network writes nothing");
}

pub async fn test_missing_artifact_is_regenerated(ctx: &TestContext) {
    println!("  🧪 test_missing_artifact_is_regenerated");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let artifact = server
        .executor()
        .retrieve_artifact(&tenant(BOB), "bob.csv")
        .await
        .unwrap()
        .expect("bob has contacts");
    let content = String::from_utf8(artifact.content).unwrap();
    assert!(content.contains("Alan Turing"));

    let missing = server
        .executor()
        .retrieve_artifact(&tenant(CAROL), "carol.csv")
        .await
        .unwrap();
    assert!(missing.is_none());

    println!("     ✓ Download regenerates from the tenant's current rows");
}

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📦 Export Tests\n");
    test_inline_csv_export(ctx).await;
    test_file_export_is_keyed_by_fingerprint(ctx).await;
    test_empty_network_export(ctx).await;
    test_missing_artifact_is_regenerated(ctx).await;
}
