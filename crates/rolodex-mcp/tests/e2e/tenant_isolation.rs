//! Tenant isolation tests.
//!
//! Every tool must answer only from the rows owned by the credential attached
//! to the call, whichever transport-level value is configured as fallback.

use super::common::*;
use serde_json::json;

pub async fn test_search_is_scoped_to_caller(ctx: &TestContext) {
    println!("  🧪 test_search_is_scoped_to_caller");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (alice, _) = call(&server, Some(ALICE), "search_network", json!({"query": ""})).await;
    assert_eq!(alice.as_array().unwrap().len(), 4);

    let (bob, _) = call(&server, Some(BOB), "search_network", json!({"query": ""})).await;
    assert_eq!(names(&bob), vec![Some("Alan Turing".to_string())]);

    let (carol, is_error) = call(&server, Some(CAROL), "search_network", json!({"query": ""})).await;
    assert!(!is_error);
    assert_eq!(carol, json!([]));

    println!("     ✓ Each tenant sees only its own contacts");
}

pub async fn test_profile_of_other_tenant_not_found(ctx: &TestContext) {
    println!("  🧪 test_profile_of_other_tenant_not_found");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(&server, Some(ALICE), "get_profile", json!({"name": "Turing"})).await;
    assert_eq!(payload["status"], "not_found");

    let (payload, _) = call(&server, Some(BOB), "get_profile", json!({"name": "Turing"})).await;
    assert_eq!(payload["full_name"], "Alan Turing");

    println!("     ✓ Cross-tenant profile lookup blocked");
}

pub async fn test_header_credential_beats_fallback(ctx: &TestContext) {
    println!("  🧪 test_header_credential_beats_fallback");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), Some(BOB));

    let (fallback, _) = call(&server, None, "analyze_network", json!({})).await;
    assert_eq!(fallback["overview"]["total_connections"], 1);

    let (scoped, _) = call(&server, Some(ALICE), "analyze_network", json!({})).await;
    assert_eq!(scoped["overview"]["total_connections"], 4);

    println!("     ✓ Call credential takes precedence over fallback");
}

pub async fn test_missing_credential_rejected(ctx: &TestContext) {
    println!("  🧪 test_missing_credential_rejected");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let response = call_raw(&server, None, "search_network", json!({"query": ""})).await;
    let error = response.error.expect("missing credential is an error");
    assert_eq!(error.code, -32001);
    assert!(!error.message.contains(ALICE));

    println!("     ✓ Calls without any credential fail before touching the database");
}

pub async fn test_concurrent_tenants_do_not_mix(ctx: &TestContext) {
    println!("  🧪 test_concurrent_tenants_do_not_mix");
    let dir = tempfile::tempdir().unwrap();
    let server = std::sync::Arc::new(ctx.server(dir.path(), None));

    let mut handles = Vec::new();
    for i in 0..24 {
        let server = server.clone();
        let (credential, expected) = if i % 2 == 0 { (ALICE, 4) } else { (BOB, 1) };
        handles.push(tokio::spawn(async move {
            let (payload, _) =
                call(&server, Some(credential), "search_network", json!({"query": ""})).await;
            assert_eq!(payload.as_array().unwrap().len(), expected);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    println!("     ✓ Interleaved calls keep their own tenant");
}

pub async fn test_credential_with_quote_is_bound(ctx: &TestContext) {
    println!("  🧪 test_credential_with_quote_is_bound");
    sqlx::query("INSERT INTO people (user_id, full_name) VALUES ($1, $2)")
        .bind("o'malley-key")
        .bind("Quoted Tenant Contact")
        .execute(&ctx.pool)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(&server, Some("o'malley-key"), "search_network", json!({"query": ""})).await;
    assert_eq!(names(&payload), vec![Some("Quoted Tenant Contact".to_string())]);

    let (payload, _) = call(
        &server,
        Some("x' OR '1'='1"),
        "search_network",
        json!({"query": ""}),
    )
    .await;
    assert_eq!(payload, json!([]));

    println!("     ✓ Credentials are compared as bound values");
}

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📦 Tenant Isolation Tests\n");
    test_search_is_scoped_to_caller(ctx).await;
    test_profile_of_other_tenant_not_found(ctx).await;
    test_header_credential_beats_fallback(ctx).await;
    test_missing_credential_rejected(ctx).await;
    test_concurrent_tenants_do_not_mix(ctx).await;
    test_credential_with_quote_is_bound(ctx).await;
}
