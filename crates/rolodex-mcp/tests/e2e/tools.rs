//! Tool behavior against a real Postgres table.

use super::common::*;
use serde_json::json;

pub async fn test_search_is_case_insensitive(ctx: &TestContext) {
    println!("  🧪 test_search_is_case_insensitive");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(&server, Some(ALICE), "search_network", json!({"query": "ADA"})).await;
    assert_eq!(names(&payload), vec![Some("Ada Lovelace".to_string())]);

    // Matches inside the `experiences` jsonb and `skills` array columns too.
    let (payload, _) = call(&server, Some(ALICE), "search_network", json!({"query": "compilers"})).await;
    assert_eq!(names(&payload), vec![Some("Grace Hopper".to_string())]);

    println!("     ✓ Substring search ignores case and reads every searchable column");
}

pub async fn test_search_orders_by_name_with_nulls_last(ctx: &TestContext) {
    println!("  🧪 test_search_orders_by_name_with_nulls_last");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(&server, Some(ALICE), "search_network", json!({"query": ""})).await;
    assert_eq!(
        names(&payload),
        vec![
            Some("Ada Lovelace".to_string()),
            Some("Charles O'Brien".to_string()),
            Some("Grace Hopper".to_string()),
            None,
        ]
    );

    let (payload, _) = call(
        &server,
        Some(ALICE),
        "search_network",
        json!({"query": "", "limit": 2}),
    )
    .await;
    assert_eq!(payload.as_array().unwrap().len(), 2);

    println!("     ✓ Results sorted by name and truncated to the limit");
}

pub async fn test_search_with_quotes_and_wildcards(ctx: &TestContext) {
    println!("  🧪 test_search_with_quotes_and_wildcards");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, is_error) =
        call(&server, Some(ALICE), "search_network", json!({"query": "O'Brien"})).await;
    assert!(!is_error);
    assert_eq!(names(&payload), vec![Some("Charles O'Brien".to_string())]);

    let (payload, is_error) = call(
        &server,
        Some(ALICE),
        "search_network",
        json!({"query": "' OR '1'='1"}),
    )
    .await;
    assert!(!is_error);
    assert_eq!(payload, json!([]));

    let (payload, _) = call(&server, Some(ALICE), "search_network", json!({"query": "%"})).await;
    assert_eq!(names(&payload), vec![Some("Charles O'Brien".to_string())]);

    let (payload, _) = call(&server, Some(ALICE), "search_network", json!({"query": "_"})).await;
    assert_eq!(payload, json!([]));

    println!("     ✓ Quotes and LIKE metacharacters match literally");
}

pub async fn test_profile_decodes_structured_fields(ctx: &TestContext) {
    println!("  🧪 test_profile_decodes_structured_fields");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(&server, Some(ALICE), "get_profile", json!({"name": "ada"})).await;
    assert_eq!(payload["full_name"], "Ada Lovelace");
    assert_eq!(payload["keywords"], json!(["math", "computing"]));
    assert_eq!(payload["experiences"][0]["company"], "Analytical Engines");
    assert!(payload["id"].is_string());

    println!("     ✓ Profile returns every column with decoded JSON values");
}

pub async fn test_filter_by_keywords(ctx: &TestContext) {
    println!("  🧪 test_filter_by_keywords");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(
        &server,
        Some(ALICE),
        "filter_by_keywords",
        json!({"keywords": ["computing"]}),
    )
    .await;
    assert_eq!(
        names(&payload),
        vec![Some("Ada Lovelace".to_string()), Some("Grace Hopper".to_string())]
    );

    let (payload, _) = call(
        &server,
        Some(ALICE),
        "filter_by_keywords",
        json!({"keywords": ["NAVY", "Rust"]}),
    )
    .await;
    assert_eq!(
        names(&payload),
        vec![Some("Charles O'Brien".to_string()), Some("Grace Hopper".to_string())]
    );

    let response = call_raw(
        &server,
        Some(ALICE),
        "filter_by_keywords",
        json!({"keywords": []}),
    )
    .await;
    assert_eq!(response.error.unwrap().code, -32602);

    println!("     ✓ Any-keyword match, case-insensitive; empty list rejected");
}

pub async fn test_analyze_network(ctx: &TestContext) {
    println!("  🧪 test_analyze_network");
    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    let (payload, _) = call(&server, Some(ALICE), "analyze_network", json!({})).await;
    assert_eq!(payload["overview"]["total_connections"], 4);
    assert_eq!(payload["overview"]["unique_companies"], 2);
    assert_eq!(
        payload["top_companies"],
        json!([
            {"current_company": "Analytical Engines", "count": 2},
            {"current_company": "US Navy", "count": 1}
        ])
    );
    assert_eq!(payload["top_keywords"][0], json!({"keyword": "computing", "count": 2}));
    let keywords: Vec<&str> = payload["top_keywords"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|k| k["keyword"].as_str())
        .collect();
    assert_eq!(keywords, vec!["computing", "math", "navy", "postgres", "rust"]);

    let (payload, _) = call(&server, Some(CAROL), "analyze_network", json!({})).await;
    assert_eq!(payload["overview"]["total_connections"], 0);
    assert_eq!(payload["top_keywords"], json!([]));

    println!("     ✓ Totals and rankings computed per tenant");
}

pub async fn test_filter_by_keywords_with_quotes(ctx: &TestContext) {
    println!("  🧪 test_filter_by_keywords_with_quotes");
    sqlx::query("INSERT INTO people (user_id, full_name, keywords) VALUES ($1, $2, $3)")
        .bind("dave-key")
        .bind("Dave O'Brien")
        .bind(r#"["O'Brien lab", "rust"]"#)
        .execute(&ctx.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO people (user_id, full_name, keywords) VALUES ($1, $2, $3)")
        .bind("dave-key")
        .bind("Eve Other")
        .bind(r#"["compilers"]"#)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let server = ctx.server(dir.path(), None);

    for tenant in [ALICE, "dave-key"] {
        let (payload, is_error) = call(
            &server,
            Some(tenant),
            "filter_by_keywords",
            json!({"keywords": ["x' OR '1'='1"]}),
        )
        .await;
        assert!(!is_error);
        assert_eq!(payload, json!([]));
    }

    let (payload, _) = call(
        &server,
        Some("dave-key"),
        "filter_by_keywords",
        json!({"keywords": ["O'Brien"]}),
    )
    .await;
    assert_eq!(names(&payload), vec![Some("Dave O'Brien".to_string())]);

    println!("     ✓ Keywords with quotes match literally");
}

pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📦 Tool Tests\n");
    test_search_is_case_insensitive(ctx).await;
    test_search_orders_by_name_with_nulls_last(ctx).await;
    test_search_with_quotes_and_wildcards(ctx).await;
    test_profile_decodes_structured_fields(ctx).await;
    test_filter_by_keywords(ctx).await;
    test_filter_by_keywords_with_quotes(ctx).await;
    test_analyze_network(ctx).await;
}
