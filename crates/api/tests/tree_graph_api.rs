//! Integration tests for trees, members, relationships, and layout.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_member, create_tree, delete_auth, get_auth, patch_json, post_json, token_for,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: tree CRUD through the API
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn tree_lifecycle(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "Smiths").await;

    // Listed under owned with a zero member count.
    let response = get_auth(app.clone(), "/api/v1/trees", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["owned"].as_array().unwrap().len(), 1);
    assert_eq!(json["owned"][0]["member_count"], 0);
    assert_eq!(json["shared"].as_array().unwrap().len(), 0);

    // Rename and publish.
    let response = patch_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}"),
        &token,
        json!({ "name": "Smith Family", "is_public": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Smith Family");
    assert_eq!(json["is_public"], true);

    // Delete.
    let response = delete_auth(app.clone(), &format!("/api/v1/trees/{tree_id}"), &token, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/trees/{tree_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_tree_name_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let response = post_json(app, "/api/v1/trees", &token, json!({ "name": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// Values longer than their columns must be caught up front, not surface
// as database errors.
#[sqlx::test(migrations = "../db/migrations")]
async fn overlong_fields_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "T").await;
    let member_id = create_member(&app, &token, tree_id, "Ada", "FEMALE").await;

    // Tree name caps at 100 characters, the description at 500.
    let response = post_json(
        app.clone(),
        "/api/v1/trees",
        &token,
        json!({ "name": "n".repeat(101) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}"),
        &token,
        json!({ "description": "d".repeat(501) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // Places and occupations cap at 200 characters.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/members"),
        &token,
        json!({ "first_name": "Eve", "gender": "FEMALE", "birth_place": "p".repeat(201) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/members/{member_id}"),
        &token,
        json!({ "occupation": "o".repeat(201) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // Fact sources cap at 200 characters.
    let response = post_json(
        app,
        &format!("/api/v1/trees/{tree_id}/members/{member_id}/facts"),
        &token,
        json!({ "title": "Born", "content": "x", "source": "s".repeat(201) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: spouse relationship labels (scenario: Alice & Bob)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn spouse_label_is_symmetric(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "Smiths").await;
    let alice = create_member(&app, &token, tree_id, "Alice", "FEMALE").await;
    let bob = create_member(&app, &token, tree_id, "Bob", "MALE").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/relationships"),
        &token,
        json!({ "from_member_id": bob, "to_member_id": alice, "type": "SPOUSE" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["label"], "Spouse");
    assert_eq!(json["lateral"], true);

    // The label is "Spouse" from either member's perspective.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/members/{alice}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["relationships_to"][0]["label"], "Spouse");
    assert_eq!(json["relationships_to"][0]["counterpart"]["first_name"], "Bob");

    let response = get_auth(
        app,
        &format!("/api/v1/trees/{tree_id}/members/{bob}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["relationships_from"][0]["label"], "Spouse");
}

// ---------------------------------------------------------------------------
// Test: parent labels are gendered by the parent endpoint
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn parent_child_label_uses_parent_gender(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "Smiths").await;
    let bob = create_member(&app, &token, tree_id, "Bob", "MALE").await;
    let alice = create_member(&app, &token, tree_id, "Alice", "FEMALE").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/relationships"),
        &token,
        json!({ "from_member_id": bob, "to_member_id": alice, "type": "PARENT_CHILD" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    // Bob (male) is the parent endpoint, so the edge reads "Father"
    // regardless of which member it is viewed from.
    assert_eq!(json["label"], "Father");
    assert_eq!(json["lateral"], false);

    let response = get_auth(
        app,
        &format!("/api/v1/trees/{tree_id}/members/{alice}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["relationships_to"][0]["label"], "Father");
}

// ---------------------------------------------------------------------------
// Test: duplicate relationship triple is a conflict
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_relationship_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "T").await;
    let a = create_member(&app, &token, tree_id, "A", "UNKNOWN").await;
    let b = create_member(&app, &token, tree_id, "B", "UNKNOWN").await;

    let body = json!({ "from_member_id": a, "to_member_id": b, "type": "SIBLING" });
    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/relationships"),
        &token,
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/relationships"),
        &token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");

    // Self-relationships are rejected outright.
    let response = post_json(
        app,
        &format!("/api/v1/trees/{tree_id}/relationships"),
        &token,
        json!({ "from_member_id": a, "to_member_id": a, "type": "SIBLING" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: deleting a member cascades its relationships
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn member_delete_cascades_relationships(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "T").await;
    let a = create_member(&app, &token, tree_id, "A", "UNKNOWN").await;
    let b = create_member(&app, &token, tree_id, "B", "UNKNOWN").await;

    post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/relationships"),
        &token,
        json!({ "from_member_id": a, "to_member_id": b, "type": "SPOUSE" }),
    )
    .await;

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/members/{a}"),
        &token,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        app,
        &format!("/api/v1/trees/{tree_id}/relationships"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Test: bulk positions apply in-tree entries, skip foreign ids
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_positions_scoped_to_tree(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "Mine").await;
    let other_tree = create_tree(&app, &token, "Other").await;
    let mine = create_member(&app, &token, tree_id, "Mine", "UNKNOWN").await;
    let foreign = create_member(&app, &token, other_tree, "Foreign", "UNKNOWN").await;

    let response = patch_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/positions"),
        &token,
        json!({ "positions": [
            { "id": mine, "position_x": 10.0, "position_y": 20.0 },
            { "id": foreign, "position_x": 99.0, "position_y": 99.0 },
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["applied"], 1);
    assert!(json["positions"][mine.to_string()].is_object());
    assert!(json["positions"][foreign.to_string()].is_null());

    // The foreign member kept its NULL position.
    let response = get_auth(
        app,
        &format!("/api/v1/trees/{other_tree}/members/{foreign}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert!(json["position_x"].is_null());
}

// ---------------------------------------------------------------------------
// Test: auto-layout persists deterministic layered positions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn auto_layout_persists_layered_positions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "T").await;
    let parent = create_member(&app, &token, tree_id, "Parent", "FEMALE").await;
    let spouse = create_member(&app, &token, tree_id, "Spouse", "MALE").await;
    let child = create_member(&app, &token, tree_id, "Child", "UNKNOWN").await;

    for (from, to, kind) in [
        (parent, child, "PARENT_CHILD"),
        (parent, spouse, "SPOUSE"),
    ] {
        let response = post_json(
            app.clone(),
            &format!("/api/v1/trees/{tree_id}/relationships"),
            &token,
            json!({ "from_member_id": from, "to_member_id": to, "type": kind }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/layout"),
        &token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["applied"], 3);

    let positions = &first["positions"];
    let parent_y = positions[parent.to_string().as_str()]["y"].as_f64().unwrap();
    let spouse_y = positions[spouse.to_string().as_str()]["y"].as_f64().unwrap();
    let child_y = positions[child.to_string().as_str()]["y"].as_f64().unwrap();

    // Spouses share a layer; the child sits strictly below.
    assert_eq!(parent_y, spouse_y);
    assert!(child_y > parent_y);

    // Determinism: a second run yields identical coordinates.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/layout"),
        &token,
        json!({}),
    )
    .await;
    let second = body_json(response).await;
    assert_eq!(first["positions"], second["positions"]);

    // And the stored member rows now carry the computed positions.
    let response = get_auth(
        app,
        &format!("/api/v1/trees/{tree_id}/members/{child}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["position_y"].as_f64().unwrap(), child_y);
}

// ---------------------------------------------------------------------------
// Test: unpositioned members get placeholder display coordinates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn tree_detail_uses_placeholders_for_unpositioned_members(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);

    let tree_id = create_tree(&app, &token, "T").await;
    create_member(&app, &token, tree_id, "First", "UNKNOWN").await;
    create_member(&app, &token, tree_id, "Second", "UNKNOWN").await;

    let response = get_auth(app, &format!("/api/v1/trees/{tree_id}"), &token).await;
    let json = body_json(response).await;
    let members = json["members"].as_array().unwrap();

    assert!(members[0]["position_x"].is_null());
    assert_eq!(members[0]["display_x"].as_f64().unwrap(), 0.0);
    assert_eq!(members[1]["display_x"].as_f64().unwrap(), 200.0);
    assert_eq!(members[1]["display_y"].as_f64().unwrap(), 0.0);
}
