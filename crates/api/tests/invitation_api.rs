//! Integration tests for the invitation lifecycle.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_tree, delete_auth, get_auth, post_json, token_for};
use kintree_core::permissions::Role;
use kintree_db::repositories::MembershipRepo;
use serde_json::json;
use sqlx::PgPool;

const OWNER: i64 = 1;
const GUEST: i64 = 2;
const INTRUDER: i64 = 3;

async fn issue(
    app: &axum::Router,
    token: &str,
    tree_id: i64,
    role: &str,
) -> (i64, String) {
    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/invitations"),
        token,
        json!({ "role": role }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["id"].as_i64().unwrap(),
        json["token"].as_str().unwrap().to_string(),
    )
}

// ---------------------------------------------------------------------------
// Test: issue -> validate -> accept grants membership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn accept_grants_membership(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let owner = token_for(OWNER);
    let guest = token_for(GUEST);

    let tree_id = create_tree(&app, &owner, "Smiths").await;
    let (_, token) = issue(&app, &owner, tree_id, "EDITOR").await;

    // Public validation shows what the link grants, without auth.
    let response = common::get(app.clone(), &format!("/api/v1/invitations/{token}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "VALID");
    assert_eq!(json["tree_name"], "Smiths");
    assert_eq!(json["role"], "EDITOR");

    // Accepting creates the membership.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/invitations/{token}/accept"),
        &guest,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["tree_id"].as_i64().unwrap(), tree_id);
    assert_eq!(json["role"], "EDITOR");

    let membership = MembershipRepo::find_by_tree_and_user(&pool, tree_id, GUEST)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(membership.role_enum(), Role::Editor);

    // The tree now appears in the guest's shared list.
    let response = get_auth(app, "/api/v1/trees", &guest).await;
    let json = body_json(response).await;
    assert_eq!(json["shared"][0]["id"].as_i64().unwrap(), tree_id);
    assert_eq!(json["shared"][0]["role"], "EDITOR");
}

// ---------------------------------------------------------------------------
// Test: share links are derived from the token
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn issued_invitation_includes_share_links(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = token_for(OWNER);

    let tree_id = create_tree(&app, &owner, "Smiths").await;
    let response = post_json(
        app,
        &format!("/api/v1/trees/{tree_id}/invitations"),
        &owner,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    let token = json["token"].as_str().unwrap();
    let invite_url = json["share"]["invite_url"].as_str().unwrap();
    assert_eq!(
        invite_url,
        format!("http://localhost:5173/invite/{token}")
    );
    assert!(json["share"]["whatsapp_url"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/?text="));
    assert!(json["share"]["email_subject"]
        .as_str()
        .unwrap()
        .contains("Smiths"));
    // Default role and expiry applied.
    assert_eq!(json["role"], "VIEWER");
}

// ---------------------------------------------------------------------------
// Test: a token is single-use
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn token_is_single_use(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let owner = token_for(OWNER);
    let guest = token_for(GUEST);
    let intruder = token_for(INTRUDER);

    let tree_id = create_tree(&app, &owner, "T").await;
    let (_, token) = issue(&app, &owner, tree_id, "VIEWER").await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/invitations/{token}/accept"),
        &guest,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Second redemption is rejected and grants nothing.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/invitations/{token}/accept"),
        &intruder,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let membership = MembershipRepo::find_by_tree_and_user(&pool, tree_id, INTRUDER)
        .await
        .unwrap();
    assert!(membership.is_none());

    // Validation now reports the consumed state.
    let response = common::get(app, &format!("/api/v1/invitations/{token}")).await;
    let json = body_json(response).await;
    assert_eq!(json["status"], "CONSUMED");
}

// ---------------------------------------------------------------------------
// Test: role upgrades are monotonic
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn accept_never_downgrades_role(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let owner = token_for(OWNER);
    let guest = token_for(GUEST);

    let tree_id = create_tree(&app, &owner, "T").await;

    // Editor first.
    let (_, editor_token) = issue(&app, &owner, tree_id, "EDITOR").await;
    post_json(
        app.clone(),
        &format!("/api/v1/invitations/{editor_token}/accept"),
        &guest,
        json!({}),
    )
    .await;

    // A later VIEWER invitation must not demote.
    let (_, viewer_token) = issue(&app, &owner, tree_id, "VIEWER").await;
    let response = post_json(
        app,
        &format!("/api/v1/invitations/{viewer_token}/accept"),
        &guest,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["role"], "EDITOR");

    let membership = MembershipRepo::find_by_tree_and_user(&pool, tree_id, GUEST)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(membership.role_enum(), Role::Editor);
}

// ---------------------------------------------------------------------------
// Test: owners cannot accept invitations to their own tree
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_self_accept_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = token_for(OWNER);

    let tree_id = create_tree(&app, &owner, "T").await;
    let (_, token) = issue(&app, &owner, tree_id, "VIEWER").await;

    let response = post_json(
        app,
        &format!("/api/v1/invitations/{token}/accept"),
        &owner,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: revocation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn revoke_deletes_unconsumed_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = token_for(OWNER);
    let guest = token_for(GUEST);

    let tree_id = create_tree(&app, &owner, "T").await;

    // Unconsumed: revocable, and the token dies with it.
    let (id, token) = issue(&app, &owner, tree_id, "VIEWER").await;
    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/invitations/{id}"),
        &owner,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = common::get(app.clone(), &format!("/api/v1/invitations/{token}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Consumed: revocation conflicts, keeping the audit record.
    let (id, token) = issue(&app, &owner, tree_id, "VIEWER").await;
    post_json(
        app.clone(),
        &format!("/api/v1/invitations/{token}/accept"),
        &guest,
        json!({}),
    )
    .await;
    let response = delete_auth(
        app,
        &format!("/api/v1/trees/{tree_id}/invitations/{id}"),
        &owner,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: issuing is gated and validated
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn issuing_requires_invite_capability(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let owner = token_for(OWNER);
    let editor = token_for(GUEST);

    let tree_id = create_tree(&app, &owner, "T").await;
    MembershipRepo::create(&pool, tree_id, GUEST, Role::Editor)
        .await
        .unwrap();

    // Invite is owner-only under the capability table.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/invitations"),
        &editor,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Expiry bounds are enforced.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/trees/{tree_id}/invitations"),
        &owner,
        json!({ "expires_in_days": 45 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // So is the 254-character email cap.
    let response = post_json(
        app,
        &format!("/api/v1/trees/{tree_id}/invitations"),
        &owner,
        json!({ "email": format!("{}@example.com", "a".repeat(250)) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
