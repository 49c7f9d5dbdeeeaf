//! Tree-level access resolution against the database.
//!
//! Every tree-scoped handler goes through [`require_capability`] before
//! touching any data. A tree that does not exist and a private tree the
//! caller cannot see produce the same NotFound response, so probing ids
//! reveals nothing.

use kintree_core::error::CoreError;
use kintree_core::permissions::{self, Capability, TreeAccess, TreeAccessFacts};
use kintree_core::types::DbId;
use kintree_db::models::tree::FamilyTree;
use kintree_db::repositories::{MembershipRepo, TreeRepo};
use sqlx::PgPool;

use crate::error::AppError;

/// Load the tree and the caller's membership, then run the pure
/// resolution. Missing trees resolve to denied access.
pub async fn resolve_access(
    pool: &PgPool,
    tree_id: DbId,
    user_id: DbId,
) -> Result<(Option<FamilyTree>, TreeAccess), AppError> {
    let Some(tree) = TreeRepo::find_by_id(pool, tree_id).await? else {
        return Ok((None, TreeAccess::denied()));
    };

    let membership = MembershipRepo::find_by_tree_and_user(pool, tree_id, user_id).await?;
    let facts = TreeAccessFacts {
        owner_id: tree.owner_id,
        membership_role: membership.map(|m| m.role_enum()),
        is_public: tree.is_public,
    };
    let access = permissions::resolve(&facts, user_id);
    Ok((Some(tree), access))
}

/// Gate a handler on one capability. Returns the tree and resolved access
/// on success.
///
/// Denied access is reported as NotFound rather than Forbidden when the
/// caller has no visibility at all; Forbidden is reserved for callers who
/// can see the tree but lack the capability.
pub async fn require_capability(
    pool: &PgPool,
    tree_id: DbId,
    user_id: DbId,
    capability: Capability,
) -> Result<(FamilyTree, TreeAccess), AppError> {
    let (tree, access) = resolve_access(pool, tree_id, user_id).await?;

    let Some(tree) = tree else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Tree",
            id: tree_id,
        }));
    };

    if !access.has_access {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Tree",
            id: tree_id,
        }));
    }

    if !access.can(capability) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "You do not have {} permission on this tree",
            capability_name(capability)
        ))));
    }

    Ok((tree, access))
}

fn capability_name(capability: Capability) -> &'static str {
    match capability {
        Capability::View => "view",
        Capability::Edit => "edit",
        Capability::Delete => "delete",
        Capability::ManageMembers => "manage members",
        Capability::Invite => "invite",
    }
}
