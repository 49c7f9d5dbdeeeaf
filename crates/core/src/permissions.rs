//! Role and capability model for tree access.
//!
//! This module lives in `core` (zero internal deps) so the repository layer
//! and the HTTP handlers resolve access through the same fixed table.
//!
//! Resolution order (first match wins): tree owner, then an explicit
//! membership row, then public visibility (view only, no role), then no
//! access. The role-to-capability mapping is a fixed lookup, not dispatch:
//! there are only three roles and five capabilities.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// A role a user can hold on a tree.
///
/// Ordered: `Viewer < Editor < Owner`. Invitation accepts never downgrade
/// an existing membership, so the ordering is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Viewer,
    Editor,
    Owner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "VIEWER",
            Role::Editor => "EDITOR",
            Role::Owner => "OWNER",
        }
    }

    /// Parse from the database `role` column.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "VIEWER" => Some(Role::Viewer),
            "EDITOR" => Some(Role::Editor),
            "OWNER" => Some(Role::Owner),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// An atomic permission on a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read the tree, its members, relationships, and attachments.
    View,
    /// Edit tree-level settings and reposition nodes.
    Edit,
    /// Delete the whole tree.
    Delete,
    /// Add/edit/delete members and relationships, upload media.
    ManageMembers,
    /// Issue and revoke invitations.
    Invite,
}

/// Fixed role-to-capability table.
///
/// EDITOR can manage members (people, relationships, media) and edit, but
/// cannot delete the tree or invite. VIEWER is read-only.
pub fn capabilities_for(role: Role) -> &'static [Capability] {
    match role {
        Role::Owner => &[
            Capability::View,
            Capability::Edit,
            Capability::Delete,
            Capability::ManageMembers,
            Capability::Invite,
        ],
        Role::Editor => &[Capability::View, Capability::Edit, Capability::ManageMembers],
        Role::Viewer => &[Capability::View],
    }
}

// ---------------------------------------------------------------------------
// Access resolution
// ---------------------------------------------------------------------------

/// The facts about a tree that access resolution depends on.
///
/// `resolve` is a pure function of this struct and the caller's user id --
/// no hidden state.
#[derive(Debug, Clone, Copy)]
pub struct TreeAccessFacts {
    pub owner_id: DbId,
    /// The caller's membership role on the tree, if a membership row exists.
    pub membership_role: Option<Role>,
    pub is_public: bool,
}

/// Resolved access for one (tree, user) pair.
#[derive(Debug, Clone, Serialize)]
pub struct TreeAccess {
    pub has_access: bool,
    /// `None` for public-visibility access and for no access.
    pub role: Option<Role>,
    pub capabilities: Vec<Capability>,
}

impl TreeAccess {
    pub fn denied() -> Self {
        TreeAccess {
            has_access: false,
            role: None,
            capabilities: Vec::new(),
        }
    }

    fn with_role(role: Role) -> Self {
        TreeAccess {
            has_access: true,
            role: Some(role),
            capabilities: capabilities_for(role).to_vec(),
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Resolve a user's access to a tree. First match wins:
///
/// 1. owner field equals the user -> OWNER
/// 2. membership row -> its role
/// 3. public tree -> view only, no role
/// 4. otherwise -> no access
pub fn resolve(facts: &TreeAccessFacts, user_id: DbId) -> TreeAccess {
    if facts.owner_id == user_id {
        return TreeAccess::with_role(Role::Owner);
    }
    if let Some(role) = facts.membership_role {
        return TreeAccess::with_role(role);
    }
    if facts.is_public {
        return TreeAccess {
            has_access: true,
            role: None,
            capabilities: vec![Capability::View],
        };
    }
    TreeAccess::denied()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
