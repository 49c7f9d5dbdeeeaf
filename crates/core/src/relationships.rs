//! Relationship-type vocabulary, gendered label derivation, and edge
//! routing rules.
//!
//! Labels are derived, never stored. The derivation is a pure function of
//! (type, from-member gender, to-member gender) and is invoked identically
//! whether rendering a member's relationship list or an edge's inline
//! label. The match is exhaustive over the enum so a new relationship type
//! cannot ship without a label rule.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Member gender. Drives node color-coding and gender-dependent
/// relationship labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
            Gender::Unknown => "UNKNOWN",
        }
    }

    /// Parse from the database `gender` column. Unknown strings map to
    /// `None` so callers can reject them at the validation boundary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            "OTHER" => Some(Gender::Other),
            "UNKNOWN" => Some(Gender::Unknown),
            _ => None,
        }
    }

    /// Display color (hex) for gender-coded nodes.
    pub fn display_color(self) -> &'static str {
        match self {
            Gender::Male => "#3b82f6",
            Gender::Female => "#ec4899",
            Gender::Other => "#a855f7",
            Gender::Unknown => "#6b7280",
        }
    }
}

// ---------------------------------------------------------------------------
// Relationship types
// ---------------------------------------------------------------------------

/// Directed, typed edge vocabulary between two members of the same tree.
///
/// Direction matters for the asymmetric types (parent-like edges point from
/// parent to child; `GODPARENT` from godparent to godchild).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    ParentChild,
    Spouse,
    Partner,
    ExSpouse,
    Sibling,
    HalfSibling,
    StepSibling,
    AdoptiveParent,
    FosterParent,
    Godparent,
}

/// All relationship types, in display order.
pub const ALL_RELATIONSHIP_TYPES: &[RelationshipType] = &[
    RelationshipType::ParentChild,
    RelationshipType::Spouse,
    RelationshipType::Partner,
    RelationshipType::ExSpouse,
    RelationshipType::Sibling,
    RelationshipType::HalfSibling,
    RelationshipType::StepSibling,
    RelationshipType::AdoptiveParent,
    RelationshipType::FosterParent,
    RelationshipType::Godparent,
];

impl RelationshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::ParentChild => "PARENT_CHILD",
            RelationshipType::Spouse => "SPOUSE",
            RelationshipType::Partner => "PARTNER",
            RelationshipType::ExSpouse => "EX_SPOUSE",
            RelationshipType::Sibling => "SIBLING",
            RelationshipType::HalfSibling => "HALF_SIBLING",
            RelationshipType::StepSibling => "STEP_SIBLING",
            RelationshipType::AdoptiveParent => "ADOPTIVE_PARENT",
            RelationshipType::FosterParent => "FOSTER_PARENT",
            RelationshipType::Godparent => "GODPARENT",
        }
    }

    /// Parse from the database `relationship_type` column.
    pub fn parse(s: &str) -> Option<Self> {
        ALL_RELATIONSHIP_TYPES
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
    }

    /// Lateral edges connect nodes side-to-side on the canvas; all other
    /// types attach top/bottom and define the layer hierarchy. Derived
    /// purely from the type, never stored.
    pub fn is_lateral(self) -> bool {
        matches!(
            self,
            RelationshipType::Spouse
                | RelationshipType::Partner
                | RelationshipType::ExSpouse
                | RelationshipType::Sibling
                | RelationshipType::HalfSibling
                | RelationshipType::StepSibling
        )
    }

    /// Default edge color (hex) used when the relationship has no custom
    /// color.
    pub fn default_color(self) -> &'static str {
        match self {
            RelationshipType::ParentChild => "#22c55e",
            RelationshipType::Spouse => "#f59e0b",
            RelationshipType::Partner => "#eab308",
            RelationshipType::ExSpouse => "#94a3b8",
            RelationshipType::Sibling => "#3b82f6",
            RelationshipType::HalfSibling => "#60a5fa",
            RelationshipType::StepSibling => "#93c5fd",
            RelationshipType::AdoptiveParent => "#10b981",
            RelationshipType::FosterParent => "#14b8a6",
            RelationshipType::Godparent => "#8b5cf6",
        }
    }
}

// ---------------------------------------------------------------------------
// Label derivation
// ---------------------------------------------------------------------------

/// Derive the display label for a relationship.
///
/// Parent-like types are gendered by the *from* member (the parent side);
/// `SIBLING` by the *to* member; the rest are fixed.
pub fn label(
    relationship_type: RelationshipType,
    from_gender: Gender,
    to_gender: Gender,
) -> &'static str {
    match relationship_type {
        RelationshipType::ParentChild => match from_gender {
            Gender::Male => "Father",
            Gender::Female => "Mother",
            Gender::Other | Gender::Unknown => "Parent",
        },
        RelationshipType::Spouse => "Spouse",
        RelationshipType::Partner => "Partner",
        RelationshipType::ExSpouse => "Ex-Spouse",
        RelationshipType::Sibling => match to_gender {
            Gender::Male => "Brother",
            Gender::Female => "Sister",
            Gender::Other | Gender::Unknown => "Sibling",
        },
        RelationshipType::HalfSibling => "Half-Sibling",
        RelationshipType::StepSibling => "Step-Sibling",
        RelationshipType::AdoptiveParent => match from_gender {
            Gender::Male => "Adoptive Father",
            Gender::Female => "Adoptive Mother",
            Gender::Other | Gender::Unknown => "Adoptive Parent",
        },
        RelationshipType::FosterParent => match from_gender {
            Gender::Male => "Foster Father",
            Gender::Female => "Foster Mother",
            Gender::Other | Gender::Unknown => "Foster Parent",
        },
        RelationshipType::Godparent => match from_gender {
            Gender::Male => "Godfather",
            Gender::Female => "Godmother",
            Gender::Other | Gender::Unknown => "Godparent",
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_child_labels_follow_from_gender() {
        assert_eq!(
            label(RelationshipType::ParentChild, Gender::Male, Gender::Female),
            "Father"
        );
        assert_eq!(
            label(RelationshipType::ParentChild, Gender::Female, Gender::Male),
            "Mother"
        );
        assert_eq!(
            label(RelationshipType::ParentChild, Gender::Unknown, Gender::Male),
            "Parent"
        );
        assert_eq!(
            label(RelationshipType::ParentChild, Gender::Other, Gender::Male),
            "Parent"
        );
    }

    #[test]
    fn test_sibling_labels_follow_to_gender() {
        assert_eq!(
            label(RelationshipType::Sibling, Gender::Female, Gender::Male),
            "Brother"
        );
        assert_eq!(
            label(RelationshipType::Sibling, Gender::Male, Gender::Female),
            "Sister"
        );
        assert_eq!(
            label(RelationshipType::Sibling, Gender::Male, Gender::Unknown),
            "Sibling"
        );
    }

    #[test]
    fn test_spouse_label_is_gender_independent() {
        for from in [Gender::Male, Gender::Female, Gender::Other, Gender::Unknown] {
            for to in [Gender::Male, Gender::Female, Gender::Other, Gender::Unknown] {
                assert_eq!(label(RelationshipType::Spouse, from, to), "Spouse");
            }
        }
    }

    #[test]
    fn test_gendered_prefix_labels() {
        assert_eq!(
            label(RelationshipType::AdoptiveParent, Gender::Male, Gender::Unknown),
            "Adoptive Father"
        );
        assert_eq!(
            label(RelationshipType::FosterParent, Gender::Female, Gender::Unknown),
            "Foster Mother"
        );
        assert_eq!(
            label(RelationshipType::Godparent, Gender::Other, Gender::Unknown),
            "Godparent"
        );
    }

    #[test]
    fn test_fixed_labels() {
        assert_eq!(
            label(RelationshipType::ExSpouse, Gender::Male, Gender::Female),
            "Ex-Spouse"
        );
        assert_eq!(
            label(RelationshipType::HalfSibling, Gender::Male, Gender::Male),
            "Half-Sibling"
        );
        assert_eq!(
            label(RelationshipType::StepSibling, Gender::Female, Gender::Female),
            "Step-Sibling"
        );
        assert_eq!(
            label(RelationshipType::Partner, Gender::Female, Gender::Male),
            "Partner"
        );
    }

    #[test]
    fn test_lateral_routing() {
        assert!(RelationshipType::Spouse.is_lateral());
        assert!(RelationshipType::Partner.is_lateral());
        assert!(RelationshipType::ExSpouse.is_lateral());
        assert!(RelationshipType::Sibling.is_lateral());
        assert!(RelationshipType::HalfSibling.is_lateral());
        assert!(RelationshipType::StepSibling.is_lateral());

        assert!(!RelationshipType::ParentChild.is_lateral());
        assert!(!RelationshipType::AdoptiveParent.is_lateral());
        assert!(!RelationshipType::FosterParent.is_lateral());
        assert!(!RelationshipType::Godparent.is_lateral());
    }

    #[test]
    fn test_type_round_trip() {
        for t in ALL_RELATIONSHIP_TYPES {
            assert_eq!(RelationshipType::parse(t.as_str()), Some(*t));
        }
        assert_eq!(RelationshipType::parse("COUSIN"), None);
        assert_eq!(RelationshipType::parse("parent_child"), None);
    }

    #[test]
    fn test_gender_round_trip() {
        for g in [Gender::Male, Gender::Female, Gender::Other, Gender::Unknown] {
            assert_eq!(Gender::parse(g.as_str()), Some(g));
        }
        assert_eq!(Gender::parse("male"), None);
    }

    #[test]
    fn test_every_type_has_a_default_color() {
        for t in ALL_RELATIONSHIP_TYPES {
            assert!(t.default_color().starts_with('#'));
        }
    }
}
