//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod audio_clip_repo;
pub mod document_repo;
pub mod fact_repo;
pub mod invitation_repo;
pub mod member_repo;
pub mod membership_repo;
pub mod photo_repo;
pub mod relationship_repo;
pub mod tree_repo;

pub use audio_clip_repo::AudioClipRepo;
pub use document_repo::DocumentRepo;
pub use fact_repo::FactRepo;
pub use invitation_repo::InvitationRepo;
pub use member_repo::MemberRepo;
pub use membership_repo::MembershipRepo;
pub use photo_repo::PhotoRepo;
pub use relationship_repo::RelationshipRepo;
pub use tree_repo::TreeRepo;
