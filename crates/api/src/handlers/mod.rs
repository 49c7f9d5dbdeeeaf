pub mod fact;
pub mod invitation;
pub mod layout;
pub mod media;
pub mod member;
pub mod relationship;
pub mod tree;
