//! Database entities.

#![allow(missing_docs)]

pub mod hidden_movie;
pub mod movie;
pub mod petition;
pub mod petition_vote;
pub mod review;
pub mod user;

pub use hidden_movie::Entity as HiddenMovie;
pub use movie::Entity as Movie;
pub use petition::Entity as Petition;
pub use petition_vote::Entity as PetitionVote;
pub use review::Entity as Review;
pub use user::Entity as User;
