//! Business logic services.

#![allow(missing_docs)]

pub mod hidden_movie;
pub mod movie;
pub mod petition;
pub mod review;
pub mod user;

pub use hidden_movie::{HiddenMovieService, HideToggle};
pub use movie::{CreateMovieInput, MovieDetail, MovieService, ReviewWithAuthor};
pub use petition::{
    Ownership, PetitionInput, PetitionService, PetitionSummary, VoteOutcome,
};
pub use review::ReviewService;
pub use user::UserService;
