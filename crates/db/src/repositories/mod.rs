//! Repositories for database operations.

mod hidden_movie;
mod movie;
mod petition;
mod review;
mod user;

pub use hidden_movie::HiddenMovieRepository;
pub use movie::MovieRepository;
pub use petition::{PetitionRepository, PetitionVoteRepository, PetitionWithVotes};
pub use review::ReviewRepository;
pub use user::UserRepository;
