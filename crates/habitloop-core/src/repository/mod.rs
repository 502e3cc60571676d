//! Local-first repositories.
//!
//! Writes land in the SQLite cache first and are then pushed to the remote
//! store on a best-effort basis. Reads always come from the cache, exposed as
//! `watch` streams that are republished after every local write.

mod auth;
mod habits;
pub mod paths;
mod profile_picture;
mod quotes;

pub use auth::AuthRepository;
pub use habits::HabitRepository;
pub use profile_picture::ProfilePictureRepository;
pub use quotes::QuoteRepository;

#[cfg(test)]
mod tests;
