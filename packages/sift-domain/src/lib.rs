pub mod candidate;
pub mod context;
pub mod fusion;
pub mod ordering;

pub use candidate::{Candidate, CandidateKey};
