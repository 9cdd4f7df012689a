pub mod transcript;
pub mod gene;

pub use gene::Gene;
pub use transcript::Transcript;
