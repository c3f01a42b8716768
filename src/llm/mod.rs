pub mod client;
pub mod extract;
pub mod prompt;
