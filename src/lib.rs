// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod app;
pub mod config;
pub mod event;
pub mod llm;
pub mod protocol;
pub mod rag;
pub mod server;
pub mod session;
