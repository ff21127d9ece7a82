pub mod http;
pub mod orchestrator;
