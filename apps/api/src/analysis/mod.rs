pub mod orchestrator;
pub mod validator;
