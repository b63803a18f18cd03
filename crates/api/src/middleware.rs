/// Maps core errors to HTTP responses
pub mod error_handling;
/// Security headers added to every response
pub mod security;
