// Library exports for integration tests and reusable components

pub mod decoder;
pub mod encryption;
pub mod import;
pub mod progress;
pub mod vault_client;
