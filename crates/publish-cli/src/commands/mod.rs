//! Command implementations for publish-cli

pub mod init;
pub mod publish;

pub use init::run_init;
pub use publish::run_publish;
