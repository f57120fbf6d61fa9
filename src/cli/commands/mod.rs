//! CLI command implementations
//!
//! Each command returns the process exit code:
//! 0 success, 2 configuration error, 3 run lock held,
//! 4 service initialisation failure, 5 fatal run failure, 130 interrupted.

pub mod enrich;
pub mod init;
pub mod status;
pub mod validate;
