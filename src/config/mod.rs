/// Configuration subsystem - editing behaviour settings
///
/// Loads .docenginerc files into a DocConfig that documents are created
/// with.

pub mod rc;

// Re-export public interface
pub use rc::{ConfigError, DocConfig, RcLoader};
