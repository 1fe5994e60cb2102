//! Mkvdex Process - Probing media files with external tools.
//!
//! Probing relies on `mediainfo` being installed on the system.

mod error;
mod mediainfo;

pub use error::{ProcessError, ProcessResult};
pub use mediainfo::{MediaInfoProber, Prober, DEFAULT_PROBE_TIMEOUT};

/// Check if the external tools are available.
pub fn check_dependencies(program: &str) -> Vec<(String, bool)> {
    vec![(program.to_string(), which::which(program).is_ok())]
}

/// Check if all required tools are installed.
pub fn all_tools_available(program: &str) -> bool {
    check_dependencies(program)
        .iter()
        .all(|(_, available)| *available)
}
