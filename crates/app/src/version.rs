use std::fmt;

/// Build metadata stamped in by build.rs
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub crate_version: &'static str,
    pub version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        crate_version: env!("CARGO_PKG_VERSION"),
        version: env!("REPO_VERSION"),
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        rust_version: env!("RUST_VERSION"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weft {} ({}, {} build, {}, {})",
            self.crate_version,
            self.version,
            self.build_profile,
            self.build_timestamp,
            self.rust_version
        )
    }
}
