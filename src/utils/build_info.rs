//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// One-line version string for `--version`.
pub fn version_line() -> String {
    format!("banana-runner {} ({})", BUILD_DATE, BUILD_COMMIT)
}
