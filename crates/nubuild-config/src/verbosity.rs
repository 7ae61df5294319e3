/// Verbosity levels understood by the NuGet command line.
pub const VERBOSITIES: [&str; 3] = ["Normal", "Quiet", "Detailed"];

/// Returns true if `verbosity` is one of [`VERBOSITIES`].
///
/// Unknown values are still passed to NuGet as given; this is only used to warn about them.
pub fn is_known_verbosity(verbosity: &str) -> bool {
    VERBOSITIES.contains(&verbosity)
}

/// Returns the verbosity to pass to NuGet, or `None` when it is unset or empty.
pub fn effective_verbosity(verbosity: Option<&str>) -> Option<&str> {
    verbosity.filter(|v| !v.is_empty())
}
