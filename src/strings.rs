//! Display strings shown in the grid and its tooltips.

pub const MISSING_DATA: &str = "-";
pub const UNKNOWN_VERSION: &str = "Unknown";
pub const NOT_MONITORED: &str = "Not monitored";

pub const NO_DATA_IN_WORKSPACE: &str =
    "No health data was reported for this cluster to workspace '{0}' in the last query window.";
pub const QUERY_FAILED: &str =
    "Querying workspace '{0}' failed on the server. Try refreshing in a few minutes.";
pub const WORKSPACE_UNAUTHORIZED: &str =
    "You do not have read access to workspace '{0}'.";
pub const WORKSPACE_NOT_FOUND: &str =
    "Workspace '{0}' could not be found. It may have been deleted or moved.";
pub const WORKSPACE_MISCONFIGURED: &str =
    "The health query against workspace '{0}' was rejected. Monitoring for this cluster may be misconfigured.";
pub const QUERY_UNKNOWN_ERROR: &str =
    "An unexpected error occurred while querying workspace '{0}'.";
pub const WORKSPACE_UNAVAILABLE: &str =
    "Workspace '{0}' was deleted or is no longer accessible.";

pub const GRID_LOAD_FAILED: &str =
    "Cluster health could not be loaded. Try refreshing the page.";

/// Substitute positional `{0}`, `{1}`, ... placeholders in one left-to-right
/// pass. Substituted text is never rescanned; placeholders without a
/// matching argument are left as written.
pub fn format(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            args.get(index).map(|arg| (*arg, close))
        });
        match arg {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
