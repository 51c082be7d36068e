//! Fixed locations of the generated configuration files, relative to the
//! workspace root.

/// The image registry.
pub const CONFIG_YAML: &str = "config.yaml";

/// The autoupdate entry list.
pub const AUTOUPDATE_YAML: &str = "autoupdate.yaml";

/// The regsync configuration derived from the registry.
pub const REGSYNC_YAML: &str = "regsync.yaml";
