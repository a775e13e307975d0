#![forbid(unsafe_code)]

/// Asset categories packed by default, in declaration order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "ascii", "bgm", "dan", "danbg", "danpl", "dlg", "dvm", "mesh", "sfx", "shaders", "tex",
    "tex/bg", "tex/card", "tex/char", "tex/dan", "tex/ui",
];

/// Extension of intermediate authoring files that never ship.
pub const DEFAULT_EXCLUDED_EXTENSION: &str = "i";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Subdirectories of the input root that are scanned (non-recursively).
    pub categories: Vec<String>,
    /// Files with this extension (without the dot) are skipped.
    pub excluded_extension: String,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            excluded_extension: DEFAULT_EXCLUDED_EXTENSION.to_string(),
        }
    }
}

impl PackConfig {
    /// Builds a config from CLI values, falling back to the defaults for
    /// anything left unset.
    pub fn from_args(categories: Vec<String>, excluded_extension: Option<String>) -> Self {
        let mut cfg = Self::default();
        if !categories.is_empty() {
            cfg.categories = categories;
        }
        if let Some(ext) = excluded_extension {
            cfg.excluded_extension = ext.trim_start_matches('.').to_string();
        }
        cfg
    }
}
