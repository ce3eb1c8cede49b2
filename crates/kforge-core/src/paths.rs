use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const FORGE_DIR: &str = ".knowledgeforge";
pub const STATE_FILE: &str = ".knowledgeforge/state.json";
pub const CONFIG_FILE: &str = ".knowledgeforge/config.yaml";
pub const IGNORE_FILE: &str = ".knowledgeforge/.gitignore";

/// Entries written into the local ignore marker.
pub const IGNORE_CONTENTS: &str = "state.json\n";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn forge_dir(root: &Path) -> PathBuf {
    root.join(FORGE_DIR)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn ignore_path(root: &Path) -> PathBuf {
    root.join(IGNORE_FILE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            state_path(root),
            PathBuf::from("/tmp/proj/.knowledgeforge/state.json")
        );
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.knowledgeforge/config.yaml")
        );
        assert_eq!(
            ignore_path(root),
            PathBuf::from("/tmp/proj/.knowledgeforge/.gitignore")
        );
        assert_eq!(forge_dir(root), PathBuf::from("/tmp/proj/.knowledgeforge"));
    }
}
