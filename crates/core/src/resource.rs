use serde::{Deserialize, Serialize};
use std::fmt;

/// URI scheme the game uses to serve mod scripts. Resources behind it are not
/// ordinary network or disk paths.
pub const GAME_SCRIPT_SCHEME: &str = "fs://game/";

/// Placeholder token the build step replaces with the deployed relative path.
/// A reference still carrying it must never reach an import call.
pub const REL_PATH_TOKEN: &str = "<REL_PATH>";

/// Opaque path identifying a loadable script resource inside the game's
/// virtual filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference(String);

impl ResourceReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Builds a `fs://game/<path>` reference from a mod-relative path.
    pub fn game_script(rel_path: &str) -> Self {
        Self(format!("{GAME_SCRIPT_SCHEME}{rel_path}"))
    }

    /// True when no placeholder token is left in the reference.
    pub fn is_resolved(&self) -> bool {
        !self.0.contains(REL_PATH_TOKEN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_script_prefixes_the_scheme() {
        let reference = ResourceReference::game_script("transcrypt/test.js");
        assert_eq!(reference.as_str(), "fs://game/transcrypt/test.js");
        assert!(reference.is_resolved());
    }

    #[test]
    fn template_reference_is_not_resolved() {
        let reference = ResourceReference::game_script(REL_PATH_TOKEN);
        assert!(!reference.is_resolved());
    }
}
