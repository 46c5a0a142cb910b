use crate::settings::Settings;
use anyhow::{bail, Result};
use civforge_core::{ResourceReference, REL_PATH_TOKEN};
use std::path::{Component, Path};

/// Base-game script the loader stub is appended to when none is picked.
pub const DEFAULT_SHELL_HOOK: &str = "modules/core/ui/shell/main-menu/main-menu.js";

const MOD_NAME_TOKEN: &str = "<MOD_NAME>";

/// Loader stub appended to the hooked base-game script. One guarded dynamic
/// import; a failure is logged and never escapes the task. Only the build
/// step may resolve the placeholder.
const HOOK_TEMPLATE: &str = "\
(async () => {
    try {
        const mod = await import('fs://game/<REL_PATH>');
    } catch (e) {
        console.error('failed to import mod script', e);
    }
})();
";

/// Variant that also resolves the namespace and publishes it for non-module
/// code. Transcrypt usually exports a namespace named after the script, or
/// default, or direct names.
const EXPOSED_HOOK_TEMPLATE: &str = "\
(async () => {
    try {
        const mod = await import('fs://game/<REL_PATH>');
        const ns = mod.<MOD_NAME> || mod.default || mod;
        window.<MOD_NAME> = ns;
    } catch (e) {
        console.error('failed to import mod script', e);
    }
})();
";

/// Renders a deployable loader stub for a mod-relative script path. The
/// returned script carries a fully resolved `fs://game/` reference; no
/// placeholder token can survive into it.
pub fn render_hook(rel_path: &str, expose: Option<&str>) -> Result<String> {
    if !is_safe_relative_path(rel_path) {
        bail!("hook script path must stay inside the mod: {rel_path}");
    }
    let reference = ResourceReference::game_script(rel_path);
    if !reference.is_resolved() {
        bail!("placeholder left in script reference: {reference}");
    }
    let script = match expose {
        Some(name) => {
            if !is_valid_export_name(name) {
                bail!("invalid export name: {name}");
            }
            EXPOSED_HOOK_TEMPLATE.replace(MOD_NAME_TOKEN, name)
        }
        None => HOOK_TEMPLATE.to_string(),
    };
    Ok(script.replace(REL_PATH_TOKEN, rel_path))
}

/// Checks that a hook target is a real base-game module script.
pub fn validate_hook_target(settings: &Settings, hook: &str) -> Result<()> {
    if !is_safe_relative_path(hook) {
        bail!("hook target must be relative to the installation: {hook}");
    }
    if !settings.base_module(hook).exists() {
        bail!("{hook} is not a valid base module script to hook scripts to");
    }
    Ok(())
}

pub(crate) fn is_safe_relative_path(path: &str) -> bool {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return false;
    }
    for component in candidate.components() {
        match component {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    true
}

fn is_valid_export_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_resolved_import() {
        let script = render_hook("transcrypt/test.js", None).expect("render");
        assert!(script.contains("await import('fs://game/transcrypt/test.js')"));
        assert!(script.contains("console.error('failed to import mod script', e)"));
        assert!(!script.contains(REL_PATH_TOKEN));
        assert!(!script.contains("window."));
    }

    #[test]
    fn exposed_variant_publishes_the_namespace() {
        let script = render_hook("transcrypt/test.js", Some("test")).expect("render");
        assert!(script.contains("const ns = mod.test || mod.default || mod;"));
        assert!(script.contains("window.test = ns;"));
        assert!(!script.contains(MOD_NAME_TOKEN));
    }

    #[test]
    fn rejects_escaping_paths() {
        assert!(render_hook("../outside.js", None).is_err());
        assert!(render_hook("/abs/outside.js", None).is_err());
        assert!(render_hook("scripts/../../outside.js", None).is_err());
    }

    #[test]
    fn rejects_an_unresolved_placeholder() {
        let error = render_hook("transcrypt/<REL_PATH>", None).expect_err("should fail");
        assert!(error.to_string().contains("placeholder"));
    }

    #[test]
    fn rejects_bad_export_names() {
        assert!(render_hook("transcrypt/test.js", Some("1abc")).is_err());
        assert!(render_hook("transcrypt/test.js", Some("a-b")).is_err());
        assert!(render_hook("transcrypt/test.js", Some("")).is_err());
    }

    #[test]
    fn safe_path_rules() {
        assert!(is_safe_relative_path("scripts/main.js"));
        assert!(is_safe_relative_path("./scripts/main.js"));
        assert!(!is_safe_relative_path("../escape.js"));
        assert!(!is_safe_relative_path("/abs/path.js"));
    }
}
