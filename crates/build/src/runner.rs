use crate::builder::{build, BuildOptions, BuildReport, HookedScripts};
use crate::settings::{Settings, RELEASE_BIN_ENV};
use anyhow::{anyhow, Context, Result};
use civforge_modinfo::ModInfo;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

/// App options the getting-started guide suggests for mod debugging.
const DEBUG_OPTIONS: &[&str] = &[
    "CopyDatabasesToDisk",
    "EnableTuner",
    "EnableDebugPanels",
    "UIDebugger",
    "UIFileWatcher",
];

/// Turns the debug app options on and restores the previous `AppOptions.txt`
/// contents when dropped.
pub struct DebugOptionsGuard {
    path: PathBuf,
    original: String,
}

impl DebugOptionsGuard {
    pub fn enable(settings: &Settings) -> Result<Self> {
        let path = settings.app_options();
        let original = fs::read_to_string(&path)
            .with_context(|| format!("read app options {}", path.display()))?;
        let updated: Vec<String> = original
            .lines()
            .map(|line| {
                match DEBUG_OPTIONS
                    .iter()
                    .find(|option| line.starts_with(*option))
                {
                    Some(option) => format!("{option} 1"),
                    None => line.to_string(),
                }
            })
            .collect();
        fs::write(&path, updated.join("\n"))
            .with_context(|| format!("write app options {}", path.display()))?;
        Ok(Self { path, original })
    }
}

impl Drop for DebugOptionsGuard {
    fn drop(&mut self) {
        if let Err(error) = fs::write(&self.path, &self.original) {
            warn!("failed to restore {}: {error}", self.path.display());
        }
    }
}

/// Builds the mod, then launches the game. Debug mode flips the app options
/// for the duration of the game session.
pub fn run(
    info_doc: &ModInfo,
    hooked: &[HookedScripts],
    settings: &Settings,
    options: &BuildOptions,
    debug: bool,
) -> Result<BuildReport> {
    let guard = if debug {
        Some(DebugOptionsGuard::enable(settings)?)
    } else {
        None
    };
    let report = build(info_doc, hooked, settings, options)?;
    let release_bin = settings.release_bin.as_ref().ok_or_else(|| {
        anyhow!("cannot find Civilization VII's release binary; manually set this path via {RELEASE_BIN_ENV}")
    })?;
    if debug {
        info!("running Civilization 7 in debug mode");
    } else {
        info!("running Civilization 7 in release mode");
    }
    let status = Command::new(release_bin).status().with_context(|| {
        format!(
            "cannot run Civilization VII's release binary at {}; manually set this path via {RELEASE_BIN_ENV}",
            release_bin.display()
        )
    })?;
    if !status.success() {
        warn!("game exited with {status}");
    }
    drop(guard);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_root(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "civforge_runner_{}_{}_{}",
            std::process::id(),
            name,
            nanos
        ));
        let _ = fs::create_dir_all(&path);
        path
    }

    fn settings_with_options(root: &Path, contents: &str) -> Settings {
        let settings = Settings {
            installation_dir: root.join("installation"),
            settings_dir: root.join("settings"),
            release_bin: None,
        };
        fs::create_dir_all(&settings.settings_dir).expect("mkdir settings");
        fs::write(settings.app_options(), contents).expect("write app options");
        settings
    }

    #[test]
    fn guard_flips_flags_and_restores_on_drop() {
        let root = temp_root("guard");
        let original = "CopyDatabasesToDisk 0\nEnableTuner 0\nWindowed 1";
        let settings = settings_with_options(&root, original);
        {
            let _guard = DebugOptionsGuard::enable(&settings).expect("enable");
            let toggled = fs::read_to_string(settings.app_options()).expect("read");
            assert!(toggled.contains("CopyDatabasesToDisk 1"));
            assert!(toggled.contains("EnableTuner 1"));
            assert!(toggled.contains("Windowed 1"));
        }
        let restored = fs::read_to_string(settings.app_options()).expect("read");
        assert_eq!(restored, original);
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn guard_requires_existing_app_options() {
        let root = temp_root("guard_missing");
        let settings = Settings {
            installation_dir: root.join("installation"),
            settings_dir: root.join("settings"),
            release_bin: None,
        };
        assert!(DebugOptionsGuard::enable(&settings).is_err());
        let _ = fs::remove_dir_all(root);
    }
}
