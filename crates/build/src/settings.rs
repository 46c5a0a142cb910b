use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

pub const INSTALLATION_DIR_ENV: &str = "CIV7_INSTALLATION_DIR";
pub const SETTINGS_DIR_ENV: &str = "CIV7_SETTINGS_DIR";
pub const RELEASE_BIN_ENV: &str = "CIV7_RELEASE_BIN";

/// Where the game lives on this machine. Everything can be overridden via
/// environment variables; the defaults cover the common Steam and Firaxis
/// locations per platform.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Game installation, the directory holding `Base/`.
    pub installation_dir: PathBuf,
    /// User data directory holding `Mods/` and `AppOptions.txt`.
    pub settings_dir: PathBuf,
    /// Game executable, when known.
    pub release_bin: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let installation_dir = match env::var_os(INSTALLATION_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_installation_dir()?,
        };
        let settings_dir = match env::var_os(SETTINGS_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_settings_dir()?,
        };
        let release_bin = env::var_os(RELEASE_BIN_ENV).map(PathBuf::from);
        Ok(Self {
            installation_dir,
            settings_dir,
            release_bin,
        })
    }

    /// Where built mods are installed.
    pub fn mods_dir(&self) -> PathBuf {
        self.settings_dir.join("Mods")
    }

    pub fn app_options(&self) -> PathBuf {
        self.settings_dir.join("AppOptions.txt")
    }

    /// Absolute path of a base-game module script.
    pub fn base_module(&self, rel_path: &str) -> PathBuf {
        self.installation_dir.join("Base").join(rel_path)
    }
}

#[cfg(not(target_os = "windows"))]
fn home_dir() -> Result<PathBuf> {
    match env::var_os("HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => bail!("cannot determine the home directory; set HOME"),
    }
}

fn default_settings_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        match env::var_os("LOCALAPPDATA") {
            Some(dir) => Ok(PathBuf::from(dir)
                .join("Firaxis Games")
                .join("Sid Meier's Civilization VII")),
            None => bail!(
                "cannot determine the common location of Civilization VII's user data; \
                 manually set this path via {SETTINGS_DIR_ENV}"
            ),
        }
    }
    #[cfg(target_os = "macos")]
    {
        Ok(home_dir()?
            .join("Library")
            .join("Application Support")
            .join("Civilization VII"))
    }
    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    {
        Ok(home_dir()?
            .join("My Games")
            .join("Sid Meier's Civilization VII"))
    }
}

fn default_installation_dir() -> Result<PathBuf> {
    let Some(steam_root) = steam_root() else {
        bail!(
            "cannot determine the common Steam location of Civilization VII's \
             installation; manually set this path via {INSTALLATION_DIR_ENV}"
        );
    };
    Ok(steam_root
        .join("steamapps")
        .join("common")
        .join("Sid Meier's Civilization VII"))
}

#[cfg(target_os = "windows")]
fn steam_root() -> Option<PathBuf> {
    let root = PathBuf::from(r"C:\Program Files (x86)\Steam");
    root.exists().then_some(root)
}

#[cfg(target_os = "macos")]
fn steam_root() -> Option<PathBuf> {
    let home = home_dir().ok()?;
    Some(home.join("Library").join("Application Support").join("Steam"))
}

#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
fn steam_root() -> Option<PathBuf> {
    let home = home_dir().ok()?;
    let candidates = [
        home.join(".steam/steam"),
        home.join(".local/share/Steam"),
        // Flatpak
        home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"),
    ];
    candidates.into_iter().find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_hang_off_the_right_roots() {
        let settings = Settings {
            installation_dir: PathBuf::from("/opt/civ7"),
            settings_dir: PathBuf::from("/data/civ7"),
            release_bin: None,
        };
        assert_eq!(settings.mods_dir(), PathBuf::from("/data/civ7/Mods"));
        assert_eq!(
            settings.app_options(),
            PathBuf::from("/data/civ7/AppOptions.txt")
        );
        assert_eq!(
            settings.base_module("modules/core/ui/shell/main-menu/main-menu.js"),
            PathBuf::from("/opt/civ7/Base/modules/core/ui/shell/main-menu/main-menu.js")
        );
    }

    #[test]
    fn environment_overrides_win() {
        env::set_var(INSTALLATION_DIR_ENV, "/tmp/civ7-install");
        env::set_var(SETTINGS_DIR_ENV, "/tmp/civ7-settings");
        env::set_var(RELEASE_BIN_ENV, "/tmp/civ7-install/Civ7");
        let settings = Settings::from_env().expect("settings");
        assert_eq!(settings.installation_dir, PathBuf::from("/tmp/civ7-install"));
        assert_eq!(settings.settings_dir, PathBuf::from("/tmp/civ7-settings"));
        assert_eq!(
            settings.release_bin,
            Some(PathBuf::from("/tmp/civ7-install/Civ7"))
        );
        env::remove_var(INSTALLATION_DIR_ENV);
        env::remove_var(SETTINGS_DIR_ENV);
        env::remove_var(RELEASE_BIN_ENV);
    }
}
