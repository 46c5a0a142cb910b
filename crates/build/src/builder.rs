use crate::hook::{render_hook, validate_hook_target, DEFAULT_SHELL_HOOK};
use crate::settings::Settings;
use crate::transpile::{transpile, validate_item_ext};
use anyhow::{anyhow, bail, Context, Result};
use civforge_modinfo::{
    render_modinfo, Action, ActionGroup, Condition, Criteria, DatabaseItem, ModInfo, Scope,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

pub const TRANSCRYPT_SUBDIR: &str = "transcrypt";
pub const SQL_SUBDIR: &str = "sql";

fn default_hook() -> String {
    DEFAULT_SHELL_HOOK.to_string()
}

/// Python scripts to transpile and hook into a base-game script, so the game
/// imports them the moment that script runs.
#[derive(Debug, Clone, Deserialize)]
pub struct HookedScripts {
    pub items: Vec<PathBuf>,
    /// Base-game script (relative to `Base/`) the import stub is appended to.
    #[serde(default = "default_hook")]
    pub hook: String,
    /// Also publish each module on the global object for non-module code.
    #[serde(default)]
    pub expose: bool,
}

impl HookedScripts {
    pub fn new(items: Vec<PathBuf>) -> Self {
        Self {
            items,
            hook: default_hook(),
            expose: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Target directory; defaults to the game's `Mods` folder.
    pub out_dir: Option<PathBuf>,
    /// Overwrite an existing build of the same mod.
    pub rebuild: bool,
}

#[derive(Debug)]
pub struct BuildReport {
    pub mod_dir: PathBuf,
    /// The staged document as written, hooks and rewritten items included.
    pub modinfo: ModInfo,
    pub warnings: Vec<String>,
}

/// Materializes a mod directory: stages scripts and SQL, installs hooks,
/// writes `.modinfo`. The input document is left untouched; the staged copy
/// lands in the report.
pub fn build(
    info: &ModInfo,
    hooked: &[HookedScripts],
    settings: &Settings,
    options: &BuildOptions,
) -> Result<BuildReport> {
    let mut warnings = info.id_recommendations();
    warnings.extend(info.properties.recommendations());
    for warning in &warnings {
        warn!("{}", warning);
    }
    info.validate()?;

    let out_dir = options
        .out_dir
        .clone()
        .unwrap_or_else(|| settings.mods_dir());
    let mod_dir = out_dir.join(&info.id);
    if mod_dir.exists() && !options.rebuild {
        bail!(
            "mod {} already exists at {}; enable rebuild to overwrite it",
            info.id,
            mod_dir.display()
        );
    }
    fs::create_dir_all(&mod_dir)
        .with_context(|| format!("create mod directory {}", mod_dir.display()))?;

    let mut staged = info.clone();
    stage_python_items(&mut staged, &mod_dir)?;
    stage_sql_items(&mut staged, &mod_dir)?;
    for scripts in hooked {
        install_hook(&mut staged, scripts, settings, &mod_dir)?;
    }

    let xml = render_modinfo(&staged)?;
    fs::write(mod_dir.join(".modinfo"), xml)
        .with_context(|| format!("write .modinfo under {}", mod_dir.display()))?;
    Ok(BuildReport {
        mod_dir,
        modinfo: staged,
        warnings,
    })
}

/// Transpiles `.py` items in place and rewrites them to the staged JS path.
fn stage_python_items(staged: &mut ModInfo, mod_dir: &Path) -> Result<()> {
    let transcrypt_dir = mod_dir.join(TRANSCRYPT_SUBDIR);
    for group in &mut staged.action_groups {
        for action in &mut group.actions {
            let items = match action {
                Action::ImportFiles { items } | Action::UiScripts { items } => items,
                Action::UpdateDatabase { .. } | Action::UpdateText { .. } => continue,
            };
            for item in items {
                let path = PathBuf::from(item.as_str());
                let is_python = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("py"));
                if !is_python {
                    continue;
                }
                transpile(std::slice::from_ref(&path), &transcrypt_dir)?;
                *item = staged_script_path(&path)?;
            }
        }
    }
    Ok(())
}

/// Mod-relative path a transpiled script is imported from.
fn staged_script_path(script: &Path) -> Result<String> {
    let stem = script
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("script has no usable file name: {}", script.display()))?;
    Ok(format!("{TRANSCRYPT_SUBDIR}/{stem}.js"))
}

/// Writes inline SQL statements to generated files under `sql/` and rewrites
/// the items to point at them.
fn stage_sql_items(staged: &mut ModInfo, mod_dir: &Path) -> Result<()> {
    let sql_dir = mod_dir.join(SQL_SUBDIR);
    for group in &mut staged.action_groups {
        for action in &mut group.actions {
            let Action::UpdateDatabase { items } = action else {
                continue;
            };
            for item in items {
                let DatabaseItem::Sql { sql } = item else {
                    continue;
                };
                fs::create_dir_all(&sql_dir)
                    .with_context(|| format!("create {}", sql_dir.display()))?;
                let file_name = format!("{}.sql", Uuid::new_v4().simple());
                fs::write(sql_dir.join(&file_name), sql.as_bytes())
                    .with_context(|| format!("write staged sql {file_name}"))?;
                *item = DatabaseItem::File(format!("{SQL_SUBDIR}/{file_name}"));
            }
        }
    }
    Ok(())
}

/// Transpiles the hooked scripts, appends a loader stub per script to a copy
/// of the hooked base-game module, and registers an always-met action group
/// importing the lot.
fn install_hook(
    staged: &mut ModInfo,
    scripts: &HookedScripts,
    settings: &Settings,
    mod_dir: &Path,
) -> Result<()> {
    for item in &scripts.items {
        validate_item_ext(item, "py")?;
    }
    validate_hook_target(settings, &scripts.hook)?;
    let transcrypt_dir = mod_dir.join(TRANSCRYPT_SUBDIR);
    transpile(&scripts.items, &transcrypt_dir)?;

    let base_script = settings.base_module(&scripts.hook);
    let mut content = fs::read_to_string(&base_script)
        .with_context(|| format!("read base module {}", base_script.display()))?;
    let mut imported = vec![scripts.hook.clone()];
    for item in &scripts.items {
        let rel_path = staged_script_path(item)?;
        let stem = item
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow!("script has no usable file name: {}", item.display()))?;
        let expose = scripts.expose.then_some(stem);
        content.push('\n');
        content.push_str(&render_hook(&rel_path, expose)?);
        imported.push(rel_path);
    }
    let hook_copy = mod_dir.join(&scripts.hook);
    if let Some(parent) = hook_copy.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&hook_copy, content)
        .with_context(|| format!("write hooked module {}", hook_copy.display()))?;

    let criteria_id = format!("{}-hook-condition", Uuid::new_v4());
    let group_id = format!("{}-hook-action-group", Uuid::new_v4());
    staged.action_criteria.push(Criteria {
        id: criteria_id.clone(),
        any: false,
        conditions: vec![Condition::AlwaysMet],
    });
    let scope = if scripts.hook.starts_with("modules/core/ui/shell") {
        Scope::Shell
    } else {
        Scope::Game
    };
    staged.action_groups.push(ActionGroup {
        id: group_id,
        scope,
        criteria: criteria_id,
        actions: vec![Action::ImportFiles { items: imported }],
    });
    Ok(())
}
