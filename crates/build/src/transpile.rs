use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Checks that an item carries the extension its action accepts.
pub fn validate_item_ext(path: &Path, expected: &str) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext != expected {
        bail!(
            "{} must have a .{expected} extension",
            path.display()
        );
    }
    Ok(())
}

/// Compiles Python scripts to JS modules with the external `transcrypt` tool.
/// Each script becomes `<out_dir>/<stem>.js`.
pub fn transpile(items: &[PathBuf], out_dir: &Path) -> Result<()> {
    for item in items {
        debug!("transpiling {}", item.display());
        let status = Command::new("transcrypt")
            .arg("--build")
            .arg("--outdir")
            .arg(out_dir)
            .arg(item)
            .status()
            .context("run transcrypt")?;
        if !status.success() {
            bail!("failed to transpile {} to JavaScript", item.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_expected_extension() {
        validate_item_ext(Path::new("scripts/test.py"), "py").expect("py is fine");
        validate_item_ext(Path::new("scripts/TEST.PY"), "py").expect("case folds");
    }

    #[test]
    fn rejects_other_extensions() {
        assert!(validate_item_ext(Path::new("scripts/test.js"), "py").is_err());
        assert!(validate_item_ext(Path::new("scripts/test"), "py").is_err());
    }
}
