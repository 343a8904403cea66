//! XDG locations.

use std::env;
use std::path::PathBuf;

/// `$XDG_CONFIG_HOME/ghpr`, else `$HOME/.config/ghpr`. Empty variables count
/// as unset.
pub fn ghpr_config_dir() -> Option<PathBuf> {
    let set = |name: &str| env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    let base = set("XDG_CONFIG_HOME").or_else(|| set("HOME").map(|home| home.join(".config")))?;
    Some(base.join("ghpr"))
}
