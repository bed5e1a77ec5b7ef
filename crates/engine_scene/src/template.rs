//! Editor-side component templates.
//!
//! The editor builds its "add component" menu from one `<Kind>.variant` file
//! per registered kind, each holding the kind's default-valued document.

use std::fs;
use std::path::Path;

use engine_component::Registry;
use tracing::{debug, info};

use crate::error::SceneError;

/// Extension of template files.
pub const TEMPLATE_EXTENSION: &str = "variant";

/// Replace every `*.variant` file in `dir` with fresh templates.
///
/// Other files in the directory are left alone. Returns the number of
/// templates written.
///
/// # Errors
///
/// [`SceneError::Io`] if the directory cannot be read or a file cannot be
/// removed or written.
pub fn write_templates(dir: impl AsRef<Path>, registry: &Registry) -> Result<usize, SceneError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| SceneError::io(dir, e))?;

    let entries = fs::read_dir(dir).map_err(|e| SceneError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| SceneError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION) {
            fs::remove_file(&path).map_err(|e| SceneError::io(&path, e))?;
            debug!(path = %path.display(), "removed stale template");
        }
    }

    let mut written = 0;
    for kind in registry.kinds() {
        let path = dir.join(format!("{}.{TEMPLATE_EXTENSION}", kind.name));
        let text = serde_json::to_string_pretty(&kind.template())?;
        fs::write(&path, text).map_err(|e| SceneError::io(&path, e))?;
        written += 1;
    }

    info!(dir = %dir.display(), count = written, "generated component templates");
    Ok(written)
}
