use std::path::Path;

use crate::error::SurrogateResult;
use crate::rbf::RbfSurrogate;

pub fn load_json(path: &Path) -> SurrogateResult<RbfSurrogate> {
    let content = std::fs::read_to_string(path)?;
    let surrogate: RbfSurrogate = serde_json::from_str(&content)?;
    surrogate.check()?;
    tracing::debug!(path = %path.display(), "loaded surrogate");
    Ok(surrogate)
}

pub fn save_json(path: &Path, surrogate: &RbfSurrogate) -> SurrogateResult<()> {
    let content = serde_json::to_string_pretty(surrogate)?;
    std::fs::write(path, content)?;
    Ok(())
}
