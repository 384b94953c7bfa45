//! rc-project: plant input documents and their validation.
//!
//! An [`InputDocument`] holds the calibrated operating conditions of one
//! plant in plant units. Bare file names are resolved against the data
//! directory, which defaults to `./data` and can be moved with
//! `RC_DATA_DIR`.

pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};

pub use schema::*;
pub use validate::{ValidationError, validate_document};

pub const DATA_DIR_ENV: &str = "RC_DATA_DIR";

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Missing section: {section}")]
    MissingSection { section: &'static str },

    #[error("Data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Paths with a directory component are taken as given; bare names are
/// looked up in [`data_dir`].
pub fn resolve_data_file(name: impl AsRef<Path>) -> ProjectResult<PathBuf> {
    resolve_in(&data_dir(), name.as_ref())
}

pub fn resolve_in(dir: &Path, name: &Path) -> ProjectResult<PathBuf> {
    let candidate = if name.components().count() > 1 || name.is_absolute() {
        name.to_path_buf()
    } else {
        dir.join(name)
    };
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(ProjectError::NotFound { path: candidate })
    }
}

pub fn parse_yaml(text: &str) -> ProjectResult<InputDocument> {
    let doc: InputDocument = serde_yaml::from_str(text)?;
    validate_document(&doc)?;
    Ok(doc)
}

pub fn load_yaml(path: &Path) -> ProjectResult<InputDocument> {
    let content = std::fs::read_to_string(path)?;
    let doc = parse_yaml(&content)?;
    tracing::debug!(path = %path.display(), "loaded input document");
    Ok(doc)
}

pub fn save_yaml(path: &Path, doc: &InputDocument) -> ProjectResult<()> {
    validate_document(doc)?;
    let content = serde_yaml::to_string(doc)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Loads a document by bare name from the data directory or by path.
pub fn load_input(name: impl AsRef<Path>) -> ProjectResult<InputDocument> {
    let path = resolve_data_file(name)?;
    load_yaml(&path)
}
