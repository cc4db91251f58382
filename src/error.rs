// Error types module

use thiserror::Error;

use crate::batch::ExportError;
use crate::config::ConfigError;
use crate::imaging::ImageError;
use crate::persistence::PersistenceError;
use crate::watermark::WatermarkError;

/// Crate-level error, wrapping each module's error type.
#[derive(Debug, Error)]
pub enum FiremarkError {
    /// Invalid YAML, missing env vars, bad values
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Decode, resize or encode failures
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Watermark error: {0}")]
    Watermark(#[from] WatermarkError),

    /// Settings store failures
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_module_errors() {
        let err: FiremarkError = ExportError::NoOutputDirectory.into();
        assert_eq!(err.to_string(), "Export error: No output directory selected");

        let err: FiremarkError = PersistenceError::EmptyPresetName.into();
        assert!(matches!(err, FiremarkError::Persistence(_)));

        let err: FiremarkError = ConfigError::MissingEnvVar("HOME".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Environment variable 'HOME' is referenced but not set"
        );
    }
}
