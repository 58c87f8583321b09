use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
///
/// Configuration problems are caught at setup time and never reach the
/// per-frame math.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.yaml"));
        assert!(e.to_string().contains("missing.yaml"));

        let e = ConfigError::Invalid("bloom.taps must be odd".into());
        assert!(e.to_string().contains("taps must be odd"));
    }
}
