use std::fmt;

/// Provenance of one configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this environment variable
    EnvVar(String),
    /// Built-in default, kept as display text
    Default(String),
    /// Overridden by this command-line flag
    Flag(String),
}

impl ConfigSource {
    /// `EnvVar` when `var` is set in the process environment, `Default` otherwise
    pub fn env_or_default(var: &str, default: impl Into<String>) -> Self {
        if std::env::var_os(var).is_some() {
            ConfigSource::EnvVar(var.to_string())
        } else {
            ConfigSource::Default(default.into())
        }
    }

    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::EnvVar(var) => write!(f, "${}", var),
            ConfigSource::Default(value) => write!(f, "default ({})", value),
            ConfigSource::Flag(flag) => write!(f, "--{}", flag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ConfigSource::EnvVar("BATCH_FETCH_SIZE".into()).to_string(), "$BATCH_FETCH_SIZE");
        assert_eq!(ConfigSource::Default("100".into()).to_string(), "default (100)");
        assert_eq!(ConfigSource::Flag("batch-size".into()).to_string(), "--batch-size");
    }
}
