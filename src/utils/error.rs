use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("IO error at {path}: {source}")]
    PathIoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV report error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Source does not exist: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Front matter error: {message}")]
    FrontMatter { message: String },

    #[error("{key}: cannot parse date '{value}': {reason}")]
    DateParse {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl MigrateError {
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PathIoError {
            path: path.into(),
            source,
        }
    }

    pub fn front_matter(message: impl Into<String>) -> Self {
        Self::FrontMatter {
            message: message.into(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfigValueError { .. }
                | Self::TomlError(_)
                | Self::RegexError(_)
                | Self::InvalidPath { .. }
        )
    }

    /// 給使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingSource { path } => {
                format!("Nothing to migrate at {}", path.display())
            }
            Self::PathIoError { path, source } => {
                format!("Could not access {}: {}", path.display(), source)
            }
            Self::YamlError(e) => format!("An outline in the data directory is invalid: {}", e),
            e if e.is_config_error() => format!("The migration plan is invalid: {}", e),
            e => format!("Migration aborted: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingSource { .. } => "Check --root; it must point at the project root",
            Self::PathIoError { .. } | Self::IoError(_) | Self::WalkError(_) => {
                "Check file permissions and free disk space, then restore the tree and rerun"
            }
            Self::YamlError(_) => "Fix the YAML outline in the data directory",
            Self::CsvError(_) => "Check that the --report-file location is writable",
            e if e.is_config_error() => "Fix the migration plan and rerun with --try first",
            _ => "Rerun with --verbose to see the failing step",
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
