use crate::core::fixers::FixerKind;
use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::{
    validate_file_name, validate_non_empty_string, validate_pattern, validate_positive_number,
    validate_relative_path, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// 內建的 Kubernetes 文件遷移計畫
pub const DEFAULT_PLAN: &str = include_str!("../../migration-plan.toml");

/// Everything a migration does, step by step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub migration: MigrationInfo,
    #[serde(default)]
    pub copy: Vec<FromTo>,
    #[serde(default, rename = "move")]
    pub moves: Vec<FromTo>,
    #[serde(default)]
    pub rename: Vec<RenameRule>,
    #[serde(default)]
    pub rename_file: Vec<FromTo>,
    #[serde(default)]
    pub replacements: ReplacementsConfig,
    pub sections: Option<SectionsConfig>,
    #[serde(default)]
    pub final_copy: Vec<FromTo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationInfo {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FromTo {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRule {
    pub pattern: String,
    pub rename_to: String,
}

/// Paths in this table are relative to `content/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplacementsConfig {
    #[serde(default)]
    pub link_titles: Vec<LinkTitle>,
    pub main_menu: Option<MainMenuConfig>,
    #[serde(default)]
    pub strings: Vec<StringReplacement>,
    #[serde(default)]
    pub content: Vec<ContentFixRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTitle {
    pub file: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainMenuConfig {
    pub files: Vec<String>,
    pub base_weight: Option<usize>,
    pub weight_step: Option<usize>,
}

impl MainMenuConfig {
    pub fn base_weight(&self) -> usize {
        self.base_weight.unwrap_or(20)
    }

    pub fn weight_step(&self) -> usize {
        self.weight_step.unwrap_or(10)
    }

    /// Menu weight for the file at `index`.
    pub fn weight_for(&self, index: usize) -> usize {
        self.base_weight() + index * self.weight_step()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringReplacement {
    pub file: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFixRule {
    pub pattern: String,
    pub fixers: Vec<FixerKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsConfig {
    pub data_dir: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    pub weight_step: Option<usize>,
}

impl SectionsConfig {
    pub fn data_dir(&self) -> &str {
        self.data_dir.as_deref().unwrap_or("data")
    }

    pub fn weight_step(&self) -> usize {
        self.weight_step.unwrap_or(10)
    }
}

impl MigrationPlan {
    /// 從 TOML 檔案載入遷移計畫
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| MigrateError::io_at(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_PLAN)
    }

    /// 替換環境變數 (例如 ${DOCS_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn language(&self) -> &str {
        &self.migration.language
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("migration.name", &self.migration.name)?;
        validate_non_empty_string("migration.language", &self.migration.language)?;

        let path_lists = [
            ("copy", &self.copy),
            ("move", &self.moves),
            ("rename_file", &self.rename_file),
            ("final_copy", &self.final_copy),
        ];
        for (table, entries) in path_lists {
            for entry in entries {
                validate_relative_path(&format!("{}.from", table), &entry.from)?;
                validate_relative_path(&format!("{}.to", table), &entry.to)?;
            }
        }
        for (table, entries) in [("copy", &self.copy), ("final_copy", &self.final_copy)] {
            for entry in entries {
                if is_within(&entry.to, &entry.from) {
                    return Err(MigrateError::InvalidConfigValueError {
                        field: format!("{}.to", table),
                        value: entry.to.clone(),
                        reason: format!("Target must not be inside the source '{}'", entry.from),
                    });
                }
            }
        }

        for rule in &self.rename {
            validate_pattern("rename.pattern", &rule.pattern)?;
            validate_file_name("rename.rename_to", &rule.rename_to)?;
        }

        let replacements = &self.replacements;
        for link_title in &replacements.link_titles {
            validate_relative_path("replacements.link_titles.file", &link_title.file)?;
            validate_non_empty_string("replacements.link_titles.title", &link_title.title)?;
        }
        if let Some(menu) = &replacements.main_menu {
            validate_positive_number("replacements.main_menu.weight_step", menu.weight_step(), 1)?;
            for file in &menu.files {
                validate_relative_path("replacements.main_menu.files", file)?;
            }
        }
        for replacement in &replacements.strings {
            validate_relative_path("replacements.strings.file", &replacement.file)?;
            validate_non_empty_string("replacements.strings.old", &replacement.old)?;
        }
        for rule in &replacements.content {
            validate_pattern("replacements.content.pattern", &rule.pattern)?;
            if rule.fixers.is_empty() {
                return Err(MigrateError::InvalidConfigValueError {
                    field: "replacements.content.fixers".to_string(),
                    value: rule.pattern.clone(),
                    reason: "At least one fixer is required".to_string(),
                });
            }
        }

        if let Some(sections) = &self.sections {
            validate_relative_path("sections.data_dir", sections.data_dir())?;
            validate_positive_number("sections.weight_step", sections.weight_step(), 1)?;
        }

        Ok(())
    }
}

/// `path` equals `base` or lies below it, ignoring `.` components.
fn is_within(path: &str, base: &str) -> bool {
    let normal = |p: &str| -> Vec<String> {
        Path::new(p)
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    };
    let (path, base) = (normal(path), normal(base));
    path.starts_with(&base)
}

impl Validate for MigrationPlan {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
