use crate::core::fixers::add_weight;
use crate::core::mover::{FileOutcome, Mover, CONTENT_DIR};
use crate::domain::model::{Outline, TocEntry, TocGroup};
use crate::utils::error::{MigrateError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const SECTION_INDEX: &str = "_index.md";

/// Loads every file in `dir` as an outline, keyed by file stem.
pub fn load_outlines(dir: &Path) -> Result<BTreeMap<String, Outline>> {
    if !dir.is_dir() {
        return Err(MigrateError::MissingSource {
            path: dir.to_path_buf(),
        });
    }

    let mut outlines = BTreeMap::new();
    for entry in fs::read_dir(dir).map_err(|e| MigrateError::io_at(dir, e))? {
        let entry = entry.map_err(|e| MigrateError::io_at(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        let content = fs::read_to_string(&path).map_err(|e| MigrateError::io_at(&path, e))?;
        let outline: Outline = serde_yaml::from_str(&content).map_err(|e| {
            tracing::error!("❌ Invalid outline {}: {}", path.display(), e);
            MigrateError::YamlError(e)
        })?;
        outlines.insert(stem, outline);
    }

    Ok(outlines)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionStats {
    pub sections_written: usize,
    pub weights_set: usize,
    pub missing_pages: usize,
    pub failed: usize,
}

/// Turns outline groups into sections: one `_index.md` per group directory
/// and a `weight` on each listed page following the outline order.
pub struct SectionBuilder<'a> {
    mover: &'a mut Mover,
    language: String,
    weight_step: usize,
    stats: SectionStats,
}

impl<'a> SectionBuilder<'a> {
    pub fn new(mover: &'a mut Mover, language: impl Into<String>, weight_step: usize) -> Self {
        Self {
            mover,
            language: language.into(),
            weight_step,
            stats: SectionStats::default(),
        }
    }

    /// Walks the named outlines, or all of them when `include` is empty.
    pub fn build(
        mut self,
        outlines: &BTreeMap<String, Outline>,
        include: &[String],
    ) -> Result<SectionStats> {
        for (name, outline) in outlines {
            if !include.is_empty() && !include.contains(name) {
                tracing::debug!("Skipping outline {}", name);
                continue;
            }
            tracing::info!("📚 Creating sections from outline '{}'", name);

            for entry in &outline.toc {
                match entry {
                    TocEntry::Page(page) => tracing::debug!("Top level page in {}: {}", name, page),
                    TocEntry::Group(group) => self.handle_group(group)?,
                    TocEntry::Other(value) => {
                        tracing::warn!("Unexpected toc entry in {}: {:?}", name, value)
                    }
                }
            }
        }

        Ok(self.stats)
    }

    fn content_rel(&self, page: &str) -> String {
        format!("{}/{}/{}", CONTENT_DIR, self.language, page.trim_start_matches('/'))
    }

    fn handle_group(&mut self, group: &TocGroup) -> Result<()> {
        let mut section_page_written = false;

        for (i, entry) in group.section.iter().enumerate() {
            match entry {
                TocEntry::Page(page) => {
                    if page.ends_with("index.md") {
                        continue;
                    }

                    if !section_page_written {
                        section_page_written = true;
                        self.ensure_section_index(page, &group.title)?;
                    }

                    let rel = self.content_rel(page);
                    if !self.mover.rel_file_exists(&rel)? {
                        tracing::warn!("content file in toc does not exist: {}", rel);
                        self.stats.missing_pages += 1;
                        continue;
                    }

                    let weight = (i + 1) * self.weight_step;
                    match self.mover.replace_in_file_rel(&rel, &add_weight(weight))? {
                        FileOutcome::Failed => self.stats.failed += 1,
                        _ => self.stats.weights_set += 1,
                    }
                }
                TocEntry::Group(nested) => self.handle_group(nested)?,
                TocEntry::Other(value) => {
                    tracing::warn!("Unexpected entry in section '{}': {:?}", group.title, value)
                }
            }
        }

        Ok(())
    }

    fn ensure_section_index(&mut self, page: &str, title: &str) -> Result<()> {
        let dir = Path::new(page.trim_start_matches('/'))
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rel = if dir.is_empty() {
            format!("{}/{}/{}", CONTENT_DIR, self.language, SECTION_INDEX)
        } else {
            format!("{}/{}/{}/{}", CONTENT_DIR, self.language, dir, SECTION_INDEX)
        };

        if self.mover.rel_file_exists(&rel)? {
            return Ok(());
        }

        self.mover.write_new_file(&rel, &section_index_content(title)?)?;
        self.stats.sections_written += 1;
        Ok(())
    }
}

pub fn section_index_content(title: &str) -> Result<String> {
    Ok(format!("---\ntitle: {}\n---\n\n", serde_json::to_string(title)?))
}
