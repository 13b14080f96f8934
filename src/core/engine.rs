use crate::config::plan::MigrationPlan;
use crate::core::fixers::{
    add_link_title, add_to_docs_main_menu, build_fixers, strings_replacer,
};
use crate::core::mover::{Mover, CONTENT_DIR};
use crate::core::sections::{load_outlines, SectionBuilder};
use crate::domain::model::ChangeLog;
use crate::utils::error::Result;
use crate::utils::monitor::StepMonitor;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Step {
    /// Copy content roots into place and rename section files
    Copy,
    /// Front matter and shortcode rewrites
    Replacements,
    /// Section index files and weights from the data outlines
    Sections,
    /// Copy hand-maintained content over the result
    Final,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Copy, Step::Replacements, Step::Sections, Step::Final];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Copy => "Copy And Rename",
            Step::Replacements => "Replacement",
            Step::Sections => "Create Sections",
            Step::Final => "Final",
        }
    }

    /// The requested steps in execution order; all of them when none are given.
    pub fn ordered(requested: &[Step]) -> Vec<Step> {
        if requested.is_empty() {
            return Self::ALL.to_vec();
        }
        let mut steps = requested.to_vec();
        steps.sort();
        steps.dedup();
        steps
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn content_rel(file: &str) -> String {
    format!("{}/{}", CONTENT_DIR, file)
}

pub struct MigrationEngine {
    plan: MigrationPlan,
    mover: Mover,
    monitor: StepMonitor,
}

impl MigrationEngine {
    pub fn new(plan: MigrationPlan, mover: Mover) -> Self {
        Self::new_with_monitoring(plan, mover, false)
    }

    pub fn new_with_monitoring(plan: MigrationPlan, mover: Mover, monitor_enabled: bool) -> Self {
        Self {
            plan,
            mover,
            monitor: StepMonitor::new(monitor_enabled),
        }
    }

    /// Runs `steps` in order and returns the recorded changes.
    ///
    /// Stops at the first error; whatever already happened stays on disk.
    pub fn run(mut self, steps: &[Step]) -> Result<ChangeLog> {
        tracing::info!(
            "🚀 Running '{}' in {}",
            self.plan.migration.name,
            self.mover.project_root().display()
        );
        if self.mover.is_trial() {
            tracing::info!("🔍 Trial mode on, nothing will be written");
        }

        for step in Step::ordered(steps) {
            tracing::info!("Start {} step …", step);
            self.monitor.begin_step();
            self.run_step(step)?;
            self.monitor.log_step(step.name());
        }

        self.monitor.log_final_stats();
        Ok(self.mover.into_changes())
    }

    fn run_step(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Copy => self.copy_and_rename(),
            Step::Replacements => self.replacements(),
            Step::Sections => self.create_sections(),
            Step::Final => self.final_copy(),
        }
    }

    /// Copies the content into the new content roots and renames files to
    /// match the section layout.
    fn copy_and_rename(&mut self) -> Result<()> {
        for copy in &self.plan.copy {
            self.mover.copy_dir(&copy.from, &copy.to)?;
        }
        for moved in &self.plan.moves {
            self.mover.move_dir(&moved.from, &moved.to)?;
        }
        for rule in &self.plan.rename {
            self.mover.rename_content_files(&rule.pattern, &rule.rename_to)?;
        }
        for rename in &self.plan.rename_file {
            self.mover.rename_file(&rename.from, &rename.to)?;
        }
        Ok(())
    }

    fn replacements(&mut self) -> Result<()> {
        if self.mover.is_trial() {
            // 試跑只確認第一步的結果
            self.mover.log_change("All content files", "Replacements");
            return Ok(());
        }

        let replacements = &self.plan.replacements;

        for link_title in &replacements.link_titles {
            self.mover.replace_in_file_rel(
                &content_rel(&link_title.file),
                &add_link_title(link_title.title.as_str()),
            )?;
        }

        if let Some(menu) = &replacements.main_menu {
            for (i, file) in menu.files.iter().enumerate() {
                self.mover.replace_in_file_rel(
                    &content_rel(file),
                    &add_to_docs_main_menu(menu.weight_for(i)),
                )?;
            }
        }

        for replacement in &replacements.strings {
            self.mover.replace_in_file_rel(
                &content_rel(&replacement.file),
                &strings_replacer(replacement.old.as_str(), replacement.new.as_str()),
            )?;
        }

        for rule in &replacements.content {
            let fixers = build_fixers(&rule.fixers);
            let summary = self.mover.apply_content_fixers(&fixers, &rule.pattern)?;
            tracing::info!(
                "✏️ '{}': {} changed, {} unchanged, {} failed",
                rule.pattern,
                summary.changed,
                summary.unchanged,
                summary.failed
            );
        }

        Ok(())
    }

    /// Makes every group of the configured outlines a section.
    fn create_sections(&mut self) -> Result<()> {
        let Some(sections) = &self.plan.sections else {
            tracing::info!("No [sections] in the plan, skipping");
            return Ok(());
        };

        let data_dir = self.mover.abs_path(sections.data_dir())?;
        let outlines = load_outlines(&data_dir)?;

        let stats = SectionBuilder::new(
            &mut self.mover,
            self.plan.language(),
            sections.weight_step(),
        )
        .build(&outlines, &sections.include)?;

        tracing::info!(
            "📚 {} section files written, {} weights set, {} pages missing, {} failed",
            stats.sections_written,
            stats.weights_set,
            stats.missing_pages,
            stats.failed
        );
        Ok(())
    }

    /// Copies additional content files over the migrated tree. This can revert
    /// changes made by the earlier steps.
    fn final_copy(&mut self) -> Result<()> {
        for copy in &self.plan.final_copy {
            self.mover.copy_dir(&copy.from, &copy.to)?;
        }
        Ok(())
    }
}
