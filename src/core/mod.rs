pub mod engine;
pub mod fixers;
pub mod mover;
pub mod report;
pub mod sections;

pub use crate::domain::model::{ChangeEntry, ChangeLog, Outline, TocEntry};
pub use crate::domain::ports::{ContentFixer, ContentFixers};
pub use crate::utils::error::Result;
