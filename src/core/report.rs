use crate::domain::model::ChangeLog;
use crate::utils::error::{MigrateError, Result};
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 2] = ["FROM", "TO"];

/// Writes the change log as a borderless two column table.
pub fn print_table<W: Write>(changes: &ChangeLog, out: &mut W) -> Result<()> {
    let width = changes
        .entries()
        .iter()
        .map(|entry| entry.from.chars().count())
        .chain(std::iter::once(HEADER[0].len()))
        .max()
        .unwrap_or(0);

    let mut write_row = |from: &str, to: &str| -> std::io::Result<()> {
        let padding = width.saturating_sub(from.chars().count());
        writeln!(out, "  {}{} | {}", from, " ".repeat(padding), to)
    };

    write_row(HEADER[0], HEADER[1])?;
    write_row(&"-".repeat(width), &"-".repeat(HEADER[1].len()))?;
    for entry in changes.entries() {
        write_row(&entry.from, &entry.to)?;
    }

    Ok(())
}

/// Writes the change log to `path` as CSV with a `from,to` header.
pub fn write_csv(changes: &ChangeLog, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MigrateError::io_at(parent, e))?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for entry in changes.entries() {
        writer.serialize(entry)?;
    }
    writer.flush().map_err(|e| MigrateError::io_at(path, e))?;

    tracing::info!("📝 Wrote {} changes to {}", changes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ChangeLog {
        let mut log = ChangeLog::new();
        log.record("/site/docs", "/site/content/en/docs");
        log.record("/site/blog", "/site/content/en/blog");
        log
    }

    #[test]
    fn test_print_table_aligns_columns() {
        let mut out = Vec::new();
        print_table(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "  FROM       | TO");
        assert_eq!(lines[2], "  /site/docs | /site/content/en/docs");
        assert_eq!(lines[3], "  /site/blog | /site/content/en/blog");
    }

    #[test]
    fn test_print_empty_table() {
        let mut out = Vec::new();
        print_table(&ChangeLog::new(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  FROM | TO\n  ---- | --\n");
    }

    #[test]
    fn test_write_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports/changes.csv");

        write_csv(&sample(), &path).unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            csv,
            "from,to\n/site/docs,/site/content/en/docs\n/site/blog,/site/content/en/blog\n"
        );
    }
}
