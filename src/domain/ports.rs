use crate::utils::error::Result;
use std::path::Path;

/// Rewrites the content of one file.
///
/// Returning an error leaves the file as it was.
pub trait ContentFixer {
    fn fix(&self, path: &Path, content: &str) -> Result<String>;
}

impl<F> ContentFixer for F
where
    F: Fn(&Path, &str) -> Result<String>,
{
    fn fix(&self, path: &Path, content: &str) -> Result<String> {
        self(path, content)
    }
}

/// Fixers applied in order; the first failure stops the chain.
#[derive(Default)]
pub struct ContentFixers {
    fixers: Vec<Box<dyn ContentFixer>>,
}

impl ContentFixers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fixer: Box<dyn ContentFixer>) {
        self.fixers.push(fixer);
    }

    pub fn len(&self) -> usize {
        self.fixers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixers.is_empty()
    }
}

impl ContentFixer for ContentFixers {
    fn fix(&self, path: &Path, content: &str) -> Result<String> {
        let mut current = content.to_string();
        for fixer in &self.fixers {
            current = fixer.fix(path, &current)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MigrateError;

    #[test]
    fn test_fixers_run_in_order() {
        let mut fixers = ContentFixers::new();
        fixers.push(Box::new(|_: &Path, s: &str| -> Result<String> { Ok(format!("{}a", s)) }));
        fixers.push(Box::new(|_: &Path, s: &str| -> Result<String> { Ok(format!("{}b", s)) }));

        assert_eq!(fixers.fix(Path::new("x.md"), "").unwrap(), "ab");
    }

    #[test]
    fn test_first_error_stops_chain() {
        let mut fixers = ContentFixers::new();
        fixers.push(Box::new(|_: &Path, _: &str| -> Result<String> {
            Err(MigrateError::front_matter("missing"))
        }));
        fixers.push(Box::new(|_: &Path, _: &str| -> Result<String> { panic!("must not run") }));

        assert!(fixers.fix(Path::new("x.md"), "body").is_err());
    }
}
