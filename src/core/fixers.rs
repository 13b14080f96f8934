use crate::domain::ports::{ContentFixer, ContentFixers};
use crate::utils::error::{MigrateError, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

// 檔案開頭的 `---` 區塊，結尾為第一個只有 `---` 的行
static FRONT_MATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(?P<body>.*?)\r?\n)??(?P<close>---)[ \t]*(?:\r?\n|\z)")
        .expect("valid regex")
});

static DATE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?P<key>date):[ \t]*(?P<value>.*?)[ \t]*\r?$").expect("valid regex")
});

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}([T ].*)?$").expect("valid regex"));

static GLOSSARY_TOOLTIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{% glossary_tooltip text="(.*?)" term_id="(.*?)" %\}"#).expect("valid regex")
});

static CAPTURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{% capture (.*?) %\}(.*?)\{% endcapture %\}").expect("valid regex")
});

const BROKEN_GLOSSARY_TOOLTIP: &str =
    r#"{{ "{% glossary_tooltip text=" }}"cluster" term_id="cluster" %}"#;
const REPAIRED_GLOSSARY_TOOLTIP: &str = r#"{% glossary_tooltip text=" term_id="cluster" %}"#;

const HUMAN_DATE_FORMAT: &str = "%A, %B %d, %Y";
const HUMAN_DATE_NO_WEEKDAY_FORMAT: &str = "%B %d, %Y";

/// Location of a front matter block inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterSpan {
    /// Text between the markers, without the final line break.
    pub body: Range<usize>,
    /// Byte offset where the closing `---` line starts.
    pub close: usize,
}

pub fn find_front_matter(src: &str) -> Option<FrontMatterSpan> {
    let caps = FRONT_MATTER_RE.captures(src)?;
    let close = caps.name("close")?.start();
    let body = caps
        .name("body")
        .map_or(close..close, |m| m.start()..m.end());
    Some(FrontMatterSpan { body, close })
}

fn top_level_key(line: &str) -> Option<&str> {
    if line.starts_with([' ', '\t', '-', '#']) {
        return None;
    }
    let (key, _) = line.split_once(':')?;
    let key = key.trim();
    let key = ['"', '\'']
        .iter()
        .find_map(|q| key.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(key);
    (!key.is_empty()).then_some(key)
}

/// Inserts `addition` as the last lines of the front matter.
///
/// Existing lines are kept as they are. Fails when the document has no front
/// matter or when one of the added top-level keys is already present, so the
/// key ends up in the file exactly once however often this runs.
pub fn append_to_front_matter(src: &str, addition: &str) -> Result<String> {
    let span = find_front_matter(src)
        .ok_or_else(|| MigrateError::front_matter("no front matter block found"))?;

    let body = &src[span.body.clone()];
    for key in addition.lines().filter_map(top_level_key) {
        if body.lines().filter_map(top_level_key).any(|k| k == key) {
            return Err(MigrateError::front_matter(format!(
                "key '{}' already present",
                key
            )));
        }
    }

    let newline = if src[..span.close].ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    };

    let mut out = String::with_capacity(src.len() + addition.len() + 2);
    out.push_str(&src[..span.close]);
    for line in addition.lines() {
        out.push_str(line);
        out.push_str(newline);
    }
    out.push_str(&src[span.close..]);
    Ok(out)
}

/// YAML double-quoted scalar.
fn quoted(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn add_link_title(title: impl Into<String>) -> impl ContentFixer {
    let title = title.into();
    move |_: &Path, s: &str| -> Result<String> {
        append_to_front_matter(s, &format!("linkTitle: {}", quoted(&title)?))
    }
}

pub fn add_to_docs_main_menu(weight: usize) -> impl ContentFixer {
    move |_: &Path, s: &str| -> Result<String> {
        append_to_front_matter(
            s,
            &format!("menu:\n  docsmain:\n    weight: {}", weight),
        )
    }
}

pub fn add_weight(weight: usize) -> impl ContentFixer {
    move |_: &Path, s: &str| -> Result<String> {
        append_to_front_matter(s, &format!("weight: {}", weight))
    }
}

pub fn strings_replacer(old: impl Into<String>, new: impl Into<String>) -> impl ContentFixer {
    let (old, new) = (old.into(), new.into());
    move |_: &Path, s: &str| -> Result<String> { Ok(s.replace(&old, &new)) }
}

/// Repairs a known typo that would otherwise produce a broken shortcode.
pub fn fix_broken_glossary_tooltip(_path: &Path, s: &str) -> Result<String> {
    Ok(s.replacen(BROKEN_GLOSSARY_TOOLTIP, REPAIRED_GLOSSARY_TOOLTIP, 1))
}

pub fn replace_glossary_tooltips(_path: &Path, s: &str) -> Result<String> {
    Ok(GLOSSARY_TOOLTIP_RE
        .replace_all(s, r#"{{< glossary_tooltip text="${1}" term_id="${2}" >}}"#)
        .into_owned())
}

pub fn replace_captures(_path: &Path, s: &str) -> Result<String> {
    Ok(CAPTURE_RE
        .replace_all(s, "{{% capture ${1} %}}${2}{{% /capture %}}")
        .into_owned())
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Parses dates like `Friday, July 02, 2015`.
///
/// The weekday is optional and not checked against the date.
pub fn parse_human_date(value: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    let first_error = match NaiveDate::parse_from_str(value, HUMAN_DATE_FORMAT) {
        Ok(date) => return Ok(date),
        Err(e) => e,
    };

    let without_weekday = match value.split_once(',') {
        Some((weekday, rest)) if weekday.chars().all(char::is_alphabetic) => rest.trim(),
        _ => value,
    };

    NaiveDate::parse_from_str(without_weekday, HUMAN_DATE_NO_WEEKDAY_FORMAT).map_err(|_| first_error)
}

/// Turns human readable `date:` values in the front matter into `YYYY-MM-DD`.
pub fn fix_dates(_path: &Path, s: &str) -> Result<String> {
    let Some(span) = find_front_matter(s) else {
        return Ok(s.to_string());
    };
    let body = &s[span.body.clone()];

    let mut fixed_body = String::with_capacity(body.len());
    let mut last = 0;
    for caps in DATE_LINE_RE.captures_iter(body) {
        let (Some(line), Some(key), Some(value)) =
            (caps.get(0), caps.name("key"), caps.name("value"))
        else {
            continue;
        };
        let raw = unquote(value.as_str());
        if ISO_DATE_RE.is_match(raw) {
            continue;
        }

        let date = parse_human_date(raw).map_err(|e| MigrateError::DateParse {
            key: key.as_str().to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })?;

        fixed_body.push_str(&body[last..line.start()]);
        fixed_body.push_str(&format!("{}: {}", key.as_str(), date.format("%Y-%m-%d")));
        if line.as_str().ends_with('\r') {
            fixed_body.push('\r');
        }
        last = line.end();
    }
    fixed_body.push_str(&body[last..]);

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..span.body.start]);
    out.push_str(&fixed_body);
    out.push_str(&s[span.body.end..]);
    Ok(out)
}

/// Named fixers usable from a migration plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixerKind {
    BrokenGlossaryTooltip,
    GlossaryTooltip,
    Capture,
    Dates,
}

impl FixerKind {
    pub fn into_fixer(self) -> Box<dyn ContentFixer> {
        match self {
            Self::BrokenGlossaryTooltip => Box::new(fix_broken_glossary_tooltip),
            Self::GlossaryTooltip => Box::new(replace_glossary_tooltips),
            Self::Capture => Box::new(replace_captures),
            Self::Dates => Box::new(fix_dates),
        }
    }
}

pub fn build_fixers(kinds: &[FixerKind]) -> ContentFixers {
    let mut fixers = ContentFixers::new();
    for kind in kinds {
        fixers.push(kind.into_fixer());
    }
    fixers
}
