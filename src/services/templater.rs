use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use rand::Rng;
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::models::errors::AppError;
use crate::models::upload::extension_of;

/// Per-request inputs for template expansion.
///
/// Clock and randomness are captured here rather than read inside
/// [`PathTemplate::render`], so tests can pin both.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    /// Local wall-clock fields used by the date tokens.
    pub local_time: NaiveDateTime,
    /// Unix seconds used by `{time}`.
    pub unix_time: i64,
    pub original_name: String,
    /// Decimal digit pool consumed by `{rand:N}`.
    pub random_digits: String,
}

impl TemplateContext {
    /// Capture the current instant and fresh randomness for one upload.
    pub fn capture(original_name: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            local_time: now.naive_local(),
            unix_time: now.timestamp(),
            original_name: original_name.into(),
            random_digits: random_digits(),
        }
    }
}

/// Digit pool for `{rand:N}`: two random integers in `1..=10^10`,
/// concatenated. `{rand:N}` always slices the prefix.
pub fn random_digits() -> String {
    let mut rng = rand::rng();
    format!(
        "{}{}",
        rng.random_range(1..=10_000_000_000u64),
        rng.random_range(1..=10_000_000_000u64)
    )
}

/// A destination-path template with `{...}` placeholder tokens.
///
/// Recognized tokens (case-insensitive): `{yyyy}` `{yy}` `{mm}` `{dd}`
/// `{hh}` `{ii}` `{ss}` `{time}` `{filename}` `{rand:N}`. Literal text and
/// unrecognized tokens pass through untouched. The lower-cased extension of
/// the original filename is appended to the rendered path.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\{(yyyy|yy|mm|dd|hh|ii|ss|time|filename|rand:(\d+))\}")
            .expect("token pattern is valid")
    })
}

impl PathTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Expand the template and append the original file's extension.
    ///
    /// Fails when the original filename carries no extension; uploads
    /// without one cannot be named.
    pub fn render(&self, ctx: &TemplateContext) -> Result<String, AppError> {
        let ext = extension_of(&ctx.original_name)
            .ok_or_else(|| AppError::validation_failed("Uploaded file has no extension"))?;

        let expanded = token_regex().replace_all(&self.raw, |caps: &Captures| {
            if let Some(n) = caps.get(2) {
                // {rand:N}: prefix of the digit pool
                let n: usize = n.as_str().parse().unwrap_or(0);
                return ctx.random_digits.chars().take(n).collect();
            }
            match caps[1].to_ascii_lowercase().as_str() {
                "yyyy" => format!("{:04}", ctx.local_time.year()),
                "yy" => format!("{:02}", ctx.local_time.year().rem_euclid(100)),
                "mm" => format!("{:02}", ctx.local_time.month()),
                "dd" => format!("{:02}", ctx.local_time.day()),
                "hh" => format!("{:02}", ctx.local_time.hour()),
                "ii" => format!("{:02}", ctx.local_time.minute()),
                "ss" => format!("{:02}", ctx.local_time.second()),
                "time" => ctx.unix_time.to_string(),
                "filename" => sanitize_stem(&ctx.original_name),
                _ => caps[0].to_string(),
            }
        });

        Ok(format!("{}.{}", expanded, ext.to_ascii_lowercase()))
    }
}

/// Original filename minus its last extension segment, with the characters
/// `| ? " < > / * \` stripped.
fn sanitize_stem(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    };
    stem.chars()
        .filter(|c| !matches!(c, '|' | '?' | '"' | '<' | '>' | '/' | '*' | '\\'))
        .collect()
}
