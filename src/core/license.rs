//! License stub injection.
//!
//! The inserted `VerifyLicense()` always returns `true`; it marks where a real
//! check would go and carries the key into the compiled artifact.

use crate::domain::model::LicenseInjection;
use crate::domain::ports::Storage;
use crate::utils::error::{CompileError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const LICENSED_PREFIX: &str = "licensed_";

fn directive_regex() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| Regex::new(r"^#(include|property)").expect("valid directive regex"))
}

/// Index of the line the license block is inserted before: just past the
/// last leading `#include`/`#property` directive. Blank and `//` lines are
/// skipped; any other line ends the scan.
pub fn insertion_index(lines: &[&str]) -> usize {
    let mut index = 0;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if directive_regex().is_match(trimmed) {
            index = i + 1;
        } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
            break;
        }
    }
    index
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn license_block(license_key: &str) -> String {
    format!(
        r#"
// Auto-generated license verification
string LICENSE_KEY = "{}";
bool VerifyLicense() {{
    // Add your license verification logic here
    return true;
}}
"#,
        escape_literal(license_key)
    )
}

/// Returns `content` with the license block spliced in after the leading
/// directives. CRLF sources stay CRLF throughout.
pub fn inject_into(content: &str, license_key: &str) -> String {
    let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let block = license_block(license_key).replace('\n', eol);
    let index = insertion_index(&lines);
    lines.insert(index, &block);
    lines.join(eol)
}

pub fn licensed_path(source: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        CompileError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("source path has no file name: {}", source.display()),
        ))
    })?;
    let mut licensed = std::ffi::OsString::from(LICENSED_PREFIX);
    licensed.push(name);
    Ok(source.with_file_name(licensed))
}

async fn write_licensed_copy<S: Storage>(
    storage: &S,
    source: &Path,
    license_key: &str,
) -> Result<PathBuf> {
    let content = storage.read_to_string(source).await?;
    let target = licensed_path(source)?;
    storage
        .write_string(&target, &inject_into(&content, license_key))
        .await?;
    Ok(target)
}

/// Writes `licensed_<name>` beside `source`. Never fails: on error the
/// original path comes back as `Skipped` with the reason.
pub async fn inject_license<S: Storage>(
    storage: &S,
    source: &Path,
    license_key: &str,
) -> LicenseInjection {
    match write_licensed_copy(storage, source, license_key).await {
        Ok(path) => {
            tracing::info!("🔐 License injected into {}", path.display());
            LicenseInjection::Injected { path }
        }
        Err(e) => {
            tracing::warn!("❌ License injection failed: {}", e);
            LicenseInjection::Skipped {
                original: source.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

const BASE36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SEGMENT_LEN: usize = 11;
const ID_SEGMENT_LEN: usize = 8;

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

fn leading_chars(value: &str, count: usize) -> String {
    value.chars().take(count).collect()
}

/// `EA-<user>-<product>-<random>-<TIMESTAMP>`, ids truncated to eight
/// characters and the millisecond timestamp in upper-case base 36.
pub fn generate_license_key(user_id: &str, product_id: &str) -> String {
    generate_license_key_with(user_id, product_id, Utc::now(), &mut rand::thread_rng())
}

pub fn generate_license_key_with<R: Rng + ?Sized>(
    user_id: &str,
    product_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let random: String = (0..RANDOM_SEGMENT_LEN)
        .map(|_| BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())] as char)
        .collect();
    let timestamp = u64::try_from(now.timestamp_millis()).unwrap_or(0);

    format!(
        "EA-{}-{}-{}-{}",
        leading_chars(user_id, ID_SEGMENT_LEN),
        leading_chars(product_id, ID_SEGMENT_LEN),
        random,
        to_base36(timestamp).to_uppercase()
    )
}
