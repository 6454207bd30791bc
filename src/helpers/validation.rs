//! Checks on identifiers and request parameters before any lookup happens

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ApiError;

static SCAN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .unwrap_or_else(|err| panic!("Invalid scan id pattern: {}", err))
});
static HASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[0-9a-f]{32}|[0-9a-f]{40}|[0-9a-f]{64})$")
        .unwrap_or_else(|err| panic!("Invalid hash pattern: {}", err))
});
static SHA256: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{64}$").unwrap_or_else(|err| panic!("Invalid sha256 pattern: {}", err))
});

/// Name given to uploads whose name has no usable base name
pub const UNNAMED_FILE: &str = "unnamed";

/// Accepts canonical hyphenated UUIDs in any case.
pub fn validate_scan_id(id: &str) -> Result<(), ApiError> {
    if SCAN_ID.is_match(id) {
        Ok(())
    } else {
        Err(ApiError::InvalidIdentifier(format!("scan id '{}'", id)))
    }
}

/// Accepts md5, sha1 and sha256 hex strings.
pub fn validate_hash(value: &str) -> Result<(), ApiError> {
    if HASH.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::InvalidIdentifier(format!("hash '{}'", value)))
    }
}

pub fn validate_sha256(value: &str) -> Result<(), ApiError> {
    if SHA256.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::InvalidIdentifier(format!("sha256 '{}'", value)))
    }
}

/// Strips every directory part of an uploaded file name. Both separator styles are honored
/// because the name comes from the client's platform.
/// * `name` - File name as sent in the multipart form
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => UNNAMED_FILE.to_owned(),
        base => base.to_owned(),
    }
}

/// Reads the `formatted` query flag. Anything but `false` keeps the formatted output.
pub fn parse_formatted(value: Option<&str>) -> bool {
    !matches!(value, Some(value) if value.trim().eq_ignore_ascii_case("false"))
}

/// Reads the `force` query flag. Only `true` and `1` enable it.
pub fn parse_force(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(value) if value.eq_ignore_ascii_case("true") || value == "1")
}

/// Splits a comma separated probe list. `None` when no probe was named.
pub fn parse_probe_list(value: Option<&str>) -> Option<Vec<String>> {
    let probes: Vec<String> = value?
        .split(',')
        .map(str::trim)
        .filter(|probe| !probe.is_empty())
        .map(str::to_owned)
        .collect();
    if probes.is_empty() {
        None
    } else {
        Some(probes)
    }
}

/// Parses a non negative integer query parameter, `default` when absent.
///
/// Values are capped at `i64::MAX`, the largest offset or limit the database accepts.
/// * `name` - Name of the parameter, used in the error message
pub fn parse_unsigned(name: &str, value: Option<&str>, default: u64) -> Result<u64, ApiError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(parsed) if parsed <= i64::MAX as u64 => Ok(parsed),
        Ok(_) => Err(ApiError::InvalidParameter(format!(
            "{} must not exceed {}",
            name,
            i64::MAX
        ))),
        Err(_) => Err(ApiError::InvalidParameter(format!(
            "{} must be a non negative integer",
            name
        ))),
    }
}
