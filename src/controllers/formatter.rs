//! Shapes stored file and probe records into what clients receive

use std::collections::BTreeMap;

use sea_orm::prelude::DateTime;
use serde::Serialize;
use serde_json::Value;

use crate::database::models::{file, probe_result};
use crate::database::service_trait::FileWebRecord;

pub const VERDICT_PENDING: &str = "pending";
pub const VERDICT_ERROR: &str = "error";
pub const VERDICT_CLEAN: &str = "clean";
pub const VERDICT_DETECTED: &str = "detected";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileInfos {
    pub size: i64,
    pub sha256: String,
    pub sha1: String,
    pub md5: String,
    pub timestamp_first_scan: DateTime,
    pub timestamp_last_scan: DateTime,
}

impl From<&file::Model> for FileInfos {
    fn from(file: &file::Model) -> Self {
        FileInfos {
            size: file.size,
            sha256: file.sha256.clone(),
            sha1: file.sha1.clone(),
            md5: file.md5.clone(),
            timestamp_first_scan: file.timestamp_first_scan,
            timestamp_last_scan: file.timestamp_last_scan,
        }
    }
}

/// Probe result as stored, with the payload parsed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawProbeResult {
    pub name: String,
    #[serde(rename = "type")]
    pub probe_type: Option<String>,
    pub status: Option<i32>,
    pub results: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeResults {
    /// `{probe name: verdict}`
    Formatted(BTreeMap<String, String>),
    Raw(Vec<RawProbeResult>),
}

/// One file of a scan, as listed by searches and scan results
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileWebView {
    pub name: String,
    pub result_id: i32,
    pub scan_id: String,
    pub file_infos: FileInfos,
    pub probe_results: ProbeResults,
    pub probes_total: usize,
    pub probes_finished: usize,
    /// Highest status among the finished probes, `None` while nothing finished
    pub status: Option<i32>,
}

/// Detail of one file of a scan
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileResultView {
    pub tools_finished: usize,
    pub tools_total: usize,
    pub file_infos: FileInfos,
    pub probe_results: ProbeResults,
}

/// Stored payloads are JSON; anything else is handed out as a plain string.
fn parse_payload(payload: Option<&str>) -> Value {
    match payload {
        None => Value::Null,
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned())),
    }
}

/// Summarises one probe result in a single word, or the probe's own finding.
pub fn verdict(result: &probe_result::Model) -> String {
    match result.status {
        None => VERDICT_PENDING.to_owned(),
        Some(status) if status < 0 => VERDICT_ERROR.to_owned(),
        Some(0) => VERDICT_CLEAN.to_owned(),
        Some(_) => match parse_payload(result.results.as_deref()) {
            Value::Object(map) => match map.get("results") {
                Some(Value::String(finding)) if !finding.is_empty() => finding.clone(),
                _ => VERDICT_DETECTED.to_owned(),
            },
            Value::String(finding) if !finding.is_empty() => finding,
            _ => VERDICT_DETECTED.to_owned(),
        },
    }
}

pub fn format_probe_results(results: &[probe_result::Model], formatted: bool) -> ProbeResults {
    if formatted {
        ProbeResults::Formatted(
            results
                .iter()
                .map(|result| (result.name.clone(), verdict(result)))
                .collect(),
        )
    } else {
        ProbeResults::Raw(
            results
                .iter()
                .map(|result| RawProbeResult {
                    name: result.name.clone(),
                    probe_type: result.probe_type.clone(),
                    status: result.status,
                    results: parse_payload(result.results.as_deref()),
                })
                .collect(),
        )
    }
}

fn finished_count(results: &[probe_result::Model]) -> usize {
    results.iter().filter(|result| result.status.is_some()).count()
}

pub fn format_file_web(record: &FileWebRecord, formatted: bool) -> FileWebView {
    FileWebView {
        name: record.file_web.name.clone(),
        result_id: record.file_web.scan_file_idx,
        scan_id: record.scan_id.clone(),
        file_infos: FileInfos::from(&record.file),
        probe_results: format_probe_results(&record.probe_results, formatted),
        probes_total: record.probe_results.len(),
        probes_finished: finished_count(&record.probe_results),
        status: record.probe_results.iter().filter_map(|result| result.status).max(),
    }
}

pub fn format_file_result(record: &FileWebRecord, formatted: bool) -> FileResultView {
    FileResultView {
        tools_finished: finished_count(&record.probe_results),
        tools_total: record.probe_results.len(),
        file_infos: FileInfos::from(&record.file),
        probe_results: format_probe_results(&record.probe_results, formatted),
    }
}
