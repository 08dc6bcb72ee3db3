//! Sample API contract
//!
//! Types exchanged with the backend sample API:
//! - `Sample`: aggregate root, owns its runs
//! - `Run`: one sequencing assay execution with open metadata
//! - `RunMetadata`: typed view over `metadata_col` (profiles + display entries)
//! - `FileLocation` / `PipelineResult`: passthrough records
//! - `ListSamplesParams` / `MetadataSearchParams`: request parameters

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key holding the per-position depth profile
pub const COVERAGE_PROFILE_KEY: &str = "coverage_profile";
/// Metadata key holding the per-position Phred profile
pub const QUALITY_PROFILE_KEY: &str = "quality_profile";

/// Default page size for sample listings
pub const DEFAULT_LIMIT: u32 = 50;
/// Largest page the backend will serve
pub const MAX_LIMIT: u32 = 100;

/// A patient-derived specimen and its sequencing runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub sample_id: String,
    /// De-identified patient reference, opaque
    #[serde(default)]
    pub patient_hash: String,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Sample {
    pub fn new(sample_id: impl Into<String>, patient_hash: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            patient_hash: patient_hash.into(),
            created_at: None,
            updated_at: None,
            runs: Vec::new(),
        }
    }

    /// Builder method: add a run
    pub fn run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }
}

/// One execution of a sequencing assay against a sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub run_id: String,
    pub assay_type: String,
    #[serde(default)]
    pub metadata_col: RunMetadata,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: Vec<FileLocation>,
    #[serde(default)]
    pub results: Vec<PipelineResult>,
}

impl Run {
    pub fn new(run_id: impl Into<String>, assay_type: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            assay_type: assay_type.into(),
            metadata_col: RunMetadata::default(),
            created_at: None,
            updated_at: None,
            files: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Builder method: replace metadata
    pub fn metadata(mut self, metadata: RunMetadata) -> Self {
        self.metadata_col = metadata;
        self
    }
}

/// Run metadata split into the two visualization profiles and
/// the remaining display entries.
///
/// On the wire this is a single JSON object; the reserved keys
/// `coverage_profile` and `quality_profile` are lifted into typed
/// fields, everything else stays in `entries` in API order.
/// Profile elements that are not numbers decode as `NaN` and are
/// drawn as gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct RunMetadata {
    pub coverage_profile: Option<Vec<f64>>,
    pub quality_profile: Option<Vec<f64>>,
    pub entries: Map<String, Value>,
}

impl RunMetadata {
    /// Builder method: set the coverage profile
    pub fn coverage(mut self, values: Vec<f64>) -> Self {
        self.coverage_profile = Some(values);
        self
    }

    /// Builder method: set the quality profile
    pub fn quality(mut self, values: Vec<f64>) -> Self {
        self.quality_profile = Some(values);
        self
    }

    /// Builder method: add a display entry
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn coverage_or_empty(&self) -> &[f64] {
        self.coverage_profile.as_deref().unwrap_or(&[])
    }

    pub fn quality_or_empty(&self) -> &[f64] {
        self.quality_profile.as_deref().unwrap_or(&[])
    }
}

impl From<Map<String, Value>> for RunMetadata {
    fn from(mut map: Map<String, Value>) -> Self {
        let coverage_profile = map.remove(COVERAGE_PROFILE_KEY).and_then(profile_from_value);
        let quality_profile = map.remove(QUALITY_PROFILE_KEY).and_then(profile_from_value);

        Self {
            coverage_profile,
            quality_profile,
            entries: map,
        }
    }
}

impl From<RunMetadata> for Map<String, Value> {
    fn from(meta: RunMetadata) -> Self {
        let mut map = meta.entries;
        if let Some(coverage) = meta.coverage_profile {
            map.insert(COVERAGE_PROFILE_KEY.to_string(), profile_to_value(coverage));
        }
        if let Some(quality) = meta.quality_profile {
            map.insert(QUALITY_PROFILE_KEY.to_string(), profile_to_value(quality));
        }
        map
    }
}

fn profile_from_value(value: Value) -> Option<Vec<f64>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                    Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
                    _ => f64::NAN,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn profile_to_value(values: Vec<f64>) -> Value {
    // serde_json maps non-finite floats to null
    Value::Array(values.into_iter().map(Value::from).collect())
}

/// Storage location of a run artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileLocation {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub s3_uri: String,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Output of a pipeline execution for a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineResult {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub clinical_report_json_uri: Option<String>,
    #[serde(default)]
    pub pipeline_version: Option<String>,
    #[serde(default)]
    pub metrics: Map<String, Value>,
    #[serde(default, with = "timestamp")]
    pub run_date: Option<DateTime<Utc>>,
}

/// Query parameters for `GET /samples/`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListSamplesParams {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assay_type: Option<String>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for ListSamplesParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
            assay_type: None,
        }
    }
}

impl ListSamplesParams {
    /// Builder method: filter by assay type
    pub fn assay_type(mut self, assay_type: impl Into<String>) -> Self {
        self.assay_type = Some(assay_type.into());
        self
    }

    /// Clamp to what the backend accepts and drop a blank assay filter
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_LIMIT);
        self.assay_type = self
            .assay_type
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self
    }

    /// Parameters for the page before this one, if any
    pub fn previous_page(&self) -> Option<Self> {
        if self.skip == 0 {
            return None;
        }
        Some(Self {
            skip: self.skip.saturating_sub(self.limit),
            ..self.clone()
        })
    }

    pub fn next_page(&self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.limit),
            ..self.clone()
        }
    }

    /// Encode as a URL query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        let mut query = format!("skip={}&limit={}", self.skip, self.limit);
        if let Some(assay) = &self.assay_type {
            query.push_str("&assay_type=");
            query.push_str(&urlencoding::encode(assay));
        }
        query
    }
}

/// Query parameters for `GET /samples/search/metadata`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSearchParams {
    pub key: String,
    pub value: String,
}

impl MetadataSearchParams {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.key.trim().is_empty() && !self.value.trim().is_empty()
    }
}

/// Backend `GET /health` body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
}

/// Timestamps arrive either as RFC 3339 or as naive ISO 8601 (assumed UTC).
/// Anything unreadable decodes as `None`.
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let parsed = match &raw {
            Value::Null => return Ok(None),
            Value::String(s) => super::parse_timestamp(s),
            _ => None,
        };
        if parsed.is_none() {
            tracing::debug!(value = %raw, "Ignoring unreadable timestamp");
        }
        Ok(parsed)
    }
}

/// Parse an RFC 3339, offset (`+0000`) or naive ISO 8601 timestamp
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> Value {
        json!({
            "sample_id": "TEST-001",
            "patient_hash": "5f4dcc3b5aa765d61d8327deb882cf99",
            "created_at": "2024-03-01T12:00:00",
            "runs": [{
                "run_id": "RUN-TEST-001",
                "assay_type": "WGS",
                "metadata_col": {
                    "sequencer": "NovaSeq",
                    "coverage_profile": [30, 32.5],
                    "read_length": 150,
                    "quality_profile": [35, 36]
                },
                "files": [{"id": 1, "file_type": "bam", "s3_uri": "s3://bucket/run.bam"}],
                "results": [{"id": 7, "pipeline_version": "2.1.0", "metrics": {"snps": 12}}]
            }]
        })
    }

    #[test]
    fn test_decode_sample() {
        let sample: Sample = serde_json::from_value(sample_json()).unwrap();

        assert_eq!(sample.sample_id, "TEST-001");
        assert!(sample.created_at.is_some());
        assert_eq!(sample.runs.len(), 1);

        let run = &sample.runs[0];
        assert_eq!(run.assay_type, "WGS");
        assert_eq!(run.metadata_col.coverage_profile, Some(vec![30.0, 32.5]));
        assert_eq!(run.metadata_col.quality_profile, Some(vec![35.0, 36.0]));
        assert_eq!(run.files[0].s3_uri, "s3://bucket/run.bam");
        assert_eq!(run.results[0].pipeline_version.as_deref(), Some("2.1.0"));
    }

    #[test]
    fn test_metadata_entries_keep_api_order_without_profiles() {
        let sample: Sample = serde_json::from_value(sample_json()).unwrap();
        let keys: Vec<&str> = sample.runs[0]
            .metadata_col
            .entries
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["sequencer", "read_length"]);
    }

    #[test]
    fn test_missing_collections_default_empty() {
        let sample: Sample = serde_json::from_value(json!({
            "sample_id": "S1",
            "patient_hash": "abc",
        }))
        .unwrap();
        assert!(sample.runs.is_empty());

        let run: Run = serde_json::from_value(json!({"run_id": "R1", "assay_type": "RNA-Seq"})).unwrap();
        assert!(run.metadata_col.coverage_profile.is_none());
        assert!(run.metadata_col.entries.is_empty());
    }

    #[test]
    fn test_non_numeric_profile_values_become_gaps() {
        let meta: RunMetadata = serde_json::from_value(json!({
            "coverage_profile": [1, "2", null, "x"],
            "quality_profile": "not-a-list"
        }))
        .unwrap();

        let coverage = meta.coverage_profile.unwrap();
        assert_eq!(coverage[0], 1.0);
        assert_eq!(coverage[1], 2.0);
        assert!(coverage[2].is_nan());
        assert!(coverage[3].is_nan());
        assert!(meta.quality_profile.is_none());
        assert!(meta.entries.is_empty());
    }

    #[test]
    fn test_metadata_reencodes_as_single_object() {
        let meta = RunMetadata::default()
            .entry("instrument", "X")
            .coverage(vec![1.0, f64::NAN])
            .quality(vec![3.0, 4.0]);

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            value,
            json!({"instrument": "X", "coverage_profile": [1.0, null], "quality_profile": [3.0, 4.0]})
        );
    }

    #[test]
    fn test_list_params_defaults_and_paging() {
        let params: ListSamplesParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params, ListSamplesParams::default());
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, 50);
        assert!(params.previous_page().is_none());

        let next = params.next_page();
        assert_eq!(next.skip, 50);
        assert_eq!(next.previous_page().unwrap().skip, 0);
    }

    #[test]
    fn test_list_params_normalized() {
        let params = ListSamplesParams {
            skip: 0,
            limit: 500,
            assay_type: Some("  ".to_string()),
        }
        .normalized();
        assert_eq!(params.limit, MAX_LIMIT);
        assert!(params.assay_type.is_none());

        let query = ListSamplesParams::default().assay_type("RNA Seq").to_query_string();
        assert_eq!(query, "skip=0&limit=50&assay_type=RNA%20Seq");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T12:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-01T12:00:00.123456").is_some());
        assert!(parse_timestamp("2024-03-01 12:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());

        let offset = parse_timestamp("2024-03-01T14:00:00+0200").unwrap();
        assert_eq!(offset, parse_timestamp("2024-03-01T12:00:00Z").unwrap());
    }

    #[test]
    fn test_loose_passthrough_records_still_decode() {
        let sample: Sample = serde_json::from_value(json!({
            "sample_id": "S1",
            "created_at": "2024-03-01T12:00:00+0000",
            "updated_at": "not a date",
            "runs": [{
                "run_id": "R1",
                "assay_type": "WGS",
                "created_at": 1709294400,
                "files": [{"file_type": "bam"}],
                "results": [{"pipeline_version": "2.1.0"}]
            }]
        }))
        .unwrap();

        assert_eq!(sample.patient_hash, "");
        assert_eq!(sample.created_at, parse_timestamp("2024-03-01T12:00:00Z"));
        assert!(sample.updated_at.is_none());

        let run = &sample.runs[0];
        assert!(run.created_at.is_none());
        assert_eq!(run.files[0].id, 0);
        assert_eq!(run.files[0].file_type, "bam");
        assert_eq!(run.files[0].s3_uri, "");
        assert_eq!(run.results[0].id, 0);
    }
}
