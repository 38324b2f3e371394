use serde::{Deserialize, Serialize};

/// Response of the provider's `dataset:aggregate` endpoint: time buckets,
/// each holding one dataset per requested source, each holding sample points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleFitAggregateResponse {
    #[serde(default)]
    pub bucket: Vec<Bucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(default)]
    pub dataset: Vec<Dataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub data_source_id: Option<String>,
    #[serde(default)]
    pub point: Vec<DataPoint>,
}

/// One provider-reported sample. `start_time_nanos` is a string-encoded
/// epoch-nanosecond timestamp and may be missing entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    #[serde(default)]
    pub data_type_name: String,
    #[serde(default)]
    pub start_time_nanos: Option<String>,
    #[serde(default)]
    pub value: Vec<PointValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointValue {
    #[serde(default)]
    pub fp_val: Option<f64>,
    #[serde(default)]
    pub map_val: Vec<MapValEntry>,
}

/// Named sub-field of a nutrition summary (`calories`, `sodium`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapValEntry {
    pub key: String,
    #[serde(default)]
    pub value: MapFieldValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFieldValue {
    #[serde(default)]
    pub fp_val: Option<f64>,
}

/// Error body the provider sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
