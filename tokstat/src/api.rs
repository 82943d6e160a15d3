//! Wire types for the analysis server and the rules for turning raw replies
//! into typed results.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::TsError;

/// Raw HTTP reply handed back by an [`crate::AnalysisApi`] implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct UploadResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Key/value pairs in the order the server wrote them.
pub type Tally = Vec<(String, f64)>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AnalysisData {
    #[serde(default, deserialize_with = "ordered_tally")]
    pub token_counts: Tally,
    #[serde(default, deserialize_with = "ordered_tally")]
    pub quantity_per_token: Tally,
    #[serde(default, deserialize_with = "ordered_tally")]
    pub entries_per_hour: Tally,
    #[serde(default, deserialize_with = "ordered_tally")]
    pub quantity_per_hour: Tally,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphDataResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<AnalysisData>,
}

// Relies on serde_json's `preserve_order` so the map iterates in document order.
fn ordered_tally<'de, D>(deserializer: D) -> Result<Tally, D::Error>
where
    D: Deserializer<'de>,
{
    let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(key, value)| match value.as_f64() {
            Some(number) => Ok((key, number)),
            None => Err(D::Error::custom(format!("value for `{key}` is not a number"))),
        })
        .collect()
}

/// Interpret an `/upload` reply.
///
/// The server answers rejections with a JSON body and a 4xx/5xx status, so
/// the body is consulted before the status. A body that cannot be read on a
/// failing status degrades to [`TsError::Status`].
pub fn decode_upload(reply: &Reply) -> Result<Vec<String>, TsError> {
    match serde_json::from_str::<UploadResult>(&reply.body) {
        Ok(result) if result.success && reply.is_success() => Ok(result.files),
        Ok(result) => Err(TsError::Rejected(result.message)),
        Err(_) if !reply.is_success() => Err(TsError::Status(reply.status)),
        Err(err) => Err(TsError::Decode(err.to_string())),
    }
}

/// Interpret an `/api/graph-data` reply.
pub fn decode_graph_data(reply: &Reply) -> Result<AnalysisData, TsError> {
    match serde_json::from_str::<GraphDataResponse>(&reply.body) {
        Ok(response) if response.success && reply.is_success() => response
            .data
            .ok_or_else(|| TsError::Decode("analysis payload missing `data`".to_string())),
        Ok(response) => Err(TsError::Rejected(response.message)),
        Err(_) if !reply.is_success() => Err(TsError::Status(reply.status)),
        Err(err) => Err(TsError::Decode(err.to_string())),
    }
}
