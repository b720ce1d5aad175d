use serde::{Deserialize, Serialize};

/// Category of a place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    Airport,
    Bus,
    City,
    Country,
    Street,
    Tourism,
    Townhall,
    Train,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Street {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub name: String,
}

/// One search or reverse-geocoding hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<Street>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub administrative: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub countrycode: String,
    /// `"lat,lng"`.
    #[serde(default)]
    pub coordinates: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub place_type: Option<PlaceType>,
    #[serde(default)]
    pub zipcode: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Place>,
    #[serde(default)]
    pub results_count: u64,
    #[serde(default)]
    pub max_results: u64,
    #[serde(default)]
    pub query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchStatus {
    Pending,
    Approved,
}

/// Stored place override.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PatchRecord {
    pub id: String,
    #[serde(default)]
    pub status: Option<PatchStatus>,
    #[serde(flatten)]
    pub place: Place,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchListResponse {
    #[serde(default)]
    pub results: Vec<PatchRecord>,
    #[serde(default)]
    pub results_count: u64,
    #[serde(default)]
    pub max_results: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub total_results: u64,
}

/// Fields of a place override; unset fields are left out of the payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PatchUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub place_type: Option<PlaceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countrycode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

/// Moderation status and language of a patch write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchOptions {
    pub status: Option<PatchStatus>,
    pub language: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    Public,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub app_id: String,
    pub role: KeyRole,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KeyOptions {
    /// Allowed referrer domains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
}
