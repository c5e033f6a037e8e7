use serde::Serialize;

#[derive(Serialize)]
pub struct OccurrencesResponse {
    pub session_id: String,
    pub occurrences: Vec<String>,
}
