/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog layer and the UI layer.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Represents a single cataloged mesh.
///
/// Field names match the keys of `metadata.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelRecord {
    /// Catalog identifier, assigned as `count + 1` when the model was added
    pub id: String,
    /// Original filename (e.g., "cube.obj")
    pub name: String,
    /// Path to the copy under `models/`
    pub file_path: PathBuf,
    /// Local time the model was added, stored as ISO-8601
    pub upload_date: NaiveDateTime,
    pub tags: Vec<String>,
    /// Where the rendered thumbnail lives (`previews/<id>.png`); may not exist yet
    pub preview_path: PathBuf,
}

impl ModelRecord {
    /// Upload date as shown on cards and matched by the filter
    pub fn upload_day(&self) -> String {
        self.upload_date.format("%Y-%m-%d").to_string()
    }

    /// Tags joined the way the card label and the filter see them
    pub fn joined_tags(&self, separator: &str) -> String {
        self.tags.join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> ModelRecord {
        ModelRecord {
            id: "7".to_string(),
            name: "teapot.obj".to_string(),
            file_path: PathBuf::from("store/models/7_teapot.obj"),
            upload_date: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_micro_opt(14, 5, 1, 250_000)
                .unwrap(),
            tags: vec!["kitchen".to_string(), "classic".to_string()],
            preview_path: PathBuf::from("store/previews/7.png"),
        }
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(record()).unwrap();

        assert_eq!(json["id"], "7");
        assert_eq!(json["name"], "teapot.obj");
        assert_eq!(json["file_path"], "store/models/7_teapot.obj");
        assert_eq!(json["upload_date"], "2024-03-09T14:05:01.250");
        assert_eq!(json["tags"][1], "classic");
        assert_eq!(json["preview_path"], "store/previews/7.png");
    }

    #[test]
    fn test_reads_microsecond_timestamps() {
        let json = r#"{
            "id": "1",
            "name": "cube.obj",
            "file_path": "gallery_storage/models/1_cube.obj",
            "upload_date": "2024-11-02T09:30:15.123456",
            "tags": ["default"],
            "preview_path": "gallery_storage/previews/1.png"
        }"#;

        let parsed: ModelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.upload_day(), "2024-11-02");
        assert_eq!(parsed.tags, vec!["default"]);
    }

    #[test]
    fn test_joined_tags() {
        assert_eq!(record().joined_tags(", "), "kitchen, classic");
        assert_eq!(record().joined_tags(","), "kitchen,classic");
    }
}
