use serde::{Deserialize, Serialize};
use std::fmt;

/// One animal extracted from its detail page.
///
/// Built only after a successful fetch + parse + extract cycle and never
/// mutated afterwards. Serialized keys match the exported JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Derived from the detail URL path, e.g. `/koshki/fluffy` -> `fluffy`
    #[serde(rename = "id_name")]
    pub id_name: String,
    pub name: String,
    pub gender: String,
    #[serde(rename = "short description")]
    pub short_description: String,
    #[serde(rename = "full description")]
    pub full_description: String,
    /// Phone numbers in document order
    #[serde(rename = "phone")]
    pub phones: Vec<String>,
    /// Main image first (when present), then gallery images in document order
    #[serde(rename = "image")]
    pub images: Vec<String>,
}

impl Record {
    pub fn id(&self) -> &str {
        &self.id_name
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Record: {}", self.id_name)?;
        writeln!(f, "name: {}, gender: {}", self.name, self.gender)?;
        writeln!(f, "short description: {}", self.short_description)?;
        writeln!(f, "full description: {}", self.full_description)?;
        writeln!(f, "phone numbers: {:?}", self.phones)?;
        writeln!(f, "images ref:")?;
        for image in &self.images {
            writeln!(f, "{image}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fluffy() -> Record {
        Record {
            id_name: "fluffy".to_string(),
            name: "Fluffy".to_string(),
            gender: "female".to_string(),
            short_description: "Calm and gentle".to_string(),
            full_description: "Loves naps".to_string(),
            phones: vec!["+7 912 345 67 89".to_string()],
            images: vec!["/img/fluffy-main.jpg".to_string(), "/img/fluffy-1.jpg".to_string()],
        }
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = fluffy();
        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_uses_export_keys() {
        let value = serde_json::to_value(fluffy()).unwrap();
        let object = value.as_object().unwrap();

        for key in ["id_name", "name", "gender", "short description", "full description", "phone", "image"] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 7);
        assert_eq!(value["image"][0], "/img/fluffy-main.jpg");
    }

    #[test]
    fn test_display_lists_images() {
        let text = fluffy().to_string();
        assert!(text.starts_with("Record: fluffy"));
        assert!(text.contains("/img/fluffy-1.jpg\n"));
    }
}
