//! Visual Recognition v3 classification, face detection and custom
//! classifier models.

use serde::{Deserialize, Serialize};

/// Training state of a custom classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClassifierStatus {
    Ready,
    Training,
    Retraining,
    Failed,
    /// A status this client does not know about, kept as sent.
    Unrecognized(String),
}

impl ClassifierStatus {
    /// `ready` and `failed` will not change without a new training request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClassifierStatus::Ready | ClassifierStatus::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClassifierStatus::Ready => "ready",
            ClassifierStatus::Training => "training",
            ClassifierStatus::Retraining => "retraining",
            ClassifierStatus::Failed => "failed",
            ClassifierStatus::Unrecognized(other) => other,
        }
    }
}

impl From<String> for ClassifierStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "ready" => ClassifierStatus::Ready,
            "training" => ClassifierStatus::Training,
            "retraining" => ClassifierStatus::Retraining,
            "failed" => ClassifierStatus::Failed,
            _ => ClassifierStatus::Unrecognized(status),
        }
    }
}

impl From<ClassifierStatus> for String {
    fn from(status: ClassifierStatus) -> Self {
        match status {
            ClassifierStatus::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub classifier_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClassifierStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_ml_enabled: Option<bool>,
    /// Why training failed, when `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<Class>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrained: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl Classifier {
    pub fn is_ready(&self) -> bool {
        self.status == Some(ClassifierStatus::Ready)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifiers {
    pub classifiers: Vec<Classifier>,
}

/// Arguments for classifying an image by URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifyOptions {
    pub url: String,
    /// Empty means the service default (`default`).
    pub classifier_ids: Vec<String>,
    /// `IBM`, `me`, or both.
    pub owners: Vec<String>,
    /// Minimum score, 0.0 to 1.0.
    pub threshold: Option<f32>,
    pub accept_language: Option<String>,
}

impl ClassifyOptions {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_classes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_processed: Option<u32>,
    pub images: Vec<ClassifiedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<WarningInfo>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<Vec<ClassifierResult>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    pub name: String,
    pub classifier_id: String,
    pub classes: Vec<ClassResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassResult {
    pub class: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hierarchy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFaces {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_processed: Option<u32>,
    pub images: Vec<ImageWithFaces>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<WarningInfo>>,
}

impl DetectedFaces {
    pub fn face_count(&self) -> usize {
        self.images.iter().map(|image| image.faces.as_ref().map_or(0, Vec::len)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageWithFaces {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<Face>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<FaceAge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<FaceGender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_location: Option<FaceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceGender {
    /// `MALE` or `FEMALE`.
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_label: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceLocation {
    pub width: u32,
    pub height: u32,
    pub left: u32,
    pub top: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: u16,
    pub description: String,
    pub error_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningInfo {
    pub warning_id: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifier_status_values() {
        let statuses: Vec<ClassifierStatus> =
            serde_json::from_value(json!(["ready", "training", "retraining", "failed", "archived"])).unwrap();
        assert_eq!(
            statuses,
            [
                ClassifierStatus::Ready,
                ClassifierStatus::Training,
                ClassifierStatus::Retraining,
                ClassifierStatus::Failed,
                ClassifierStatus::Unrecognized("archived".to_string()),
            ]
        );
        let terminal: Vec<bool> = statuses.iter().map(|s| s.is_terminal()).collect();
        assert_eq!(terminal, [true, false, false, true, false]);
    }

    #[test]
    fn classifier_round_trip_keeps_absent_fields_absent() {
        let doc = json!({
            "classifier_id": "dogs_1477088859",
            "name": "dogs",
            "status": "training",
            "classes": [{"class": "beagle"}, {"class": "husky"}]
        });
        let classifier: Classifier = serde_json::from_value(doc.clone()).unwrap();
        assert!(!classifier.is_ready());
        assert!(classifier.owner.is_none());
        assert_eq!(serde_json::to_value(&classifier).unwrap(), doc);
    }

    #[test]
    fn classified_images_decode() {
        let result: ClassifiedImages = serde_json::from_value(json!({
            "custom_classes": 0,
            "images_processed": 1,
            "images": [{
                "source_url": "https://example.com/fruit.jpg",
                "resolved_url": "https://example.com/fruit.jpg",
                "classifiers": [{
                    "name": "default",
                    "classifier_id": "default",
                    "classes": [
                        {"class": "banana", "score": 0.81, "type_hierarchy": "/fruit/banana"},
                        {"class": "yellow color", "score": 0.9}
                    ]
                }]
            }]
        }))
        .unwrap();
        let classes = &result.images[0].classifiers.as_ref().unwrap()[0].classes;
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].type_hierarchy.as_deref(), Some("/fruit/banana"));
    }

    #[test]
    fn face_count_sums_over_images() {
        let faces: DetectedFaces = serde_json::from_value(json!({
            "images_processed": 2,
            "images": [
                {"faces": [{"age": {"min": 30, "max": 40, "score": 0.5}}, {}]},
                {"faces": [], "error": {"code": 400, "description": "bad image", "error_id": "input_error"}}
            ]
        }))
        .unwrap();
        assert_eq!(faces.face_count(), 2);
        assert_eq!(faces.images[1].error.as_ref().unwrap().code, 400);
    }

    #[test]
    fn unknown_classifier_status_is_written_back_as_sent() {
        let doc = json!({"classifier_id": "c", "name": "n", "status": "archived"});
        let classifier: Classifier = serde_json::from_value(doc.clone()).unwrap();
        assert!(!classifier.status.as_ref().unwrap().is_terminal());
        assert_eq!(serde_json::to_value(&classifier).unwrap(), doc);
    }

    #[test]
    fn empty_class_list_survives_round_trip() {
        let doc = json!({"classes": [], "classifier_id": "c", "name": "n"});
        let classifier: Classifier = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(classifier.classes.as_deref(), Some(&[][..]));
        assert_eq!(serde_json::to_value(&classifier).unwrap(), doc);
    }

    #[test]
    fn classified_images_round_trip() {
        let docs = [
            json!({"images": [{"source_url": "https://example.com/a.jpg"}]}),
            json!({
                "images_processed": 1,
                "images": [{"classifiers": [], "error": {"code": 400, "description": "bad", "error_id": "input_error"}}],
                "warnings": []
            }),
            json!({"images": [{"faces": []}, {"image": "b.jpg"}]}),
        ];
        for doc in &docs[..2] {
            let classified: ClassifiedImages = serde_json::from_value(doc.clone()).unwrap();
            assert_eq!(&serde_json::to_value(&classified).unwrap(), doc);
        }
        let faces: DetectedFaces = serde_json::from_value(docs[2].clone()).unwrap();
        assert_eq!(faces.face_count(), 0);
        assert_eq!(serde_json::to_value(&faces).unwrap(), docs[2]);
    }
}
