//! Visual Recognition v3: general and custom classification, face detection
//! and classifier management.

use std::future::Future;

use tracing::info;

use crate::client::WatsonClient;
use crate::config::{ServiceConfig, VISUAL_RECOGNITION_DEFAULT_URL, VISUAL_RECOGNITION_V3_VERSION};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::models::visual_recognition_v3::{
    ClassifiedImages, Classifier, ClassifyOptions, Classifiers, DetectedFaces,
};
use crate::operation::{Arguments, BodyKind, Operation, Param};
use crate::poll::{poll_until, Attempt, PollPolicy};

pub static CLASSIFY: Operation = Operation {
    name: "classify",
    method: HttpMethod::Get,
    path: "/v3/classify",
    params: &[
        Param::required_query("url"),
        Param::query("classifier_ids"),
        Param::query("owners"),
        Param::query("threshold"),
        Param::header("Accept-Language"),
    ],
    body: BodyKind::None,
};

pub static DETECT_FACES: Operation = Operation {
    name: "detect_faces",
    method: HttpMethod::Get,
    path: "/v3/detect_faces",
    params: &[Param::required_query("url"), Param::header("Accept-Language")],
    body: BodyKind::None,
};

pub static LIST_CLASSIFIERS: Operation = Operation {
    name: "list_classifiers",
    method: HttpMethod::Get,
    path: "/v3/classifiers",
    params: &[Param::query("verbose")],
    body: BodyKind::None,
};

pub static GET_CLASSIFIER: Operation = Operation {
    name: "get_classifier",
    method: HttpMethod::Get,
    path: "/v3/classifiers/{classifier_id}",
    params: &[Param::path("classifier_id")],
    body: BodyKind::None,
};

pub static DELETE_CLASSIFIER: Operation = Operation {
    name: "delete_classifier",
    method: HttpMethod::Delete,
    path: "/v3/classifiers/{classifier_id}",
    params: &[Param::path("classifier_id")],
    body: BodyKind::None,
};

#[derive(Debug, Clone)]
pub struct VisualRecognitionV3 {
    client: WatsonClient,
}

impl VisualRecognitionV3 {
    pub fn new(client: WatsonClient) -> Self {
        Self { client }
    }

    /// Configure from `VISUAL_RECOGNITION_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ServiceConfig::from_env(
            "VISUAL_RECOGNITION",
            VISUAL_RECOGNITION_DEFAULT_URL,
            VISUAL_RECOGNITION_V3_VERSION,
        )?;
        Ok(Self::new(WatsonClient::from_config(config)?))
    }

    pub fn client(&self) -> &WatsonClient {
        &self.client
    }

    /// Classify the image at `options.url`.
    pub fn classify(&self, options: &ClassifyOptions) -> impl Future<Output = Result<ClassifiedImages>> + Send + '_ {
        let args = Arguments::new()
            .set("url", &options.url)
            .set_list("classifier_ids", &options.classifier_ids)
            .set_list("owners", &options.owners)
            .set_opt("threshold", options.threshold)
            .set_opt("Accept-Language", options.accept_language.as_ref());
        self.client.call(&CLASSIFY, args)
    }

    pub fn detect_faces<'a>(
        &'a self,
        url: &str,
        accept_language: Option<&str>,
    ) -> impl Future<Output = Result<DetectedFaces>> + Send + 'a {
        let args = Arguments::new()
            .set("url", url)
            .set_opt("Accept-Language", accept_language);
        self.client.call(&DETECT_FACES, args)
    }

    pub fn list_classifiers(&self, verbose: Option<bool>) -> impl Future<Output = Result<Classifiers>> + Send + '_ {
        let args = Arguments::new().set_opt("verbose", verbose);
        self.client.call(&LIST_CLASSIFIERS, args)
    }

    pub fn get_classifier<'a>(&'a self, classifier_id: &str) -> impl Future<Output = Result<Classifier>> + Send + 'a {
        let args = Arguments::new().set("classifier_id", classifier_id);
        self.client.call(&GET_CLASSIFIER, args)
    }

    pub fn delete_classifier<'a>(&'a self, classifier_id: &str) -> impl Future<Output = Result<()>> + Send + 'a {
        let args = Arguments::new().set("classifier_id", classifier_id);
        self.client.call_empty(&DELETE_CLASSIFIER, args)
    }

    /// Poll `get_classifier` until the classifier is `ready` or `failed`.
    ///
    /// Returns the classifier in its terminal state; a `failed` classifier is
    /// returned, not turned into an error.
    pub async fn wait_for_classifier(&self, classifier_id: &str, policy: PollPolicy) -> Result<Classifier> {
        let classifier = poll_until(policy, move |_| async move {
            let classifier = self.get_classifier(classifier_id).await?;
            if classifier.status.as_ref().is_some_and(|status| status.is_terminal()) {
                Ok(Attempt::Done(classifier))
            } else {
                Ok(Attempt::Pending)
            }
        })
        .await?;
        info!(
            classifier_id,
            status = ?classifier.status,
            "classifier reached a terminal state"
        );
        Ok(classifier)
    }
}
