//! In-memory tracker and scanner fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use reconcile::{
    ApiKey, ArtifactScanner, FolderName, RunConfig, TrackerClient, TrackerConfig, TrackerResponse,
    TransportError,
};
use serde_json::{json, Value};

/// One request received by [`ScriptedTracker`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Call {
    /// The `offset` query parameter, if present.
    pub fn offset(&self) -> Option<u64> {
        self.query
            .iter()
            .find(|(k, _)| k == "offset")
            .and_then(|(_, v)| v.parse().ok())
    }
}

type Responder = Box<dyn Fn(&Call) -> Result<TrackerResponse, TransportError> + Send + Sync>;

/// A tracker that records every call and answers from a closure.
pub struct ScriptedTracker {
    calls: Mutex<Vec<Call>>,
    responder: Responder,
}

impl ScriptedTracker {
    pub fn new(
        responder: impl Fn(&Call) -> Result<TrackerResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Empty backlog; every POST is created and every DELETE succeeds.
    pub fn accepting() -> Self {
        Self::new(|call| {
            Ok(match call.method {
                "GET" => page(&[], 0, 25, 0),
                "POST" => TrackerResponse::new(201, "{}"),
                _ => TrackerResponse::new(204, ""),
            })
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_with(&self, method: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    /// Bodies of every POST to `path`, in order.
    pub fn posted_to(&self, path: &str) -> Vec<Value> {
        self.calls_with("POST")
            .into_iter()
            .filter(|c| c.path == path)
            .filter_map(|c| c.body)
            .collect()
    }

    /// Subjects of every issue posted, in order.
    pub fn issue_subjects(&self) -> Vec<String> {
        self.posted_to("/issues.json")
            .iter()
            .map(|b| b["issue"]["subject"].as_str().unwrap().to_string())
            .collect()
    }

    fn record(&self, call: Call) -> Result<TrackerResponse, TransportError> {
        let response = (self.responder)(&call);
        self.calls.lock().unwrap().push(call);
        response
    }
}

#[async_trait]
impl TrackerClient for ScriptedTracker {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<TrackerResponse, TransportError> {
        self.record(Call {
            method: "GET",
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: None,
        })
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<TrackerResponse, TransportError> {
        self.record(Call {
            method: "POST",
            path: path.to_string(),
            query: Vec::new(),
            body: Some(payload.clone()),
        })
    }

    async fn delete(&self, path: &str) -> Result<TrackerResponse, TransportError> {
        self.record(Call {
            method: "DELETE",
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        })
    }
}

/// A `200` issue listing page.
pub fn page(ids: &[u64], offset: u64, limit: u64, total_count: u64) -> TrackerResponse {
    let issues: Vec<Value> = ids.iter().map(|id| json!({"id": id, "subject": "old"})).collect();
    TrackerResponse::new(
        200,
        json!({
            "issues": issues,
            "offset": offset,
            "limit": limit,
            "total_count": total_count,
        })
        .to_string(),
    )
}

/// Answers listing calls from a backlog of issues `1..=total` served `limit`
/// at a time, and accepts everything else.
pub fn backlog(total: u64, limit: u64) -> ScriptedTracker {
    ScriptedTracker::new(move |call| {
        Ok(match call.method {
            "GET" => {
                let offset = call.offset().unwrap_or(0);
                let ids: Vec<u64> = (offset + 1..=total).take(limit as usize).collect();
                page(&ids, offset, limit, total)
            }
            "POST" => TrackerResponse::new(201, "{}"),
            _ => TrackerResponse::new(200, ""),
        })
    })
}

/// A scanner returning a fixed file list per folder, in the given order.
#[derive(Default)]
pub struct FixedScanner {
    files: HashMap<String, Vec<PathBuf>>,
}

impl FixedScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, folder: &str, files: &[&str]) -> Self {
        self.files.insert(
            folder.to_string(),
            files.iter().map(PathBuf::from).collect(),
        );
        self
    }
}

impl ArtifactScanner for FixedScanner {
    fn scan(&self, folder: &FolderName) -> Vec<PathBuf> {
        self.files.get(folder.as_str()).cloned().unwrap_or_default()
    }
}

pub fn folder(name: &str) -> FolderName {
    FolderName::new(name).unwrap()
}

pub fn run_config() -> RunConfig {
    RunConfig {
        tracker: TrackerConfig {
            base_url: "https://tracker.test".into(),
            api_key: ApiKey::new("test-key").unwrap(),
        },
        ci_base_url: "https://ci.test/".into(),
        workspace_root: PathBuf::from("/var/lib/ci/workspace"),
        project_name: "Formazione - student1".into(),
        student_name: "student1".into(),
    }
}
