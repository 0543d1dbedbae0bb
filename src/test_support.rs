use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::PluginError;
use crate::ports::master::{MasterApi, MasterError, MasterResponse, MasterRoute};
use crate::runner::JobRunner;
use crate::schema::{Envelope, JobDescriptor};

/// Canned master keyed by resource name. Records every route it is asked for.
#[derive(Default)]
pub struct StaticMaster {
    gets: HashMap<&'static str, Result<MasterResponse, MasterError>>,
    posts: HashMap<&'static str, Result<MasterResponse, MasterError>>,
    routes: Mutex<Vec<MasterRoute>>,
    posted: Mutex<Vec<Vec<u8>>>,
}

impl StaticMaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(mut self, resource: &'static str, resp: MasterResponse) -> Self {
        self.gets.insert(resource, Ok(resp));
        self
    }

    pub fn fail_get(mut self, resource: &'static str, err: MasterError) -> Self {
        self.gets.insert(resource, Err(err));
        self
    }

    pub fn on_post(mut self, resource: &'static str, resp: MasterResponse) -> Self {
        self.posts.insert(resource, Ok(resp));
        self
    }

    pub fn routes(&self) -> Vec<MasterRoute> {
        self.routes.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<Vec<u8>> {
        self.posted.lock().unwrap().clone()
    }

    fn answer(
        table: &HashMap<&'static str, Result<MasterResponse, MasterError>>,
        route: &MasterRoute,
    ) -> Result<MasterResponse, MasterError> {
        table.get(route.resource).cloned().unwrap_or(Ok(MasterResponse {
            status: 404,
            body: br#"{"Error":"no such resource"}"#.to_vec(),
        }))
    }
}

#[async_trait::async_trait]
impl MasterApi for StaticMaster {
    async fn get(&self, route: &MasterRoute) -> Result<MasterResponse, MasterError> {
        self.routes.lock().unwrap().push(route.clone());
        Self::answer(&self.gets, route)
    }

    async fn post(
        &self,
        route: &MasterRoute,
        body: Vec<u8>,
    ) -> Result<MasterResponse, MasterError> {
        self.routes.lock().unwrap().push(route.clone());
        self.posted.lock().unwrap().push(body);
        Self::answer(&self.posts, route)
    }
}

/// Runner that remembers every descriptor and answers with a fixed outcome.
pub struct RecordingRunner {
    outcome: Result<i64, PluginError>,
    calls: Mutex<Vec<JobDescriptor>>,
}

impl RecordingRunner {
    pub fn returning(job_id: i64) -> Self {
        Self {
            outcome: Ok(job_id),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(PluginError::Submission(message.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<JobDescriptor> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JobRunner for RecordingRunner {
    async fn submit(&self, _request: &Envelope, job: &JobDescriptor) -> Result<i64, PluginError> {
        self.calls.lock().unwrap().push(job.clone());
        self.outcome.clone()
    }
}
