#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use cims_tauri::catalog::ModuleSpec;
use cims_tauri::inflight::InFlight;
use cims_tauri::transport::{ApiRequest, HttpReply, Method, Transport};
use cims_tauri::{ApiClient, ConsoleConfig, ConsoleError, ConsoleResult, PageController, SessionStore};
use serde_json::{json, Value};

pub const BASE: &str = "http://cims.test";
pub const TOKEN: &str = "test-token";

type Hook = Arc<dyn Fn() + Send + Sync>;

/// Scripted gateway: records every request and replays queued replies per
/// `METHOD url`. The last reply queued for a route keeps answering.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<String, VecDeque<HttpReply>>>,
    hooks: Mutex<HashMap<String, Hook>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn route(method: Method, url: &str) -> String {
    format!("{} {}", method.as_str(), url)
}

impl FakeTransport {
    pub fn reply(&self, method: Method, path: &str, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .entry(route(method, &format!("{BASE}{path}")))
            .or_default()
            .push_back(HttpReply {
                status,
                body: body.to_string(),
            });
    }

    pub fn ok(&self, method: Method, path: &str, content: Value) {
        self.reply(method, path, 200, &envelope("00", "Success", content));
    }

    pub fn get_ok(&self, path: &str, content: Value) {
        self.ok(Method::Get, path, content);
    }

    /// Runs `hook` while the request to `path` is in flight.
    pub fn during(&self, method: Method, path: &str, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks
            .lock()
            .unwrap()
            .insert(route(method, &format!("{BASE}{path}")), Arc::new(hook));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| route(request.method, &request.url))
            .collect()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        let wanted = route(method, &format!("{BASE}{path}"));
        self.calls().iter().filter(|call| **call == wanted).count()
    }

    pub fn last_to(&self, method: Method, path: &str) -> Option<ApiRequest> {
        let url = format!("{BASE}{path}");
        self.requests()
            .into_iter()
            .rev()
            .find(|request| request.method == method && request.url == url)
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: &ApiRequest) -> ConsoleResult<HttpReply> {
        self.requests.lock().unwrap().push(request.clone());
        let key = route(request.method, &request.url);
        let hook = self.hooks.lock().unwrap().get(&key).cloned();
        if let Some(hook) = hook {
            hook();
        }
        let mut replies = self.replies.lock().unwrap();
        let queue = replies
            .get_mut(&key)
            .ok_or_else(|| ConsoleError::Transport(format!("unexpected request {key}")))?;
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.ok_or_else(|| ConsoleError::Transport(format!("no reply left for {key}")))
    }
}

pub fn envelope(code: &str, message: &str, content: Value) -> String {
    json!({ "code": code, "message": message, "content": content }).to_string()
}

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub client: ApiClient,
    pub sessions: Arc<SessionStore>,
    pub inflight: InFlight,
}

impl Harness {
    pub fn new() -> Self {
        let transport = Arc::new(FakeTransport::default());
        let config = ConsoleConfig {
            base_url: BASE.to_string(),
            ..ConsoleConfig::default()
        };
        Self {
            client: ApiClient::new(config, transport.clone()),
            transport,
            sessions: Arc::new(SessionStore::new()),
            inflight: InFlight::new(),
        }
    }

    pub fn logged_in() -> Self {
        let harness = Self::new();
        harness.sessions.set("token", TOKEN);
        harness
    }

    pub fn page(&self, module: &'static ModuleSpec) -> Arc<PageController> {
        Arc::new(PageController::new(
            &format!("{}-1", module.key),
            module,
            self.client.clone(),
            self.sessions.clone(),
            self.inflight.clone(),
        ))
    }
}
