//! Local HTTP server emulating the Vault ACL policy endpoints.
//!
//! Realism level: **HTTP**: real sockets and the real request/response
//! shapes for `sys/policies/acl`, backed by an in-memory policy table.
//!
//! Use for: client tests that need to inspect paths, headers, and bodies, and
//! CLI tests that run the compiled binary against a source and a destination.

use std::collections::BTreeSet;
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use serde_json::{Value, json};
use tiny_http::{Header, Request, Response, Server};

const ACL_PATH: &str = "/v1/sys/policies/acl";

/// One request received by a [`FakeVault`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method, e.g. `GET`
    pub method: String,
    /// Path and query, e.g. `/v1/sys/policies/acl?list=true`
    pub url: String,
    /// Value of the `X-Vault-Token` header, if sent
    pub token: Option<String>,
    /// Raw request body
    pub body: String,
}

#[derive(Debug, Default)]
struct VaultState {
    token: String,
    policies: Vec<(String, String)>,
    requests: Vec<RecordedRequest>,
    fail_get: BTreeSet<String>,
    fail_put: BTreeSet<String>,
}

impl VaultState {
    fn rules(&self, name: &str) -> Option<&str> {
        self.policies
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, rules)| rules.as_str())
    }

    fn upsert(&mut self, name: &str, rules: &str) {
        match self.policies.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = rules.to_string(),
            None => self.policies.push((name.to_string(), rules.to_string())),
        }
    }
}

/// A Vault policy API served on `127.0.0.1` from a background thread.
///
/// Requests must carry the token given at start, otherwise they are answered
/// with `403`. Writes to `root` are answered with `400`. The server stops when
/// the value is dropped.
pub struct FakeVault {
    server: Arc<Server>,
    state: Arc<Mutex<VaultState>>,
    address: String,
    handle: Option<JoinHandle<()>>,
}

impl FakeVault {
    /// Start an empty server accepting `token`
    ///
    /// # Panics
    /// Panics if the server cannot bind a local port.
    pub fn start(token: &str) -> Self {
        let server = Server::http("127.0.0.1:0")
            .unwrap_or_else(|e| panic!("FakeVault::start: failed to bind: {e}"));
        let server = Arc::new(server);
        let address = format!("http://{}", server.server_addr());
        let state = Arc::new(Mutex::new(VaultState {
            token: token.to_string(),
            ..VaultState::default()
        }));

        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                while let Ok(request) = server.recv() {
                    handle_request(&state, request);
                }
            })
        };

        Self {
            server,
            state,
            address,
            handle: Some(handle),
        }
    }

    /// Start a server holding the given `(name, rules)` pairs, in listing order
    pub fn with_policies<'a>(
        token: &str,
        policies: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let vault = Self::start(token);
        for (name, rules) in policies {
            vault.insert(name, rules);
        }
        vault
    }

    /// Base address, e.g. `http://127.0.0.1:40123`
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Insert or replace a policy without recording a request
    pub fn insert(&self, name: &str, rules: &str) {
        self.lock().upsert(name, rules);
    }

    /// Answer reads of `name` with `500`
    pub fn fail_get(&self, name: &str) {
        self.lock().fail_get.insert(name.to_string());
    }

    /// Answer writes of `name` with `500`
    pub fn fail_put(&self, name: &str) {
        self.lock().fail_put.insert(name.to_string());
    }

    /// Rules currently stored under `name`
    pub fn rules(&self, name: &str) -> Option<String> {
        self.lock().rules(name).map(str::to_string)
    }

    /// Names of every stored policy, in listing order
    pub fn policy_names(&self) -> Vec<String> {
        self.lock()
            .policies
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Names of policies written through the API, in order
    pub fn put_names(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == "PUT" || request.method == "POST")
            .filter_map(|request| policy_segment(&request.url).map(str::to_string))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, VaultState> {
        lock(&self.state)
    }
}

impl Drop for FakeVault {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn lock(state: &Mutex<VaultState>) -> MutexGuard<'_, VaultState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn handle_request(state: &Mutex<VaultState>, mut request: Request) {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);

    let recorded = RecordedRequest {
        method: request.method().as_str().to_string(),
        url: request.url().to_string(),
        token: request
            .headers()
            .iter()
            .find(|header| header.field.equiv("X-Vault-Token"))
            .map(|header| header.value.as_str().to_string()),
        body,
    };

    let (status, payload) = {
        let mut state = lock(state);
        let answer = route(&mut state, &recorded);
        state.requests.push(recorded);
        answer
    };

    let mut response = Response::from_string(payload.map(|v| v.to_string()).unwrap_or_default())
        .with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}

fn route(state: &mut VaultState, request: &RecordedRequest) -> (u16, Option<Value>) {
    if request.token.as_deref() != Some(state.token.as_str()) {
        return (403, Some(json!({ "errors": ["permission denied"] })));
    }

    let (path, query) = request
        .url
        .split_once('?')
        .unwrap_or((request.url.as_str(), ""));
    let Some(rest) = path.strip_prefix(ACL_PATH) else {
        return (404, Some(json!({ "errors": [] })));
    };

    let wants_list = query.split('&').any(|pair| pair == "list=true");
    match (request.method.as_str(), rest.trim_start_matches('/')) {
        ("GET", "") if wants_list => {
            let keys: Vec<&str> = state.policies.iter().map(|(name, _)| name.as_str()).collect();
            (200, Some(json!({ "data": { "keys": keys } })))
        }
        ("GET", name) if !name.is_empty() => {
            if state.fail_get.contains(name) {
                return (500, Some(json!({ "errors": ["internal error"] })));
            }
            match state.rules(name) {
                Some(rules) => (
                    200,
                    Some(json!({ "data": { "name": name, "policy": rules } })),
                ),
                None => (404, Some(json!({ "errors": [] }))),
            }
        }
        ("PUT" | "POST", name) if !name.is_empty() => {
            if name == "root" {
                return (400, Some(json!({ "errors": ["cannot update \"root\" policy"] })));
            }
            if state.fail_put.contains(name) {
                return (500, Some(json!({ "errors": ["internal error"] })));
            }
            let rules = serde_json::from_str::<Value>(&request.body)
                .ok()
                .and_then(|body| body.get("policy").and_then(Value::as_str).map(str::to_string));
            match rules {
                Some(rules) => {
                    state.upsert(name, &rules);
                    (204, None)
                }
                None => (400, Some(json!({ "errors": ["'policy' parameter not supplied or empty"] }))),
            }
        }
        _ => (405, Some(json!({ "errors": ["unsupported operation"] }))),
    }
}

fn policy_segment(url: &str) -> Option<&str> {
    let path = url.split('?').next()?;
    let name = path.strip_prefix(ACL_PATH)?.trim_start_matches('/');
    (!name.is_empty()).then_some(name)
}
