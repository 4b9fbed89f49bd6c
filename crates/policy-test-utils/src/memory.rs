//! In-process policy store.
//!
//! Realism level: **FAKE**: no transport, but the same reserved-name and
//! not-found behaviour as a real store.
//!
//! Use for: engine tests that need to inject failures at a precise policy or
//! inspect every write the engine made.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use policy_core::{PolicyName, PolicyRuleset, PolicyStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    /// Listing order of the store
    order: Vec<PolicyName>,
    policies: BTreeMap<PolicyName, PolicyRuleset>,
    puts: Vec<(PolicyName, PolicyRuleset)>,
    gets: Vec<PolicyName>,
    fail_list: bool,
    fail_get: BTreeSet<PolicyName>,
    fail_put: BTreeSet<PolicyName>,
}

/// A policy store held in memory.
///
/// Policies are listed in insertion order. Writes to `root` are rejected with
/// [`StoreError::Reserved`], like a real store.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    state: Mutex<State>,
}

impl MemoryPolicyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given `(name, rules)` pairs, in order
    ///
    /// # Panics
    /// Panics if a name is empty.
    pub fn with_policies<'a>(policies: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (name, rules) in policies {
            store.insert(name, rules);
        }
        store
    }

    /// Insert or replace a policy without recording it as a write
    ///
    /// # Panics
    /// Panics if `name` is empty.
    pub fn insert(&self, name: &str, rules: &str) {
        let name = PolicyName::new(name)
            .unwrap_or_else(|e| panic!("MemoryPolicyStore::insert: {e}"));
        let mut state = self.lock();
        if !state.policies.contains_key(&name) {
            state.order.push(name.clone());
        }
        state.policies.insert(name, PolicyRuleset::from(rules));
    }

    /// Make `list_policies` fail
    pub fn fail_list(&self) {
        self.lock().fail_list = true;
    }

    /// Make `get_policy` fail for one name
    ///
    /// # Panics
    /// Panics if `name` is empty.
    pub fn fail_get(&self, name: &str) {
        let name = PolicyName::new(name).unwrap_or_else(|e| panic!("fail_get: {e}"));
        self.lock().fail_get.insert(name);
    }

    /// Make `put_policy` fail for one name
    ///
    /// # Panics
    /// Panics if `name` is empty.
    pub fn fail_put(&self, name: &str) {
        let name = PolicyName::new(name).unwrap_or_else(|e| panic!("fail_put: {e}"));
        self.lock().fail_put.insert(name);
    }

    /// Rules currently stored under `name`
    pub fn rules(&self, name: &str) -> Option<String> {
        let state = self.lock();
        state
            .policies
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, rules)| rules.as_str().to_string())
    }

    /// Whether a policy named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.rules(name).is_some()
    }

    /// Every successful `put_policy` call, in order
    pub fn puts(&self) -> Vec<(String, String)> {
        self.lock()
            .puts
            .iter()
            .map(|(name, rules)| (name.to_string(), rules.to_string()))
            .collect()
    }

    /// Names of successful `put_policy` calls, in order
    pub fn put_names(&self) -> Vec<String> {
        self.puts().into_iter().map(|(name, _)| name).collect()
    }

    /// Names passed to `get_policy`, in order
    pub fn get_names(&self) -> Vec<String> {
        self.lock().gets.iter().map(ToString::to_string).collect()
    }

    /// Snapshot of every stored policy as `(name, rules)`, sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock()
            .policies
            .iter()
            .map(|(name, rules)| (name.to_string(), rules.to_string()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn list_policies(&self) -> StoreResult<Vec<PolicyName>> {
        let state = self.lock();
        if state.fail_list {
            return Err(StoreError::Transport {
                message: "injected list failure".to_string(),
            });
        }
        Ok(state.order.clone())
    }

    fn get_policy(&self, name: &PolicyName) -> StoreResult<PolicyRuleset> {
        let mut state = self.lock();
        state.gets.push(name.clone());
        if state.fail_get.contains(name) {
            return Err(StoreError::Transport {
                message: format!("injected read failure for '{name}'"),
            });
        }
        state
            .policies
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    fn put_policy(&self, name: &PolicyName, rules: &PolicyRuleset) -> StoreResult<()> {
        let mut state = self.lock();
        if name.is_root() {
            return Err(StoreError::Reserved {
                name: name.to_string(),
            });
        }
        if state.fail_put.contains(name) {
            return Err(StoreError::Status {
                status: 500,
                message: format!("injected write failure for '{name}'"),
            });
        }
        if !state.policies.contains_key(name) {
            state.order.push(name.clone());
        }
        state.policies.insert(name.clone(), rules.clone());
        state.puts.push((name.clone(), rules.clone()));
        Ok(())
    }
}
