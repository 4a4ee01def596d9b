//! Test doubles and common utilities for sync contract tests
//!
//! This module provides minimal test doubles that record every call the
//! engine makes, so contract tests can assert on reads and writes.

#![allow(dead_code)]

use async_trait::async_trait;
use contacts_core::error::{Error, Result};
use contacts_core::traits::{ContactStore, RemoteClient, RemoteClientFactory};
use contacts_core::{Contact, MemoryContactStore, SyncConfig};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;
use uuid::Uuid;

/// Pauses `fetch_all` until the test releases it
pub struct FetchGate {
    /// Notified when a fetch reaches the gate
    pub entered: Notify,
    /// Notify to let the fetch continue
    pub release: Notify,
}

impl FetchGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

struct RemoteState {
    contacts: std::sync::Mutex<Vec<Contact>>,
    fetch_call_count: AtomicUsize,
    create_call_count: AtomicUsize,
    fail_fetch: AtomicBool,
    failing_creates: std::sync::Mutex<HashSet<Uuid>>,
    gate: std::sync::Mutex<Option<Arc<FetchGate>>>,
}

/// An in-memory remote service that tracks calls
///
/// Clones share the same contact list and counters, so the copy handed to
/// the engine and the copy kept by the test observe the same state.
#[derive(Clone)]
pub struct MockRemoteClient {
    state: Arc<RemoteState>,
}

impl MockRemoteClient {
    pub fn new() -> Self {
        Self::with_contacts(Vec::new())
    }

    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            state: Arc::new(RemoteState {
                contacts: std::sync::Mutex::new(contacts),
                fetch_call_count: AtomicUsize::new(0),
                create_call_count: AtomicUsize::new(0),
                fail_fetch: AtomicBool::new(false),
                failing_creates: std::sync::Mutex::new(HashSet::new()),
                gate: std::sync::Mutex::new(None),
            }),
        }
    }

    /// Make every subsequent fetch fail
    pub fn fail_fetches(&self, fail: bool) {
        self.state.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make creates of this contact fail
    pub fn fail_create_of(&self, id: Uuid) {
        self.state.failing_creates.lock().unwrap().insert(id);
    }

    /// Let creates of this contact succeed again
    pub fn heal_create_of(&self, id: Uuid) {
        self.state.failing_creates.lock().unwrap().remove(&id);
    }

    /// Hold the next fetches at `gate` until released
    pub fn set_gate(&self, gate: Arc<FetchGate>) {
        *self.state.gate.lock().unwrap() = Some(gate);
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.state.contacts.lock().unwrap().clone()
    }

    pub fn ids(&self) -> HashSet<Uuid> {
        ids_of(&self.contacts())
    }

    pub fn fetch_call_count(&self) -> usize {
        self.state.fetch_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.state.create_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteClient for MockRemoteClient {
    async fn fetch_all(&self) -> Result<Vec<Contact>> {
        self.state.fetch_call_count.fetch_add(1, Ordering::SeqCst);

        let gate = self.state.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.state.fail_fetch.load(Ordering::SeqCst) {
            return Err(Error::http("connection refused"));
        }
        Ok(self.contacts())
    }

    async fn create(&self, contact: &Contact) -> Result<()> {
        self.state.create_call_count.fetch_add(1, Ordering::SeqCst);

        if self.state.failing_creates.lock().unwrap().contains(&contact.id()) {
            return Err(Error::remote("mock", "HTTP 500: internal error"));
        }
        self.state.contacts.lock().unwrap().push(contact.clone());
        Ok(())
    }

    fn remote_name(&self) -> &'static str {
        "mock"
    }
}

/// A RemoteClientFactory that hands out clones of one MockRemoteClient
pub struct MockRemoteFactory {
    remote: MockRemoteClient,
    create_call_count: AtomicUsize,
    fail: bool,
}

impl MockRemoteFactory {
    pub fn new(remote: MockRemoteClient) -> Self {
        Self {
            remote,
            create_call_count: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// A factory whose every create fails
    pub fn failing() -> Self {
        Self {
            remote: MockRemoteClient::new(),
            create_call_count: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }
}

impl RemoteClientFactory for MockRemoteFactory {
    fn create(&self, _config: &SyncConfig) -> Result<Box<dyn RemoteClient>> {
        self.create_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::config("invalid base URL"));
        }
        Ok(Box::new(self.remote.clone()))
    }
}

/// A ContactStore wrapper that counts reads and writes
#[derive(Clone)]
pub struct CountingStore {
    inner: MemoryContactStore,
    read_count: Arc<AtomicUsize>,
    write_count: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            inner: MemoryContactStore::with_contacts(contacts),
            read_count: Arc::new(AtomicUsize::new(0)),
            write_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored contacts without touching the counters
    pub async fn snapshot(&self) -> Vec<Contact> {
        self.inner.get_all().await.unwrap()
    }

    pub async fn ids(&self) -> HashSet<Uuid> {
        ids_of(&self.snapshot().await)
    }
}

#[async_trait]
impl ContactStore for CountingStore {
    async fn get_all(&self) -> Result<Vec<Contact>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.inner.get_all().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Contact>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }

    async fn add(&self, contact: &Contact) -> Result<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.inner.add(contact).await
    }

    async fn update(&self, contact: &Contact) -> Result<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.inner.update(contact).await
    }

    async fn flush(&self) -> Result<()> {
        self.inner.flush().await
    }
}

/// A store whose reads always fail
pub struct BrokenStore;

#[async_trait]
impl ContactStore for BrokenStore {
    async fn get_all(&self) -> Result<Vec<Contact>> {
        Err(Error::store("disk I/O error"))
    }

    async fn get(&self, _id: Uuid) -> Result<Option<Contact>> {
        Err(Error::store("disk I/O error"))
    }

    async fn add(&self, _contact: &Contact) -> Result<()> {
        Err(Error::store("disk I/O error"))
    }

    async fn update(&self, _contact: &Contact) -> Result<()> {
        Err(Error::store("disk I/O error"))
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Sync settings with every value present
pub fn complete_config() -> SyncConfig {
    SyncConfig::new("https://contacts.example.com", "alice", "s3cret")
}

pub fn ids_of(contacts: &[Contact]) -> HashSet<Uuid> {
    contacts.iter().map(Contact::id).collect()
}

/// `n` contacts with fresh identifiers
pub fn fresh_contacts(prefix: &str, n: usize) -> Vec<Contact> {
    (0..n)
        .map(|i| Contact::new().with_name(format!("{} {}", prefix, i)))
        .collect()
}

/// Build an engine over the given store and factory
///
/// The event receiver is returned so tests can keep it alive or inspect it.
pub fn build_engine(
    store: Arc<dyn ContactStore>,
    factory: Arc<dyn RemoteClientFactory>,
) -> (
    contacts_core::SyncEngine,
    tokio::sync::mpsc::Receiver<contacts_core::SyncEvent>,
) {
    contacts_core::SyncEngine::new(store, factory, contacts_core::EngineConfig::default())
        .expect("engine construction succeeds")
}
