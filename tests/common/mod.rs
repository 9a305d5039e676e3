#![allow(dead_code)]

//! In-memory fakes standing in for Redis and PostgreSQL, plus helpers for
//! building handler-level test state.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ConnectInfo;
use chrono::Utc;
use hoplink::application::services::RedirectService;
use hoplink::domain::click_producer::ClickProducer;
use hoplink::domain::entities::{ClickEvent, Link};
use hoplink::domain::repositories::{ClickRepository, LinkRepository};
use hoplink::error::AppError;
use hoplink::infrastructure::cache::{
    CacheError, CacheResult, CacheService, ClickStream, StreamMessage,
};
use hoplink::state::AppState;

/// In-memory cache with positive entries and negative markers.
///
/// `fail` simulates an outage: every lookup errors, mirroring an unreachable
/// Redis. Call counters let tests assert the zero-I/O invariants.
#[derive(Default)]
pub struct MemoryCache {
    pub urls: Mutex<HashMap<String, String>>,
    pub misses: Mutex<HashSet<String>>,
    pub fail: AtomicBool,
    pub lookups: AtomicUsize,
}

impl MemoryCache {
    fn check(&self) -> CacheResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CacheError::ConnectionError("cache down".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn cached_url(&self, code: &str) -> Option<String> {
        self.urls.lock().unwrap().get(code).cloned()
    }

    pub fn has_miss_marker(&self, code: &str) -> bool {
        self.misses.lock().unwrap().contains(code)
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, code: &str) -> CacheResult<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.urls.lock().unwrap().get(code).cloned())
    }

    async fn set_url(&self, code: &str, url: &str) -> CacheResult<()> {
        self.check()?;
        self.urls
            .lock()
            .unwrap()
            .insert(code.to_string(), url.to_string());
        Ok(())
    }

    async fn is_miss(&self, code: &str) -> CacheResult<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.misses.lock().unwrap().contains(code))
    }

    async fn set_miss(&self, code: &str) -> CacheResult<()> {
        self.check()?;
        self.misses.lock().unwrap().insert(code.to_string());
        Ok(())
    }

    async fn ping(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }
}

/// In-memory stream with consumer-group-ish delivery: entries are delivered
/// once past a read cursor and remembered until acked.
#[derive(Default)]
pub struct MemoryStream {
    pub entries: Mutex<Vec<StreamMessage>>,
    pub acked: Mutex<Vec<String>>,
    pub groups: Mutex<Vec<String>>,
    cursor: AtomicUsize,
    next_id: AtomicUsize,
}

impl MemoryStream {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn payloads(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.data.clone())
            .collect()
    }

    pub fn acked_count(&self) -> usize {
        self.acked.lock().unwrap().len()
    }
}

#[async_trait]
impl ClickStream for MemoryStream {
    async fn append(&self, _stream: &str, payload: &str) -> CacheResult<()> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().push(StreamMessage {
            id: format!("{}-0", id),
            data: payload.to_string(),
        });
        Ok(())
    }

    async fn read(
        &self,
        _stream: &str,
        _group: &str,
        _consumer: &str,
        max_count: usize,
        block: Duration,
    ) -> CacheResult<Vec<StreamMessage>> {
        let batch: Vec<StreamMessage> = {
            let entries = self.entries.lock().unwrap();
            let cursor = self.cursor.load(Ordering::SeqCst);
            entries.iter().skip(cursor).take(max_count).cloned().collect()
        };

        if batch.is_empty() {
            // Mimic the server-side block so worker loops do not spin.
            tokio::time::sleep(block).await;
            return Ok(Vec::new());
        }

        self.cursor.fetch_add(batch.len(), Ordering::SeqCst);
        Ok(batch)
    }

    async fn ack(&self, _stream: &str, _group: &str, id: &str) -> CacheResult<()> {
        self.acked.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn ensure_group(&self, _stream: &str, group: &str, _start_id: &str) -> CacheResult<()> {
        self.groups.lock().unwrap().push(group.to_string());
        Ok(())
    }
}

/// In-memory link table. `fail` simulates a store outage; `lookups` counts
/// queries so tests can prove the cache shielded the store.
#[derive(Default)]
pub struct MemoryLinks {
    pub rows: Mutex<HashMap<String, Link>>,
    pub fail: AtomicBool,
    pub lookups: AtomicUsize,
}

impl MemoryLinks {
    pub fn insert(&self, link: Link) {
        self.rows.lock().unwrap().insert(link.code.clone(), link);
    }
}

#[async_trait]
impl LinkRepository for MemoryLinks {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::store("store down"));
        }
        Ok(self.rows.lock().unwrap().get(code).cloned())
    }
}

/// In-memory click sink recording each flushed batch separately.
#[derive(Default)]
pub struct MemoryClicks {
    pub batches: Mutex<Vec<Vec<ClickEvent>>>,
    pub fail: AtomicBool,
}

impl MemoryClicks {
    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn total_events(&self) -> usize {
        self.batches.lock().unwrap().iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl ClickRepository for MemoryClicks {
    async fn insert_batch(&self, events: &[ClickEvent]) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::store("store down"));
        }
        self.batches.lock().unwrap().push(events.to_vec());
        Ok(())
    }
}

pub fn active_link(code: &str, url: &str) -> Link {
    Link {
        code: code.to_string(),
        long_url: url.to_string(),
        created_at: Utc::now(),
        expires_at: None,
        is_disabled: false,
        user_id: None,
    }
}

/// Builds handler state over the given fakes with a 302 redirect status.
pub fn test_state(
    cache: Arc<MemoryCache>,
    links: Arc<MemoryLinks>,
    stream: Arc<MemoryStream>,
) -> AppState {
    test_state_with_status(cache, links, stream, 302)
}

pub fn test_state_with_status(
    cache: Arc<MemoryCache>,
    links: Arc<MemoryLinks>,
    stream: Arc<MemoryStream>,
    redirect_status_code: u16,
) -> AppState {
    let redirects = Arc::new(RedirectService::new(cache, links));
    let producer = ClickProducer::new(stream, "su:clicks");
    AppState::new(redirects, producer, redirect_status_code, false)
}

/// Injects a fixed peer address so handlers relying on `ConnectInfo` work
/// under `axum_test` without a real socket.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> tower::Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
