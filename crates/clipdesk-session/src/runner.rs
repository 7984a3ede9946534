//! Session event loop.
//!
//! All session mutation happens on one task. It selects over three inputs:
//! user intents from [`SessionHandle`]s, inbound values from the connection
//! manager's dispatch callback, and completions of engine calls it spawned.
//! The only suspension points are inside those spawned calls and the
//! channel itself; the loop body never blocks.

use std::sync::Arc;

use clipdesk_engine::{build_request, EngineApi, EngineError, EngineResult, ValidationError};
use clipdesk_models::{JobParams, JobRequest, JobState, StyleOverride, VideoMetadata};
use clipdesk_realtime::{ConnectionConfig, ConnectionManager, Dispatch, Inbound};
use clipdesk_style::PresetCatalog;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::log::{COLOR_ERROR, COLOR_INFO, COLOR_WARNING};
use crate::reducer::{Ack, SessionEvent};
use crate::session::{Session, SessionSnapshot};

const INTENT_CHANNEL_CAPACITY: usize = 32;

type Reply<T> = oneshot::Sender<SessionResult<T>>;

enum Intent {
    FetchMetadata {
        url: String,
        reply: Reply<VideoMetadata>,
    },
    Submit {
        params: Box<JobParams>,
        reply: Reply<JobRequest>,
    },
    Cancel {
        reply: Reply<()>,
    },
    Rerender {
        path: String,
        style: StyleOverride,
        reply: Reply<()>,
    },
    Reset {
        reply: Reply<()>,
    },
    Shutdown,
}

/// A spawned engine call finished.
enum Completion {
    Metadata {
        result: EngineResult<VideoMetadata>,
        reply: Reply<VideoMetadata>,
    },
    Submitted {
        generation: u64,
        result: EngineResult<()>,
    },
    CancelSent(EngineResult<()>),
    Rerendered {
        path: String,
        result: EngineResult<()>,
        reply: Reply<()>,
    },
}

/// Owns the session and the real-time channel.
pub struct SessionRunner {
    engine: Arc<dyn EngineApi>,
    catalog: Arc<PresetCatalog>,
    session: Session,
    connection: ConnectionManager,
    intents: mpsc::Receiver<Intent>,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<SessionSnapshot>,
    /// Bumped per submission so a stale acknowledgement cannot touch a newer job
    generation: u64,
}

impl SessionRunner {
    pub fn new(
        engine: Arc<dyn EngineApi>,
        catalog: Arc<PresetCatalog>,
        connection: ConnectionConfig,
        config: SessionConfig,
    ) -> (Self, SessionHandle) {
        let (intent_tx, intents) = mpsc::channel(INTENT_CHANNEL_CAPACITY);
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();

        let dispatch: Dispatch = Arc::new(move |event| {
            let _ = inbound_tx.send(event);
        });

        let session = Session::new(&config);
        let (snapshots, snapshot_rx) = watch::channel(session.snapshot());

        let runner = Self {
            engine,
            catalog,
            session,
            connection: ConnectionManager::new(connection, dispatch),
            intents,
            inbound,
            completions_tx,
            completions,
            snapshots,
            generation: 0,
        };
        let handle = SessionHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
        };
        (runner, handle)
    }

    /// Run until shut down or every handle is dropped.
    pub async fn run(mut self) {
        info!(url = %self.connection.config().url, "Session started");
        self.connection.open().await;

        loop {
            tokio::select! {
                intent = self.intents.recv() => match intent {
                    Some(Intent::Shutdown) | None => break,
                    Some(intent) => self.handle_intent(intent),
                },
                Some(inbound) = self.inbound.recv() => self.handle_inbound(inbound),
                Some(done) = self.completions.recv() => self.handle_completion(done),
            }
            self.publish();
        }

        self.connection.close().await;
        while let Ok(inbound) = self.inbound.try_recv() {
            self.handle_inbound(inbound);
        }
        self.publish();
        info!("Session stopped");
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }

    /// Publish before replying so a caller sees its own effect.
    fn reply<T>(&self, reply: Reply<T>, result: SessionResult<T>) {
        self.publish();
        let _ = reply.send(result);
    }

    fn handle_inbound(&mut self, inbound: Inbound) {
        let event = match inbound {
            Inbound::Event(event) => SessionEvent::Engine(event),
            Inbound::ConnectionChanged(state) => SessionEvent::ConnectionChanged(state),
        };
        self.session.apply(&event);
    }

    fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::FetchMetadata { url, reply } => self.fetch_metadata(url, reply),
            Intent::Submit { params, reply } => {
                let result = self.submit(&params);
                self.reply(reply, result);
            }
            Intent::Cancel { reply } => {
                let result = self.cancel();
                self.reply(reply, result);
            }
            Intent::Rerender { path, style, reply } => self.rerender(path, style, reply),
            Intent::Reset { reply } => {
                let result = self.reset();
                self.reply(reply, result);
            }
            Intent::Shutdown => {}
        }
    }

    fn fetch_metadata(&mut self, url: String, reply: Reply<VideoMetadata>) {
        let url = url.trim().to_string();
        if url.is_empty() {
            let _ = reply.send(Err(ValidationError::EmptySourceUrl.into()));
            return;
        }
        let state = self.session.job();
        if !state.accepts_new_work() {
            let _ = reply.send(Err(SessionError::invalid_state(
                "fetch metadata",
                state.name(),
            )));
            return;
        }

        self.session.apply(&SessionEvent::FetchMetadataRequested);
        let engine = Arc::clone(&self.engine);
        let done = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = engine.fetch_metadata(&url).await;
            let _ = done.send(Completion::Metadata { result, reply });
        });
    }

    fn submit(&mut self, params: &JobParams) -> SessionResult<JobRequest> {
        let state = self.session.job();
        if !state.accepts_new_work() {
            return Err(SessionError::invalid_state("submit", state.name()));
        }
        let request = build_request(params, &self.catalog)?;

        self.session.apply(&SessionEvent::SubmitRequested);
        self.generation += 1;

        let generation = self.generation;
        let engine = Arc::clone(&self.engine);
        let done = self.completions_tx.clone();
        let payload = request.clone();
        tokio::spawn(async move {
            let result = engine.submit_job(&payload).await;
            let _ = done.send(Completion::Submitted { generation, result });
        });

        Ok(request)
    }

    /// Ask the engine to stop. The state only moves when the engine's
    /// `cancelled` status arrives.
    fn cancel(&mut self) -> SessionResult<()> {
        let state = self.session.job();
        if !matches!(state, JobState::Processing { .. }) {
            return Err(SessionError::invalid_state("cancel", state.name()));
        }

        self.session.apply(&SessionEvent::CancelRequested);
        self.session.note("Cancelling...", COLOR_WARNING);

        let engine = Arc::clone(&self.engine);
        let done = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = engine.cancel_job().await;
            let _ = done.send(Completion::CancelSent(result));
        });
        Ok(())
    }

    fn rerender(&mut self, path: String, style: StyleOverride, reply: Reply<()>) {
        let engine = Arc::clone(&self.engine);
        let done = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = engine.rerender_clip(&path, &style).await;
            let _ = done.send(Completion::Rerendered {
                path,
                result,
                reply,
            });
        });
    }

    fn reset(&mut self) -> SessionResult<()> {
        let state = self.session.job();
        if state.is_active() {
            return Err(SessionError::invalid_state("reset", state.name()));
        }
        self.session.apply(&SessionEvent::Reset);
        Ok(())
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Metadata { result, reply } => {
                self.session.apply(&SessionEvent::MetadataResolved);
                match &result {
                    Ok(metadata) => {
                        info!(title = %metadata.title, duration = metadata.duration_seconds, "Metadata fetched");
                        self.session.set_metadata(Some(metadata.clone()));
                    }
                    Err(e) => {
                        warn!(error = %e, "Metadata fetch failed");
                        self.session
                            .note(format!("Metadata fetch failed: {}", e), COLOR_ERROR);
                    }
                }
                self.reply(reply, result.map_err(SessionError::from));
            }
            Completion::Submitted { generation, result } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "Ignoring stale submit acknowledgement");
                    return;
                }
                let ack = match result {
                    Ok(()) => Ack::Accepted,
                    Err(EngineError::Backend(message)) => Ack::Rejected(message),
                    Err(e) => Ack::RequestFailed(e.to_string()),
                };
                if ack != Ack::Accepted {
                    warn!(ack = ?ack, "Job submission failed");
                }
                self.session.apply(&SessionEvent::SubmitAcknowledged(ack));
            }
            Completion::CancelSent(result) => {
                if let Err(e) = result {
                    warn!(error = %e, "Cancel request failed");
                    self.session
                        .note(format!("Cancel request failed: {}", e), COLOR_ERROR);
                }
            }
            Completion::Rerendered {
                path,
                result,
                reply,
            } => {
                match &result {
                    Ok(()) => self
                        .session
                        .note(format!("Re-render requested: {}", path), COLOR_INFO),
                    Err(e) => {
                        warn!(path = %path, error = %e, "Re-render request failed");
                        self.session
                            .note(format!("Re-render failed: {}", e), COLOR_ERROR);
                    }
                }
                self.reply(reply, result.map_err(SessionError::from));
            }
        }
    }
}

/// Build a session and spawn its loop.
pub fn spawn_session(
    engine: Arc<dyn EngineApi>,
    catalog: Arc<PresetCatalog>,
    connection: ConnectionConfig,
    config: SessionConfig,
) -> (SessionHandle, JoinHandle<()>) {
    let (runner, handle) = SessionRunner::new(engine, catalog, connection, config);
    (handle, tokio::spawn(runner.run()))
}

/// Cloneable front door to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    intents: mpsc::Sender<Intent>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Intent) -> SessionResult<T> {
        let (reply, response) = oneshot::channel();
        self.intents
            .send(make(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)?
    }

    /// Probe a source video. Resolves when the engine answers.
    pub async fn fetch_metadata(&self, url: impl Into<String>) -> SessionResult<VideoMetadata> {
        let url = url.into();
        self.request(|reply| Intent::FetchMetadata { url, reply })
            .await
    }

    /// Validate and submit a job. Resolves once the job is `Submitting`; the
    /// engine's acknowledgement arrives later through the snapshots.
    pub async fn submit(&self, params: JobParams) -> SessionResult<JobRequest> {
        let params = Box::new(params);
        self.request(|reply| Intent::Submit { params, reply }).await
    }

    /// Request cancellation of the running job.
    pub async fn cancel(&self) -> SessionResult<()> {
        self.request(|reply| Intent::Cancel { reply }).await
    }

    pub async fn rerender(
        &self,
        path: impl Into<String>,
        style: impl Into<StyleOverride>,
    ) -> SessionResult<()> {
        let path = path.into();
        let style = style.into();
        self.request(|reply| Intent::Rerender { path, style, reply })
            .await
    }

    /// Return a finished session to `Idle`.
    pub async fn reset(&self) -> SessionResult<()> {
        self.request(|reply| Intent::Reset { reply }).await
    }

    pub async fn shutdown(&self) {
        let _ = self.intents.send(Intent::Shutdown).await;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`.
    pub async fn wait_until<F>(&self, mut predicate: F) -> SessionResult<SessionSnapshot>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok((*snapshot).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use clipdesk_engine::HealthResponse;
    use clipdesk_models::StylePatch;

    #[derive(Default)]
    struct FakeEngine {
        calls: Mutex<Vec<String>>,
        reject_submit: Option<String>,
    }

    impl FakeEngine {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    #[async_trait]
    impl EngineApi for FakeEngine {
        async fn health(&self) -> EngineResult<HealthResponse> {
            self.record("health");
            Ok(HealthResponse {
                status: "online".into(),
                service: None,
            })
        }

        async fn fetch_metadata(&self, url: &str) -> EngineResult<VideoMetadata> {
            self.record(format!("metadata {}", url));
            if url.contains("missing") {
                return Err(EngineError::backend("Video unavailable"));
            }
            Ok(VideoMetadata::new("Talk", 600.0))
        }

        async fn submit_job(&self, request: &JobRequest) -> EngineResult<()> {
            self.record(format!("submit {}", request.source_url));
            match &self.reject_submit {
                Some(message) => Err(EngineError::backend(message.clone())),
                None => Ok(()),
            }
        }

        async fn cancel_job(&self) -> EngineResult<()> {
            self.record("cancel");
            Ok(())
        }

        async fn rerender_clip(&self, path: &str, _style: &StyleOverride) -> EngineResult<()> {
            self.record(format!("rerender {}", path));
            Ok(())
        }
    }

    /// A channel endpoint nobody listens on, retried rarely.
    fn offline() -> ConnectionConfig {
        ConnectionConfig::default()
            .with_url("ws://127.0.0.1:9")
            .with_reconnect_delay(Duration::from_secs(60))
    }

    fn start(engine: Arc<FakeEngine>) -> (SessionHandle, JoinHandle<()>) {
        spawn_session(
            engine,
            Arc::new(PresetCatalog::builtin()),
            offline(),
            SessionConfig::default(),
        )
    }

    async fn wait_for_state(handle: &SessionHandle, name: &str) -> SessionSnapshot {
        tokio::time::timeout(
            Duration::from_secs(5),
            handle.wait_until(|s| s.job.name() == name),
        )
        .await
        .expect("timed out waiting for job state")
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_url_never_reaches_engine() {
        let engine = Arc::new(FakeEngine::default());
        let (handle, task) = start(Arc::clone(&engine));

        let err = handle.submit(JobParams::new("  ")).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::EmptySourceUrl)
        ));
        assert_eq!(handle.snapshot().job, JobState::Idle);

        handle.shutdown().await;
        task.await.unwrap();
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_ack_moves_to_processing() {
        let engine = Arc::new(FakeEngine::default());
        let (handle, task) = start(Arc::clone(&engine));

        let request = handle
            .submit(JobParams::new("https://youtu.be/abc"))
            .await
            .unwrap();
        assert_eq!(request.output_resolution, "1080x1920");

        let snapshot = wait_for_state(&handle, "processing").await;
        assert_eq!(snapshot.progress.percent, 0.0);
        assert_eq!(engine.calls(), ["submit https://youtu.be/abc"]);

        let busy = handle.submit(JobParams::new("https://youtu.be/other")).await;
        assert!(matches!(
            busy,
            Err(SessionError::InvalidState {
                action: "submit",
                ..
            })
        ));

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_backend_rejection_fails_job() {
        let engine = Arc::new(FakeEngine {
            reject_submit: Some("Already processing".into()),
            ..Default::default()
        });
        let (handle, task) = start(engine);

        handle
            .submit(JobParams::new("https://youtu.be/abc"))
            .await
            .unwrap();
        let snapshot = wait_for_state(&handle, "failed").await;
        assert_eq!(
            snapshot.job,
            JobState::Failed {
                message: "Already processing".into()
            }
        );
        assert!(snapshot
            .log
            .iter()
            .any(|entry| entry.text.contains("Already processing")));

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_sends_request_without_transition() {
        let engine = Arc::new(FakeEngine::default());
        let (handle, task) = start(Arc::clone(&engine));

        assert!(matches!(
            handle.cancel().await,
            Err(SessionError::InvalidState {
                action: "cancel",
                state: "idle"
            })
        ));

        handle
            .submit(JobParams::new("https://youtu.be/abc"))
            .await
            .unwrap();
        wait_for_state(&handle, "processing").await;

        handle.cancel().await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !engine.calls().contains(&"cancel".to_string()) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(handle.snapshot().job.name(), "processing");

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_metadata_returns_to_idle() {
        let engine = Arc::new(FakeEngine::default());
        let (handle, task) = start(Arc::clone(&engine));

        let metadata = handle.fetch_metadata("https://youtu.be/abc").await.unwrap();
        assert_eq!(metadata.duration_seconds, 600.0);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.job, JobState::Idle);
        assert_eq!(snapshot.metadata, Some(metadata));

        let err = handle
            .fetch_metadata("https://youtu.be/missing")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Engine(EngineError::Backend(_))));
        assert_eq!(handle.snapshot().job, JobState::Idle);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_rerender_and_reset() {
        let engine = Arc::new(FakeEngine::default());
        let (handle, task) = start(Arc::clone(&engine));

        let patch = StylePatch {
            margin_v: Some(80),
            ..Default::default()
        };
        handle.rerender("/out/clip_1.mp4", patch).await.unwrap();
        assert_eq!(engine.calls(), ["rerender /out/clip_1.mp4"]);

        handle.reset().await.unwrap();
        assert_eq!(handle.snapshot().job, JobState::Idle);

        handle.shutdown().await;
        task.await.unwrap();
        assert!(matches!(handle.reset().await, Err(SessionError::Closed)));
    }
}
