//! Catalog controller task.
//!
//! One task owns the filter state, the debounce deadlines, and the set of
//! in-flight list fetches. Callers talk to it through a [`CatalogHandle`]
//! and observe it through a `watch` channel of [`CatalogView`] snapshots.
//!
//! Every input that is ready when the task wakes is applied before it
//! decides whether to fetch, so changes arriving in the same tick collapse
//! into one request. Each fetch carries a sequence number and only the
//! response to the newest one is ever applied.

use folio_model::{Article, ListQuery};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::filter::FilterState;
use super::view::{CatalogView, FetchFailure};
use crate::api::ArticleApi;
use crate::errors::{CatalogError, RequestError};
use crate::session::SessionState;

#[derive(Debug)]
enum Command {
    Search(String),
    Tags(String),
    IncludeUnpublished(bool),
    Refresh(oneshot::Sender<u64>),
    Shutdown,
}

/// What a fetch task was asked for, kept until the task is joined.
struct Dispatched {
    seq: u64,
    query: ListQuery,
}

/// Cheap, cloneable front for a running catalog controller.
#[derive(Clone)]
pub struct CatalogHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<CatalogView>,
}

impl CatalogHandle {
    /// Replace the raw search text. The fetch follows after the quiet period.
    pub fn set_search(&self, text: impl Into<String>) -> Result<(), CatalogError> {
        self.send(Command::Search(text.into()))
    }

    /// Replace the raw tag filter text.
    pub fn set_tags(&self, text: impl Into<String>) -> Result<(), CatalogError> {
        self.send(Command::Tags(text.into()))
    }

    pub fn set_include_unpublished(&self, include: bool) -> Result<(), CatalogError> {
        self.send(Command::IncludeUnpublished(include))
    }

    /// Fetch now with the current settled filters.
    ///
    /// Returns the sequence number of the fetch that will carry the result;
    /// see [`wait_for_seq`](Self::wait_for_seq).
    pub async fn refresh(&self) -> Result<u64, CatalogError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Refresh(tx))?;
        rx.await.map_err(|_| CatalogError::Closed)
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogView> {
        self.view.clone()
    }

    pub fn snapshot(&self) -> CatalogView {
        self.view.borrow().clone()
    }

    /// Wait until a published view satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&CatalogView) -> bool,
    ) -> Result<CatalogView, CatalogError> {
        let mut view = self.view.clone();
        let matched = view
            .wait_for(predicate)
            .await
            .map_err(|_| CatalogError::Closed)?;
        Ok(matched.clone())
    }

    /// Wait until the fetch numbered `seq` or a later one has been applied.
    pub async fn wait_for_seq(&self, seq: u64) -> Result<CatalogView, CatalogError> {
        self.wait_for(|view| view.settled_at(seq)).await
    }

    /// Stop the controller, cancelling pending timers and in-flight fetches.
    pub async fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).is_ok() {
            self.commands.closed().await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), CatalogError> {
        self.commands
            .send(command)
            .map_err(|_| CatalogError::Closed)
    }
}

/// State owned by the controller task.
pub struct CatalogController {
    api: ArticleApi,
    session: watch::Receiver<SessionState>,
    session_open: bool,
    user: Option<String>,
    filter: FilterState,
    commands: mpsc::UnboundedReceiver<Command>,
    in_flight: JoinSet<Result<Vec<Article>, RequestError>>,
    dispatched: HashMap<task::Id, Dispatched>,
    latest_seq: u64,
    fetch_pending: bool,
    refresh_waiters: Vec<oneshot::Sender<u64>>,
    view: CatalogView,
    view_tx: watch::Sender<CatalogView>,
}

impl CatalogController {
    /// Start a controller on the current runtime.
    ///
    /// It fetches once immediately, then again whenever a settled filter,
    /// the unpublished toggle, or the signed-in user changes.
    pub fn spawn(
        api: ArticleApi,
        mut session: watch::Receiver<SessionState>,
        quiet: Duration,
    ) -> CatalogHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let user = session.borrow_and_update().username().map(str::to_string);
        let view = CatalogView {
            user: user.clone(),
            ..CatalogView::default()
        };
        let (view_tx, view_rx) = watch::channel(view.clone());

        let controller = CatalogController {
            api,
            session,
            session_open: true,
            user,
            filter: FilterState::new(quiet),
            commands: command_rx,
            in_flight: JoinSet::new(),
            dispatched: HashMap::new(),
            latest_seq: 0,
            fetch_pending: true,
            refresh_waiters: Vec::new(),
            view,
            view_tx,
        };
        tokio::spawn(controller.run());

        CatalogHandle {
            commands: command_tx,
            view: view_rx,
        }
    }

    async fn run(mut self) {
        debug!("catalog controller started");
        self.flush();

        let mut running = true;
        while running {
            let deadline = self.filter.next_deadline();
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => running = self.handle(command),
                    None => running = false,
                },
                Some(joined) = self.in_flight.join_next_with_id() => {
                    self.complete(joined);
                }
                changed = self.session.changed(), if self.session_open => match changed {
                    Ok(()) => self.observe_session(),
                    Err(_) => self.session_open = false,
                },
                _ = sleep_until(deadline) => {}
            }

            // Apply everything else that is already waiting.
            while running {
                match self.commands.try_recv() {
                    Ok(command) => running = self.handle(command),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => running = false,
                }
            }
            if !running {
                break;
            }
            if self.session_open && self.session.has_changed().unwrap_or(false) {
                self.observe_session();
            }
            if self.filter.settle(Instant::now()) {
                self.fetch_pending = true;
            }
            self.flush();
        }

        self.filter.cancel_timers();
        self.in_flight.abort_all();
        debug!(aborted = self.in_flight.len(), "catalog stopped");
    }

    /// Returns false on shutdown.
    fn handle(&mut self, command: Command) -> bool {
        let now = Instant::now();
        match command {
            Command::Search(text) => {
                self.view.search_input = text.clone();
                self.filter.search.input(text, now);
            }
            Command::Tags(text) => {
                self.view.tags_input = text.clone();
                self.filter.tags.input(text, now);
            }
            Command::IncludeUnpublished(include) => {
                if self.filter.include_unpublished != include {
                    self.filter.include_unpublished = include;
                    self.view.include_unpublished = include;
                    self.fetch_pending = true;
                }
            }
            Command::Refresh(reply) => {
                self.refresh_waiters.push(reply);
                self.fetch_pending = true;
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn observe_session(&mut self) {
        let user = self
            .session
            .borrow_and_update()
            .username()
            .map(str::to_string);
        if user != self.user {
            debug!(user = ?user, "session changed");
            self.user = user.clone();
            self.view.user = user;
            self.fetch_pending = true;
        }
    }

    fn flush(&mut self) {
        if self.fetch_pending {
            self.fetch_pending = false;
            let seq = self.dispatch();
            for waiter in self.refresh_waiters.drain(..) {
                let _ = waiter.send(seq);
            }
        }
        self.publish();
    }

    fn dispatch(&mut self) -> u64 {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        let query = self.filter.query(self.user.is_some());
        debug!(
            seq,
            search = query.search.as_deref(),
            tags = query.tags.as_deref(),
            show_unpublished = query.show_unpublished,
            "fetching articles"
        );

        self.view.loading = true;
        self.view.issued_seq = seq;

        let api = self.api.clone();
        let task_query = query.clone();
        let handle = self
            .in_flight
            .spawn(async move { api.list(&task_query).await });
        let id = handle.id();
        self.dispatched.insert(id, Dispatched { seq, query });
        seq
    }

    fn complete(
        &mut self,
        joined: Result<(task::Id, Result<Vec<Article>, RequestError>), JoinError>,
    ) {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(e) => {
                warn!(error = %e, "article fetch task failed");
                let err = RequestError::Network {
                    message: e.to_string(),
                };
                (e.id(), Err(err))
            }
        };
        let Some(Dispatched { seq, query }) = self.dispatched.remove(&id) else {
            return;
        };
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "discarding stale list");
            return;
        }

        self.view.loading = false;
        self.view.applied_seq = seq;
        self.view.query = query;
        match result {
            Ok(articles) => {
                debug!(seq, count = articles.len(), "articles loaded");
                self.view.articles = Arc::new(articles);
                self.view.error = None;
            }
            Err(err) => {
                warn!(seq, error = %err, "failed to fetch articles");
                self.view.error = Some(FetchFailure::from(&err));
            }
        }
    }

    fn publish(&self) {
        let view = &self.view;
        self.view_tx.send_if_modified(|current| {
            if current == view {
                return false;
            }
            *current = view.clone();
            true
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
