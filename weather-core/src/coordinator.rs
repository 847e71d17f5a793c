//! Debounced search coordination.
//!
//! A single actor task owns the visible state and the sequence counter. Every
//! query value bumps the counter and restarts the debounce timer; the counter
//! value captured at that moment is the token of whatever lookup the timer
//! eventually issues. Outcomes carrying any other token are dropped, so the
//! visible state only ever reflects the most recently scheduled lookup no
//! matter in which order the network calls complete.

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

use crate::{
    error::LookupError, logger::BackgroundLogger, lookup::WeatherLookup, model::WeatherSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Quiet period a query must survive before it is looked up.
    pub debounce: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(500) }
    }
}

/// What the user currently sees. Exactly one of these at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Loaded(WeatherSnapshot),
    Failed(String),
}

enum Command {
    Query(String),
    Flush(oneshot::Sender<()>),
}

enum Report {
    TimerElapsed {
        token: u64,
        query: String,
    },
    Resolved {
        token: u64,
        city: String,
        outcome: Result<WeatherSnapshot, LookupError>,
    },
}

/// Cheap, cloneable front end of a running coordinator.
///
/// The coordinator stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ViewState>,
}

impl SearchHandle {
    /// Feed the latest raw query value, e.g. after each keystroke.
    pub fn set_query(&self, query: impl Into<String>) {
        if self.commands.send(Command::Query(query.into())).is_err() {
            tracing::warn!("search coordinator has stopped, query ignored");
        }
    }

    /// Resolves once the most recently scheduled cycle has settled: its timer
    /// has elapsed and its lookup, if any, has been applied. Queries sent
    /// while waiting extend the wait to their own cycle.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Flush(tx)).is_err() {
            return;
        }
        // An error means the coordinator stopped, which also settles everything.
        let _ = rx.await;
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }
}

pub struct SearchCoordinator {
    settings: SearchSettings,
    lookup: Arc<dyn WeatherLookup>,
    logger: BackgroundLogger,
    seq: u64,
    pending: Option<JoinHandle<()>>,
    /// Whether the lookup for the current token is still outstanding.
    in_flight: bool,
    flush_waiters: Vec<oneshot::Sender<()>>,
    state: watch::Sender<ViewState>,
    reports: mpsc::UnboundedSender<Report>,
}

impl SearchCoordinator {
    /// Start the coordinator on the current Tokio runtime.
    pub fn spawn(
        settings: SearchSettings,
        lookup: Arc<dyn WeatherLookup>,
        logger: BackgroundLogger,
    ) -> SearchHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ViewState::Idle);

        let coordinator = Self {
            settings,
            lookup,
            logger,
            seq: 0,
            pending: None,
            in_flight: false,
            flush_waiters: Vec::new(),
            state: state_tx,
            reports: report_tx,
        };
        tokio::spawn(coordinator.run(command_rx, report_rx));

        SearchHandle { commands: command_tx, state: state_rx }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut reports: mpsc::UnboundedReceiver<Report>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Query(query)) => self.on_query(query),
                    Some(Command::Flush(waiter)) => self.on_flush(waiter),
                    None => break,
                },
                Some(report) = reports.recv() => self.on_report(report),
            }
        }

        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        tracing::debug!("search coordinator stopped");
    }

    fn on_query(&mut self, query: String) {
        self.seq += 1;
        let token = self.seq;
        self.in_flight = false;

        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        // A blank query clears right away; the timer below still runs but
        // only re-applies the clear.
        if query.trim().is_empty() {
            self.apply(token, ViewState::Idle);
        }

        let reports = self.reports.clone();
        let delay = self.settings.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = reports.send(Report::TimerElapsed { token, query });
        }));
    }

    fn on_flush(&mut self, waiter: oneshot::Sender<()>) {
        self.flush_waiters.push(waiter);
        self.settle_if_idle();
    }

    fn settle_if_idle(&mut self) {
        if self.pending.is_some() || self.in_flight {
            return;
        }
        for waiter in self.flush_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    fn on_report(&mut self, report: Report) {
        match report {
            Report::TimerElapsed { token, query } => self.on_timer(token, query),
            Report::Resolved { token, city, outcome } => self.on_resolved(token, city, outcome),
        }
    }

    fn on_timer(&mut self, token: u64, query: String) {
        if token != self.seq {
            return;
        }
        self.pending = None;

        let city = query.trim().to_string();
        if city.is_empty() {
            self.apply(token, ViewState::Idle);
            self.settle_if_idle();
            return;
        }

        self.in_flight = true;
        self.apply(token, ViewState::Loading);
        tracing::debug!(token, city = %city, "issuing lookup");

        let lookup = Arc::clone(&self.lookup);
        let reports = self.reports.clone();
        // In-flight lookups are never cancelled; a superseded one is dropped on arrival.
        tokio::spawn(async move {
            let outcome = lookup.lookup(&city).await;
            let _ = reports.send(Report::Resolved { token, city, outcome });
        });
    }

    fn on_resolved(
        &mut self,
        token: u64,
        city: String,
        outcome: Result<WeatherSnapshot, LookupError>,
    ) {
        if token != self.seq {
            tracing::trace!(token, current = self.seq, city = %city, "discarding stale lookup result");
            return;
        }

        match outcome {
            Ok(snapshot) => {
                tracing::info!(city = %city, location = %snapshot.location.name, "lookup succeeded");
                self.apply(token, ViewState::Loaded(snapshot));
                self.logger.record(&city);
            }
            Err(e) => {
                tracing::info!(city = %city, kind = ?e.kind(), "lookup failed");
                self.apply(token, ViewState::Failed(e.to_string()));
            }
        }

        self.in_flight = false;
        self.settle_if_idle();
    }

    fn apply(&self, token: u64, next: ViewState) {
        if token != self.seq {
            return;
        }
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
