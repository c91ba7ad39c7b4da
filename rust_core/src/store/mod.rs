//! Observable team state.
//!
//! `TeamStore` owns five pieces of state and the workflows that fill them:
//! - `selected_team`: code the user picked ("TOR" until told otherwise)
//! - `current_team`: detail for the selection, `None` until the first load lands
//! - `abbreviations`: every team code ESPN knows about
//! - `logo_index`: code -> logo URL and accent color, built by fanning out one
//!   detail lookup per code and publishing only after all of them settle
//! - `team_status`: whether the selected team is loading, loaded or failed
//!
//! Every field is a `tokio::sync::watch` channel written only by the store and
//! always replaced whole. Commands return immediately; the work runs on tasks
//! owned by the store and is aborted when the store is dropped.

use crate::models::{LogoEntry, Team};
use crate::repository::TeamRepository;
use futures_util::future::join_all;
use futures_util::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Team code -> display assets
pub type LogoIndex = HashMap<String, LogoEntry>;

/// What to do with a load that finishes after a newer one was launched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Drop results whose launch has been superseded
    #[default]
    LatestSelection,
    /// Whatever completes last wins, even for an abandoned selection
    CompletionOrder,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" | "latest_selection" => Ok(Self::LatestSelection),
            "completion" | "completion_order" => Ok(Self::CompletionOrder),
            other => Err(format!("unknown selection policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub default_team: String,
    /// Max concurrent detail lookups while building the logo index
    pub logo_concurrency: usize,
    pub selection_policy: SelectionPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_team: crate::config::DEFAULT_TEAM.to_string(),
            logo_concurrency: crate::config::DEFAULT_LOGO_CONCURRENCY,
            selection_policy: SelectionPolicy::default(),
        }
    }
}

/// Progress of the selected team's detail load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading { code: String },
    Loaded { code: String },
    /// The lookup came back empty; `current_team` kept its previous value
    Failed { code: String },
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "idle"),
            LoadStatus::Loading { code } => write!(f, "loading {}", code),
            LoadStatus::Loaded { code } => write!(f, "loaded {}", code),
            LoadStatus::Failed { code } => write!(f, "failed {}", code),
        }
    }
}

/// Launch counters; a load may only publish while its stamp is still current
#[derive(Debug, Default)]
struct Generations {
    selection: u64,
    roster: u64,
}

struct Inner {
    repository: Arc<dyn TeamRepository>,
    options: StoreOptions,
    selected_team: watch::Sender<String>,
    current_team: watch::Sender<Option<Team>>,
    abbreviations: watch::Sender<Vec<String>>,
    logo_index: watch::Sender<LogoIndex>,
    team_status: watch::Sender<LoadStatus>,
    generations: Mutex<Generations>,
    /// Workflows launched and not yet finished
    active: watch::Sender<usize>,
}

/// Counts one running workflow; released on completion, panic or abort
struct ActiveWorkflow(Arc<Inner>);

impl Drop for ActiveWorkflow {
    fn drop(&mut self) {
        self.0.active.send_modify(|n| *n = n.saturating_sub(1));
    }
}

pub struct TeamStore {
    inner: Arc<Inner>,
    tasks: Mutex<JoinSet<()>>,
}

impl fmt::Debug for TeamStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamStore")
            .field("selected_team", &*self.inner.selected_team.borrow())
            .field("team_status", &*self.inner.team_status.borrow())
            .field("abbreviations", &self.inner.abbreviations.borrow().len())
            .finish()
    }
}

impl TeamStore {
    /// Create the store, select `options.default_team` and start loading it
    /// together with the full team list.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn launch(repository: Arc<dyn TeamRepository>, options: StoreOptions) -> Self {
        let (selected_team, _) = watch::channel(String::new());
        let (current_team, _) = watch::channel(None);
        let (abbreviations, _) = watch::channel(Vec::new());
        let (logo_index, _) = watch::channel(LogoIndex::new());
        let (team_status, _) = watch::channel(LoadStatus::Idle);

        let default_team = options.default_team.clone();
        let store = Self {
            inner: Arc::new(Inner {
                repository,
                options,
                selected_team,
                current_team,
                abbreviations,
                logo_index,
                team_status,
                generations: Mutex::new(Generations::default()),
                active: watch::channel(0).0,
            }),
            tasks: Mutex::new(JoinSet::new()),
        };

        info!("Team store starting with {}", default_team);
        store.change_selected_team(default_team);
        store.load_all_abbreviations();
        store
    }

    /// Select a team and load its detail. Earlier loads keep running.
    pub fn change_selected_team(&self, code: impl Into<String>) {
        let code = code.into();
        let generation = self.inner.begin_selection(&code);
        self.spawn(load_selected_team(self.inner.clone(), code, generation));
    }

    /// Load the current selection again
    pub fn reload_selected_team(&self) {
        let code = self.selected_team();
        self.change_selected_team(code);
    }

    /// Refresh the team list, then rebuild the logo index from it
    pub fn load_all_abbreviations(&self) {
        let generation = {
            let mut generations = self.inner.generations.lock();
            generations.roster += 1;
            generations.roster
        };
        self.spawn(load_all_abbreviations(self.inner.clone(), generation));
    }

    /// Wait until every workflow launched so far is done.
    ///
    /// Only observes; the workflows stay owned by the store, so giving up on
    /// this future (timeout, `select!`) leaves them running.
    pub async fn settle(&self) {
        let mut active = self.inner.active.subscribe();
        let _ = active.wait_for(|n| *n == 0).await;

        let mut tasks = self.tasks.lock();
        while let Some(result) = tasks.try_join_next() {
            log_join_result(result);
        }
    }

    pub fn selected_team(&self) -> String {
        self.inner.selected_team.borrow().clone()
    }

    pub fn current_team(&self) -> Option<Team> {
        self.inner.current_team.borrow().clone()
    }

    pub fn abbreviations(&self) -> Vec<String> {
        self.inner.abbreviations.borrow().clone()
    }

    pub fn logo_index(&self) -> LogoIndex {
        self.inner.logo_index.borrow().clone()
    }

    pub fn team_status(&self) -> LoadStatus {
        self.inner.team_status.borrow().clone()
    }

    pub fn subscribe_selected_team(&self) -> watch::Receiver<String> {
        self.inner.selected_team.subscribe()
    }

    pub fn subscribe_current_team(&self) -> watch::Receiver<Option<Team>> {
        self.inner.current_team.subscribe()
    }

    pub fn subscribe_abbreviations(&self) -> watch::Receiver<Vec<String>> {
        self.inner.abbreviations.subscribe()
    }

    pub fn subscribe_logo_index(&self) -> watch::Receiver<LogoIndex> {
        self.inner.logo_index.subscribe()
    }

    pub fn subscribe_team_status(&self) -> watch::Receiver<LoadStatus> {
        self.inner.team_status.subscribe()
    }

    fn spawn<F>(&self, workflow: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        while let Some(result) = tasks.try_join_next() {
            log_join_result(result);
        }
        self.inner.active.send_modify(|n| *n += 1);
        let guard = ActiveWorkflow(self.inner.clone());
        tasks.spawn(async move {
            let _guard = guard;
            workflow.await;
        });
    }
}

impl Inner {
    fn begin_selection(&self, code: &str) -> u64 {
        let mut generations = self.generations.lock();
        generations.selection += 1;
        self.selected_team.send_replace(code.to_string());
        self.team_status.send_replace(LoadStatus::Loading {
            code: code.to_string(),
        });
        generations.selection
    }

    fn is_stale(&self, launched: u64, current: u64) -> bool {
        self.options.selection_policy == SelectionPolicy::LatestSelection && launched != current
    }
}

async fn load_selected_team(inner: Arc<Inner>, code: String, generation: u64) {
    let result = guarded_team_details(inner.repository.as_ref(), &code).await;

    let generations = inner.generations.lock();
    if inner.is_stale(generation, generations.selection) {
        debug!("Discarding stale result for {} (selection moved on)", code);
        return;
    }

    match result {
        Some(team) => {
            info!("Selected team loaded: {} ({})", team.name, team.abbreviation);
            inner.current_team.send_replace(Some(team));
            inner.team_status.send_replace(LoadStatus::Loaded { code });
        }
        None => {
            warn!("No data for team {}; keeping previous team", code);
            inner.team_status.send_replace(LoadStatus::Failed { code });
        }
    }
}

async fn load_all_abbreviations(inner: Arc<Inner>, generation: u64) {
    let codes = inner.repository.get_teams().await;

    {
        let generations = inner.generations.lock();
        if inner.is_stale(generation, generations.roster) {
            debug!("Discarding stale team list ({} codes)", codes.len());
            return;
        }
        info!("Loaded {} team abbreviations", codes.len());
        inner.abbreviations.send_replace(codes.clone());
    }

    load_logo_index(&inner, codes, generation).await;
}

/// Fan out one detail lookup per code, join them all, publish once
async fn load_logo_index(inner: &Inner, codes: Vec<String>, generation: u64) {
    let permits = Semaphore::new(inner.options.logo_concurrency.max(1));
    let repository = inner.repository.as_ref();

    let lookups = codes.iter().map(|code| {
        let permits = &permits;
        async move {
            let _permit = permits.acquire().await.ok();
            let team = guarded_team_details(repository, code).await;
            (code.clone(), LogoEntry::from_team(team.as_ref()))
        }
    });

    let mut index = LogoIndex::with_capacity(codes.len());
    index.extend(join_all(lookups).await);

    let generations = inner.generations.lock();
    if inner.is_stale(generation, generations.roster) {
        debug!("Discarding stale logo index ({} teams)", index.len());
        return;
    }
    info!("Logo index built for {} teams", index.len());
    inner.logo_index.send_replace(index);
}

/// Repository lookup that turns a panicking implementation into absence
async fn guarded_team_details(repository: &dyn TeamRepository, code: &str) -> Option<Team> {
    match AssertUnwindSafe(repository.get_team_details(code))
        .catch_unwind()
        .await
    {
        Ok(team) => team,
        Err(_) => {
            error!("Team lookup for {} panicked", code);
            None
        }
    }
}

fn log_join_result(result: Result<(), JoinError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_panic() => error!("Team workflow panicked: {}", e),
        Err(e) => debug!("Team workflow cancelled: {}", e),
    }
}
