use tracing::info;

use super::{
    ActivateReport, CacheStorage, FetchOutcome, InstallReport, LifecycleError, Network,
    OfflineCache, Request,
};

/// Outcome of registering a new worker version.
pub struct RegisterReport<S: CacheStorage, N: Network> {
    pub install: InstallReport,
    /// Set when the new worker took over immediately
    pub activate: Option<ActivateReport>,
    /// The worker that was active before, now superseded
    pub superseded: Option<OfflineCache<S, N>>,
}

/// How `register_or_resume` brought a worker up.
pub enum Startup<S: CacheStorage, N: Network> {
    /// An earlier run installed this version; only stale stores were purged
    Resumed(ActivateReport),
    Registered(RegisterReport<S, N>),
}

/// Hosts worker versions and sequences their lifecycle.
///
/// At most one worker is active and at most one waits behind it.
pub struct Registration<S: CacheStorage, N: Network> {
    active: Option<OfflineCache<S, N>>,
    waiting: Option<OfflineCache<S, N>>,
}

impl<S: CacheStorage, N: Network> Default for Registration<S, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CacheStorage, N: Network> Registration<S, N> {
    pub fn new() -> Self {
        Self {
            active: None,
            waiting: None,
        }
    }

    pub fn active(&self) -> Option<&OfflineCache<S, N>> {
        self.active.as_ref()
    }

    pub fn waiting(&self) -> Option<&OfflineCache<S, N>> {
        self.waiting.as_ref()
    }

    /// Install `worker`. It activates at once when it asked to skip waiting
    /// or nothing is active yet; otherwise it waits for `activate_waiting`.
    pub async fn register(
        &mut self,
        mut worker: OfflineCache<S, N>,
    ) -> Result<RegisterReport<S, N>, LifecycleError> {
        let install = worker.install().await?;

        if worker.skip_waiting() || self.active.is_none() {
            // A newer install replaces anything still waiting
            self.waiting = None;
            let (activate, superseded) = self.take_over(worker).await?;
            return Ok(RegisterReport {
                install,
                activate: Some(activate),
                superseded,
            });
        }

        info!(cache = %worker.cache_name(), "Worker installed, waiting for activation");
        self.waiting = Some(worker);
        Ok(RegisterReport {
            install,
            activate: None,
            superseded: None,
        })
    }

    /// Reuse `worker`'s store if an earlier run already installed this
    /// version; otherwise register it.
    pub async fn register_or_resume(
        &mut self,
        mut worker: OfflineCache<S, N>,
    ) -> Result<Startup<S, N>, LifecycleError> {
        if self.active.is_none() {
            if let Some(activate) = worker.resume()? {
                self.active = Some(worker);
                return Ok(Startup::Resumed(activate));
            }
        }
        self.register(worker).await.map(Startup::Registered)
    }

    /// Promote the waiting worker, if any.
    pub async fn activate_waiting(
        &mut self,
    ) -> Result<Option<(ActivateReport, Option<OfflineCache<S, N>>)>, LifecycleError> {
        match self.waiting.take() {
            Some(worker) => Ok(Some(self.take_over(worker).await?)),
            None => Ok(None),
        }
    }

    async fn take_over(
        &mut self,
        mut worker: OfflineCache<S, N>,
    ) -> Result<(ActivateReport, Option<OfflineCache<S, N>>), LifecycleError> {
        let report = worker.activate().await?;
        let mut previous = self.active.replace(worker);
        if let Some(previous) = previous.as_mut() {
            previous.supersede();
            info!(cache = %previous.cache_name(), "Previous worker superseded");
        }
        Ok((report, previous))
    }

    /// Route a request through the active worker.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        match &self.active {
            Some(worker) => worker.handle_fetch(request).await,
            None => FetchOutcome::Passthrough,
        }
    }
}
