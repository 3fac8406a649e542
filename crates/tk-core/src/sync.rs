use crate::vcs::VcsService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tk_vcs::CommandRunner;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Disabled,
    Idle,
    Running,
}

/// Background pull/update loop. Each repository with an enabled policy gets
/// its own ticker: it syncs once immediately, then every interval, for as
/// long as the runtime lives.
pub struct SyncScheduler<R> {
    service: Arc<VcsService<R>>,
    enabled: bool,
    started: AtomicBool,
}

impl<R: CommandRunner + 'static> SyncScheduler<R> {
    pub fn new(service: Arc<VcsService<R>>, enabled: bool) -> Self {
        Self {
            service,
            enabled,
            started: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if !self.enabled {
            SchedulerState::Disabled
        } else if self.started.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Starts the loops. Returns `false` without doing anything when
    /// auto-sync is disabled or the loops are already running.
    pub fn start(&self) -> bool {
        if !self.enabled {
            tracing::debug!("auto-sync disabled");
            return false;
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let mut loops = 0_usize;
        for repo in self.service.registry().list() {
            if !repo.sync.enabled {
                tracing::debug!(repo = %repo.name, "auto-sync disabled for repository");
                continue;
            }
            let service = Arc::clone(&self.service);
            let repo = repo.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(repo.sync.interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    service.sync_repo(&repo).await;
                }
            });
            loops += 1;
        }
        tracing::info!(repos = loops, "auto-sync started");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VcsConfig;
    use crate::registry::RepositoryRegistry;
    use crate::vcs::testing::MockRunner;
    use std::time::Duration;
    use tk_vcs::CommandOutput;

    fn scheduler(runner: MockRunner, enabled: bool) -> SyncScheduler<MockRunner> {
        let config = VcsConfig::from_json_str(&format!(
            r#"{{
                "repositories": [
                    {{ "name": "app", "type": "GIT", "path": "/srv/app" }},
                    {{ "name": "legacy", "type": "SVN", "path": "/srv/legacy",
                       "auth": {{ "username": "svc", "password": "pw" }} }}
                ],
                "autoSync": {{ "enabled": {enabled}, "intervalSeconds": 60 }}
            }}"#
        ))
        .unwrap();
        let service = VcsService::new(
            Arc::new(RepositoryRegistry::from_config(&config)),
            config.tools(),
            runner,
        );
        SyncScheduler::new(Arc::new(service), config.auto_sync.enabled)
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_scheduler_never_runs_commands() {
        let runner = MockRunner::default();
        let scheduler = scheduler(runner.clone(), false);

        assert!(!scheduler.start());
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(scheduler.state(), SchedulerState::Disabled);
        assert!(runner.invocations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn syncs_immediately_then_every_interval() {
        let runner = MockRunner::default();
        let scheduler = scheduler(runner.clone(), true);

        assert!(scheduler.start());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(runner.invocations().len(), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runner.invocations().len(), 4);
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let runner = MockRunner::default();
        let scheduler = scheduler(runner.clone(), true);

        assert!(scheduler.start());
        assert!(!scheduler.start());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(runner.invocations().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_pull_does_not_stop_svn_update() {
        let runner = MockRunner::default();
        runner.respond("/srv/app", Ok(CommandOutput::failed(128, "fatal: unable to access remote")));
        runner.respond("/srv/app", Ok(CommandOutput::failed(128, "fatal: unable to access remote")));
        let scheduler = scheduler(runner.clone(), true);

        scheduler.start();
        tokio::time::sleep(Duration::from_secs(61)).await;

        let invocations = runner.invocations();
        let svn_updates = invocations
            .iter()
            .filter(|inv| inv.program == "svn" && inv.args[0] == "update")
            .count();
        let git_pulls = invocations
            .iter()
            .filter(|inv| inv.program == "git")
            .count();
        assert_eq!(svn_updates, 2);
        assert_eq!(git_pulls, 2);
    }
}
