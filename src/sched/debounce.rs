use super::{Command, Scheduler};
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Identity-keyed debounce scheduler.
///
/// A single consumer task collects enqueued commands into a pending batch,
/// collapsing duplicates by `Arc` identity, waits for a quiet window with no
/// new arrivals, then drains the batch and executes each distinct command
/// once. A burst of N identical enqueues therefore produces one execution.
pub struct DebounceScheduler {
    tx: UnboundedSender<Arc<dyn Command>>,
}

impl DebounceScheduler {
    /// Spawn the consumer task. Must be called from within a tokio runtime.
    pub fn new(quiet_window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(consume(rx, quiet_window));
        Self { tx }
    }
}

impl Scheduler for DebounceScheduler {
    fn schedule_command(&self, command: &Arc<dyn Command>) {
        if self.tx.send(Arc::clone(command)).is_err() {
            warn!(
                "scheduler consumer is gone, dropping command '{}'",
                command.name()
            );
        }
    }
}

async fn consume(mut rx: UnboundedReceiver<Arc<dyn Command>>, quiet_window: Duration) {
    while let Some(first) = rx.recv().await {
        let mut pending: Vec<Arc<dyn Command>> = vec![first];

        // Keep absorbing arrivals until the queue stays quiet for a full
        // window. Duplicate references collapse into the existing entry.
        loop {
            match tokio::time::timeout(quiet_window, rx.recv()).await {
                Ok(Some(cmd)) => {
                    if !pending.iter().any(|p| Arc::ptr_eq(p, &cmd)) {
                        pending.push(cmd);
                    }
                }
                Ok(None) => break,
                Err(_) => break,
            }
        }

        for cmd in pending.drain(..) {
            debug!("executing scheduled command '{}'", cmd.name());
            if let Err(e) = cmd.execute().await {
                error!("scheduled command '{}' failed: {}", cmd.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingCommand {
        label: &'static str,
        executions: AtomicU64,
    }

    impl CountingCommand {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                executions: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl Command for CountingCommand {
        fn name(&self) -> &str {
            self.label
        }

        async fn execute(&self) -> Result<()> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn duplicate_enqueues_run_once() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(50));
        let command = CountingCommand::new("refresh");
        let canonical: Arc<dyn Command> = command.clone();

        for _ in 0..5 {
            scheduler.schedule_command(&canonical);
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(command.executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_commands_each_run() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(50));
        let a = CountingCommand::new("refresh-a");
        let b = CountingCommand::new("refresh-b");
        let canonical_a: Arc<dyn Command> = a.clone();
        let canonical_b: Arc<dyn Command> = b.clone();

        scheduler.schedule_command(&canonical_a);
        scheduler.schedule_command(&canonical_b);
        scheduler.schedule_command(&canonical_a);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(a.executions.load(Ordering::SeqCst), 1);
        assert_eq!(b.executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn batches_separated_by_quiet_period_run_separately() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(30));
        let command = CountingCommand::new("refresh");
        let canonical: Arc<dyn Command> = command.clone();

        scheduler.schedule_command(&canonical);
        tokio::time::sleep(Duration::from_millis(200)).await;

        scheduler.schedule_command(&canonical);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(command.executions.load(Ordering::SeqCst), 2);
    }
}
