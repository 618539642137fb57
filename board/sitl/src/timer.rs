use std::time::Duration;

use hal::{MessageSender, RepeatingTimer, SensorMessage};
use tokio::task::JoinHandle;

/// Repeating timer backed by a task on the current tokio runtime
pub struct TokioTimer {
    task: Option<JoinHandle<()>>,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self { task: None }
    }
}

impl RepeatingTimer for TokioTimer {
    fn start(&mut self, period: Duration, queue: MessageSender) {
        self.stop();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if queue.send(SensorMessage::TimerFired).is_err() {
                    return;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
