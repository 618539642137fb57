use std::{cell::RefCell, rc::Rc, time::Duration};

use device_orientation::{
    OrientationData, OrientationEventPump, OrientationListener, PumpConfig, PumpState,
};
use hal::{message_queue, MessageReceiver};
use log::{info, warn};
use tokio::time::Instant;

use crate::config::SitlConfig;
use crate::simulator::SimulatedFrame;
use crate::timer::TokioTimer;

/// How often the simulated device publishes a new sample
const MOTION_STEP: Duration = Duration::from_millis(10);

/// Listener that logs and keeps every dispatched event
struct EventLog {
    events: Rc<RefCell<Vec<OrientationData>>>,
}

impl OrientationListener for EventLog {
    fn did_change_device_orientation(&mut self, data: &OrientationData) {
        info!(
            "orientation: alpha={} beta={} gamma={} absolute={}",
            format_angle(data.alpha),
            format_angle(data.beta),
            format_angle(data.gamma),
            data.absolute
        );
        self.events.borrow_mut().push(*data);
    }
}

fn format_angle(angle: Option<f64>) -> String {
    match angle {
        Some(angle) => format!("{:.2}", angle),
        None => "null".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initializing,
    Visible,
    Hidden,
    Stopped,
}

/// Runs an orientation pump against the simulated device.
///
/// The page is hidden for the middle fifth of the run, which stops the pump
/// and starts it again, and an optional service crash forces a reconnect.
pub struct SitlApp {
    state: State,
    config: SitlConfig,
    frame: SimulatedFrame,
    pump: OrientationEventPump<TokioTimer>,
    queue: MessageReceiver,
    events: Rc<RefCell<Vec<OrientationData>>>,
    visibility_changes: usize,
}

impl SitlApp {
    pub fn new(config: SitlConfig) -> anyhow::Result<Self> {
        let pump_config = PumpConfig::with_frequency(config.frequency_hz)?;
        let (tx, rx) = message_queue();
        Ok(Self {
            state: State::Initializing,
            frame: SimulatedFrame::new(config.relative_available, config.absolute_available),
            pump: OrientationEventPump::new(config.absolute, pump_config, TokioTimer::new(), tx),
            queue: rx,
            events: Rc::new(RefCell::new(Vec::new())),
            visibility_changes: 0,
            config,
        })
    }

    pub fn events(&self) -> Vec<OrientationData> {
        self.events.borrow().clone()
    }

    pub fn frame(&self) -> &SimulatedFrame {
        &self.frame
    }

    pub fn visibility_changes(&self) -> usize {
        self.visibility_changes
    }

    fn show(&mut self) -> anyhow::Result<()> {
        let listener = EventLog {
            events: self.events.clone(),
        };
        self.pump.start(&mut self.frame, Box::new(listener))?;
        if self.state == State::Hidden {
            self.visibility_changes += 1;
            info!("page visible");
        }
        self.state = State::Visible;
        Ok(())
    }

    fn hide(&mut self) {
        self.pump.stop();
        self.visibility_changes += 1;
        self.state = State::Hidden;
        info!("page hidden");
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let started = Instant::now();
        let hidden_from = self.config.run_for.mul_f64(0.4);
        let hidden_until = self.config.run_for.mul_f64(0.6);
        let mut disconnect_at = self.config.disconnect_after;

        let mut motion = tokio::time::interval(MOTION_STEP);
        let deadline = tokio::time::sleep(self.config.run_for);
        tokio::pin!(deadline);

        self.show()?;

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = motion.tick() => {
                    let elapsed = started.elapsed();
                    self.frame.step(elapsed.as_secs_f64());

                    if disconnect_at.is_some_and(|at| elapsed >= at) {
                        disconnect_at = None;
                        warn!("simulated sensor service crashed");
                        self.frame.disconnect();
                    }

                    match self.state {
                        State::Visible if elapsed >= hidden_from && elapsed < hidden_until => {
                            self.hide()
                        }
                        State::Hidden if elapsed >= hidden_until => self.show()?,
                        State::Visible if self.pump.state() == PumpState::Stopped => {
                            info!("reconnecting to sensor service");
                            self.show()?
                        }
                        _ => {}
                    }
                }
                Some(message) = self.queue.recv() => self.pump.handle_message(message),
            }
        }

        self.pump.stop();
        self.state = State::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::SensorType;

    fn config(relative_available: bool, absolute_available: bool) -> SitlConfig {
        SitlConfig {
            relative_available,
            absolute_available,
            run_for: Duration::from_secs(1),
            ..SitlConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_relative_run() {
        let mut app = SitlApp::new(config(true, true)).expect("Config should be valid");
        app.run().await.expect("Run should succeed");

        let events = app.events();
        assert!(!events.is_empty(), "The pump should dispatch events");
        assert!(events.iter().all(|e| !e.absolute), "Relative sensor data expected");
        assert!(events.iter().all(|e| e.alpha.is_some()));
        assert_eq!(app.visibility_changes(), 2, "The page should be hidden and shown once");
        assert_eq!(app.state, State::Stopped);

        let world = app.frame().world();
        let world = world.borrow();
        assert_eq!(world.channels.len(), 1, "Showing the page again should reuse the sensor");
        assert_eq!(world.requests, vec![SensorType::RelativeOrientationEulerAngles]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_run() {
        let mut app = SitlApp::new(config(false, true)).expect("Config should be valid");
        app.run().await.expect("Run should succeed");

        let events = app.events();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.absolute), "Absolute fallback data expected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sensor_run() {
        let mut app = SitlApp::new(config(false, false)).expect("Config should be valid");
        app.run().await.expect("Run should succeed");

        let events = app.events();
        assert!(!events.is_empty(), "Null events should still be dispatched");
        assert!(events.iter().all(|e| !e.has_any_angle()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnects_after_service_crash() {
        let mut cfg = config(true, true);
        cfg.disconnect_after = Some(Duration::from_millis(200));
        let mut app = SitlApp::new(cfg).expect("Config should be valid");
        app.run().await.expect("Run should succeed");

        let world = app.frame().world();
        let world = world.borrow();
        assert_eq!(
            world.requests,
            vec![
                SensorType::RelativeOrientationEulerAngles,
                SensorType::RelativeOrientationEulerAngles
            ],
            "The sensor should be requested again after reconnecting"
        );
        assert_eq!(world.channels.len(), 1);
        assert!(!app.events().is_empty());
    }

    #[test]
    fn test_invalid_frequency_is_rejected() {
        let cfg = SitlConfig {
            frequency_hz: 0.0,
            ..SitlConfig::default()
        };
        assert!(SitlApp::new(cfg).is_err());
    }
}
