//! Reconfiguration orchestrator.
//!
//! Drives one configuration at a time through
//! NOTIFY_START → PRE_GUARD → SWITCHING → POST_GUARD → NOTIFY_FINISH → HOLD,
//! then advances round-robin to the next configuration. Phases never
//! overlap: every send, sleep, and driver call completes before the next
//! phase begins.

use crate::clock::Clock;
use crate::driver::SwitchDriver;
use crate::packet::SignalPacket;
use crate::registry::ConfigurationRegistry;
use crate::socket::Transport;
use crate::table::MessageTable;
use crate::types::{CycleReport, NotificationEvent, OrchestratorStats, ReconfigPhase, Timings};
use common::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{Level, debug, error, info, warn};

/// Longest uninterrupted sleep while holding a configuration
const HOLD_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shared stop request for the reconfiguration loop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sequences notifications, guard intervals, and switch changes
pub struct Orchestrator<T, D, C> {
    registry: ConfigurationRegistry,
    table: MessageTable,
    transport: T,
    driver: D,
    clock: C,
    timings: Timings,
    current: usize,
    phase: ReconfigPhase,
    stats: OrchestratorStats,
    cancel: CancelToken,
}

impl<T: Transport, D: SwitchDriver, C: Clock> Orchestrator<T, D, C> {
    /// Create an orchestrator positioned at configuration 0
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `table` was not built from `registry`.
    pub fn new(
        registry: ConfigurationRegistry,
        table: MessageTable,
        transport: T,
        driver: D,
        clock: C,
        timings: Timings,
    ) -> Result<Self> {
        if table.configuration_count() != registry.configuration_count() {
            return Err(Error::config(format!(
                "message table covers {} configurations, registry has {}",
                table.configuration_count(),
                registry.configuration_count()
            )));
        }

        Ok(Self {
            registry,
            table,
            transport,
            driver,
            clock,
            timings,
            current: 0,
            phase: ReconfigPhase::Idle,
            stats: OrchestratorStats::default(),
            cancel: CancelToken::new(),
        })
    }

    /// Stop the loop when `token` is cancelled
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Index of the configuration the next cycle applies
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> ReconfigPhase {
        self.phase
    }

    pub fn stats(&self) -> &OrchestratorStats {
        &self.stats
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Zero every switch channel before the first cycle
    pub fn zero_switch(&mut self) -> Result<()> {
        info!("Zeroing switch");
        self.driver
            .reset_all()
            .inspect_err(|e| error!(error = %e, "Failed to zero switch"))
    }

    /// Run cycles until the cancel token fires.
    ///
    /// Cancellation is checked before each cycle and during the hold, so
    /// hosts that received a start notification always get the matching
    /// finish notification.
    pub fn run(&mut self) -> Result<()> {
        info!(
            configurations = self.registry.configuration_count(),
            pre_guard_ms = self.timings.pre_guard.as_millis(),
            post_guard_ms = self.timings.post_guard.as_millis(),
            "Starting reconfiguration loop"
        );

        while !self.cancel.is_cancelled() {
            self.run_cycle()?;
        }

        self.enter(ReconfigPhase::Idle);
        info!(
            cycles = self.stats.cycles_completed,
            "Reconfiguration loop stopped"
        );
        Ok(())
    }

    /// Run one full cycle for the current configuration and advance
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let index = self.current;
        let count = self.registry.configuration_count();

        info!(config = index, "Switching to configuration");

        self.enter(ReconfigPhase::NotifyStart);
        let (sent_start, failed_start) = self.notify(index, NotificationEvent::Start);

        self.enter(ReconfigPhase::PreGuard);
        self.clock.sleep(self.timings.pre_guard);

        self.enter(ReconfigPhase::Switching);
        let configuration = self
            .registry
            .configuration_at(index)
            .ok_or_else(|| Error::config(format!("no configuration at index {}", index)))?;
        self.driver
            .reset_all()
            .inspect_err(|e| error!(config = index, error = %e, "Failed to zero switch"))?;
        self.driver
            .apply(configuration)
            .inspect_err(|e| error!(config = index, error = %e, "Failed to apply configuration"))?;

        self.enter(ReconfigPhase::PostGuard);
        self.clock.sleep(self.timings.post_guard);

        self.enter(ReconfigPhase::NotifyFinish);
        let (sent_finish, failed_finish) = self.notify(index, NotificationEvent::Finish);
        let hold = self
            .registry
            .configuration_at(index)
            .map(|c| c.duration())
            .unwrap_or_default();

        let next_index = (index + 1) % count;
        info!(
            config = index,
            hold_ms = hold.as_millis(),
            "Switched to configuration"
        );

        self.enter(ReconfigPhase::Hold);
        let hold_interrupted = self.hold(hold);

        self.current = next_index;
        self.stats.cycles_completed += 1;

        Ok(CycleReport {
            index,
            next_index,
            hold,
            notifications_sent: sent_start + sent_finish,
            send_failures: failed_start + failed_finish,
            hold_interrupted,
        })
    }

    /// Send every `event` datagram of configuration `index`.
    ///
    /// Failures are logged and skipped. Returns (sent, failed).
    fn notify(&mut self, index: usize, event: NotificationEvent) -> (usize, usize) {
        let messages = self.table.messages(index, event);
        let destinations = self.table.destinations(index);
        let mut sent = 0;
        let mut failed = 0;

        for (packet, &dest) in messages.iter().zip(destinations) {
            if tracing::enabled!(Level::DEBUG) {
                log_packet(packet);
            }

            match self.transport.send(packet, dest) {
                Ok(_) => {
                    sent += 1;
                    info!(config = index, event = %event, dest = %dest, "Sent notification");
                }
                Err(e) => {
                    failed += 1;
                    warn!(config = index, event = %event, dest = %dest, error = %e, "Failed to send notification");
                }
            }
        }

        self.stats.notifications_sent += sent as u64;
        self.stats.send_failures += failed as u64;
        (sent, failed)
    }

    /// Sleep for `duration`, waking early on cancellation. Returns true if interrupted.
    fn hold(&self, duration: Duration) -> bool {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if self.cancel.is_cancelled() {
                return true;
            }
            let slice = remaining.min(HOLD_POLL_INTERVAL);
            self.clock.sleep(slice);
            remaining -= slice;
        }
        false
    }

    fn enter(&mut self, phase: ReconfigPhase) {
        debug!(config = self.current, from = %self.phase, to = %phase, "Phase transition");
        self.phase = phase;
    }
}

fn log_packet(packet: &[u8]) {
    match SignalPacket::parse(packet) {
        Ok(p) => debug!(
            source = %p.source,
            destination = %p.destination,
            event = %p.event,
            dest_host_id = p.dest_host_id,
            src_port = p.src_port,
            dst_port = p.dst_port,
            "Notification packet"
        ),
        Err(e) => debug!(error = %e, "Undecodable notification packet"),
    }
}
