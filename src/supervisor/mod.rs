//! Connectivity supervisor.
//!
//! The supervisor is a small state machine that brings the device online and
//! keeps it there:
//!
//! ```text
//!  AssociatingNetwork ──▶ ConnectingBroker ◀──▶ Connected
//! ```
//!
//! * **AssociatingNetwork**: starts Wi-Fi association once, then polls the
//!   station every [`RetryPolicy::association_poll`] until it is up. It then
//!   points the MQTT client at the configured broker.
//! * **ConnectingBroker**: attempts a broker session. After a failure it waits
//!   [`RetryPolicy::reconnect_delay`] and tries again, forever.
//! * **Connected**: services the client's protocol loop once per iteration and
//!   falls back to `ConnectingBroker` when the session drops.
//!
//! There is no terminal state. Association happens exactly once; if the link
//! later drops, broker reconnects keep failing until the station recovers.
//!
//! [`Supervisor::step`] performs a single transition and never sleeps, which
//! makes it easy to drive from a thread that must release a lock between
//! iterations (see [`runtime`](crate::runtime)). [`Supervisor::run`] is the
//! blocking loop for single-context firmware.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::helper::MqttHelper;
use crate::network::{BrokerClient, WifiStation};

/// The supervisor's position in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Waiting for the Wi-Fi station to associate.
    AssociatingNetwork,
    /// Network is up; trying to open a broker session.
    ConnectingBroker,
    /// Broker session is open; servicing the protocol loop.
    Connected,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SupervisorState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SupervisorState::AssociatingNetwork => defmt::write!(f, "AssociatingNetwork"),
            SupervisorState::ConnectingBroker => defmt::write!(f, "ConnectingBroker"),
            SupervisorState::Connected => defmt::write!(f, "Connected"),
        }
    }
}

/// Fixed delays used by the supervisor. Attempts are never limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Interval between Wi-Fi association checks.
    pub association_poll: Duration,
    /// Wait after a failed broker connection attempt.
    pub reconnect_delay: Duration,
    /// Pause between protocol loop iterations while connected.
    pub poll_interval: Duration,
}

impl RetryPolicy {
    /// 500 ms association polling, 5 s reconnect delay, 10 ms poll interval.
    pub const DEFAULT: Self = Self {
        association_poll: Duration::from_millis(500),
        reconnect_delay: Duration::from_secs(5),
        poll_interval: Duration::from_millis(10),
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What the driver of the supervisor should do after a [`Supervisor::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Call `step` again right away.
    Continue,
    /// Wait for the given duration before the next `step`.
    Sleep(Duration),
}

/// Drives the network and broker connection of an [`MqttHelper`].
#[derive(Debug)]
pub struct Supervisor {
    config: Config,
    policy: RetryPolicy,
    state: SupervisorState,
    association_started: bool,
}

impl Supervisor {
    /// Create a supervisor that owns `config`.
    pub fn new(config: Config, policy: RetryPolicy) -> Self {
        Self {
            config,
            policy,
            state: SupervisorState::AssociatingNetwork,
            association_started: false,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// The configuration this supervisor connects with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The retry policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Perform one transition. Never blocks beyond the collaborator calls.
    pub fn step<W, C, const N: usize>(&mut self, helper: &mut MqttHelper<W, C, N>) -> Step
    where
        W: WifiStation,
        C: BrokerClient,
    {
        match self.state {
            SupervisorState::AssociatingNetwork => self.associate(helper),
            SupervisorState::ConnectingBroker => self.connect_broker(helper),
            SupervisorState::Connected => self.service(helper),
        }
    }

    /// Run forever, sleeping on `delay` whenever a step asks for it.
    pub fn run<W, C, D, const N: usize>(
        mut self,
        helper: &mut MqttHelper<W, C, N>,
        delay: &mut D,
    ) -> !
    where
        W: WifiStation,
        C: BrokerClient,
        D: DelayNs,
    {
        loop {
            if let Step::Sleep(duration) = self.step(helper) {
                sleep(delay, duration);
            }
        }
    }

    fn associate<W, C, const N: usize>(&mut self, helper: &mut MqttHelper<W, C, N>) -> Step
    where
        W: WifiStation,
        C: BrokerClient,
    {
        if !self.association_started {
            info!("Connecting to: {}", self.config.ssid());
            match helper
                .wifi_mut()
                .begin(self.config.ssid(), self.config.password())
            {
                Ok(()) => self.association_started = true,
                Err(e) => {
                    warn!("WiFi begin failed: {:?}", e);
                    return Step::Sleep(self.policy.association_poll);
                }
            }
        }

        if !helper.wifi().is_associated() {
            debug!(".");
            return Step::Sleep(self.policy.association_poll);
        }

        info!("WiFi connected");
        if let Some(ip) = helper.wifi().local_ip() {
            info!("IP address: {}", ip);
        }

        helper
            .client_mut()
            .set_server(self.config.broker_host(), self.config.broker_port());
        self.state = SupervisorState::ConnectingBroker;
        Step::Continue
    }

    fn connect_broker<W, C, const N: usize>(&mut self, helper: &mut MqttHelper<W, C, N>) -> Step
    where
        W: WifiStation,
        C: BrokerClient,
    {
        if helper.client().is_connected() {
            self.state = SupervisorState::Connected;
            return Step::Continue;
        }

        info!("Attempting MQTT connection...");
        match helper.client_mut().connect(self.config.client_id()) {
            Ok(()) => {
                info!("connected");
                self.state = SupervisorState::Connected;
                Step::Continue
            }
            Err(e) => {
                warn!(
                    "failed, rc={:?} try again in {} ms",
                    e,
                    self.policy.reconnect_delay.as_millis()
                );
                Step::Sleep(self.policy.reconnect_delay)
            }
        }
    }

    fn service<W, C, const N: usize>(&mut self, helper: &mut MqttHelper<W, C, N>) -> Step
    where
        W: WifiStation,
        C: BrokerClient,
    {
        if !helper.client().is_connected() {
            warn!("MQTT connection lost");
            self.state = SupervisorState::ConnectingBroker;
            return Step::Continue;
        }

        if let Err(e) = helper.client_mut().poll() {
            warn!("MQTT loop error: {:?}", e);
        }

        if self.policy.poll_interval.is_zero() {
            Step::Continue
        } else {
            Step::Sleep(self.policy.poll_interval)
        }
    }
}

/// Sleep for `duration` on an `embedded-hal` delay, in `u32`-sized microsecond chunks.
pub(crate) fn sleep<D: DelayNs>(delay: &mut D, duration: Duration) {
    let mut remaining = duration.as_micros();
    while remaining > 0 {
        let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
        delay.delay_us(chunk);
        remaining -= u128::from(chunk);
    }
}
