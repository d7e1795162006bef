//! Background supervisor runtime for `std` targets.
//!
//! [`init`] wraps an [`MqttHelper`] in a [`SharedHelper`], moves a
//! [`Supervisor`] onto a dedicated worker, and hands the shared handle back to
//! the caller. The worker holds the helper's lock for a single supervisor
//! step at a time and always sleeps with the lock released.
//!
//! While the supervisor is associating or connecting, a step may sit in a
//! blocking collaborator call. Publishers never wait for such a step: if the
//! lock is taken while the link is being brought up, `publish` returns `false`
//! and `state` reports the supervisor's last known phase. Once connected, the
//! worker only holds the lock to service the client's protocol loop.
//!
//! The handle is `Clone`, so it is safe to publish from several threads at
//! once.
//!
//! # Execution units
//!
//! [`SpawnOptions::core`] names the execution unit the worker should be pinned
//! to. [`StdSpawner`] uses `std::thread` and cannot pin; firmware targets that
//! support affinity (for example ESP-IDF's thread spawn configuration) should
//! implement [`Spawn`] and apply it there.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use mqtt_helper::network::{BrokerClient, WifiStation};
//! # struct Station;
//! # impl WifiStation for Station {
//! #     type Error = ();
//! #     fn begin(&mut self, _: &str, _: &str) -> Result<(), ()> { Ok(()) }
//! #     fn is_associated(&self) -> bool { true }
//! # }
//! # struct Client;
//! # impl BrokerClient for Client {
//! #     type Error = ();
//! #     fn set_server(&mut self, _: &str, _: u16) {}
//! #     fn connect(&mut self, _: &str) -> Result<(), ()> { Ok(()) }
//! #     fn is_connected(&self) -> bool { true }
//! #     fn poll(&mut self) -> Result<(), ()> { Ok(()) }
//! #     fn publish(&mut self, _: &str, _: &[u8]) -> Result<(), ()> { Ok(()) }
//! # }
//! use mqtt_helper::config::Config;
//! use mqtt_helper::runtime::{self, SharedHelper, SpawnOptions, StdSpawner};
//! use mqtt_helper::supervisor::RetryPolicy;
//!
//! let config = Config::new("net", "pw", "broker.hivemq.com", 1883, "node", "garden").unwrap();
//! let (helper, _worker): (SharedHelper<_, _>, _) = runtime::init(
//!     config,
//!     Station,
//!     Client,
//!     RetryPolicy::default(),
//!     &SpawnOptions::default(),
//!     &StdSpawner,
//! )
//! .unwrap();
//!
//! helper.publish_float("soil/moisture", 41.5);
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::helper::{ConnectionState, DEFAULT_BUFFER_SIZE, MqttHelper};
use crate::network::{BrokerClient, WifiStation};
use crate::supervisor::{self, RetryPolicy, Step, Supervisor, SupervisorState};

/// Runtime error types
pub mod error;

pub use error::SpawnError;

/// Where and how the supervisor worker is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOptions {
    /// Name given to the worker.
    pub name: &'static str,
    /// Worker stack size in bytes.
    pub stack_size: usize,
    /// Execution unit (core) the worker should be pinned to.
    pub core: usize,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            name: "MqttTask",
            stack_size: 10_000,
            core: 0,
        }
    }
}

/// Creates the dedicated worker that runs the supervisor.
pub trait Spawn {
    /// Handle returned for the spawned worker.
    type Handle;

    /// Start `task` on a new worker configured by `options`.
    fn spawn<F>(&self, options: &SpawnOptions, task: F) -> Result<Self::Handle, SpawnError>
    where
        F: FnOnce() + Send + 'static;
}

/// Spawns the supervisor on a named `std::thread`.
///
/// Core affinity is not applied. The requested stack size is raised to at
/// least [`StdSpawner::MIN_STACK_SIZE`]: the firmware-sized default is too
/// small for a hosted thread running a real client.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdSpawner;

impl StdSpawner {
    /// Smallest stack given to a worker thread.
    pub const MIN_STACK_SIZE: usize = 64 * 1024;
}

impl Spawn for StdSpawner {
    type Handle = JoinHandle<()>;

    fn spawn<F>(&self, options: &SpawnOptions, task: F) -> Result<Self::Handle, SpawnError>
    where
        F: FnOnce() + Send + 'static,
    {
        let stack_size = options.stack_size.max(Self::MIN_STACK_SIZE);
        debug!(
            "spawning {} ({} bytes), core affinity {} not applied",
            options.name,
            stack_size,
            options.core
        );
        thread::Builder::new()
            .name(options.name.into())
            .stack_size(stack_size)
            .spawn(task)
            .map_err(|e| {
                warn!("failed to spawn {}: {}", options.name, e);
                SpawnError::Rejected
            })
    }
}

/// `embedded-hal` delay backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// A thread-safe, cloneable handle to an [`MqttHelper`].
pub struct SharedHelper<W, C, const N: usize = DEFAULT_BUFFER_SIZE> {
    inner: Arc<Shared<W, C, N>>,
}

struct Shared<W, C, const N: usize> {
    helper: Mutex<MqttHelper<W, C, N>>,
    // Written by the worker before it releases the lock after every step.
    phase: AtomicU8,
}

impl<W, C, const N: usize> Clone for SharedHelper<W, C, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W, C, const N: usize> fmt::Debug for SharedHelper<W, C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHelper")
            .field("capacity", &N)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<W, C, const N: usize> SharedHelper<W, C, N> {
    fn phase(&self) -> SupervisorState {
        decode_phase(self.inner.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, state: SupervisorState) {
        self.inner.phase.store(encode_phase(state), Ordering::Release);
    }
}

impl<W, C, const N: usize> SharedHelper<W, C, N>
where
    W: WifiStation,
    C: BrokerClient,
{
    /// Wrap `helper` for sharing between threads.
    ///
    /// Without a supervisor driving it, every call simply waits for the lock.
    pub fn new(helper: MqttHelper<W, C, N>) -> Self {
        Self {
            inner: Arc::new(Shared {
                helper: Mutex::new(helper),
                phase: AtomicU8::new(encode_phase(SupervisorState::Connected)),
            }),
        }
    }

    /// See [`MqttHelper::state`].
    ///
    /// While the supervisor is bringing the link up and holds the lock, this
    /// reports its phase instead of waiting.
    pub fn state(&self) -> ConnectionState {
        match self.acquire() {
            Ok(helper) => helper.state(),
            Err(SupervisorState::AssociatingNetwork) => ConnectionState::NetworkDisconnected,
            Err(SupervisorState::ConnectingBroker) => ConnectionState::BrokerDisconnected,
            Err(SupervisorState::Connected) => ConnectionState::Connected,
        }
    }

    /// See [`MqttHelper::publish`].
    ///
    /// Returns `false` without waiting while the supervisor is bringing the
    /// link up.
    pub fn publish(&self, topic: &str, args: fmt::Arguments<'_>) -> bool {
        match self.acquire() {
            Ok(mut helper) => helper.publish(topic, args),
            Err(phase) => {
                debug!("Link not ready ({:?}), dropping publish on {}", phase, topic);
                false
            }
        }
    }

    /// See [`MqttHelper::publish_float`].
    pub fn publish_float(&self, topic: &str, value: f32) -> bool {
        match self.acquire() {
            Ok(mut helper) => helper.publish_float(topic, value),
            Err(_) => false,
        }
    }

    /// See [`MqttHelper::publish_int`].
    pub fn publish_int(&self, topic: &str, value: i32) -> bool {
        match self.acquire() {
            Ok(mut helper) => helper.publish_int(topic, value),
            Err(_) => false,
        }
    }

    /// Run `f` with exclusive access to the helper.
    ///
    /// Unlike the publish calls this always waits for the lock, including
    /// while the supervisor is connecting.
    pub fn with<R>(&self, f: impl FnOnce(&mut MqttHelper<W, C, N>) -> R) -> R {
        f(&mut self.lock())
    }

    // A panic inside a collaborator must not take the publish API down with it.
    fn lock(&self) -> MutexGuard<'_, MqttHelper<W, C, N>> {
        self.inner.helper.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the lock, or give up with the supervisor's phase if the lock is
    /// held while the link is not up.
    fn acquire(&self) -> Result<MutexGuard<'_, MqttHelper<W, C, N>>, SupervisorState> {
        loop {
            match self.inner.helper.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => match self.phase() {
                    SupervisorState::Connected => thread::yield_now(),
                    phase => return Err(phase),
                },
            }
        }
    }
}

fn encode_phase(state: SupervisorState) -> u8 {
    match state {
        SupervisorState::AssociatingNetwork => 0,
        SupervisorState::ConnectingBroker => 1,
        SupervisorState::Connected => 2,
    }
}

fn decode_phase(raw: u8) -> SupervisorState {
    match raw {
        0 => SupervisorState::AssociatingNetwork,
        1 => SupervisorState::ConnectingBroker,
        _ => SupervisorState::Connected,
    }
}

/// Start the connectivity supervisor on a dedicated worker.
///
/// Returns the shared publish handle and the spawner's handle for the worker.
/// The worker never exits.
///
/// # Errors
///
/// [`SpawnError::Rejected`] if the spawner could not create the worker.
pub fn init<W, C, S, const N: usize>(
    config: Config,
    wifi: W,
    client: C,
    policy: RetryPolicy,
    options: &SpawnOptions,
    spawner: &S,
) -> Result<(SharedHelper<W, C, N>, S::Handle), SpawnError>
where
    W: WifiStation + Send + 'static,
    C: BrokerClient + Send + 'static,
    S: Spawn,
{
    let helper = SharedHelper::new(MqttHelper::new(&config, wifi, client));
    let worker = helper.clone();
    let supervisor = Supervisor::new(config, policy);
    helper.set_phase(supervisor.state());

    let handle = spawner.spawn(options, move || drive(supervisor, worker))?;
    Ok((helper, handle))
}

fn drive<W, C, const N: usize>(mut supervisor: Supervisor, helper: SharedHelper<W, C, N>) -> !
where
    W: WifiStation,
    C: BrokerClient,
{
    let mut delay = StdDelay;
    loop {
        let step = helper.with(|h| {
            let step = supervisor.step(h);
            helper.set_phase(supervisor.state());
            step
        });
        match step {
            Step::Sleep(duration) => supervisor::sleep(&mut delay, duration),
            Step::Continue => thread::yield_now(),
        }
    }
}
