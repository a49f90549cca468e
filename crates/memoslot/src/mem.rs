// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::time::Instant;

use parking_lot::RwLock;

use crate::telemetry::{self, Activity};
use crate::{Clock, Failure, Policy, Producer, Timed};

const DEFAULT_NAME: &str = "memoslot";

/// A single-slot cache that deduplicates refreshes across concurrent callers.
///
/// `Mem` owns one [`Timed`] state behind a reader/writer lock. Conceptually it is an atomic cell
/// for that state, with the added ability to make readers wait for a writer that is producing a
/// new value, and to skip producing one while the current value is still fresh.
///
/// The default instance is empty and immediately usable. `Mem` is not `Clone`; share an instance
/// by reference or wrap it in an [`Arc`](std::sync::Arc).
///
/// # Concurrency
///
/// Readers ([`read`][Self::read], and [`dedup`][Self::dedup] when the value is fresh) run in
/// parallel with each other. Writers ([`replace`][Self::replace], [`reset`][Self::reset], and
/// `dedup` when the value is expired) exclude everyone else. A reader arriving while a writer is
/// producing a new value waits for that writer, even if the old value would have satisfied the
/// reader's policy, and then observes the new value.
///
/// There are no timeouts: if a producer hangs, every caller contending for the slot hangs with it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use memoslot::{MaxAge, Mem, NowClock, ProduceFn};
///
/// let mem = Mem::<String>::default();
/// let producer = ProduceFn(|| Ok::<_, memoslot::Failure>("expensive".to_string()));
/// let policy = MaxAge::new(Duration::from_secs(60));
///
/// let first = mem.dedup(&producer, &NowClock, &policy);
/// let second = mem.dedup(&producer, &NowClock, &policy);
///
/// // The second call reused the first state, timestamp included.
/// assert_eq!(first, second);
/// assert_eq!(first.get().ok().map(String::as_str), Some("expensive"));
/// ```
pub struct Mem<T> {
    state: RwLock<Timed<T>>,
    name: &'static str,
}

impl<T> Mem<T> {
    /// Creates an instance holding the given state.
    ///
    /// Mostly useful in tests; [`Mem::default`] is ready to use.
    #[must_use]
    pub fn new(initial: Timed<T>) -> Self {
        Self {
            state: RwLock::new(initial),
            name: DEFAULT_NAME,
        }
    }

    /// Returns a builder for configuring a new instance.
    #[must_use]
    pub fn builder() -> MemBuilder<T> {
        MemBuilder::new()
    }

    /// Returns the name used to label log events for this instance.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns a snapshot of the current state.
    ///
    /// Runs concurrently with other readers. If a writer is producing a new state, this waits
    /// for it and returns the new state.
    #[must_use]
    pub fn read(&self) -> Timed<T>
    where
        T: Clone,
    {
        self.state.read().clone()
    }

    /// Shorthand for `read().get()`, returning an owned value.
    ///
    /// # Errors
    ///
    /// Returns the currently cached failure, if any.
    pub fn get(&self) -> Result<T, Failure>
    where
        T: Clone,
    {
        self.state.read().get().cloned()
    }

    /// Replaces the state unconditionally.
    pub fn replace(&self, state: Timed<T>) {
        *self.state.write() = state;
        telemetry::record(self.name, Activity::Replaced, None, None);
    }

    /// Resets the state to the empty [`Timed::default`].
    pub fn reset(&self)
    where
        T: Default,
    {
        *self.state.write() = Timed::default();
        telemetry::record(self.name, Activity::Reset, None, None);
    }

    /// Returns a fresh state, producing a new one only if the current state is expired.
    ///
    /// 1. Takes a snapshot under shared access. If `policy` says it is fresh, returns it without
    ///    calling the producer or the clock.
    /// 2. Otherwise takes exclusive access and checks the policy again, because other callers
    ///    may have refreshed the state while this one waited for the lock.
    /// 3. If the state is still expired, calls `producer` and then `clock`, stores the result,
    ///    and returns it.
    ///
    /// At most one producer call is in flight per instance. Failures raised or returned by the
    /// producer or clock are stored in the returned state rather than propagated; they surface
    /// when the caller invokes [`Timed::get`].
    ///
    /// Pass `None` for an absent capability: an absent producer yields `T::default()`, an absent
    /// clock yields [`ZERO_TIME`](crate::ZERO_TIME), and an absent policy expires every state.
    pub fn dedup<P, C, E>(&self, producer: &P, clock: &C, policy: &E) -> Timed<T>
    where
        T: Clone,
        P: Producer<T> + ?Sized,
        C: Clock + ?Sized,
        E: Policy<T> + ?Sized,
    {
        let snapshot = self.read();
        if !policy.is_expired(&snapshot) {
            telemetry::record(self.name, Activity::Fresh, None, None);
            return snapshot;
        }

        // Concurrent callers line up here; the first one in refreshes the state and the rest
        // find it fresh on the recheck below.
        let mut state = self.state.write();

        if !policy.is_expired(&state) {
            telemetry::record(self.name, Activity::RecheckFresh, None, None);
            return state.clone();
        }

        let started = Instant::now();
        state.refresh(producer, clock);
        let elapsed = Some(started.elapsed());

        match state.either().as_result() {
            Ok(_) => telemetry::record(self.name, Activity::Refreshed, elapsed, None),
            Err(failure) => telemetry::record(self.name, Activity::RefreshFailed, elapsed, Some(failure)),
        }

        state.clone()
    }
}

impl<T: Default> Default for Mem<T> {
    fn default() -> Self {
        Self::new(Timed::default())
    }
}

impl<T> AsRef<Self> for Mem<T> {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Mem<T> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic output only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Mem");
        debug.field("name", &self.name);

        // Never block on a writer that may be formatting this very instance.
        match self.state.try_read() {
            Some(state) => debug.field("state", &*state),
            None => debug.field("state", &format_args!("<locked>")),
        };

        debug.finish()
    }
}

/// Builder for [`Mem`].
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
///
/// use memoslot::{Mem, Timed};
///
/// let mem = Mem::builder()
///     .name("exchange_rates")
///     .initial(Timed::new(1.08_f64, SystemTime::now()))
///     .build();
///
/// assert_eq!(mem.name(), "exchange_rates");
/// assert_eq!(mem.get().ok(), Some(1.08));
/// ```
#[derive(Debug)]
pub struct MemBuilder<T> {
    name: &'static str,
    initial: Option<Timed<T>>,
}

impl<T> MemBuilder<T> {
    fn new() -> Self {
        Self {
            name: DEFAULT_NAME,
            initial: None,
        }
    }

    /// Sets the name used to label log events. Defaults to `"memoslot"`.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Sets the initial state. Defaults to [`Timed::default`].
    #[must_use]
    pub fn initial(mut self, initial: Timed<T>) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Builds the instance.
    #[must_use]
    pub fn build(self) -> Mem<T>
    where
        T: Default,
    {
        Mem {
            state: RwLock::new(self.initial.unwrap_or_default()),
            name: self.name,
        }
    }
}
