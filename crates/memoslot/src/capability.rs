// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Single-method capabilities consumed by [`Mem::dedup`](crate::Mem::dedup).
//!
//! Each capability has a neutral fallback that is used when it is absent. The fallbacks are
//! expressed as implementations on [`Option`]:
//!
//! | Capability     | `None` behaves as                     |
//! | :------------- | :------------------------------------ |
//! | [`Producer`]   | produces `T::default()`               |
//! | [`Clock`]      | reports [`ZERO_TIME`]                 |
//! | [`Policy`]     | reports every state as expired        |

use std::fmt;
use std::time::SystemTime;

use crate::{Failure, Timed, ZERO_TIME};

/// Produces a new value for the slot.
///
/// Producers report failure by returning `Err`, or by panicking. Both are captured by the cache
/// and stored in the slot; neither escapes [`Mem::dedup`](crate::Mem::dedup).
///
/// Returning `Err` is the quiet path. A caught panic still runs the process panic hook first,
/// which by default prints a panic message (and a backtrace when enabled) to stderr.
pub trait Producer<T> {
    /// Computes a fresh value. Expected to be slow; the cache calls it as rarely as it can.
    ///
    /// # Errors
    ///
    /// Returns the failure to store in place of the value.
    fn produce(&self) -> Result<T, Failure>;
}

/// Supplies the timestamp attached to a newly produced value.
///
/// The timestamp carries no meaning of its own; it is only interpreted by a [`Policy`].
///
/// A clock can only fail by panicking. The panic is captured and stored in place of the value,
/// but the process panic hook still runs and by default reports it on stderr.
pub trait Clock {
    /// Returns the current timestamp.
    fn now(&self) -> SystemTime;
}

/// Decides whether a cached state must be produced again.
///
/// The state handed to a policy may be the initial zero state, holding the default value and
/// [`ZERO_TIME`]. Most policies only look at [`Timed::time`].
pub trait Policy<T> {
    /// Returns `true` if the state is too old to be served.
    fn is_expired(&self, timed: &Timed<T>) -> bool;
}

impl<T: Default, P: Producer<T>> Producer<T> for Option<P> {
    fn produce(&self) -> Result<T, Failure> {
        self.as_ref().map_or_else(|| Ok(T::default()), P::produce)
    }
}

impl<C: Clock> Clock for Option<C> {
    fn now(&self) -> SystemTime {
        self.as_ref().map_or(ZERO_TIME, C::now)
    }
}

impl<T, E: Policy<T>> Policy<T> for Option<E> {
    fn is_expired(&self, timed: &Timed<T>) -> bool {
        self.as_ref().is_none_or(|policy| policy.is_expired(timed))
    }
}

/// Adapts a closure into a [`Producer`].
///
/// The closure may fail with any error convertible into [`Failure`].
///
/// # Examples
///
/// ```
/// use memoslot::{Failure, ProduceFn, Producer};
///
/// let producer = ProduceFn(|| "fetched".parse::<String>());
/// assert_eq!(producer.produce().ok().as_deref(), Some("fetched"));
///
/// let failing = ProduceFn(|| "not a number".parse::<u32>());
/// assert!(failing.produce().is_err());
/// ```
#[derive(Clone, Copy)]
pub struct ProduceFn<F>(pub F);

impl<T, E, F> Producer<T> for ProduceFn<F>
where
    F: Fn() -> Result<T, E>,
    E: Into<Failure>,
{
    fn produce(&self) -> Result<T, Failure> {
        (self.0)().map_err(Into::into)
    }
}

impl<F> fmt::Debug for ProduceFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProduceFn").finish_non_exhaustive()
    }
}

/// Adapts a closure into a [`Clock`].
#[derive(Clone, Copy)]
pub struct ClockFn<F>(pub F);

impl<F> Clock for ClockFn<F>
where
    F: Fn() -> SystemTime,
{
    fn now(&self) -> SystemTime {
        (self.0)()
    }
}

impl<F> fmt::Debug for ClockFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClockFn").finish_non_exhaustive()
    }
}

/// Reports the wall-clock time via [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NowClock;

impl Clock for NowClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[cfg(any(feature = "tick", test))]
impl Clock for tick::Clock {
    fn now(&self) -> SystemTime {
        self.system_time()
    }
}

/// The neutral capability.
///
/// Produces `T::default()`, reports [`ZERO_TIME`], and treats every state as expired. Useful as a
/// placeholder for any capability that is not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Void;

impl<T: Default> Producer<T> for Void {
    fn produce(&self) -> Result<T, Failure> {
        Ok(T::default())
    }
}

impl Clock for Void {
    fn now(&self) -> SystemTime {
        ZERO_TIME
    }
}

impl<T> Policy<T> for Void {
    fn is_expired(&self, _timed: &Timed<T>) -> bool {
        true
    }
}
