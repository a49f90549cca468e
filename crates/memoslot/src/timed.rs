// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::SystemTime;

use crate::{Clock, Either, Failure, Producer};

/// The timestamp of the empty state, and the timestamp reported by an absent [`Clock`].
pub const ZERO_TIME: SystemTime = SystemTime::UNIX_EPOCH;

/// A value (or captured failure) paired with the timestamp it was produced at.
///
/// This is the unit stored by [`Mem`](crate::Mem) and handed to a [`Policy`](crate::Policy). The
/// timestamp has no inherent meaning: it is produced by a [`Clock`] and only interpreted by a
/// policy.
///
/// The default state holds `T::default()` and [`ZERO_TIME`].
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use memoslot::Timed;
///
/// let at = SystemTime::UNIX_EPOCH + Duration::from_secs(60);
/// let timed = Timed::new("cached", at);
///
/// assert_eq!(timed.get().ok(), Some(&"cached"));
/// assert_eq!(timed.time(), at);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timed<T> {
    either: Either<T>,
    time: SystemTime,
}

impl<T> Timed<T> {
    /// Creates a state holding `value`, stamped with `time`.
    #[must_use]
    pub fn new(value: T, time: SystemTime) -> Self {
        Self::from_parts(Either::Value(value), time)
    }

    /// Creates a state holding a captured failure, stamped with `time`.
    #[must_use]
    pub fn failed(failure: Failure, time: SystemTime) -> Self {
        Self::from_parts(Either::Failure(failure), time)
    }

    /// Creates a state from its content and timestamp.
    #[must_use]
    pub fn from_parts(either: Either<T>, time: SystemTime) -> Self {
        Self { either, time }
    }

    /// Returns the value, or a handle to the captured failure.
    ///
    /// # Errors
    ///
    /// Returns the captured failure if one is stored. Every call returns the same failure.
    pub fn get(&self) -> Result<&T, Failure> {
        self.either.get()
    }

    /// Returns the timestamp.
    #[must_use]
    pub fn time(&self) -> SystemTime {
        self.time
    }

    /// Borrows the stored content.
    #[must_use]
    pub fn either(&self) -> &Either<T> {
        &self.either
    }

    /// Mutably borrows the stored content.
    pub fn either_mut(&mut self) -> &mut Either<T> {
        &mut self.either
    }

    /// Splits the state into its content and timestamp.
    #[must_use]
    pub fn into_parts(self) -> (Either<T>, SystemTime) {
        (self.either, self.time)
    }

    /// Replaces the timestamp with the one reported by `clock`.
    ///
    /// If the clock panics, the panic is stored as a failure in place of the *value* and the
    /// timestamp keeps its previous value. Clock and producer failures therefore share one
    /// reporting channel, and a failing clock masks a value that was just produced.
    pub fn set_clock<C>(&mut self, clock: &C)
    where
        C: Clock + ?Sized,
    {
        match catch_unwind(AssertUnwindSafe(|| clock.now())) {
            Ok(time) => self.time = time,
            Err(payload) => self.either = Either::Failure(Failure::from_panic(payload)),
        }
    }

    /// Produces a new value and then stamps it, in that order.
    ///
    /// The timestamp is taken only once the value is settled.
    pub fn refresh<P, C>(&mut self, producer: &P, clock: &C)
    where
        P: Producer<T> + ?Sized,
        C: Clock + ?Sized,
    {
        self.either.set_producer(producer);
        self.set_clock(clock);
    }
}

impl<T: Default> Default for Timed<T> {
    fn default() -> Self {
        Self::from_parts(Either::default(), ZERO_TIME)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{ClockFn, Inst, NowClock, Panicked, ProduceFn, Void};

    fn at(secs: u64) -> SystemTime {
        ZERO_TIME + Duration::from_secs(secs)
    }

    #[test]
    fn default_is_zero_state() {
        let timed = Timed::<String>::default();
        assert_eq!(timed.get().ok().map(String::as_str), Some(""));
        assert_eq!(timed.time(), ZERO_TIME);
    }

    #[test]
    fn set_clock_with_absent_clock_resets_time() {
        let mut timed = Timed::new(10, at(5));
        timed.set_clock(&None::<NowClock>);
        assert_eq!(timed, Timed::new(10, ZERO_TIME));
    }

    #[test]
    fn set_clock_uses_clock_time() {
        let mut timed = Timed::new("val", at(1));
        timed.set_clock(&Inst(at(2)));
        assert_eq!(timed, Timed::new("val", at(2)));
    }

    #[test]
    fn set_clock_keeps_failure_value() {
        let failure = Failure::from_message("kept");
        let mut timed = Timed::<u8>::failed(failure.clone(), at(1));
        timed.set_clock(&Inst(at(2)));
        assert_eq!(timed, Timed::failed(failure, at(2)));
    }

    #[test]
    fn panicking_clock_overwrites_value_not_time() {
        let mut timed = Timed::new(42, at(7));
        timed.set_clock(&ClockFn(|| -> SystemTime { panic!("clock unavailable") }));

        assert_eq!(timed.time(), at(7));
        let failure = timed.get().expect_err("the clock panic replaces the value");
        assert_eq!(
            failure.downcast_ref::<Panicked>().map(Panicked::detail),
            Some("clock unavailable")
        );
    }

    #[test]
    fn refresh_runs_producer_then_clock() {
        let mut timed = Timed::new(1, at(1));
        timed.refresh(&ProduceFn(|| Ok::<_, Failure>(2)), &Inst(at(3)));
        assert_eq!(timed, Timed::new(2, at(3)));
    }

    #[test]
    fn refresh_with_void_yields_zero_state() {
        let mut timed = Timed::new(9_u64, at(9));
        timed.refresh(&Void, &Void);
        assert_eq!(timed, Timed::default());
    }

    #[test]
    fn refresh_stamps_producer_failures() {
        let failure = Failure::from_message("producer failed");
        let mut timed = Timed::new(1, at(1));
        timed.refresh(&ProduceFn(|| Err::<i32, _>(failure.clone())), &Inst(at(4)));
        assert_eq!(timed, Timed::failed(failure, at(4)));
    }

    #[test]
    fn parts_round_trip() {
        let (either, time) = Timed::new('x', at(3)).into_parts();
        assert_eq!(Timed::from_parts(either, time), Timed::new('x', at(3)));
    }

    #[test]
    fn either_mut_edits_content_in_place() {
        let mut timed = Timed::new(1, at(1));
        timed.either_mut().set(Ok::<_, Failure>(2));
        assert_eq!(timed.either(), &Either::Value(2));
        assert_eq!(timed.time(), at(1));
    }
}
