// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Ready-made freshness policies.
//!
//! All policies here look only at [`Timed::time`] and ignore the stored value. Except for
//! [`MaxAge::with_clock`], they are zero-sized or a single timestamp, so passing them by value
//! costs nothing.

use std::time::{Duration, SystemTime};

use crate::{Clock, NowClock, Policy, Timed};

/// Expires a state once it is older than a fixed age.
///
/// A state stamped at `ts` is fresh while `now <= ts + age` and expired afterwards. A
/// [negative age](Self::ahead) only accepts timestamps that are still far enough in the future.
/// Deadlines that fall outside the range of [`SystemTime`] are treated as infinitely far away.
///
/// "Now" is read from [`NowClock`] unless another clock is supplied with
/// [`with_clock()`][Self::with_clock].
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use memoslot::{MaxAge, Policy, Timed};
///
/// let policy = MaxAge::new(Duration::from_secs(60));
///
/// assert!(!policy.is_expired(&Timed::new((), SystemTime::now())));
/// assert!(policy.is_expired(&Timed::new((), SystemTime::UNIX_EPOCH)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAge<C = NowClock> {
    age: Duration,
    ahead: bool,
    clock: C,
}

impl MaxAge {
    /// Accepts states stamped no more than `age` ago.
    #[must_use]
    pub const fn new(age: Duration) -> Self {
        Self {
            age,
            ahead: false,
            clock: NowClock,
        }
    }

    /// Accepts only states stamped at least `lead` in the future.
    ///
    /// This is the negative counterpart of [`new()`][Self::new]: a state stamped at `ts` is fresh
    /// while `now <= ts - lead`.
    #[must_use]
    pub const fn ahead(lead: Duration) -> Self {
        Self {
            age: lead,
            ahead: true,
            clock: NowClock,
        }
    }
}

impl<C> MaxAge<C> {
    /// Reads "now" from `clock` instead of the wall clock.
    #[must_use]
    pub fn with_clock<D: Clock>(self, clock: D) -> MaxAge<D> {
        MaxAge {
            age: self.age,
            ahead: self.ahead,
            clock,
        }
    }

    /// Returns the configured age, or lead for policies built with [`ahead()`][MaxAge::ahead].
    #[must_use]
    pub fn age(&self) -> Duration {
        self.age
    }
}

impl<T, C: Clock> Policy<T> for MaxAge<C> {
    fn is_expired(&self, timed: &Timed<T>) -> bool {
        let deadline = if self.ahead {
            timed.time().checked_sub(self.age)
        } else {
            timed.time().checked_add(self.age)
        };

        match deadline {
            Some(deadline) => self.clock.now() > deadline,
            // Past the end of time nothing expires; before its start everything does.
            None => self.ahead,
        }
    }
}

/// A fixed instant, usable both as a [`Clock`] and as a [`Policy`].
///
/// As a clock it always reports itself. As a policy a state is expired if its timestamp is
/// later than the instant.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use memoslot::{Clock, Inst, Policy, Timed};
///
/// let inst = Inst(SystemTime::UNIX_EPOCH + Duration::from_secs(10));
/// assert_eq!(inst.now(), inst.0);
///
/// assert!(!inst.is_expired(&Timed::new((), inst.0)));
/// assert!(inst.is_expired(&Timed::new((), inst.0 + Duration::from_secs(1))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Inst(pub SystemTime);

impl Clock for Inst {
    fn now(&self) -> SystemTime {
        self.0
    }
}

impl<T> Policy<T> for Inst {
    fn is_expired(&self, timed: &Timed<T>) -> bool {
        timed.time() > self.0
    }
}

impl From<SystemTime> for Inst {
    fn from(time: SystemTime) -> Self {
        Self(time)
    }
}

/// Expires a state once the wall clock has passed its timestamp.
///
/// Suited to producers that stamp values with their own expiry time rather than with the time
/// they were produced at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NowPolicy;

impl<T> Policy<T> for NowPolicy {
    fn is_expired(&self, timed: &Timed<T>) -> bool {
        SystemTime::now() > timed.time()
    }
}

/// Treats every state as expired, so each call refreshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysExpired;

impl<T> Policy<T> for AlwaysExpired {
    fn is_expired(&self, _timed: &Timed<T>) -> bool {
        true
    }
}

/// Treats every state as fresh, so the slot is never refreshed by [`Mem::dedup`](crate::Mem::dedup).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverExpires;

impl<T> Policy<T> for NeverExpires {
    fn is_expired(&self, _timed: &Timed<T>) -> bool {
        false
    }
}

macro_rules! fixed_age {
    ($(#[$meta:meta])* $name:ident, $secs:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl<T> Policy<T> for $name {
            fn is_expired(&self, timed: &Timed<T>) -> bool {
                MaxAge::new(Duration::from_secs($secs)).is_expired(timed)
            }
        }
    };
}

fixed_age!(
    /// Expires a state once it is more than a second old.
    ExpireSecond,
    1
);

fixed_age!(
    /// Expires a state once it is more than a minute old.
    ExpireMinute,
    60
);

fixed_age!(
    /// Expires a state once it is more than an hour old.
    ExpireHour,
    60 * 60
);

fixed_age!(
    /// Expires a state once it is more than a day old.
    ExpireDay,
    24 * 60 * 60
);
