// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Clock, Mem, Policy, Producer, Timed};

/// A type that carries its own cache together with every capability needed to refresh it.
///
/// Implemented automatically for any type that is a [`Producer`], a [`Clock`], a [`Policy`], and
/// exposes a [`Mem`] through [`AsRef`]. Typical implementors are long-lived service objects that
/// embed a `Mem` field and know how to fetch and judge their own data.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use memoslot::{Clock, Failure, Mem, Policy, Producer, Timed};
///
/// struct Config {
///     cache: Mem<String>,
/// }
///
/// impl Producer<String> for Config {
///     fn produce(&self) -> Result<String, Failure> {
///         Ok("loaded".to_string())
///     }
/// }
///
/// impl Clock for Config {
///     fn now(&self) -> SystemTime {
///         SystemTime::now()
///     }
/// }
///
/// impl Policy<String> for Config {
///     fn is_expired(&self, timed: &Timed<String>) -> bool {
///         timed.time() + Duration::from_secs(30) < SystemTime::now()
///     }
/// }
///
/// impl AsRef<Mem<String>> for Config {
///     fn as_ref(&self) -> &Mem<String> {
///         &self.cache
///     }
/// }
///
/// let config = Config { cache: Mem::default() };
/// let state: Timed<String> = memoslot::dedup(&config);
/// assert_eq!(state.get().ok().map(String::as_str), Some("loaded"));
/// ```
pub trait Omni<T>: Producer<T> + Clock + Policy<T> + AsRef<Mem<T>> {}

impl<T, O> Omni<T> for O where O: Producer<T> + Clock + Policy<T> + AsRef<Mem<T>> + ?Sized {}

/// Runs [`Mem::dedup`] on the cache of `omni`, using `omni` itself as producer, clock and policy.
pub fn dedup<T, O>(omni: &O) -> Timed<T>
where
    T: Clone,
    O: Omni<T> + ?Sized,
{
    omni.as_ref().dedup(omni, omni, omni)
}
