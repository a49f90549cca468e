// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A single-slot cache that deduplicates expensive refreshes across concurrent callers.
//!
//! This crate provides [`Mem`], which holds exactly one cached value together with the
//! timestamp it was produced at. Callers ask for the value through [`Mem::dedup`], passing three
//! capabilities:
//!
//! - a [`Producer`] that computes a new value (slow, may fail),
//! - a [`Clock`] that stamps the new value,
//! - a [`Policy`] that decides whether the cached value is too old to serve.
//!
//! While the cached value is fresh, callers read it in parallel and nothing else happens. Once
//! it expires, exactly one caller produces a replacement while the others wait for it and share
//! the result. Producer failures are cached alongside values, so a failing upstream is not
//! hammered by every waiting caller either.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use memoslot::{MaxAge, Mem, NowClock, ProduceFn};
//!
//! let rates = Mem::<f64>::default();
//! let fetch = ProduceFn(|| "1.08".parse::<f64>());
//! let policy = MaxAge::new(Duration::from_secs(300));
//!
//! let timed = rates.dedup(&fetch, &NowClock, &policy);
//! assert_eq!(timed.get().ok(), Some(&1.08));
//! ```
//!
//! # Failures
//!
//! A producer fails by returning `Err` or by panicking; a clock fails by panicking. Either way
//! the failure is captured into a [`Failure`] and stored in the slot instead of a value, and
//! [`Timed::get`] hands back a handle to that same failure on every call until the next
//! successful refresh. Panics that are not [`Failure`] payloads are wrapped in [`Panicked`].
//!
//! # Absent Capabilities
//!
//! `None` is accepted wherever a capability is expected. An absent producer produces
//! `T::default()`, an absent clock reports [`ZERO_TIME`], and an absent policy treats every state
//! as expired. [`Void`] provides the same behavior as a named type.
//!
//! # Service Objects
//!
//! A type that embeds its own [`Mem`] and implements all three capabilities is an [`Omni`], and
//! can be refreshed with the free function [`dedup`].
//!
//! # Features
//!
//! - `logs`: emits `tracing` events for each refresh, recheck, replacement and reset.
//! - `tick`: implements [`Clock`] for `tick::Clock`, so refreshes can be stamped with a
//!   controllable clock in tests.

mod capability;
mod either;
mod error;
mod failure;
mod mem;
mod omni;
mod policy;
mod telemetry;
mod timed;

#[cfg(test)]
mod testing;

pub use capability::{Clock, ClockFn, NowClock, Policy, ProduceFn, Producer, Void};
pub use either::Either;
pub use error::Panicked;
pub use failure::Failure;
pub use mem::{Mem, MemBuilder};
pub use omni::{Omni, dedup};
pub use policy::{AlwaysExpired, ExpireDay, ExpireHour, ExpireMinute, ExpireSecond, Inst, MaxAge, NeverExpires, NowPolicy};
pub use timed::{Timed, ZERO_TIME};
