// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types stored in place of a value when a capability fails.

use std::any::Any;

/// A capability panicked while the cache was refreshing its value.
///
/// When a [`Producer`](crate::Producer) or [`Clock`](crate::Clock) panics with anything other than a
/// [`Failure`](crate::Failure) payload, the panic is caught and this error is stored in the slot instead.
/// The message is extracted from `&str` and `String` payloads; other payloads yield a generic message.
///
/// # Examples
///
/// ```
/// use memoslot::{Either, Panicked, ProduceFn};
///
/// let mut either = Either::<u32>::default();
/// either.set_producer(&ProduceFn(|| -> Result<u32, memoslot::Failure> { panic!("backend is down") }));
///
/// let failure = either.get().expect_err("the panic is captured as a failure");
/// let panicked = failure.downcast_ref::<Panicked>().expect("panics are stored as `Panicked`");
/// assert_eq!(panicked.detail(), "backend is down");
/// ```
#[ohno::error]
#[display("capability panicked: {detail}")]
pub struct Panicked {
    detail: String,
}

impl Panicked {
    /// Returns the text carried by the panic payload.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let detail = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Self::new(detail)
    }
}
