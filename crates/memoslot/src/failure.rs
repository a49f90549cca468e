// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::Panicked;

type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// A captured failure, shared by every reader of the slot that holds it.
///
/// Cloning a `Failure` is cheap and yields a handle to the same underlying error, so every caller
/// that observes a cached failure sees exactly the error that was captured. Two failures compare
/// equal only when they are handles to the same captured error.
///
/// `Failure` converts from any [`std::error::Error`] that is `Send + Sync + 'static`, which makes
/// `?` work inside producers. It does not implement [`std::error::Error`] itself; use
/// [`as_error()`][Self::as_error] or convert it into `Box<dyn Error + Send + Sync>` when an error
/// trait object is needed.
///
/// A producer that signals failure by panicking should raise a `Failure` (or a
/// `Box<dyn Error + Send + Sync>`) with [`std::panic::panic_any`]; those are stored unchanged.
/// A panic carrying any other error type cannot be recovered as that type and is stored as a
/// [`Panicked`] instead.
///
/// # Examples
///
/// ```
/// use memoslot::Failure;
///
/// let failure = Failure::from_message("upstream timed out");
/// let replayed = failure.clone();
///
/// assert!(failure.ptr_eq(&replayed));
/// assert_eq!(failure.to_string(), "upstream timed out");
/// ```
#[derive(Clone)]
pub struct Failure(SharedError);

impl Failure {
    /// Captures the given error.
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Captures an error built from a message or an already boxed error.
    #[must_use]
    pub fn from_message(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(Arc::from(cause.into()))
    }

    /// Converts a caught panic payload into a failure.
    ///
    /// `Failure` and `Box<dyn Error + Send + Sync>` payloads (raised with
    /// [`std::panic::panic_any`]) are kept as-is. Any other payload becomes [`Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Self>() {
            Ok(failure) => return *failure,
            Err(payload) => payload,
        };

        match payload.downcast::<Box<dyn StdError + Send + Sync>>() {
            Ok(error) => Self(Arc::from(*error)),
            Err(payload) => Self::new(Panicked::from_payload(payload.as_ref())),
        }
    }

    /// Returns the captured error as a trait object.
    #[must_use]
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Returns the captured error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// Returns `true` if both handles refer to the same captured error.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> From<E> for Failure
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl From<Failure> for Box<dyn StdError + Send + Sync> {
    fn from(failure: Failure) -> Self {
        Box::new(SharedCause(failure.0))
    }
}

impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Failure {}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Failure").field(&self.0).finish()
    }
}

impl AsRef<dyn StdError + Send + Sync + 'static> for Failure {
    fn as_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.as_error()
    }
}

/// Exposes a shared error through `Box<dyn Error>` without cloning it.
struct SharedCause(SharedError);

impl fmt::Display for SharedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for SharedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl StdError for SharedCause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}
