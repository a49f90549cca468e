// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{Failure, Producer};

/// Either a produced value or the failure captured while producing it.
///
/// A slot always holds exactly one of the two. Reading a failed slot through [`get()`][Self::get]
/// returns the captured [`Failure`] every time it is called, so every reader of a cached failure
/// observes the same error.
///
/// # Examples
///
/// ```
/// use memoslot::{Either, Failure, ProduceFn};
///
/// let mut either = Either::Value(1);
/// assert_eq!(either.get().ok(), Some(&1));
///
/// either.set_producer(&ProduceFn(|| Err::<i32, _>(Failure::from_message("offline"))));
/// assert_eq!(either.get().map_err(|failure| failure.to_string()), Err("offline".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Either<T> {
    /// A successfully produced value.
    Value(T),
    /// A failure captured in place of a value.
    Failure(Failure),
}

impl<T> Either<T> {
    /// Returns the value, or a handle to the captured failure.
    ///
    /// # Errors
    ///
    /// Returns the captured failure if the slot holds one. The failure is returned again on every
    /// call.
    pub fn get(&self) -> Result<&T, Failure> {
        self.as_result().map_err(Failure::clone)
    }

    /// Borrows the content as a `Result` without cloning the failure.
    ///
    /// # Errors
    ///
    /// Returns the captured failure if the slot holds one.
    pub fn as_result(&self) -> Result<&T, &Failure> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }

    /// Converts the content into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the captured failure if the slot holds one.
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }

    /// Returns `true` if the slot holds a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Replaces the content unconditionally.
    pub fn set(&mut self, content: impl Into<Self>) {
        *self = content.into();
    }

    /// Replaces the content with the outcome of calling `producer`.
    ///
    /// Never panics on behalf of the producer: an `Err` it returns and a panic it raises are both
    /// stored as a failure. To store an absence value, pass `None` as the producer.
    pub fn set_producer<P>(&mut self, producer: &P)
    where
        P: Producer<T> + ?Sized,
    {
        *self = match catch_unwind(AssertUnwindSafe(|| producer.produce())) {
            Ok(outcome) => outcome.into(),
            Err(payload) => Self::Failure(Failure::from_panic(payload)),
        };
    }
}

impl<T: Default> Default for Either<T> {
    fn default() -> Self {
        Self::Value(T::default())
    }
}

impl<T, E: Into<Failure>> From<Result<T, E>> for Either<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(error) => Self::Failure(error.into()),
        }
    }
}

impl<T> From<Failure> for Either<T> {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

/// Replays the content: clones the value, or returns the same failure.
impl<T: Clone> Producer<T> for Either<T> {
    fn produce(&self) -> Result<T, Failure> {
        self.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::panic::panic_any;

    use super::*;
    use crate::{Panicked, ProduceFn, Void};

    fn values() -> Vec<Either<Option<String>>> {
        vec![
            Either::Value(None),
            Either::Value(Some("val".to_string())),
            Either::Failure(Failure::from_message("some error")),
        ]
    }

    #[test]
    fn default_holds_default_value() {
        assert_eq!(Either::<u32>::default(), Either::Value(0));
        assert_eq!(Either::<u32>::default().get().ok(), Some(&0));
    }

    #[test]
    fn get_is_repeatable() {
        for either in values() {
            assert_eq!(either.get(), either.get());
        }
    }

    #[test]
    fn get_replays_the_same_failure() {
        let failure = Failure::from_message("some error");
        let either = Either::<u8>::Failure(failure.clone());

        for _ in 0..3 {
            let replayed = either.get().expect_err("a failure is stored");
            assert!(replayed.ptr_eq(&failure));
        }
    }

    #[test]
    fn as_result_splits_value_and_failure() {
        let failure = Failure::from_message("some error");
        assert_eq!(Either::Value(10).as_result(), Ok(&10));
        assert_eq!(Either::<i32>::Failure(failure.clone()).as_result(), Err(&failure));
    }

    #[test]
    fn into_result_moves_content_out() {
        assert_eq!(Either::Value("owned".to_string()).into_result().ok().as_deref(), Some("owned"));
        assert!(Either::<u8>::Failure(Failure::from_message("gone")).into_result().is_err());
    }

    #[test]
    fn set_replaces_content() {
        for content in values() {
            let mut either = Either::Value(Some("previous".to_string()));
            either.set(content.clone());
            assert_eq!(either, content);
        }
    }

    #[test]
    fn set_accepts_results() {
        let mut either = Either::Value(1_u8);
        either.set(Err::<u8, _>(std::fmt::Error));
        assert!(either.is_failure());

        either.set(Ok::<u8, Failure>(2));
        assert_eq!(either, Either::Value(2));
    }

    #[test]
    fn set_producer_replays_either() {
        for content in values() {
            let mut either = Either::default();
            either.set_producer(&content);
            assert_eq!(either, content);
        }
    }

    #[test]
    fn set_producer_with_absent_producer_stores_default() {
        let mut either = Either::Value(Some("stale".to_string()));
        either.set_producer(&None::<Void>);
        assert_eq!(either, Either::Value(None));
    }

    #[test]
    fn set_producer_captures_returned_failure() {
        let failure = Failure::from_message("returned");
        let producer = ProduceFn(|| Err::<u8, _>(failure.clone()));

        let mut either = Either::Value(5);
        either.set_producer(&producer);
        assert!(either.get().expect_err("failure is stored").ptr_eq(&failure));
    }

    #[test]
    fn set_producer_captures_raised_failure() {
        let failure = Failure::from_message("raised");
        let producer = ProduceFn(|| -> Result<u8, Failure> { panic_any(failure.clone()) });

        let mut either = Either::Value(5);
        either.set_producer(&producer);

        // Raising and returning the same failure are indistinguishable.
        assert!(either.get().expect_err("failure is stored").ptr_eq(&failure));
        assert!(either.get().expect_err("failure is stored again").ptr_eq(&failure));
    }

    #[test]
    fn set_producer_captures_raised_boxed_error() {
        let producer = ProduceFn(|| -> Result<u8, Failure> {
            let error: Box<dyn std::error::Error + Send + Sync> = Box::new(io::Error::other("disk gone"));
            panic_any(error)
        });

        let mut either = Either::Value(5);
        either.set_producer(&producer);

        let failure = either.get().expect_err("the raised error is stored");
        assert_eq!(failure.to_string(), "disk gone");
        assert_eq!(failure.downcast_ref::<io::Error>().map(io::Error::kind), Some(io::ErrorKind::Other));
    }

    #[test]
    fn set_producer_captures_plain_panic() {
        let producer = ProduceFn(|| -> Result<u8, Failure> { panic!("producer exploded") });

        let mut either = Either::Value(5);
        either.set_producer(&producer);

        let failure = either.get().expect_err("the panic is stored");
        let panicked = failure.downcast_ref::<Panicked>().expect("plain panics become `Panicked`");
        assert_eq!(panicked.detail(), "producer exploded");
    }
}
