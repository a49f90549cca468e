// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured log events for slot activity.
//!
//! Events are emitted through `tracing` when the `logs` feature is enabled. Without it, recording
//! compiles down to nothing.

use std::time::Duration;

use crate::Failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Activity {
    /// The snapshot was fresh; no lock upgrade happened.
    Fresh,
    /// Another writer refreshed the slot while this caller waited for the write lock.
    RecheckFresh,
    Refreshed,
    RefreshFailed,
    Replaced,
    Reset,
}

impl Activity {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(dead_code, reason = "activity names are only read when logs are emitted")
    )]
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "memoslot.fresh",
            Self::RecheckFresh => "memoslot.recheck_fresh",
            Self::Refreshed => "memoslot.refreshed",
            Self::RefreshFailed => "memoslot.refresh_failed",
            Self::Replaced => "memoslot.replaced",
            Self::Reset => "memoslot.reset",
        }
    }
}

#[inline]
pub(crate) fn record(name: &'static str, activity: Activity, duration: Option<Duration>, failure: Option<&Failure>) {
    #[cfg(any(feature = "logs", test))]
    emit(name, activity, duration, failure);

    #[cfg(not(any(feature = "logs", test)))]
    let _ = (name, activity, duration, failure);
}

#[cfg(any(feature = "logs", test))]
fn emit(name: &'static str, activity: Activity, duration: Option<Duration>, failure: Option<&Failure>) {
    let activity_name = activity.as_str();
    let duration_ns = duration.map(|d| d.as_nanos());
    let failure = failure.map(ToString::to_string);

    // Field names are asserted by the field_names_are_stable test.
    macro_rules! emit_event {
        ($level:ident) => {
            tracing::$level!(
                memoslot.name = name,
                memoslot.activity = activity_name,
                memoslot.duration_ns = ?duration_ns,
                memoslot.failure = ?failure,
                "memoslot.event"
            )
        };
    }

    match activity {
        Activity::Fresh => emit_event!(trace),
        Activity::RecheckFresh | Activity::Refreshed | Activity::Replaced | Activity::Reset => emit_event!(debug),
        Activity::RefreshFailed => emit_event!(warn),
    }
}
