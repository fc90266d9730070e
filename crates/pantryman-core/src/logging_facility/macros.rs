//! Operation boundary macros
//!
//! Every operation logs one `start` event and exactly one of `end` or
//! `end_error`. Recoverable problems log a `degraded` warning instead of
//! failing. All four share the same envelope:
//!
//! | field       | value                                   |
//! |-------------|-----------------------------------------|
//! | `component` | module path of the call site            |
//! | `op`        | operation name, e.g. `migrate_dataset`  |
//! | `event`     | `start`, `end`, `end_error`, `degraded` |
//!
//! Extra `key = value` fields are passed straight through to `tracing`, so
//! `%` and `?` sigils work as usual. Call sites need `tracing` as a
//! dependency.

#[doc(hidden)]
#[macro_export]
macro_rules! __pantry_event {
    ($level:expr, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::event!(
            $level,
            component = module_path!(),
            op = $op,
            event = $event
            $(, $($field)*)?
        )
    };
}

/// `start` boundary.
///
/// ```
/// # use pantryman_core::log_op_start;
/// let candidate = std::path::Path::new("/media/usb/pantry");
/// log_op_start!("switch_select", candidate = %candidate.display());
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {{
        $crate::__pantry_event!(
            tracing::Level::INFO,
            $op,
            $crate::schema::EVENT_START
            $(, $($field)*)?
        );
    }};
}

/// `end` boundary; `duration_ms` is mandatory.
///
/// ```
/// # use pantryman_core::log_op_end;
/// let started = std::time::Instant::now();
/// log_op_end!(
///     "migrate_dataset",
///     duration_ms = started.elapsed().as_millis() as u64,
///     files_copied = 12
/// );
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        $crate::__pantry_event!(
            tracing::Level::INFO,
            $op,
            $crate::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        );
    }};
}

/// `end_error` boundary. `$err` is anything that converts into `ExError`;
/// its kind, code and message become fields.
///
/// ```
/// # use pantryman_core::log_op_error;
/// # use pantryman_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::SwitchInFlight).with_op("switch_select");
/// log_op_error!("switch_select", err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__pantry_event!(
            tracing::Level::ERROR,
            $op,
            $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message()
            $(, $($field)*)?
        );
    }};
}

/// `degraded` warning: a fallback was taken or one file was skipped.
///
/// ```
/// # use pantryman_core::log_degraded;
/// # use pantryman_core::errors::ExErrorKind;
/// log_degraded!(
///     "migrate_dataset",
///     ExErrorKind::PerFileCopyFailure.code(),
///     file = "saffron.yaml"
/// );
/// ```
#[macro_export]
macro_rules! log_degraded {
    ($op:expr, $code:expr $(, $($field:tt)*)?) => {{
        $crate::__pantry_event!(
            tracing::Level::WARN,
            $op,
            $crate::schema::EVENT_DEGRADED,
            err_code = $code
            $(, $($field)*)?
        );
    }};
}
