// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::{borrow::Cow, fmt::Debug};

use serde::Serialize;

use crate::status_tracker::StatusTracker;

/// Creates a [`LogItem`] struct that is annotated with the source file and line
/// number where the log condition was discovered.
///
/// Takes three parameters, each of which may be a `&'static str` or `String`:
///
/// * `label`: container entry this LogItem refers to (a signature, timestamp or
///   manifest filename, or an empty string for the container itself)
/// * `description`: human-readable reason for this `LogItem` to have been
///   generated
/// * `function`: name of the function generating this `LogItem`
///
/// ## Example
///
/// ```
/// # use std::borrow::Cow;
/// # use asic_container::{log_item, status_tracker::{LogKind, LogItem}};
/// let log = log_item!("META-INF/signatures001.xml", "manifest found", "test func");
///
/// assert_eq!(log.kind, LogKind::Informational);
/// assert_eq!(log.label, Cow::Borrowed("META-INF/signatures001.xml"));
/// assert!(log.line > 2);
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! log_item {
    ($label:expr, $description:expr, $function:expr) => {{
        $crate::status_tracker::LogItem {
            kind: $crate::status_tracker::LogKind::Informational,
            label: $label.into(),
            crate_name: env!("CARGO_PKG_NAME").into(),
            crate_version: env!("CARGO_PKG_VERSION").into(),
            file: file!().into(),
            function: $function.into(),
            line: line!(),
            description: $description.into(),
            ..Default::default()
        }
    }};
}

/// Creates a [`LogItem`] labelled later with the status tracker's current URI.
#[doc(hidden)]
#[macro_export]
macro_rules! log_current_item {
    ($description:expr, $function:expr) => {{
        $crate::status_tracker::LogItem {
            kind: $crate::status_tracker::LogKind::Informational,
            label: "".to_owned().into(),
            crate_name: env!("CARGO_PKG_NAME").into(),
            crate_version: env!("CARGO_PKG_VERSION").into(),
            file: file!().into(),
            function: $function.into(),
            line: line!(),
            description: $description.into(),
            ..Default::default()
        }
    }};
}

/// Detailed information about a finding made while examining a container.
///
/// Use the [`log_item`](crate::log_item) macro to create a `LogItem`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LogItem {
    /// Kind of log item.
    pub kind: LogKind,

    /// Container entry the item refers to, empty for the container itself
    pub label: Cow<'static, str>,

    /// Description of the finding
    pub description: Cow<'static, str>,

    /// Crate where the finding was made
    #[serde(skip)]
    pub crate_name: Cow<'static, str>,

    /// Version of the crate
    #[serde(skip)]
    pub crate_version: Cow<'static, str>,

    /// Source file where the finding was made
    #[serde(skip)]
    pub file: Cow<'static, str>,

    /// Function where the finding was made
    #[serde(skip)]
    pub function: Cow<'static, str>,

    /// Source line number where the finding was made
    #[serde(skip)]
    pub line: u32,

    /// Error code as string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err_val: Option<Cow<'static, str>>,

    /// Validation status code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_status: Option<Cow<'static, str>>,
}

impl Default for LogItem {
    fn default() -> Self {
        LogItem {
            kind: LogKind::Success,
            label: Cow::Borrowed(""),
            description: Cow::Borrowed(""),
            crate_name: env!("CARGO_PKG_NAME").into(),
            crate_version: env!("CARGO_PKG_VERSION").into(),
            file: Cow::Borrowed(""),
            function: Cow::Borrowed(""),
            line: 0,
            err_val: None,
            validation_status: None,
        }
    }
}

impl LogItem {
    /// Add a validation status code.
    ///
    /// ## Example
    ///
    /// ```
    /// # use std::borrow::Cow;
    /// # use asic_container::log_item;
    /// let log = log_item!("", "no mimetype", "test func")
    ///     .validation_status("container.mimetype.missing");
    ///
    /// assert_eq!(
    ///     log.validation_status,
    ///     Some(Cow::Borrowed("container.mimetype.missing"))
    /// );
    /// ```
    #[must_use]
    pub fn validation_status(self, status: &'static str) -> Self {
        LogItem {
            validation_status: Some(status.into()),
            ..self
        }
    }

    /// Set the log item kind to [`LogKind::Success`] and add it to the
    /// [`StatusTracker`].
    pub fn success(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Success;
        tracker.add_non_error(self);
    }

    /// Set the log item kind to [`LogKind::Informational`] and add it to the
    /// [`StatusTracker`].
    pub fn informational(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Informational;
        tracker.add_non_error(self);
    }

    /// Set the log item kind to [`LogKind::Warning`] and add it to the
    /// [`StatusTracker`].
    pub fn warning(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Warning;
        tracker.add_non_error(self);
    }

    /// Set the log item kind to [`LogKind::Failure`] and add it to the
    /// [`StatusTracker`].
    ///
    /// Processing always continues after a failure; the error value is
    /// returned so that it can be propagated from closures.
    pub fn failure<E: Debug>(mut self, tracker: &mut StatusTracker, err: E) -> E {
        self.kind = LogKind::Failure;
        self.err_val = Some(format!("{err:?}").into());
        tracker.add_error(self, err)
    }

    /// Set the log item kind to [`LogKind::Failure`] and add it to the
    /// [`StatusTracker`], discarding the error value.
    pub fn failure_no_throw<E: Debug>(self, tracker: &mut StatusTracker, err: E) {
        let _ = self.failure(tracker, err);
    }
}

/// Descriptive nature of this [`LogItem`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// This [`LogItem`] describes a success condition.
    Success,

    /// This [`LogItem`] describes an informational condition.
    Informational,

    /// This [`LogItem`] describes a condition worth attention that does not
    /// change the verdict.
    Warning,

    /// This [`LogItem`] describes a failure or error condition.
    Failure,
}
