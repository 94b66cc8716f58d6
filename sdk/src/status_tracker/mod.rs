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

//! Collection of the findings made while a container is resolved and checked.
//!
//! ```
//! use asic_container::{log_item, status_tracker::StatusTracker};
//!
//! let mut tracker = StatusTracker::default();
//! log_item!("mimetype", "mimetype is compressed", "example")
//!     .validation_status("container.mimetype.compressed")
//!     .warning(&mut tracker);
//!
//! assert!(tracker.has_status_for("mimetype", "container.mimetype.compressed"));
//! assert!(!tracker.has_any_error());
//! ```

#![deny(missing_docs)]

use std::{borrow::Cow, fmt::Debug, iter::Iterator};

use log::{info, warn};

/// A `StatusTracker` collects the findings produced while a container is
/// resolved and checked.
///
/// Findings never abort processing; they are aggregated and later turned into
/// verdicts.
#[derive(Clone, Debug, Default)]
pub struct StatusTracker {
    logged_items: Vec<LogItem>,
    current_uri: Vec<String>,
}

impl StatusTracker {
    /// Returns the current list of validation log items.
    pub fn logged_items(&self) -> &[LogItem] {
        &self.logged_items
    }

    /// Consumes the tracker and returns its log items.
    pub fn into_logged_items(self) -> Vec<LogItem> {
        self.logged_items
    }

    /// Appends the contents of another [`StatusTracker`] to this list of
    /// validation log items.
    pub fn append(&mut self, other: &StatusTracker) {
        for log_item in other.logged_items() {
            self.push(log_item.clone());
        }
    }

    /// Adds a non-error [`LogItem`] to this status tracker.
    ///
    /// Primarily intended for use by [`LogItem::success()`],
    /// [`LogItem::informational()`] or [`LogItem::warning()`].
    pub fn add_non_error(&mut self, log_item: LogItem) {
        match log_item.kind {
            LogKind::Warning => warn!("Validation warning: {log_item:#?}"),
            _ => info!("Validation info: {log_item:#?}"),
        }
        self.push(log_item);
    }

    /// Adds an error-case [`LogItem`] to this status tracker.
    ///
    /// Primarily intended for use by [`LogItem::failure()`]. The error value is
    /// handed back to the caller.
    pub fn add_error<E>(&mut self, log_item: LogItem, err: E) -> E {
        warn!("Validation failure: {log_item:#?}");
        self.push(log_item);
        err
    }

    fn push(&mut self, mut log_item: LogItem) {
        if log_item.label.is_empty() {
            if let Some(current_uri) = self.current_uri.last() {
                log_item.label = Cow::Owned(current_uri.to_string());
            }
        }
        self.logged_items.push(log_item);
    }

    /// Returns the [`LogItem`]s that have error conditions (`err_val` is
    /// populated).
    pub fn filter_errors(&self) -> impl Iterator<Item = &LogItem> {
        self.logged_items()
            .iter()
            .filter(|item| item.err_val.is_some())
    }

    /// Returns the [`LogItem`]s whose label matches `label`.
    pub fn items_for<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a LogItem> + 'a {
        self.logged_items()
            .iter()
            .filter(move |item| item.label == label)
    }

    /// Returns `true` if the validation log contains a specific status code.
    pub fn has_status(&self, val: &str) -> bool {
        self.logged_items().iter().any(|vi| {
            if let Some(vs) = &vi.validation_status {
                vs == val
            } else {
                false
            }
        })
    }

    /// Returns `true` if the validation log contains a specific status code
    /// for the item labelled `label`.
    pub fn has_status_for(&self, label: &str, val: &str) -> bool {
        self.items_for(label)
            .any(|vi| vi.validation_status.as_deref() == Some(val))
    }

    /// Returns `true` if the validation log contains a specific error.
    pub fn has_error<E: Debug>(&self, err: E) -> bool {
        let err_type = format!("{:?}", &err);
        self.logged_items().iter().any(|vi| {
            if let Some(e) = &vi.err_val {
                e == &err_type
            } else {
                false
            }
        })
    }

    /// Returns `true` if the validation log contains any error.
    pub fn has_any_error(&self) -> bool {
        self.filter_errors().next().is_some()
    }

    /// Keeps track of the entry currently being examined, if any.
    ///
    /// Log items created without a label are attributed to it.
    pub fn push_current_uri<S: Into<String>>(&mut self, uri: S) {
        self.current_uri.push(uri.into());
    }

    /// Removes the current URI, if any.
    pub fn pop_current_uri(&mut self) -> Option<String> {
        self.current_uri.pop()
    }

    /// Returns the current URI, if any.
    pub fn current_uri(&self) -> Option<&str> {
        self.current_uri.last().map(|s| s.as_str())
    }
}

mod log_item;
pub use log_item::{LogItem, LogKind};
