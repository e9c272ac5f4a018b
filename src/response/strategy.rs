// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered decoding strategies.

use crate::response::XmlElement;

/// One way of reading a list of records out of a response field.
///
/// A strategy either produces at least one record or reports no match with
/// `None`; it never fails.
pub trait DecodeStrategy<T> {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Decodes the field, or returns `None` if this encoding is not present.
    fn decode(&self, field: &XmlElement) -> Option<Vec<T>>;
}

/// Runs strategies in order and returns the first match.
///
/// An absent field, or one no strategy understands, yields an empty list.
pub fn decode_first<T>(
    field: Option<&XmlElement>,
    strategies: &[&dyn DecodeStrategy<T>],
) -> Vec<T> {
    let Some(field) = field else {
        tracing::debug!("Field absent from response, decoding as empty");
        return Vec::new();
    };

    for strategy in strategies {
        if let Some(records) = strategy.decode(field) {
            tracing::trace!(
                field = field.name(),
                strategy = strategy.name(),
                count = records.len(),
                "Decoded field"
            );
            return records;
        }
    }

    tracing::debug!(field = field.name(), "No decoding strategy matched, decoding as empty");
    Vec::new()
}
