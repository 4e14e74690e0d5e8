//! Scalar kinds and their shared capability metadata.
//!
//! Every operator check in the filter and mutation grammars routes through
//! `ScalarKind::metadata`, so adding a kind means adding one registry entry.

#[macro_use]
mod macros;

use derive_more::Display;
use serde::Serialize;

///
/// ScalarKind
///
/// Canonical semantic type of an entity field.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[remain::sorted]
pub enum ScalarKind {
    Bool,
    Enum,
    Float,
    Int,
    Json,
    Text,
    TextList,
    Timestamp,
}

impl ScalarKind {
    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        scalar_kind_registry!(metadata_from_registry, self)
    }

    #[must_use]
    pub const fn family(self) -> ScalarFamily {
        self.metadata().family
    }

    /// Return whether `equals` (and `not`) predicates apply.
    #[must_use]
    pub const fn supports_equality(self) -> bool {
        self.metadata().supports_equality
    }

    /// Return whether the kind can appear in an order-by or group-by list.
    #[must_use]
    pub const fn supports_sort(self) -> bool {
        self.metadata().supports_sort
    }

    /// Return whether `lt`/`lte`/`gt`/`gte` predicates and `_min`/`_max` apply.
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        self.metadata().supports_ordering
    }

    /// Return whether `in`/`notIn` list membership predicates apply.
    #[must_use]
    pub const fn supports_membership(self) -> bool {
        self.metadata().supports_membership
    }

    /// Return whether `contains`/`startsWith`/`endsWith` and `mode` apply.
    #[must_use]
    pub const fn supports_text_match(self) -> bool {
        self.metadata().supports_text_match
    }

    /// Return whether increment/decrement/multiply/divide update operators apply.
    #[must_use]
    pub const fn supports_arithmetic(self) -> bool {
        self.metadata().supports_arithmetic
    }

    /// Return whether `_avg`/`_sum` aggregates apply.
    #[must_use]
    pub const fn supports_average(self) -> bool {
        self.metadata().supports_average
    }

    /// Return whether `has`/`hasEvery`/`hasSome`/`isEmpty`/`push` apply.
    #[must_use]
    pub const fn supports_list_ops(self) -> bool {
        self.metadata().supports_list_ops
    }

    /// Return whether the kind can back a unique field or compound key member.
    #[must_use]
    pub const fn is_keyable(self) -> bool {
        self.metadata().is_keyable
    }
}

///
/// ScalarMetadata
///
/// Capability metadata shared across the model and validation layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScalarMetadata {
    pub family: ScalarFamily,
    pub supports_equality: bool,
    pub supports_sort: bool,
    pub supports_ordering: bool,
    pub supports_membership: bool,
    pub supports_text_match: bool,
    pub supports_arithmetic: bool,
    pub supports_average: bool,
    pub supports_list_ops: bool,
    pub is_keyable: bool,
}

///
/// ScalarFamily
///
/// Coarse routing family used when checking raw literals.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ScalarFamily {
    Bool,
    Enum,
    Json,
    List,
    Numeric,
    Temporal,
    Textual,
}

/// Ordered list of all scalar kinds in registry order.
pub const ALL_SCALAR_KINDS: [ScalarKind; 8] = scalar_kind_registry!(all_kinds_from_registry);

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_matches_enum_order() {
        let mut sorted = ALL_SCALAR_KINDS;
        sorted.sort();

        assert_eq!(sorted, ALL_SCALAR_KINDS);
    }

    #[test]
    fn ordering_implies_equality() {
        for kind in ALL_SCALAR_KINDS {
            if kind.supports_ordering() {
                assert!(kind.supports_equality(), "{kind} orders without equality");
            }
        }
    }

    #[test]
    fn ordering_implies_sort() {
        for kind in ALL_SCALAR_KINDS {
            if kind.supports_ordering() {
                assert!(kind.supports_sort(), "{kind} has range operators but cannot sort");
            }
        }
    }

    #[test]
    fn averaging_is_numeric_only() {
        for kind in ALL_SCALAR_KINDS {
            if kind.supports_average() {
                assert_eq!(kind.family(), ScalarFamily::Numeric);
                assert!(kind.supports_arithmetic());
            }
        }
    }

    #[test]
    fn json_and_lists_are_not_keyable() {
        assert!(!ScalarKind::Json.is_keyable());
        assert!(!ScalarKind::TextList.is_keyable());
        assert!(ScalarKind::Text.is_keyable());
    }

    #[test]
    fn only_text_supports_text_match() {
        let matching: Vec<_> = ALL_SCALAR_KINDS
            .into_iter()
            .filter(|kind| kind.supports_text_match())
            .collect();

        assert_eq!(matching, vec![ScalarKind::Text]);
    }
}
