#[macro_export]
macro_rules! scalar_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Bool,
                Bool,
                supports_equality = true,
                supports_sort = true,
                supports_ordering = false,
                supports_membership = true,
                supports_text_match = false,
                supports_arithmetic = false,
                supports_average = false,
                supports_list_ops = false,
                is_keyable = false
            ),
            (
                Enum,
                Enum,
                supports_equality = true,
                supports_sort = true,
                supports_ordering = false,
                supports_membership = true,
                supports_text_match = false,
                supports_arithmetic = false,
                supports_average = false,
                supports_list_ops = false,
                is_keyable = true
            ),
            (
                Float,
                Numeric,
                supports_equality = true,
                supports_sort = true,
                supports_ordering = true,
                supports_membership = true,
                supports_text_match = false,
                supports_arithmetic = true,
                supports_average = true,
                supports_list_ops = false,
                is_keyable = false
            ),
            (
                Int,
                Numeric,
                supports_equality = true,
                supports_sort = true,
                supports_ordering = true,
                supports_membership = true,
                supports_text_match = false,
                supports_arithmetic = true,
                supports_average = true,
                supports_list_ops = false,
                is_keyable = true
            ),
            (
                Json,
                Json,
                supports_equality = true,
                supports_sort = false,
                supports_ordering = false,
                supports_membership = false,
                supports_text_match = false,
                supports_arithmetic = false,
                supports_average = false,
                supports_list_ops = false,
                is_keyable = false
            ),
            (
                Text,
                Textual,
                supports_equality = true,
                supports_sort = true,
                supports_ordering = true,
                supports_membership = true,
                supports_text_match = true,
                supports_arithmetic = false,
                supports_average = false,
                supports_list_ops = false,
                is_keyable = true
            ),
            (
                TextList,
                List,
                supports_equality = true,
                supports_sort = false,
                supports_ordering = false,
                supports_membership = false,
                supports_text_match = false,
                supports_arithmetic = false,
                supports_average = false,
                supports_list_ops = true,
                is_keyable = false
            ),
            (
                Timestamp,
                Temporal,
                supports_equality = true,
                supports_sort = true,
                supports_ordering = true,
                supports_membership = true,
                supports_text_match = false,
                supports_arithmetic = false,
                supports_average = false,
                supports_list_ops = false,
                is_keyable = true
            ),
        }
    };
}

#[macro_export]
macro_rules! scalar_kind_registry {
    ($macro:ident) => {
        $crate::scalar_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::scalar_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $( ($scalar:ident, $family:ident, supports_equality = $supports_equality:expr, supports_sort = $supports_sort:expr, supports_ordering = $supports_ordering:expr, supports_membership = $supports_membership:expr, supports_text_match = $supports_text_match:expr, supports_arithmetic = $supports_arithmetic:expr, supports_average = $supports_average:expr, supports_list_ops = $supports_list_ops:expr, is_keyable = $is_keyable:expr) ),* $(,)? ) => {
        match $kind {
            $(
                $crate::ScalarKind::$scalar => $crate::ScalarMetadata {
                    family: $crate::ScalarFamily::$family,
                    supports_equality: $supports_equality,
                    supports_sort: $supports_sort,
                    supports_ordering: $supports_ordering,
                    supports_membership: $supports_membership,
                    supports_text_match: $supports_text_match,
                    supports_arithmetic: $supports_arithmetic,
                    supports_average: $supports_average,
                    supports_list_ops: $supports_list_ops,
                    is_keyable: $is_keyable,
                },
            )*
        }
    };
}

macro_rules! all_kinds_from_registry {
    ( @entries $( ($scalar:ident, $family:ident, supports_equality = $supports_equality:expr, supports_sort = $supports_sort:expr, supports_ordering = $supports_ordering:expr, supports_membership = $supports_membership:expr, supports_text_match = $supports_text_match:expr, supports_arithmetic = $supports_arithmetic:expr, supports_average = $supports_average:expr, supports_list_ops = $supports_list_ops:expr, is_keyable = $is_keyable:expr) ),* $(,)? ) => {
        [ $( $crate::ScalarKind::$scalar ),* ]
    };
}
