//! `define_port_error!`: declares a port error enum in one block.
//!
//! Each variant carries its `thiserror` message after `=>`. The macro also
//! emits a snake_case constructor per variant; struct-variant constructors take
//! `impl Into<T>` for every field so call sites can pass `&str` for `String`.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $error:ident {
            $(
                $(#[$meta:meta])*
                $case:ident $( { $($name:ident : $kind:ty),* $(,)? } )? => $display:expr
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $error {
            $(
                $(#[$meta])*
                #[error($display)]
                $case $( { $($name : $kind),* } )?,
            )*
        }

        impl $error {
            $( define_port_error!(@constructor $case $( { $($name : $kind),* } )?); )*
        }
    };

    (@constructor $case:ident) => {
        ::paste::paste! {
            #[doc = "Build the `" $case "` variant."]
            pub fn [<$case:snake>]() -> Self {
                Self::$case
            }
        }
    };

    (@constructor $case:ident { $($name:ident : $kind:ty),* }) => {
        ::paste::paste! {
            #[doc = "Build the `" $case "` variant."]
            pub fn [<$case:snake>]($($name: impl Into<$kind>),*) -> Self {
                Self::$case { $($name: $name.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Offline => "collection offline",
            Rejected { code: String } => "rejected: {code}",
            Throttled { retry_after_ms: u64 } => "throttled for {retry_after_ms}ms",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SamplePortError::offline(), SamplePortError::Offline);
        assert_eq!(SamplePortError::offline().to_string(), "collection offline");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SamplePortError::rejected("permission-denied");
        assert_eq!(err.to_string(), "rejected: permission-denied");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = SamplePortError::throttled(250_u64);
        assert_eq!(err.to_string(), "throttled for 250ms");
    }
}
