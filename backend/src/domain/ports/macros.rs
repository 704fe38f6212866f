//! `define_port_error!`: declares a port's error enum in one block.
//!
//! Each variant is written as `Name { field: Type } => "message"`. The enum
//! derives `thiserror::Error`, and every variant gets a snake_case
//! constructor whose parameters take `impl Into<Type>`, so adapters can write
//! `SlotRegistryError::query(err.to_string())` or pass a `&str` directly.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $error:ident {
            $(
                $(#[$meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $error {
            $(
                $(#[$meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $error {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    // Unit variant: a zero-argument constructor.
    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant [] [] $( $field : $ty, )*);
    };

    // Fields are consumed one at a time, growing the parameter and
    // initialiser lists until none remain.
    (@fields $variant:ident [$($param:tt)*] [$($init:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields $variant
            [$($param)* $field: impl Into<$ty>,]
            [$($init)* $field: $field.into(),]
            $($rest)*
        );
    };

    (@fields $variant:ident [$($param:tt)*] [$($init:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($param)*) -> Self {
                Self::$variant { $($init)* }
            }
        }
    };
}

pub(crate) use define_port_error;
