#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

/// Defines a `Uuid` based identifier.
macro_rules! id_type {
    ($name: ident) => {
        #[derive(
            derive_more::Deref,
            derive_more::Display,
            Debug,
            Default,
            Clone,
            Copy,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
        )]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[must_use]
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            #[must_use]
            pub fn new_v4() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(uuid::Uuid::from_bytes(value.to_be_bytes()))
            }
        }
    };
}

pub(crate) use id_type;

mod catalog;
mod error;
mod exercise;
mod logbook;
mod progression;
mod schedule;
mod selection;
mod service;
mod skeleton;
mod title;
mod training;
mod user;
mod workout;

pub use catalog::*;
pub use error::*;
pub use exercise::*;
pub use logbook::*;
pub use progression::*;
pub use schedule::*;
pub use selection::*;
pub use service::*;
pub use skeleton::*;
pub use title::*;
pub use training::*;
pub use user::*;
pub use workout::*;
