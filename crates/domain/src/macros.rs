//! Macro for implementing Display and FromStr for layout enums
//!
//! Layout vocabulary (density, sidebar side, color scheme) travels as plain
//! strings between the analyzer, the collector and the UI. This macro keeps the
//! string form of each variant in one place and derives both directions.
//!
//! # Example
//!
//! ```rust
//! use wayfare_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Motion {
//!     Reduced,
//!     Full,
//! }
//!
//! impl_domain_status_conversions!(Motion {
//!     Reduced => "reduced",
//!     Full => "full",
//! });
//!
//! assert_eq!(Motion::Reduced.to_string(), "reduced");
//! assert_eq!("FULL".parse::<Motion>(), Ok(Motion::Full));
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// - Display writes the canonical lowercase form
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
