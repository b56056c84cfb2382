// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes.
//!
//! Job ids double as file stems inside the job store, so every id accepted
//! from outside the process goes through [`is_safe_stem`] first.

/// Length of the random part of a generated id.
pub const ID_RANDOM_LEN: usize = 16;

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generate the random suffix used by [`define_id!`].
pub fn random_suffix() -> String {
    nanoid::nanoid!(ID_RANDOM_LEN, &ID_ALPHABET)
}

/// True if `s` can be used verbatim as a file stem: non-empty, at most 64
/// bytes, ASCII alphanumerics plus `-` and `_` only.
pub fn is_safe_stem(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Define a newtype ID wrapper around `SmolStr` with a type prefix.
///
/// Generates `new()` for random ID generation, `from_string()` for trusted
/// input, `parse()` for untrusted input (file names, CLI arguments),
/// `as_str()`, `suffix()`, `short()`, `Display`, `From<&str>`, `AsRef<str>`
/// and `Borrow<str>`.
///
/// The ID format is `{prefix}{random}` with a 16 character lowercase
/// alphanumeric random part.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId("job-");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random ID with the type prefix
            pub fn new() -> Self {
                Self(smol_str::SmolStr::new(format!(
                    "{}{}",
                    Self::PREFIX,
                    $crate::id::random_suffix()
                )))
            }

            /// Create ID from an existing trusted string
            pub fn from_string(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            /// Create ID from untrusted input, rejecting anything that is not
            /// a safe file stem.
            pub fn parse(id: &str) -> Option<Self> {
                $crate::id::is_safe_stem(id).then(|| Self::from_string(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the ID suffix (without prefix)
            pub fn suffix(&self) -> &str {
                self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
            }

            /// Returns the suffix truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                let suffix = self.suffix();
                let end = std::cmp::min(n, suffix.len());
                &suffix[..end]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
