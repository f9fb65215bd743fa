//! Priority buckets for path expressions.
//!
//! Every branch lands in a bucket keyed by a signed integer:
//!
//! - `+N`: the expression has exactly `N` literal segments and every
//!   placeholder is a plain `<name>` or `<>`, confined to one segment.
//! - `-N`: the expression has `N` literal segments and at least one typed
//!   placeholder (`<name:subexpr>`), so `N` is only a minimum. Any
//!   sub-expression counts, even one that never matches `/`.
//!
//! [`BucketKey`]'s `Ord` is the lookup order. For keys
//! `[-2, -1, -3, 5, 4, 1, -4, 3, 2, -5]` it yields
//! `[5, 4, 3, 2, 1, -5, -4, -3, -2, -1]`: exact lengths first (longest first),
//! then wildcards with the largest guaranteed length first.

use crate::pattern::{tokenize, Token};
use std::cmp::Ordering;

/// `true` if `token` may match across a segment boundary.
fn is_patterned(token: &Token<'_>) -> bool {
    matches!(token, Token::Placeholder { subexpr: Some(_), .. })
}

/// Signed bucket key of a path expression. See the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey(i32);

impl BucketKey {
    /// Compute the key of `expression`.
    ///
    /// The literal segment count is the number of `/` outside placeholders,
    /// after trimming one trailing slash and adding a missing leading one.
    ///
    /// ```
    /// use neuro_router::specificity::BucketKey;
    ///
    /// assert_eq!(BucketKey::of("/messages/<id>").get(), 2);
    /// assert_eq!(BucketKey::of("/files/<path:.+>").get(), -2);
    /// assert_eq!(BucketKey::of("promo").get(), 1);
    /// ```
    pub fn of(expression: &str) -> Self {
        let trimmed = expression.strip_suffix('/').unwrap_or(expression);
        let mut segments = i32::from(!trimmed.starts_with('/'));
        let mut spanning = false;

        for token in tokenize(trimmed) {
            match token {
                Token::Literal(text) => {
                    let slashes = text.matches('/').count();
                    segments += i32::try_from(slashes).unwrap_or(i32::MAX);
                }
                Token::Placeholder { .. } => spanning |= is_patterned(&token),
            }
        }

        if spanning {
            Self(-segments)
        } else {
            Self(segments)
        }
    }

    /// Raw signed value.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// `true` if this bucket holds wildcard-spanning expressions.
    pub const fn is_wildcard(self) -> bool {
        self.0 < 0
    }

    /// `true` if branches in this bucket can match a path of `segments` segments.
    pub fn accepts(self, segments: usize) -> bool {
        let segments = i64::try_from(segments).unwrap_or(i64::MAX);
        let key = i64::from(self.0);
        key == segments || (key < 0 && key >= -segments)
    }
}

impl From<i32> for BucketKey {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Ord for BucketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 < 0 && other.0 < 0 {
            self.0.cmp(&other.0)
        } else {
            other.0.cmp(&self.0)
        }
    }
}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// Tests
// ============================================================================
