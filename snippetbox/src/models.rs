//! Snippet resource model

use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of snippets returned by [`SnippetStore::latest`](crate::store::SnippetStore::latest)
pub const LATEST_LIMIT: usize = 10;

/// Longest lifetime a snippet can be given, in days (about 100 years)
pub const MAX_EXPIRY_DAYS: u32 = 36_500;

/// A titled piece of text that stops being served once `expires` has passed
///
/// Snippets are created once and never mutated. Expiry is applied when
/// reading; expired rows stay in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(any(feature = "postgres", feature = "sqlite"), derive(sqlx::FromRow))]
pub struct Snippet {
    /// Storage-assigned identifier (always >= 1)
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Creation time (UTC)
    pub created: DateTime<Utc>,
    /// Expiry time (UTC); the snippet is live strictly before this instant
    pub expires: DateTime<Utc>,
}

impl Snippet {
    /// Whether the snippet is still live at `now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {}", self.id, self.title)?;
        writeln!(f)?;
        writeln!(f, "{}", self.content)?;
        writeln!(f)?;
        writeln!(f, "Created: {}", self.created.format("%Y-%m-%d %H:%M:%S UTC"))?;
        write!(f, "Expires: {}", self.expires.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

/// Current UTC time at the precision every backend can store (microseconds)
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Creation and expiry timestamps for a snippet inserted at `now`
///
/// `None` unless `expiry_days` is within `1..=MAX_EXPIRY_DAYS` and the
/// expiry is representable.
pub fn lifetime(now: DateTime<Utc>, expiry_days: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=MAX_EXPIRY_DAYS).contains(&expiry_days) {
        return None;
    }
    let expires = now.checked_add_signed(Duration::days(i64::from(expiry_days)))?;
    Some((now, expires))
}
