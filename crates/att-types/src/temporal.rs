use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Ledger timestamp attached to every mutation of a key.
///
/// Mirrors the `{seconds, nanos}` pair a ledger peer stamps on a
/// transaction. Ordering is `seconds` then `nanos` (total order).
/// Deserialization goes through [`Timestamp::new`], so a decoded value
/// always has a valid `nanos`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTimestamp")]
pub struct Timestamp {
    /// Whole seconds since the UNIX epoch.
    pub seconds: i64,
    /// Sub-second component, always below one billion.
    pub nanos: u32,
}

#[derive(Deserialize)]
struct RawTimestamp {
    seconds: i64,
    nanos: u32,
}

impl TryFrom<RawTimestamp> for Timestamp {
    type Error = TypeError;

    fn try_from(raw: RawTimestamp) -> Result<Self, TypeError> {
        Self::new(raw.seconds, raw.nanos)
    }
}

impl Timestamp {
    const NANOS_PER_SECOND: u32 = 1_000_000_000;

    /// Create a timestamp with explicit values.
    ///
    /// Fails if `nanos` is not a valid sub-second component.
    pub fn new(seconds: i64, nanos: u32) -> Result<Self, TypeError> {
        if nanos >= Self::NANOS_PER_SECOND {
            return Err(TypeError::TimestampOutOfRange { seconds, nanos });
        }
        Ok(Self { seconds, nanos })
    }

    /// Timestamp for the current wall-clock time.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: elapsed.as_secs() as i64,
            nanos: elapsed.subsec_nanos(),
        }
    }

    /// The UNIX epoch.
    pub const fn zero() -> Self {
        Self {
            seconds: 0,
            nanos: 0,
        }
    }

    /// The smallest timestamp strictly after `self`.
    pub fn successor(&self) -> Self {
        if self.nanos.saturating_add(1) >= Self::NANOS_PER_SECOND {
            Self {
                seconds: self.seconds.saturating_add(1),
                nanos: 0,
            }
        } else {
            Self {
                seconds: self.seconds,
                nanos: self.nanos + 1,
            }
        }
    }

    /// Wall-clock now, bumped past `previous` if the clock has not moved.
    pub fn now_after(previous: Option<&Self>) -> Self {
        let now = Self::now();
        match previous {
            Some(prev) if now <= *prev => prev.successor(),
            _ => now,
        }
    }

    /// Convert to a UTC date-time, if representable.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}.{:09})", self.seconds, self.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => write!(f, "{}.{:09}s", self.seconds, self.nanos),
        }
    }
}
