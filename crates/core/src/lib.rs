#![forbid(unsafe_code)]

pub mod config;
pub mod tags;

pub use config::{ConfigError, TagConfig};
pub use tags::*;

pub mod ids {
    use serde::{Deserialize, Serialize};

    /// Stable identity of a tag, assigned by the backing store.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TagId(i64);

    impl TagId {
        pub fn new(value: i64) -> Self {
            Self(value)
        }

        pub fn get(self) -> i64 {
            self.0
        }
    }

    impl std::fmt::Display for TagId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
}

pub mod time {
    use ::time::OffsetDateTime;

    /// Current UTC time in epoch milliseconds. Stamps `created_at_ms` and
    /// `at_ms` when a request is built with `now`.
    pub fn now_ms() -> i64 {
        let ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        i64::try_from(ms.max(0)).unwrap_or(i64::MAX)
    }

    #[cfg(test)]
    mod tests {
        #[test]
        fn now_ms_is_past_the_epoch_and_non_decreasing() {
            let first = super::now_ms();
            let second = super::now_ms();
            assert!(first > 1_600_000_000_000);
            assert!(second >= first);
        }
    }
}
