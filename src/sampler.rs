//! Random timestamp sampling inside a [`DateRange`]

use crate::date_range::DateRange;
use chrono::{DateTime, Duration, FixedOffset};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

/// Canonical text form shared by the ledger, the commit message and `--date`
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A concrete, range-valid point in time picked for one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampledTimestamp(DateTime<FixedOffset>);

impl SampledTimestamp {
    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// Render as `YYYY-MM-DD HH:MM:SS ±HHMM`
    pub fn canonical(&self) -> String {
        self.0.format(CANONICAL_FORMAT).to_string()
    }
}

impl fmt::Display for SampledTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_FORMAT))
    }
}

impl FromStr for SampledTimestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_str(s, CANONICAL_FORMAT).map(Self)
    }
}

/// Draws commit timestamps: a uniform day offset plus a uniform time of day
///
/// Generic over the random source so tests can pin a seed.
pub struct TimestampSampler<R: Rng = StdRng> {
    rng: R,
}

impl TimestampSampler<StdRng> {
    /// Sampler seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sampler for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TimestampSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Sample one timestamp in `[range.start(), range.end()]`
    pub fn sample(&mut self, range: &DateRange) -> SampledTimestamp {
        let start = range.start();
        let end = range.end();

        let day_offset = self.rng.gen_range(0..=range.days().max(0));
        let hour = self.rng.gen_range(0..24);
        let minute = self.rng.gen_range(0..60);
        let second = self.rng.gen_range(0..60);

        let day = (start + Duration::days(day_offset)).date_naive();
        let composed = day
            .and_hms_opt(hour, minute, second)
            .and_then(|naive| naive.and_local_timezone(*start.offset()).single())
            .unwrap_or(start);

        let clamped = if composed < start {
            start
        } else if composed > end {
            end
        } else {
            composed
        };

        tracing::trace!(day_offset, %clamped, "Sampled timestamp");
        SampledTimestamp(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn utc_at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
    }

    #[test]
    fn test_degenerate_range_returns_start() {
        let instant = utc_at(2025, 1, 1, 13, 37, 0);
        let range = DateRange::new(instant, instant).unwrap();
        let mut sampler = TimestampSampler::from_entropy();

        for _ in 0..10_000 {
            assert_eq!(sampler.sample(&range).as_datetime(), instant);
        }
    }

    #[test]
    fn test_samples_stay_in_range() {
        let range =
            DateRange::new(utc_at(2024, 12, 15, 0, 0, 0), utc_at(2025, 1, 1, 9, 30, 0)).unwrap();
        let mut sampler = TimestampSampler::from_entropy();

        for _ in 0..10_000 {
            let t = sampler.sample(&range).as_datetime();
            assert!(range.contains(t), "{t} escaped the range");
        }
    }

    #[test]
    fn test_today_only_range_clamps_to_now() {
        // Start at midnight, end early in the morning: most draws land after `end`
        let range =
            DateRange::new(utc_at(2025, 1, 1, 0, 0, 0), utc_at(2025, 1, 1, 0, 5, 0)).unwrap();
        let mut sampler = TimestampSampler::seeded(7);

        let mut hit_end = false;
        for _ in 0..1_000 {
            let t = sampler.sample(&range).as_datetime();
            assert!(range.contains(t));
            hit_end |= t == range.end();
        }
        assert!(hit_end);
    }

    #[test]
    fn test_every_day_is_reachable() {
        let range =
            DateRange::new(utc_at(2025, 1, 1, 0, 0, 0), utc_at(2025, 1, 4, 23, 59, 59)).unwrap();
        let mut sampler = TimestampSampler::seeded(42);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            seen.insert(sampler.sample(&range).as_datetime().date_naive());
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_seeded_sampler_is_deterministic() {
        let range =
            DateRange::new(utc_at(2020, 1, 1, 0, 0, 0), utc_at(2025, 1, 1, 0, 0, 0)).unwrap();
        let mut a = TimestampSampler::seeded(1234);
        let mut b = TimestampSampler::seeded(1234);

        for _ in 0..100 {
            assert_eq!(a.sample(&range), b.sample(&range));
        }
    }

    #[test]
    fn test_consecutive_samples_differ() {
        let range =
            DateRange::new(utc_at(2020, 1, 1, 0, 0, 0), utc_at(2025, 1, 1, 0, 0, 0)).unwrap();
        let mut sampler = TimestampSampler::from_entropy();

        let first: Vec<_> = (0..5).map(|_| sampler.sample(&range)).collect();
        let second: Vec<_> = (0..5).map(|_| sampler.sample(&range)).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_canonical_format() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let t = offset.with_ymd_and_hms(2024, 12, 20, 7, 8, 9).unwrap();
        let range = DateRange::new(t, t).unwrap();
        let sampled = TimestampSampler::seeded(0).sample(&range);

        assert_eq!(sampled.canonical(), "2024-12-20 07:08:09 -0500");
        assert_eq!(sampled.to_string(), sampled.canonical());
    }

    #[test]
    fn test_canonical_text_parses_back() {
        let parsed: SampledTimestamp = "2024-12-20 23:59:01 +0130".parse().unwrap();
        let dt = parsed.as_datetime();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 1));
        assert_eq!(dt.offset().local_minus_utc(), 90 * 60);
        assert_eq!(parsed.canonical(), "2024-12-20 23:59:01 +0130");

        assert!("2024-12-20".parse::<SampledTimestamp>().is_err());
    }
}
