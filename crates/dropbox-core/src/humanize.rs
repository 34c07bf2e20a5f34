//! "Natural time" rendering of timestamps relative to a reference instant.
//!
//! Recent instants read as `now`, `N seconds ago`, `an hour ago`; anything a
//! day or more away is shown with up to two adjacent units, e.g.
//! `2 days, 3 hours ago` or `1 year, 2 months from now`. The short form keeps
//! the largest unit only.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Calendar-ish units used once the delta reaches one day, largest first.
const CHUNKS: [(i64, &str); 6] = [
  (YEAR, "year"),
  (MONTH, "month"),
  (WEEK, "week"),
  (DAY, "day"),
  (HOUR, "hour"),
  (MINUTE, "minute"),
];

/// Render `then` relative to `now`.
pub fn natural_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  render(then, now, 2)
}

/// Like [`natural_time`] with a single unit: `2 days ago`, not
/// `2 days, 3 hours ago`.
pub fn natural_time_short(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  render(then, now, 1)
}

fn render(then: DateTime<Utc>, now: DateTime<Utc>, max_units: usize) -> String {
  let delta = (now - then).num_seconds();
  let past = delta >= 0;
  let secs = delta.abs();
  let suffix = if past { "ago" } else { "from now" };

  if secs == 0 {
    return "now".to_string();
  }
  if secs < MINUTE {
    return match secs {
      1 => format!("a second {suffix}"),
      n => format!("{n} seconds {suffix}"),
    };
  }
  if secs < HOUR {
    return match secs / MINUTE {
      1 => format!("a minute {suffix}"),
      n => format!("{n} minutes {suffix}"),
    };
  }
  if secs < DAY {
    return match secs / HOUR {
      1 => format!("an hour {suffix}"),
      n => format!("{n} hours {suffix}"),
    };
  }

  format!("{} {suffix}", time_since(secs, max_units))
}

/// Up to `max_units` adjacent units: `3 weeks, 2 days` but never
/// `3 weeks, 4 hours`.
fn time_since(secs: i64, max_units: usize) -> String {
  let Some(first) = CHUNKS.iter().position(|(len, _)| secs >= *len) else {
    return plural(0, "minute");
  };

  let (len, name) = CHUNKS[first];
  let count = secs / len;
  let mut out = plural(count, name);

  if max_units < 2 {
    return out;
  }
  if let Some(&(next_len, next_name)) = CHUNKS.get(first + 1) {
    let next_count = (secs - count * len) / next_len;
    if next_count > 0 {
      out.push_str(", ");
      out.push_str(&plural(next_count, next_name));
    }
  }
  out
}

fn plural(n: i64, unit: &str) -> String {
  if n == 1 { format!("1 {unit}") } else { format!("{n} {unit}s") }
}
