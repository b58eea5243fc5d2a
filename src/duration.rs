//! ISO 8601 durations as they appear in `prepTime`, `cookTime` and `totalTime`.
//!
//! Only the subset recipe sites actually emit is understood: `PT1H30M`,
//! `PT45M`, `PT2H`, plus the occasional days (`P1DT2H`) or seconds
//! (`PT5400S`, `PT5400.0S`). Days fold into hours, seconds fold into whole
//! minutes, and minutes carry into hours.

use std::str::FromStr;

use crate::error::PublishError;

/// A cooking time with minute resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    total_minutes: u32,
}

impl Duration {
    pub const ZERO: Duration = Duration { total_minutes: 0 };

    pub fn new(hours: u32, minutes: u32) -> Self {
        Duration {
            total_minutes: hours.saturating_mul(60).saturating_add(minutes),
        }
    }

    pub fn from_minutes(total_minutes: u32) -> Self {
        Duration { total_minutes }
    }

    pub fn hours(&self) -> u32 {
        self.total_minutes / 60
    }

    /// Minute component, always below 60
    pub fn minutes(&self) -> u32 {
        self.total_minutes % 60
    }

    pub fn total_minutes(&self) -> u32 {
        self.total_minutes
    }

    pub fn is_zero(&self) -> bool {
        self.total_minutes == 0
    }

    /// Render as a Dutch phrase: `"1 uur, 30 minuten"`, `"1 minuut"`, `"2 uur"`.
    ///
    /// A zero duration renders as the empty string.
    pub fn to_readable(&self) -> String {
        let mut parts = Vec::with_capacity(2);

        if self.hours() > 0 {
            parts.push(format!("{} uur", self.hours()));
        }

        let minutes = self.minutes();
        if minutes > 0 {
            let unit = if minutes == 1 { "minuut" } else { "minuten" };
            parts.push(format!("{minutes} {unit}"));
        }

        parts.join(", ")
    }
}

/// Parse an ISO 8601 duration expression.
///
/// Empty or whitespace-only input yields [`Duration::ZERO`]. Anything that is
/// not a well-formed duration is a [`PublishError::Format`]; callers decide
/// whether that is fatal.
pub fn parse(text: &str) -> Result<Duration, PublishError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Duration::ZERO);
    }

    let malformed = |reason: String| PublishError::format("duration", text, reason);

    let upper = text.to_ascii_uppercase();
    let rest = upper
        .strip_prefix('P')
        .ok_or_else(|| malformed("missing 'P' designator".to_string()))?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total: u64 = 0;
    let mut components = 0;

    if !date_part.is_empty() {
        let days = date_part
            .strip_suffix('D')
            .ok_or_else(|| malformed("only days may precede 'T'".to_string()))?;
        let days = whole_number(days).ok_or_else(|| malformed(format!("invalid days '{days}'")))?;
        total = total.saturating_add(days.saturating_mul(24 * 60));
        components += 1;
    }

    if let Some(time) = time_part {
        let mut last_rank = 0;
        let mut number = String::new();

        for c in time.chars() {
            match c {
                '0'..='9' | '.' => number.push(c),
                'H' | 'M' | 'S' => {
                    let rank = match c {
                        'H' => 1,
                        'M' => 2,
                        _ => 3,
                    };
                    if rank <= last_rank {
                        return Err(malformed(format!("designator '{c}' out of order")));
                    }
                    last_rank = rank;

                    let minutes = match c {
                        'H' => whole_number(&number).map(|h| h.saturating_mul(60)),
                        'M' => whole_number(&number),
                        _ => seconds_as_minutes(&number),
                    }
                    .ok_or_else(|| malformed(format!("invalid number '{number}' before '{c}'")))?;

                    total = total.saturating_add(minutes);
                    components += 1;
                    number.clear();
                }
                _ => return Err(malformed(format!("unexpected character '{c}'"))),
            }
        }

        if !number.is_empty() {
            return Err(malformed(format!("number '{number}' has no designator")));
        }
        if last_rank == 0 {
            return Err(malformed("empty time part".to_string()));
        }
    }

    if components == 0 {
        return Err(malformed("no duration components".to_string()));
    }

    let total_minutes =
        u32::try_from(total).map_err(|_| malformed("duration too large".to_string()))?;

    Ok(Duration { total_minutes })
}

impl FromStr for Duration {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn whole_number(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn seconds_as_minutes(number: &str) -> Option<u64> {
    if number.is_empty() || number.starts_with('.') || number.ends_with('.') {
        return None;
    }
    let seconds: f64 = number.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds / 60.0).floor() as u64)
}
