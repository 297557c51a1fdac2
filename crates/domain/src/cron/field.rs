//! A single cron field: `*`, values, ranges, steps and comma lists.

use super::CronError;

/// Which of the five positions a field occupies; fixes its bounds and
/// the names it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

impl FieldKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day-of-month",
            Self::Month => "month",
            Self::DayOfWeek => "day-of-week",
        }
    }

    /// Inclusive bounds. Day-of-week allows 7 as an alias of Sunday.
    #[must_use]
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (0, 7),
        }
    }

    fn lookup_name(self, token: &str) -> Option<u32> {
        let names: &[&str] = match self {
            Self::Month => &MONTH_NAMES,
            Self::DayOfWeek => &WEEKDAY_NAMES,
            _ => return None,
        };
        let position = names.iter().position(|name| *name == token)?;
        let position = u32::try_from(position).ok()?;
        Some(if self == Self::Month {
            position + 1
        } else {
            position
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u32,
    end: u32,
    step: u32,
}

impl Span {
    fn contains(self, value: u32) -> bool {
        value >= self.start && value <= self.end && (value - self.start) % self.step == 0
    }
}

/// Parsed field. Only a bare `*` counts as a wildcard; `*/5` is a
/// restriction, which matters for the day-of-month / day-of-week rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronField {
    wildcard: bool,
    spans: Vec<Span>,
}

impl CronField {
    /// Parse one whitespace-free field.
    ///
    /// # Errors
    ///
    /// Returns [`CronError`] describing the first offending segment.
    pub fn parse(raw: &str, kind: FieldKind) -> Result<Self, CronError> {
        let raw = raw.trim().to_ascii_lowercase();
        if raw.is_empty() {
            return Err(CronError::EmptyField { field: kind.name() });
        }
        if raw == "*" {
            return Ok(Self {
                wildcard: true,
                spans: Vec::new(),
            });
        }

        let spans = raw
            .split(',')
            .map(|segment| parse_segment(segment.trim(), kind))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            wildcard: false,
            spans,
        })
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    #[must_use]
    pub fn matches(&self, value: u32) -> bool {
        if self.wildcard {
            return true;
        }
        self.spans.iter().any(|span| span.contains(value))
    }
}

fn parse_segment(segment: &str, kind: FieldKind) -> Result<Span, CronError> {
    if segment.is_empty() {
        return Err(CronError::EmptyField { field: kind.name() });
    }
    let (min, max) = kind.bounds();

    let (base, step) = match segment.split_once('/') {
        Some((base, step)) => (base.trim(), Some(parse_step(step.trim(), kind)?)),
        None => (segment, None),
    };

    if base == "*" {
        return Ok(Span {
            start: min,
            end: max,
            step: step.unwrap_or(1),
        });
    }

    if let Some((start, end)) = base.split_once('-') {
        let start = parse_value(start.trim(), kind)?;
        let end = parse_value(end.trim(), kind)?;
        if start > end {
            return Err(CronError::InvertedRange {
                field: kind.name(),
                start,
                end,
            });
        }
        return Ok(Span {
            start,
            end,
            step: step.unwrap_or(1),
        });
    }

    let start = parse_value(base, kind)?;
    Ok(match step {
        Some(step) => Span {
            start,
            end: max,
            step,
        },
        None => Span {
            start,
            end: start,
            step: 1,
        },
    })
}

fn parse_step(raw: &str, kind: FieldKind) -> Result<u32, CronError> {
    match raw.parse::<u32>() {
        Ok(step) if step > 0 => Ok(step),
        _ => Err(CronError::InvalidStep {
            field: kind.name(),
            step: raw.to_string(),
        }),
    }
}

fn parse_value(raw: &str, kind: FieldKind) -> Result<u32, CronError> {
    let value = match kind.lookup_name(raw) {
        Some(value) => value,
        None => raw.parse::<u32>().map_err(|_| CronError::InvalidValue {
            field: kind.name(),
            value: raw.to_string(),
        })?,
    };
    let (min, max) = kind.bounds();
    if value < min || value > max {
        return Err(CronError::OutOfRange {
            field: kind.name(),
            value,
            min,
            max,
        });
    }
    // Sunday is stored as 0 so that `7` behaves the same in ranges.
    if kind == FieldKind::DayOfWeek && value == 7 {
        return Ok(0);
    }
    Ok(value)
}
