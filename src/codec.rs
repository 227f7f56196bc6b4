//! Text format of schedule and macro files.
//!
//! One target per line, `TIME;VALUE`, CRLF terminated:
//!
//! ```text
//! // sunrise
//! 08:00;0
//! 10:00;100
//! ```
//!
//! Schedules write `TIME` as `HH:MM`, macros as `MM:SS` of elapsed time. A
//! bare integer is read as seconds. Blank lines and lines starting with `//`
//! are ignored.

use crate::store::TargetStore;
use crate::types::{MAX_PERCENT, Target};
use core::fmt::Write;

/// How the time column of a file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeFormat {
    /// `HH:MM` time of day (daily schedules).
    Clock,

    /// `MM:SS` since activation (macros).
    Elapsed,
}

/// What was wrong with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// No `;` between time and value.
    MissingSeparator,
    InvalidTime,
    InvalidValue,
    /// More targets than the store can hold.
    TooManyTargets,
}

/// A parse failure, with the 1-based line number it occurred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let what = match self.kind {
            ParseErrorKind::MissingSeparator => "missing ';' separator",
            ParseErrorKind::InvalidTime => "invalid time",
            ParseErrorKind::InvalidValue => "invalid value",
            ParseErrorKind::TooManyTargets => "too many targets",
        };
        write!(f, "line {}: {}", self.line, what)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

fn split_pair(s: &str) -> Result<Option<(u32, u32)>, ParseErrorKind> {
    let Some((a, b)) = s.split_once(':') else {
        return Ok(None);
    };
    let a = a.trim().parse().map_err(|_| ParseErrorKind::InvalidTime)?;
    let b = b.trim().parse().map_err(|_| ParseErrorKind::InvalidTime)?;
    Ok(Some((a, b)))
}

fn clock_seconds(hours: u32, minutes: u32, seconds: u32) -> u32 {
    hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds)
}

fn parse_time_column(s: &str, format: TimeFormat) -> Result<u32, ParseErrorKind> {
    let seconds = match (split_pair(s)?, format) {
        (Some((hours, minutes)), TimeFormat::Clock) => clock_seconds(hours, minutes, 0),
        (Some((minutes, seconds)), TimeFormat::Elapsed) => clock_seconds(0, minutes, seconds),
        (None, _) => s.trim().parse().map_err(|_| ParseErrorKind::InvalidTime)?,
    };
    Ok(seconds)
}

/// Parses a time string as entered on the management interface.
///
/// `HH:MM` when the first field is below 24, otherwise `MM:SS`. A bare
/// integer is taken as seconds.
pub fn parse_time(s: &str) -> Option<u32> {
    match split_pair(s).ok()? {
        Some((first, second)) if first >= 24 => Some(clock_seconds(0, first, second)),
        Some((first, second)) => Some(clock_seconds(first, second, 0)),
        None => s.trim().parse().ok(),
    }
}

/// Parses one line. Returns `Ok(None)` for blank and comment lines.
///
/// Out-of-range times and values are clamped by [`Target::new`].
pub fn parse_line(line: &str, format: TimeFormat) -> Result<Option<Target>, ParseErrorKind> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return Ok(None);
    }

    let (time, value) = line
        .split_once(';')
        .ok_or(ParseErrorKind::MissingSeparator)?;
    let time = parse_time_column(time, format)?;
    let value: u32 = value
        .trim()
        .parse()
        .map_err(|_| ParseErrorKind::InvalidValue)?;

    Ok(Some(Target::new(time, value.min(MAX_PERCENT as u32) as u8)))
}

/// Parses a whole file into a store.
pub fn parse_targets<const N: usize>(
    text: &str,
    format: TimeFormat,
) -> Result<TargetStore<N>, ParseError> {
    let mut store = TargetStore::new();
    for (index, line) in text.lines().enumerate() {
        let error = |kind| ParseError {
            line: index + 1,
            kind,
        };
        if let Some(target) = parse_line(line, format).map_err(error)? {
            store
                .add_target(target)
                .map_err(|_| error(ParseErrorKind::TooManyTargets))?;
        }
    }
    Ok(store)
}

/// Writes targets in file format, one CRLF-terminated line each.
///
/// Clock times are written with minute resolution.
pub fn write_targets<W: Write>(
    out: &mut W,
    targets: &[Target],
    format: TimeFormat,
) -> core::fmt::Result {
    for target in targets {
        let (major, minor) = match format {
            TimeFormat::Clock => (target.time / 3600, (target.time % 3600) / 60),
            TimeFormat::Elapsed => (target.time / 60, target.time % 60),
        };
        write!(out, "{:02}:{:02};{}\r\n", major, minor, target.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_skips_comments_and_blanks() {
        assert_eq!(parse_line("", TimeFormat::Clock), Ok(None));
        assert_eq!(parse_line("   ", TimeFormat::Clock), Ok(None));
        assert_eq!(parse_line("// 08:00;10", TimeFormat::Clock), Ok(None));
    }

    #[test]
    fn parse_line_formats() {
        assert_eq!(
            parse_line(" 08:30;75 ", TimeFormat::Clock),
            Ok(Some(Target::new(30_600, 75)))
        );
        assert_eq!(
            parse_line("02:30;40", TimeFormat::Elapsed),
            Ok(Some(Target::new(150, 40)))
        );
        assert_eq!(
            parse_line("3600;5", TimeFormat::Clock),
            Ok(Some(Target::new(3600, 5)))
        );
    }

    #[test]
    fn parse_line_clamps() {
        assert_eq!(
            parse_line("25:00;250", TimeFormat::Clock),
            Ok(Some(Target::new(86_400, 100)))
        );
    }

    #[test]
    fn parse_line_errors() {
        assert_eq!(
            parse_line("08:00", TimeFormat::Clock),
            Err(ParseErrorKind::MissingSeparator)
        );
        assert_eq!(
            parse_line("aa:00;5", TimeFormat::Clock),
            Err(ParseErrorKind::InvalidTime)
        );
        assert_eq!(
            parse_line("08:00;-1", TimeFormat::Clock),
            Err(ParseErrorKind::InvalidValue)
        );
    }

    #[test]
    fn parse_time_disambiguates_minutes() {
        assert_eq!(parse_time("08:15"), Some(29_700));
        assert_eq!(parse_time("30:15"), Some(1_815));
        assert_eq!(parse_time("42"), Some(42));
        assert_eq!(parse_time("x"), None);
    }
}
