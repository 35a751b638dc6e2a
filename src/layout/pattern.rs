// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Write;

use colored::Color;
use colored::ColoredString;
use colored::Colorize;
use jiff::Timestamp;
use jiff::Zoned;
use jiff::civil::Weekday;
use jiff::tz::TimeZone;

use crate::Level;
use crate::Record;

/// Widest padding a flag accepts; wider specs are clamped.
pub const MAX_PADDING: usize = 64;

const WEEKDAYS: [(&str, &str); 7] = [
    ("Mon", "Monday"),
    ("Tue", "Tuesday"),
    ("Wed", "Wednesday"),
    ("Thu", "Thursday"),
    ("Fri", "Friday"),
    ("Sat", "Saturday"),
    ("Sun", "Sunday"),
];

const MONTHS: [(&str, &str); 12] = [
    ("Jan", "January"),
    ("Feb", "February"),
    ("Mar", "March"),
    ("Apr", "April"),
    ("May", "May"),
    ("Jun", "June"),
    ("Jul", "July"),
    ("Aug", "August"),
    ("Sep", "September"),
    ("Oct", "October"),
    ("Nov", "November"),
    ("Dec", "December"),
];

/// A layout that formats log records according to a `%`-flag pattern.
///
/// The pattern is compiled once; formatting walks the compiled items.
///
/// | flag | output |
/// |------|--------|
/// | `%v` | the message |
/// | `%n` | the logger name |
/// | `%l` / `%L` | the level name / its first letter |
/// | `%t` / `%P` | thread id / process id |
/// | `%Y %C %m %d` | year, two-digit year, month, day |
/// | `%H %I %M %S %p` | hour, 12-hour, minute, second, AM/PM |
/// | `%e %f %F` | milli-, micro-, nanoseconds of the second |
/// | `%a %A %b %B` | weekday and month names, short and full |
/// | `%D %x %T %X %R %r %c` | date and time composites |
/// | `%z %E` | UTC offset, seconds since epoch |
/// | `%@ %s %g %#` | `file:line`, file name, file path, line |
/// | `%^ %$` | start and end of the level-colored range |
/// | `%%` | a literal `%` |
///
/// A flag may be padded as `%8l` (align right), `%-8l` (align left) or `%=8l` (center); a
/// trailing `!` in the padding spec, as in `%3!l`, truncates longer values to the width.
/// Widths above [`MAX_PADDING`] are clamped to it.
/// Unknown flags are written out unchanged.
///
/// # Examples
///
/// ```
/// use logconf::layout::PatternLayout;
///
/// let layout = PatternLayout::new("[%n] [%l] %v");
/// assert_eq!(layout.pattern(), "[%n] [%l] %v");
/// ```
#[derive(Debug, Clone)]
pub struct PatternLayout {
    pattern: String,
    items: Vec<Item>,
    needs_time: bool,
    timezone: TimeZone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Literal(String),
    Flag(Flag, Option<Padding>),
    ColorStart,
    ColorEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Payload,
    LoggerName,
    Level,
    ShortLevel,
    ThreadId,
    ProcessId,
    Year,
    ShortYear,
    Month,
    Day,
    Hour,
    Hour12,
    Minute,
    Second,
    Millis,
    Micros,
    Nanos,
    AmPm,
    Offset,
    Epoch,
    WeekdayShort,
    WeekdayFull,
    MonthShort,
    MonthFull,
    ShortDate,
    Time,
    HourMinute,
    Clock12,
    DateTime,
    Location,
    ShortFilename,
    Filename,
    Line,
}

impl Flag {
    fn from_char(c: char) -> Option<Flag> {
        let flag = match c {
            'v' => Flag::Payload,
            'n' => Flag::LoggerName,
            'l' => Flag::Level,
            'L' => Flag::ShortLevel,
            't' => Flag::ThreadId,
            'P' => Flag::ProcessId,
            'Y' => Flag::Year,
            'C' => Flag::ShortYear,
            'm' => Flag::Month,
            'd' => Flag::Day,
            'H' => Flag::Hour,
            'I' => Flag::Hour12,
            'M' => Flag::Minute,
            'S' => Flag::Second,
            'e' => Flag::Millis,
            'f' => Flag::Micros,
            'F' => Flag::Nanos,
            'p' => Flag::AmPm,
            'z' => Flag::Offset,
            'E' => Flag::Epoch,
            'a' => Flag::WeekdayShort,
            'A' => Flag::WeekdayFull,
            'b' | 'h' => Flag::MonthShort,
            'B' => Flag::MonthFull,
            'D' | 'x' => Flag::ShortDate,
            'T' | 'X' => Flag::Time,
            'R' => Flag::HourMinute,
            'r' => Flag::Clock12,
            'c' => Flag::DateTime,
            '@' => Flag::Location,
            's' => Flag::ShortFilename,
            'g' => Flag::Filename,
            '#' => Flag::Line,
            _ => return None,
        };
        Some(flag)
    }

    fn is_time(&self) -> bool {
        !matches!(
            self,
            Flag::Payload
                | Flag::LoggerName
                | Flag::Level
                | Flag::ShortLevel
                | Flag::ThreadId
                | Flag::ProcessId
                | Flag::Location
                | Flag::ShortFilename
                | Flag::Filename
                | Flag::Line
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Padding {
    width: usize,
    align: Align,
    truncate: bool,
}

impl Padding {
    fn apply(&self, text: &mut String, value: &str) {
        let len = value.chars().count();
        if len >= self.width {
            if self.truncate {
                text.extend(value.chars().take(self.width));
            } else {
                text.push_str(value);
            }
            return;
        }

        let fill = self.width - len;
        let (before, after) = match self.align {
            Align::Left => (0, fill),
            Align::Right => (fill, 0),
            Align::Center => (fill / 2, fill - fill / 2),
        };
        text.extend(std::iter::repeat_n(' ', before));
        text.push_str(value);
        text.extend(std::iter::repeat_n(' ', after));
    }
}

fn compile(pattern: &str) -> Vec<Item> {
    let mut items = vec![];
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        let mut align = Align::Right;
        let mut width = None;
        let mut truncate = false;

        if let Some(&(_, c)) = chars.peek() {
            match c {
                '-' => {
                    align = Align::Left;
                    chars.next();
                }
                '=' => {
                    align = Align::Center;
                    chars.next();
                }
                _ => {}
            }
        }
        while let Some(&(_, c)) = chars.peek() {
            let Some(digit) = c.to_digit(10) else {
                break;
            };
            let wider = width
                .unwrap_or(0usize)
                .saturating_mul(10)
                .saturating_add(digit as usize);
            width = Some(wider.min(MAX_PADDING));
            chars.next();
        }
        if width.is_some() {
            if let Some(&(_, '!')) = chars.peek() {
                truncate = true;
                chars.next();
            }
        }

        let Some((end, c)) = chars.next() else {
            literal.push_str(&pattern[start..]);
            break;
        };

        let padding = width.map(|width| Padding {
            width,
            align,
            truncate,
        });
        let item = match c {
            '%' => {
                literal.push('%');
                continue;
            }
            '^' => Item::ColorStart,
            '$' => Item::ColorEnd,
            c => match Flag::from_char(c) {
                Some(flag) => Item::Flag(flag, padding),
                None => {
                    literal.push_str(&pattern[start..end + c.len_utf8()]);
                    continue;
                }
            },
        };

        if !literal.is_empty() {
            items.push(Item::Literal(std::mem::take(&mut literal)));
        }
        items.push(item);
    }

    if !literal.is_empty() {
        items.push(Item::Literal(literal));
    }
    items
}

impl PatternLayout {
    /// Compile a new pattern layout.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let items = compile(&pattern);
        let needs_time = items
            .iter()
            .any(|item| matches!(item, Item::Flag(flag, _) if flag.is_time()));

        Self {
            pattern,
            items,
            needs_time,
            timezone: TimeZone::system(),
        }
    }

    /// Set the timezone for time flags.
    ///
    /// Defaults to the system timezone if not set.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// The pattern this layout was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Format a record into a line without the trailing newline.
    ///
    /// When `color` is false, the `%^`/`%$` markers are dropped and the range renders plain.
    pub fn format(&self, record: &Record, color: bool) -> Vec<u8> {
        let zoned = self.needs_time.then(|| {
            let ts = Timestamp::try_from(record.time()).unwrap_or(Timestamp::UNIX_EPOCH);
            ts.to_zoned(self.timezone.clone())
        });

        let mut text = String::new();
        let mut color_start = None;
        for item in &self.items {
            match item {
                Item::Literal(s) => text.push_str(s),
                Item::Flag(flag, None) => write_flag(&mut text, *flag, record, zoned.as_ref()),
                Item::Flag(flag, Some(padding)) => {
                    let mut value = String::new();
                    write_flag(&mut value, *flag, record, zoned.as_ref());
                    padding.apply(&mut text, &value);
                }
                Item::ColorStart => color_start = Some(text.len()),
                Item::ColorEnd => {
                    if let Some(start) = color_start.take() {
                        colorize_range(&mut text, start, record.level(), color);
                    }
                }
            }
        }
        if let Some(start) = color_start {
            colorize_range(&mut text, start, record.level(), color);
        }

        text.into_bytes()
    }
}

fn colorize_range(text: &mut String, start: usize, level: Level, color: bool) {
    if !color || start >= text.len() {
        return;
    }
    let range = text.split_off(start);
    let colored = colorize_level(&range, level);
    let _ = write!(text, "{colored}");
}

fn colorize_level(s: &str, level: Level) -> ColoredString {
    match level {
        Level::Trace => s.color(Color::White),
        Level::Debug => s.color(Color::Cyan),
        Level::Info => s.color(Color::Green),
        Level::Warn => s.color(Color::Yellow).bold(),
        Level::Error => s.color(Color::Red).bold(),
        Level::Critical => s.color(Color::White).on_red().bold(),
    }
}

fn weekday_index(weekday: Weekday) -> usize {
    match weekday {
        Weekday::Monday => 0,
        Weekday::Tuesday => 1,
        Weekday::Wednesday => 2,
        Weekday::Thursday => 3,
        Weekday::Friday => 4,
        Weekday::Saturday => 5,
        Weekday::Sunday => 6,
    }
}

fn month_index(zoned: &Zoned) -> usize {
    (zoned.month() as usize).saturating_sub(1).min(11)
}

fn hour12(zoned: &Zoned) -> i8 {
    match zoned.hour() % 12 {
        0 => 12,
        h => h,
    }
}

fn am_pm(zoned: &Zoned) -> &'static str {
    if zoned.hour() >= 12 { "PM" } else { "AM" }
}

fn thread_number(record: &Record) -> String {
    // ThreadId only exposes its number through Debug, as `ThreadId(N)`
    format!("{:?}", record.thread_id())
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

fn write_flag(text: &mut String, flag: Flag, record: &Record, zoned: Option<&Zoned>) {
    // write to a string always succeeds
    let _ = match (flag, zoned) {
        (Flag::Payload, _) => {
            text.push_str(record.payload());
            Ok(())
        }
        (Flag::LoggerName, _) => {
            text.push_str(record.logger_name());
            Ok(())
        }
        (Flag::Level, _) => {
            text.push_str(record.level().as_str());
            Ok(())
        }
        (Flag::ShortLevel, _) => {
            text.push_str(record.level().as_short_str());
            Ok(())
        }
        (Flag::ThreadId, _) => {
            text.push_str(&thread_number(record));
            Ok(())
        }
        (Flag::ProcessId, _) => write!(text, "{}", std::process::id()),
        (Flag::Location, _) => match record.line() {
            Some(line) if record.file().is_some() => {
                write!(text, "{}:{line}", record.file().unwrap_or_default())
            }
            _ => Ok(()),
        },
        (Flag::ShortFilename, _) => {
            text.push_str(&record.filename());
            Ok(())
        }
        (Flag::Filename, _) => {
            text.push_str(record.file().unwrap_or_default());
            Ok(())
        }
        (Flag::Line, _) => match record.line() {
            Some(line) => write!(text, "{line}"),
            None => Ok(()),
        },
        (_, None) => Ok(()),
        (Flag::Year, Some(z)) => write!(text, "{:04}", z.year()),
        (Flag::ShortYear, Some(z)) => write!(text, "{:02}", z.year() % 100),
        (Flag::Month, Some(z)) => write!(text, "{:02}", z.month()),
        (Flag::Day, Some(z)) => write!(text, "{:02}", z.day()),
        (Flag::Hour, Some(z)) => write!(text, "{:02}", z.hour()),
        (Flag::Hour12, Some(z)) => write!(text, "{:02}", hour12(z)),
        (Flag::Minute, Some(z)) => write!(text, "{:02}", z.minute()),
        (Flag::Second, Some(z)) => write!(text, "{:02}", z.second()),
        (Flag::Millis, Some(z)) => write!(text, "{:03}", z.subsec_nanosecond() / 1_000_000),
        (Flag::Micros, Some(z)) => write!(text, "{:06}", z.subsec_nanosecond() / 1_000),
        (Flag::Nanos, Some(z)) => write!(text, "{:09}", z.subsec_nanosecond()),
        (Flag::AmPm, Some(z)) => {
            text.push_str(am_pm(z));
            Ok(())
        }
        (Flag::Offset, Some(z)) => {
            let seconds = z.offset().seconds();
            let sign = if seconds < 0 { '-' } else { '+' };
            let minutes = seconds.abs() / 60;
            write!(text, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
        }
        (Flag::Epoch, Some(z)) => write!(text, "{}", z.timestamp().as_second()),
        (Flag::WeekdayShort, Some(z)) => {
            text.push_str(WEEKDAYS[weekday_index(z.weekday())].0);
            Ok(())
        }
        (Flag::WeekdayFull, Some(z)) => {
            text.push_str(WEEKDAYS[weekday_index(z.weekday())].1);
            Ok(())
        }
        (Flag::MonthShort, Some(z)) => {
            text.push_str(MONTHS[month_index(z)].0);
            Ok(())
        }
        (Flag::MonthFull, Some(z)) => {
            text.push_str(MONTHS[month_index(z)].1);
            Ok(())
        }
        (Flag::ShortDate, Some(z)) => write!(
            text,
            "{:02}/{:02}/{:02}",
            z.month(),
            z.day(),
            z.year() % 100
        ),
        (Flag::Time, Some(z)) => write!(
            text,
            "{:02}:{:02}:{:02}",
            z.hour(),
            z.minute(),
            z.second()
        ),
        (Flag::HourMinute, Some(z)) => write!(text, "{:02}:{:02}", z.hour(), z.minute()),
        (Flag::Clock12, Some(z)) => write!(
            text,
            "{:02}:{:02}:{:02} {}",
            hour12(z),
            z.minute(),
            z.second(),
            am_pm(z)
        ),
        (Flag::DateTime, Some(z)) => write!(
            text,
            "{} {} {:02} {:02}:{:02}:{:02} {:04}",
            WEEKDAYS[weekday_index(z.weekday())].0,
            MONTHS[month_index(z)].0,
            z.day(),
            z.hour(),
            z.minute(),
            z.second(),
            z.year()
        ),
    };
}
