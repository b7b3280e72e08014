//! Compiler from free-form time descriptions to absolute timestamps.
//!
//! A description has the shape `<date>_<time>+/-<offset>`, every part
//! optional, case-insensitive, no whitespace:
//!
//! - `<date>`: `today`/`t`, `yesterday`/`y`, a weekday prefix (two letters
//!   minimum, resolving to the most recent such day at or before today), a
//!   month prefix (three letters minimum, resolving to the most recent 1st
//!   of that month), or a numeric `D/M`, `D/M/Y`, `Y/M/D` date with `/`,
//!   `.` or `-` as separator. Defaults to today.
//! - `<time>`: `now`/`n` for the current instant (discarding any date),
//!   `HH[:MM[:SS]]` with optional `am`/`pm`, packed digits (`930` is 09:30,
//!   `93015` is 09:30:15), or a bare integer of at least 1,000,000 which is
//!   taken as a Unix timestamp verbatim. Defaults to the start of the day.
//! - `<offset>`: `+`/`-` followed by hour/minute/second fields (`+1h30m`,
//!   `-45s`); unlabeled digits bind to hours first, then minutes, then
//!   seconds.
//!
//! Parsing is a hand-rolled cursor over the input rather than one large
//! pattern; interpretations are tried most-specific first (numeric date with
//! year, without year, no date at all) so `1/2-3h` reads as February 1st
//! minus three hours while `1/2-3` reads as a full date.

use chrono::{DateTime, Datelike, Days, LocalResult, NaiveDate, TimeZone};
use thiserror::Error;

/// A time description that matches no grammar production, or matches one
/// with an unusable field (month 13, day 32, overflowing digits).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time description \"{0}\"")]
pub struct InvalidExpression(pub String);

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Bare time values at or above this are absolute Unix timestamps.
const TIMESTAMP_FLOOR: i64 = 1_000_000;

/// Resolves a time description against the current local time.
pub fn resolve_local(text: &str) -> Result<i64, InvalidExpression> {
    resolve(text, &chrono::Local::now())
}

/// Resolves a time description against an explicit "now".
///
/// Calendar arithmetic (today, weekday backtracking, month starts) happens
/// in the timezone of `now`; the result is seconds since the Unix epoch.
pub fn resolve<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> Result<i64, InvalidExpression> {
    let lowered = text.to_ascii_lowercase();
    let expr = parse_expr(&lowered).map_err(|_| InvalidExpression(text.to_string()))?;
    eval(&expr, now).ok_or_else(|| InvalidExpression(text.to_string()))
}

/// Marker for an interpretation that did not pan out.
struct Fail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateSpec {
    Today,
    Yesterday,
    /// Weekday index, 0 = Monday.
    Weekday(u32),
    /// Month number, 1 = January.
    MonthStart(u32),
    Calendar {
        day: u32,
        month: u32,
        year: Option<i32>,
    },
    Iso {
        year: i32,
        month: u32,
        day: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeSpec {
    Now,
    Clock {
        hour: i64,
        minute: Option<i64>,
        second: Option<i64>,
        meridiem: Option<Meridiem>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Expr {
    date: Option<DateSpec>,
    time: Option<TimeSpec>,
    offset: Option<i64>,
}

/// How aggressively the date production may consume input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateMode {
    /// Numeric dates may take a trailing separator and year.
    YearAllowed,
    /// Numeric dates stop after the month, leaving `-3h` style tails alone.
    NoYear,
    /// No date at all; the input starts with the time part.
    NoDate,
}

fn parse_expr(text: &str) -> Result<Expr, Fail> {
    parse_with(text, DateMode::YearAllowed)
        .or_else(|_| parse_with(text, DateMode::NoYear))
        .or_else(|_| parse_with(text, DateMode::NoDate))
}

fn parse_with(text: &str, mode: DateMode) -> Result<Expr, Fail> {
    let mut cur = Cursor::new(text);
    let date = if mode == DateMode::NoDate {
        None
    } else {
        parse_date(&mut cur, mode == DateMode::YearAllowed)?
    };
    cur.eat('_');
    let time = parse_time(&mut cur)?;
    let offset = parse_offset(&mut cur)?;
    if !cur.is_empty() {
        return Err(Fail);
    }
    if date.is_none() && time.is_none() && offset.is_none() && !text.is_empty() {
        return Err(Fail);
    }
    Ok(Expr { date, time, offset })
}

fn parse_date(cur: &mut Cursor<'_>, year_allowed: bool) -> Result<Option<DateSpec>, Fail> {
    let digits = cur.peek_digits();
    if !digits.is_empty() {
        // A date needs a separator right after at most four digits;
        // otherwise the digits belong to the time part.
        if digits.len() <= 4 && is_date_sep(cur.char_at(digits.len())) {
            let first = cur.digits();
            cur.advance(1);
            let month = cur.digits_max(2);
            if month.is_empty() {
                return Err(Fail);
            }
            let mut year: Option<&str> = None;
            if year_allowed {
                if is_date_sep(cur.char_at(0)) {
                    cur.advance(1);
                }
                let tail = cur.digits_max(4);
                if !tail.is_empty() {
                    year = Some(tail);
                }
            }
            let month = parse_num(month)?.try_into().map_err(|_| Fail)?;
            return Ok(Some(match year {
                Some(tail) if first.len() == 4 => DateSpec::Iso {
                    year: parse_num(first)?.try_into().map_err(|_| Fail)?,
                    month,
                    day: parse_num(tail)?.try_into().map_err(|_| Fail)?,
                },
                _ => DateSpec::Calendar {
                    day: parse_num(first)?.try_into().map_err(|_| Fail)?,
                    month,
                    year: match year {
                        Some(tail) => Some(parse_num(tail)?.try_into().map_err(|_| Fail)?),
                        None => None,
                    },
                },
            }));
        }
        return Ok(None);
    }

    let word = cur.peek_alpha();
    if word.is_empty() {
        return Ok(None);
    }
    if let Some(spec) = match_date_word(word) {
        cur.advance(word.len());
        return Ok(Some(spec));
    }
    // "mondaynow": the longest date word followed directly by a now token.
    for split in (1..word.len()).rev() {
        let (left, right) = word.split_at(split);
        if is_now_word(right) {
            if let Some(spec) = match_date_word(left) {
                cur.advance(split);
                return Ok(Some(spec));
            }
        }
    }
    Ok(None)
}

fn match_date_word(word: &str) -> Option<DateSpec> {
    if word.is_empty() {
        return None;
    }
    if "today".starts_with(word) {
        return Some(DateSpec::Today);
    }
    if "yesterday".starts_with(word) {
        return Some(DateSpec::Yesterday);
    }
    if word.len() >= 2 {
        if let Some(day) = unique_prefix(word, &WEEKDAYS) {
            return Some(DateSpec::Weekday(u32::try_from(day).ok()?));
        }
    }
    if word.len() >= 3 {
        if let Some(month) = unique_prefix(word, &MONTHS) {
            return Some(DateSpec::MonthStart(u32::try_from(month).ok()? + 1));
        }
    }
    None
}

fn unique_prefix(word: &str, names: &[&str]) -> Option<usize> {
    let mut hit = None;
    for (index, name) in names.iter().enumerate() {
        if name.starts_with(word) {
            if hit.is_some() {
                return None;
            }
            hit = Some(index);
        }
    }
    hit
}

fn is_now_word(word: &str) -> bool {
    matches!(word, "n" | "no" | "now")
}

const fn is_date_sep(c: Option<char>) -> bool {
    matches!(c, Some('/' | '.' | '-'))
}

fn parse_time(cur: &mut Cursor<'_>) -> Result<Option<TimeSpec>, Fail> {
    let word = cur.peek_alpha();
    if is_now_word(word) {
        cur.advance(word.len());
        return Ok(Some(TimeSpec::Now));
    }

    let hour = cur.digits();
    if hour.is_empty() {
        return Ok(None);
    }
    let hour = parse_num(hour)?;

    let mut minute = None;
    let mut second = None;
    if cur.eat(':') {
        let digits = cur.digits_max(2);
        if !digits.is_empty() {
            minute = Some(parse_num(digits)?);
        }
        cur.eat(':');
        let digits = cur.digits_max(2);
        if !digits.is_empty() {
            second = Some(parse_num(digits)?);
        }
    }

    let word = cur.peek_alpha();
    let meridiem = match word {
        "a" | "am" => Some(Meridiem::Am),
        "p" | "pm" => Some(Meridiem::Pm),
        _ => None,
    };
    if meridiem.is_some() {
        cur.advance(word.len());
    }

    Ok(Some(TimeSpec::Clock {
        hour,
        minute,
        second,
        meridiem,
    }))
}

fn parse_offset(cur: &mut Cursor<'_>) -> Result<Option<i64>, Fail> {
    let sign = match cur.peek() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(None),
    };
    cur.advance(1);

    const SCALES: [i64; 3] = [3600, 60, 1];
    let mut total: i64 = 0;
    // Index of the field the next unlabeled digit group binds to.
    let mut next_field = 0;
    loop {
        let digits = cur.digits();
        if digits.is_empty() {
            break;
        }
        let value = parse_num(digits)?;
        let field = match cur.peek() {
            Some('h') => {
                cur.advance(1);
                0
            }
            Some('m') => {
                cur.advance(1);
                1
            }
            Some('s') => {
                cur.advance(1);
                2
            }
            _ => next_field,
        };
        if field < next_field || field > 2 {
            return Err(Fail);
        }
        total = value
            .checked_mul(SCALES[field])
            .and_then(|v| total.checked_add(v))
            .ok_or(Fail)?;
        next_field = field + 1;
    }
    Ok(Some(sign * total))
}

fn parse_num(digits: &str) -> Result<i64, Fail> {
    digits.parse().map_err(|_| Fail)
}

fn eval<Tz: TimeZone>(expr: &Expr, now: &DateTime<Tz>) -> Option<i64> {
    let today = now.date_naive();

    let date = match expr.date {
        None | Some(DateSpec::Today) => today,
        Some(DateSpec::Yesterday) => today.checked_sub_days(Days::new(1))?,
        Some(DateSpec::Weekday(day)) => {
            let back = (today.weekday().num_days_from_monday() + 7 - day) % 7;
            today.checked_sub_days(Days::new(u64::from(back)))?
        }
        Some(DateSpec::MonthStart(month)) => {
            let year = if month <= today.month() {
                today.year()
            } else {
                today.year() - 1
            };
            NaiveDate::from_ymd_opt(year, month, 1)?
        }
        Some(DateSpec::Calendar { day, month, year }) => {
            NaiveDate::from_ymd_opt(year.unwrap_or_else(|| today.year()), month, day)?
        }
        Some(DateSpec::Iso { year, month, day }) => NaiveDate::from_ymd_opt(year, month, day)?,
    };
    let mut t = local_midnight(&now.timezone(), date)?;

    match expr.time {
        Some(TimeSpec::Now) => t = now.timestamp(),
        Some(TimeSpec::Clock {
            hour,
            minute,
            second,
            meridiem,
        }) => {
            let (mut h, m, s) = match (minute, second) {
                (None, None) => {
                    if hour >= TIMESTAMP_FLOOR {
                        // Absolute timestamp; any date computed so far is moot.
                        t = hour;
                        (0, 0, 0)
                    } else if hour > 10_000 {
                        ((hour / 10_000) % 100, (hour / 100) % 100, hour % 100)
                    } else if hour > 100 {
                        ((hour / 100) % 100, hour % 100, 0)
                    } else {
                        (hour, 0, 0)
                    }
                }
                (Some(m), second) => (hour, m, second.unwrap_or(0)),
                (None, Some(_)) => return None,
            };
            if let Some(meridiem) = meridiem {
                if h >= 12 {
                    h = 0;
                }
                if meridiem == Meridiem::Pm {
                    h += 12;
                }
            }
            t = h
                .checked_mul(3600)
                .and_then(|v| v.checked_add(m.checked_mul(60)?))
                .and_then(|v| v.checked_add(s))
                .and_then(|v| t.checked_add(v))?;
        }
        None => {}
    }

    if let Some(offset) = expr.offset {
        t = t.checked_add(offset)?;
    }
    Some(t)
}

/// Timestamp of local midnight on `date`. A DST gap at midnight falls
/// forward to 01:00; an ambiguous midnight takes the earlier instant.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    for hour in [0, 1] {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => return Some(dt.timestamp()),
            LocalResult::None => {}
        }
    }
    None
}

/// Byte cursor over lowercased ASCII-ish input.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    const fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    const fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.rest.get(offset..)?.chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest.starts_with(c) {
            self.rest = &self.rest[c.len_utf8()..];
            true
        } else {
            false
        }
    }

    fn advance(&mut self, bytes: usize) {
        self.rest = &self.rest[bytes..];
    }

    fn run_while(&self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .find(|c: char| !pred(c))
            .unwrap_or(self.rest.len());
        &self.rest[..end]
    }

    fn peek_digits(&self) -> &'a str {
        self.run_while(|c| c.is_ascii_digit())
    }

    fn peek_alpha(&self) -> &'a str {
        self.run_while(|c| c.is_ascii_alphabetic())
    }

    fn digits(&mut self) -> &'a str {
        let run = self.peek_digits();
        self.advance(run.len());
        run
    }

    fn digits_max(&mut self, max: usize) -> &'a str {
        let run = self.peek_digits();
        let take = run.len().min(max);
        self.advance(take);
        &run[..take]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Friday, August 15th 2025, 14:30:45 UTC.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 15, 14, 30, 45).unwrap()
    }

    fn at(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, h, m, s)
            .unwrap()
            .timestamp()
    }

    fn resolve_ok(text: &str) -> i64 {
        resolve(text, &now()).unwrap_or_else(|err| panic!("{err}"))
    }

    fn assert_invalid(text: &str) {
        let result = resolve(text, &now());
        assert_eq!(result, Err(InvalidExpression(text.to_string())));
    }

    #[test]
    fn empty_input_is_local_midnight() {
        assert_eq!(resolve_ok(""), at(2025, 8, 15, 0, 0, 0));
    }

    #[test]
    fn offset_against_empty_is_exact() {
        assert_eq!(resolve_ok("+1h") - resolve_ok(""), 3600);
        assert_eq!(resolve_ok("-1h") - resolve_ok(""), -3600);
    }

    #[test]
    fn now_returns_current_instant() {
        let instant = now().timestamp();
        assert_eq!(resolve_ok("now"), instant);
        assert_eq!(resolve_ok("no"), instant);
        assert_eq!(resolve_ok("n"), instant);
    }

    #[test]
    fn now_discards_any_date() {
        let instant = now().timestamp();
        assert_eq!(resolve_ok("monday_now"), instant);
        assert_eq!(resolve_ok("yesterday_now"), instant);
        assert_eq!(resolve_ok("mondaynow"), instant);
    }

    #[test]
    fn now_with_offset() {
        assert_eq!(resolve_ok("now+1h"), now().timestamp() + 3600);
        assert_eq!(resolve_ok("n-30m"), now().timestamp() - 1800);
    }

    #[test]
    fn clock_times_round_trip() {
        for (text, h, m, s) in [
            ("00:00:00", 0, 0, 0),
            ("09:05:07", 9, 5, 7),
            ("14:30:45", 14, 30, 45),
            ("23:59:59", 23, 59, 59),
        ] {
            let resolved = resolve_ok(text);
            assert_eq!(resolved, at(2025, 8, 15, h, m, s), "{text}");
            let back = Utc.timestamp_opt(resolved, 0).unwrap();
            assert_eq!(
                (back.format("%H:%M:%S").to_string(), back.date_naive()),
                (
                    format!("{h:02}:{m:02}:{s:02}"),
                    now().date_naive()
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn colon_variants() {
        assert_eq!(resolve_ok("14:30"), at(2025, 8, 15, 14, 30, 0));
        assert_eq!(resolve_ok("9:5"), at(2025, 8, 15, 9, 5, 0));
        // A dangling colon reads as a bare hour.
        assert_eq!(resolve_ok("14:"), at(2025, 8, 15, 14, 0, 0));
    }

    #[test]
    fn bare_hour() {
        assert_eq!(resolve_ok("9"), at(2025, 8, 15, 9, 0, 0));
        assert_eq!(resolve_ok("12"), at(2025, 8, 15, 12, 0, 0));
    }

    #[test]
    fn packed_hhmm() {
        assert_eq!(resolve_ok("930"), at(2025, 8, 15, 9, 30, 0));
        assert_eq!(resolve_ok("1430"), at(2025, 8, 15, 14, 30, 0));
    }

    #[test]
    fn packed_hhmmss() {
        assert_eq!(resolve_ok("93015"), at(2025, 8, 15, 9, 30, 15));
        assert_eq!(resolve_ok("093015"), at(2025, 8, 15, 9, 30, 15));
        assert_eq!(resolve_ok("143045"), at(2025, 8, 15, 14, 30, 45));
    }

    #[test]
    fn bare_timestamp_passes_through() {
        assert_eq!(resolve_ok("1000000"), 1_000_000);
        assert_eq!(resolve_ok("1234567890"), 1_234_567_890);
        // The date part is discarded, the offset still applies.
        assert_eq!(resolve_ok("15/8_1234567890"), 1_234_567_890);
        assert_eq!(resolve_ok("1234567890+1h"), 1_234_567_890 + 3600);
    }

    #[test]
    fn meridiem() {
        assert_eq!(resolve_ok("12am"), at(2025, 8, 15, 0, 0, 0));
        assert_eq!(resolve_ok("12pm"), at(2025, 8, 15, 12, 0, 0));
        assert_eq!(resolve_ok("9pm"), at(2025, 8, 15, 21, 0, 0));
        assert_eq!(resolve_ok("9a"), at(2025, 8, 15, 9, 0, 0));
        assert_eq!(resolve_ok("9p"), at(2025, 8, 15, 21, 0, 0));
        assert_eq!(resolve_ok("0230pm"), at(2025, 8, 15, 14, 30, 0));
        assert_eq!(resolve_ok("11:45pm"), at(2025, 8, 15, 23, 45, 0));
        // Hours of twelve and above are zeroed before pm adds twelve.
        assert_eq!(resolve_ok("13pm"), at(2025, 8, 15, 12, 0, 0));
    }

    #[test]
    fn month_prefixes() {
        // August 2025 has already started.
        assert_eq!(resolve_ok("aug"), at(2025, 8, 1, 0, 0, 0));
        assert_eq!(resolve_ok("august"), at(2025, 8, 1, 0, 0, 0));
        assert_eq!(resolve_ok("jan"), at(2025, 1, 1, 0, 0, 0));
        // September has not; back up a year.
        assert_eq!(resolve_ok("sep"), at(2024, 9, 1, 0, 0, 0));
        assert_eq!(resolve_ok("december"), at(2024, 12, 1, 0, 0, 0));
        assert_eq!(resolve_ok("may"), at(2025, 5, 1, 0, 0, 0));
    }

    #[test]
    fn month_prefix_needs_three_letters() {
        assert_invalid("ju");
        assert_invalid("au");
    }

    #[test]
    fn weekday_prefixes() {
        // The reference "now" is a Friday.
        assert_eq!(resolve_ok("fri"), at(2025, 8, 15, 0, 0, 0));
        assert_eq!(resolve_ok("friday"), at(2025, 8, 15, 0, 0, 0));
        assert_eq!(resolve_ok("thu"), at(2025, 8, 14, 0, 0, 0));
        assert_eq!(resolve_ok("mo"), at(2025, 8, 11, 0, 0, 0));
        // Saturday is ahead of Friday, so the previous one is meant.
        assert_eq!(resolve_ok("sat"), at(2025, 8, 9, 0, 0, 0));
        assert_eq!(resolve_ok("su"), at(2025, 8, 10, 0, 0, 0));
    }

    #[test]
    fn today_and_yesterday() {
        assert_eq!(resolve_ok("today"), at(2025, 8, 15, 0, 0, 0));
        assert_eq!(resolve_ok("t"), at(2025, 8, 15, 0, 0, 0));
        assert_eq!(resolve_ok("yesterday"), at(2025, 8, 14, 0, 0, 0));
        assert_eq!(resolve_ok("y"), at(2025, 8, 14, 0, 0, 0));
    }

    #[test]
    fn numeric_dates() {
        assert_eq!(resolve_ok("15/8"), at(2025, 8, 15, 0, 0, 0));
        assert_eq!(resolve_ok("1.2"), at(2025, 2, 1, 0, 0, 0));
        assert_eq!(resolve_ok("1/2/2024"), at(2024, 2, 1, 0, 0, 0));
        assert_eq!(resolve_ok("2024/12/31"), at(2024, 12, 31, 0, 0, 0));
        assert_eq!(resolve_ok("2024-12-31"), at(2024, 12, 31, 0, 0, 0));
    }

    #[test]
    fn date_combined_with_time() {
        assert_eq!(resolve_ok("15/8_14:30"), at(2025, 8, 15, 14, 30, 0));
        assert_eq!(resolve_ok("yesterday_9am"), at(2025, 8, 14, 9, 0, 0));
        assert_eq!(resolve_ok("mon_8:15"), at(2025, 8, 11, 8, 15, 0));
        assert_eq!(resolve_ok("jan_1130pm"), at(2025, 1, 1, 23, 30, 0));
    }

    #[test]
    fn date_with_negative_offset() {
        // The dash binds to the offset, not a year field.
        assert_eq!(resolve_ok("15/8-2h"), at(2025, 8, 14, 22, 0, 0));
        assert_eq!(resolve_ok("today_12:00-30m"), at(2025, 8, 15, 11, 30, 0));
    }

    #[test]
    fn offsets() {
        let midnight = at(2025, 8, 15, 0, 0, 0);
        assert_eq!(resolve_ok("+2h30m"), midnight + 2 * 3600 + 30 * 60);
        assert_eq!(resolve_ok("-45s"), midnight - 45);
        assert_eq!(resolve_ok("+1h30"), midnight + 3600 + 1800);
        // Unlabeled leading digits are hours.
        assert_eq!(resolve_ok("+90"), midnight + 90 * 3600);
        assert_eq!(resolve_ok("+30m"), midnight + 1800);
        assert_eq!(resolve_ok("+1h2m3s"), midnight + 3723);
    }

    #[test]
    fn offset_fields_cannot_repeat_or_regress() {
        assert_invalid("+1m2h");
        assert_invalid("+1h2h");
        assert_invalid("+1s2m");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(resolve_ok("AUG"), resolve_ok("aug"));
        assert_eq!(resolve_ok("NOW"), resolve_ok("now"));
        assert_eq!(resolve_ok("9AM"), resolve_ok("9am"));
        assert_eq!(resolve_ok("Mon"), resolve_ok("mon"));
    }

    #[test]
    fn out_of_range_calendar_fields() {
        assert_invalid("32/1");
        assert_invalid("1/13");
        assert_invalid("31/2");
        assert_invalid("2024/2/30");
    }

    #[test]
    fn unparseable_input() {
        assert_invalid("garbage");
        assert_invalid("14x");
        assert_invalid("14::30");
        assert_invalid("_");
        assert_invalid("9 am");
        assert_invalid("99999999999999999999999");
    }

    #[test]
    fn different_now_moves_the_result() {
        let earlier = Utc.with_ymd_and_hms(2025, 8, 15, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 8, 15, 10, 0, 5).unwrap();
        let a = resolve("now", &earlier).unwrap();
        let b = resolve("now", &later).unwrap();
        assert_eq!(b - a, 5);
    }
}
