//! `%`-style record patterns such as `"%(asctime)s %(levelname)s: %(message)s"`.
//!
//! Patterns are compiled once into segments so formatting a record never
//! re-parses the pattern and never fails. Unknown fields, malformed
//! placeholders and invalid date formats are rejected up front.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use thiserror::Error;

use super::Formatter;
use crate::log_record::LogRecord;

/// Date format used for `asctime` when none is configured. Milliseconds are
/// appended as `,mmm`.
const DEFAULT_DATEFMT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised while compiling a pattern.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown record field {field:?} in format string")]
    UnknownField { field: String },
    #[error("malformed placeholder at byte {position} in format string {pattern:?}")]
    Malformed { pattern: String, position: usize },
    #[error("field {field:?} cannot be rendered with conversion '{conversion}'")]
    Conversion { field: String, conversion: char },
    #[error("invalid date format {0:?}")]
    DateFormat(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Name,
    LevelName,
    LevelNo,
    Message,
    AscTime,
    Msecs,
    Created,
    Process,
    ThreadName,
    Module,
    Filename,
    PathName,
    LineNo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Text,
    Int,
    Float,
}

impl Field {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Field::Name,
            "levelname" => Field::LevelName,
            "levelno" => Field::LevelNo,
            "message" => Field::Message,
            "asctime" => Field::AscTime,
            "msecs" => Field::Msecs,
            "created" => Field::Created,
            "process" => Field::Process,
            "threadName" => Field::ThreadName,
            "module" => Field::Module,
            "filename" => Field::Filename,
            "pathname" => Field::PathName,
            "lineno" => Field::LineNo,
            _ => return None,
        })
    }

    fn kind(self) -> Kind {
        match self {
            Field::LevelNo | Field::Process | Field::LineNo => Kind::Int,
            Field::Msecs | Field::Created => Kind::Float,
            _ => Kind::Text,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conversion {
    Str,
    Int,
    Float,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Spec {
    left_align: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder {
        field: Field,
        spec: Spec,
        conversion: Conversion,
    },
}

enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Formatter driven by a `%(field)s` pattern and an optional strftime date
/// format.
#[derive(Clone, Debug)]
pub struct PatternFormatter {
    fmt: String,
    datefmt: Option<String>,
    segments: Vec<Segment>,
    uses_time: bool,
}

impl PatternFormatter {
    /// Compile `fmt`, validating `datefmt` when provided.
    pub fn new(fmt: impl Into<String>, datefmt: Option<String>) -> Result<Self, FormatError> {
        let fmt = fmt.into();
        if let Some(datefmt) = datefmt.as_deref() {
            validate_datefmt(datefmt)?;
        }
        let segments = compile(&fmt)?;
        let uses_time = segments.iter().any(|s| {
            matches!(
                s,
                Segment::Placeholder {
                    field: Field::AscTime,
                    ..
                }
            )
        });
        Ok(Self {
            fmt,
            datefmt,
            segments,
            uses_time,
        })
    }

    /// The pattern this formatter was compiled from.
    pub fn format_string(&self) -> &str {
        &self.fmt
    }

    /// The configured date format, if any.
    pub fn datefmt(&self) -> Option<&str> {
        self.datefmt.as_deref()
    }

    /// Whether the pattern renders `asctime`.
    pub fn uses_time(&self) -> bool {
        self.uses_time
    }

    fn asctime(&self, record: &LogRecord) -> String {
        let ts = record.timestamp();
        let mut out = String::new();
        match self.datefmt.as_deref() {
            Some(datefmt) => {
                let _ = write!(out, "{}", ts.format(datefmt));
            }
            None => {
                let _ = write!(
                    out,
                    "{},{:03}",
                    ts.format(DEFAULT_DATEFMT),
                    ts.timestamp_subsec_millis()
                );
            }
        }
        out
    }

    fn value(&self, field: Field, record: &LogRecord) -> Value {
        let meta = record.metadata();
        let ts = record.timestamp();
        match field {
            Field::Name => Value::Text(record.logger().to_string()),
            Field::LevelName => Value::Text(record.level().as_str().to_string()),
            Field::LevelNo => Value::Int(i64::from(record.level().number())),
            Field::Message => Value::Text(record.message().to_string()),
            Field::AscTime => Value::Text(self.asctime(record)),
            Field::Msecs => Value::Float(f64::from(ts.timestamp_subsec_nanos()) / 1_000_000.0),
            Field::Created => Value::Float(
                ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1e9,
            ),
            Field::Process => Value::Int(i64::from(meta.process_id)),
            Field::ThreadName => {
                Value::Text(meta.thread_name.clone().unwrap_or_else(|| "unnamed".into()))
            }
            Field::Module => Value::Text(meta.module_path.clone()),
            Field::Filename => Value::Text(
                std::path::Path::new(&meta.filename)
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
            Field::PathName => Value::Text(meta.filename.clone()),
            Field::LineNo => Value::Int(i64::from(meta.line_number)),
        }
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(self.fmt.len() + record.message().len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder {
                    field,
                    spec,
                    conversion,
                } => {
                    let rendered = render(self.value(*field, record), *spec, *conversion);
                    pad_into(&mut out, &rendered, *spec, *conversion);
                }
            }
        }
        out
    }
}

fn validate_datefmt(datefmt: &str) -> Result<(), FormatError> {
    if StrftimeItems::new(datefmt).any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::DateFormat(datefmt.to_string()));
    }
    Ok(())
}

fn render(value: Value, spec: Spec, conversion: Conversion) -> String {
    match (conversion, value) {
        (Conversion::Str, Value::Text(s)) => match spec.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s,
        },
        (Conversion::Str, Value::Int(i)) => i.to_string(),
        (Conversion::Str, Value::Float(f)) => f.to_string(),
        (Conversion::Int, Value::Int(i)) => int_with_precision(i, spec.precision),
        (Conversion::Int, Value::Float(f)) => int_with_precision(f.trunc() as i64, spec.precision),
        (Conversion::Float, Value::Int(i)) => format!("{:.*}", spec.precision.unwrap_or(6), i as f64),
        (Conversion::Float, Value::Float(f)) => format!("{:.*}", spec.precision.unwrap_or(6), f),
        // Rejected while compiling.
        (_, Value::Text(s)) => s,
    }
}

fn int_with_precision(i: i64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{i:0p$}"),
        None => i.to_string(),
    }
}

fn pad_into(out: &mut String, rendered: &str, spec: Spec, conversion: Conversion) {
    let len = rendered.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        out.push_str(rendered);
        return;
    }
    let fill = width - len;
    if spec.left_align {
        out.push_str(rendered);
        out.extend(std::iter::repeat_n(' ', fill));
    } else if spec.zero_pad && conversion != Conversion::Str {
        match rendered.strip_prefix('-') {
            Some(digits) => {
                out.push('-');
                out.extend(std::iter::repeat_n('0', fill));
                out.push_str(digits);
            }
            None => {
                out.extend(std::iter::repeat_n('0', fill));
                out.push_str(rendered);
            }
        }
    } else {
        out.extend(std::iter::repeat_n(' ', fill));
        out.push_str(rendered);
    }
}

fn compile(pattern: &str) -> Result<Vec<Segment>, FormatError> {
    let malformed = |position: usize| FormatError::Malformed {
        pattern: pattern.to_string(),
        position,
    };
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '%')) => {
                literal.push('%');
                continue;
            }
            Some((_, '(')) => {}
            _ => return Err(malformed(pos)),
        }

        let mut name = String::new();
        loop {
            match chars.next() {
                Some((_, ')')) => break,
                Some((_, ch)) => name.push(ch),
                None => return Err(malformed(pos)),
            }
        }
        let field = Field::lookup(&name).ok_or_else(|| FormatError::UnknownField {
            field: name.clone(),
        })?;

        let mut spec = Spec::default();
        while let Some(&(_, flag)) = chars.peek() {
            match flag {
                '-' => spec.left_align = true,
                '0' => spec.zero_pad = true,
                '+' | ' ' | '#' => {}
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if let Some(&(_, '.')) = chars.peek() {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }
        let conversion = match chars.next() {
            Some((_, 's' | 'r')) => Conversion::Str,
            Some((_, 'd' | 'i')) => Conversion::Int,
            Some((_, 'f' | 'F')) => Conversion::Float,
            _ => return Err(malformed(pos)),
        };
        if field.kind() == Kind::Text && conversion != Conversion::Str {
            let symbol = if conversion == Conversion::Int { 'd' } else { 'f' };
            return Err(FormatError::Conversion {
                field: name,
                conversion: symbol,
            });
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Placeholder {
            field,
            spec,
            conversion,
        });
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&(_, d)) = chars.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        digits.push(d);
        chars.next();
    }
    digits.parse().ok()
}

/// Escape `%` so `text` is emitted literally when embedded in a pattern.
pub(crate) fn escape_literal(text: &str) -> String {
    text.replace('%', "%%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::log_record::RecordMetadata;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn record_at(millis: u32) -> LogRecord {
        let timestamp = Utc
            .with_ymd_and_hms(2017, 8, 25, 14, 47, 44)
            .single()
            .expect("valid timestamp")
            + chrono::Duration::milliseconds(i64::from(millis));
        let metadata = RecordMetadata {
            module_path: "app::db".into(),
            filename: "src/db.rs".into(),
            line_number: 42,
            timestamp,
            process_id: 4242,
            thread_name: Some("main".into()),
        };
        LogRecord::with_metadata("app", Level::Warning, "disk low", metadata)
    }

    #[test]
    fn renders_syslog_style_pattern() {
        let f = PatternFormatter::new(
            "%(asctime)s.%(msecs)03dZ prog (%(process)d): %(message)s",
            Some("%Y-%m-%dT%H:%M:%S".into()),
        )
        .expect("pattern must compile");
        assert_eq!(
            f.format(&record_at(7)),
            "2017-08-25T14:47:44.007Z prog (4242): disk low"
        );
        assert!(f.uses_time());
    }

    #[test]
    fn default_asctime_appends_millis() {
        let f = PatternFormatter::new("%(asctime)s", None).expect("pattern must compile");
        assert_eq!(f.format(&record_at(968)), "2017-08-25 14:47:44,968");
    }

    #[rstest]
    #[case("%(levelname)s", "WARNING")]
    #[case("%(levelname)-8s|", "WARNING |")]
    #[case("%(levelname)9s", "  WARNING")]
    #[case("%(levelname).4s", "WARN")]
    #[case("%(levelno)d", "30")]
    #[case("%(lineno)05d", "00042")]
    #[case("%(name)s.%(module)s", "app.app::db")]
    #[case("%(filename)s:%(pathname)s", "db.rs:src/db.rs")]
    #[case("%(threadName)s", "main")]
    #[case("100%% %(message)s", "100% disk low")]
    #[case("%(msecs).1f", "7.0")]
    fn renders_fields(#[case] pattern: &str, #[case] expected: &str) {
        let f = PatternFormatter::new(pattern, None).expect("pattern must compile");
        assert_eq!(f.format(&record_at(7)), expected);
    }

    #[rstest]
    #[case("%(nope)s")]
    #[case("%(message)d")]
    #[case("%(message")]
    #[case("%s")]
    #[case("trailing %")]
    #[case("%(message)q")]
    fn rejects_bad_patterns(#[case] pattern: &str) {
        assert!(PatternFormatter::new(pattern, None).is_err());
    }

    #[test]
    fn rejects_invalid_datefmt() {
        let err = PatternFormatter::new("%(asctime)s", Some("%Q".into())).unwrap_err();
        assert_eq!(err, FormatError::DateFormat("%Q".into()));
    }

    #[test]
    fn escaped_literals_survive_compilation() {
        let pattern = format!("{} %(message)s", escape_literal("50%off"));
        let f = PatternFormatter::new(pattern, None).expect("pattern must compile");
        assert_eq!(f.format(&record_at(0)), "50%off disk low");
    }
}
