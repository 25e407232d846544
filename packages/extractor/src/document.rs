//! Reader for ASCII drawing-exchange (DXF) documents.
//!
//! The reader understands the group-code/value framing and the section
//! structure, nothing more. Records inside a section are kept as ordered
//! lists of typed group pairs; interpreting them is left to the caller.

use crate::error::ParseError;

/// A typed group value. The type is fixed by the group code.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Float(f64),
    Int(i64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Str(_) => None,
        }
    }
}

/// A single group code and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPair {
    pub code: i32,
    pub value: Value,
}

/// A record inside a section, introduced by a group-0 pair (`INSERT`,
/// `LINE`, `BLOCK`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: String,
    line: usize,
    pairs: Vec<GroupPair>,
}

impl Entity {
    /// The record type, i.e. the value of the introducing group-0 pair.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// 1-based line of the group code that introduced the record.
    pub fn line(&self) -> usize {
        self.line
    }

    /// First value recorded for `code`.
    pub fn first(&self, code: i32) -> Option<&Value> {
        self.pairs
            .iter()
            .find(|pair| pair.code == code)
            .map(|pair| &pair.value)
    }

    pub fn string(&self, code: i32) -> Option<&str> {
        self.first(code).and_then(Value::as_str)
    }

    pub fn float(&self, code: i32) -> Option<f64> {
        self.first(code).and_then(Value::as_f64)
    }
}

/// A named `SECTION ... ENDSEC` block.
///
/// Pairs between the section name and the first record (the `$ACADVER`
/// style variables of `HEADER`) are checked for framing and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    records: Vec<Entity>,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Entity] {
        &self.records
    }
}

/// A parsed drawing-exchange document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Parse document text, failing on any framing or structural error.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut reader = PairReader::new(text);
        let mut sections = Vec::new();
        let mut saw_any = false;

        while let Some((line, pair)) = reader.next_pair()? {
            saw_any = true;
            match (pair.code, pair.value.as_str()) {
                (0, Some("EOF")) => break,
                (0, Some("SECTION")) => sections.push(parse_section(&mut reader, line)?),
                _ => {
                    return Err(ParseError::UnexpectedRecord {
                        line,
                        found: describe(&pair),
                    });
                }
            }
        }

        if !saw_any {
            return Err(ParseError::Empty);
        }

        Ok(Self { sections })
    }

    /// First section with the given name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Records of the `ENTITIES` section, or `None` when the document has none.
    pub fn entities(&self) -> Option<&[Entity]> {
        self.section("ENTITIES").map(Section::records)
    }
}

fn parse_section(reader: &mut PairReader<'_>, start_line: usize) -> Result<Section, ParseError> {
    let name = match reader.next_pair()? {
        Some((_, GroupPair {
            code: 2,
            value: Value::Str(name),
        })) => name,
        _ => return Err(ParseError::MissingSectionName { line: start_line }),
    };

    let mut records: Vec<Entity> = Vec::new();

    loop {
        let Some((line, pair)) = reader.next_pair()? else {
            return Err(ParseError::UnterminatedSection { name });
        };

        // Group 0 always reads as a string.
        if let GroupPair {
            code: 0,
            value: Value::Str(kind),
        } = pair
        {
            match kind.as_str() {
                "ENDSEC" => break,
                "EOF" => return Err(ParseError::UnterminatedSection { name }),
                _ => records.push(Entity {
                    kind,
                    line,
                    pairs: Vec::new(),
                }),
            }
            continue;
        }

        if let Some(record) = records.last_mut() {
            record.pairs.push(pair);
        }
    }

    Ok(Section { name, records })
}

fn describe(pair: &GroupPair) -> String {
    match &pair.value {
        Value::Str(s) => format!("{} {}", pair.code, s),
        Value::Float(f) => format!("{} {}", pair.code, f),
        Value::Int(i) => format!("{} {}", pair.code, i),
    }
}

#[derive(Clone, Copy)]
enum ValueKind {
    Str,
    Float,
    Int,
    Comment,
}

fn value_kind(code: i32) -> ValueKind {
    match code {
        10..=59 | 110..=149 | 210..=239 | 460..=469 | 1010..=1059 => ValueKind::Float,
        60..=79
        | 90..=99
        | 160..=179
        | 270..=289
        | 290..=299
        | 370..=389
        | 400..=409
        | 420..=429
        | 440..=459
        | 1060..=1071 => ValueKind::Int,
        999 => ValueKind::Comment,
        _ => ValueKind::Str,
    }
}

/// Splits text into (code, value) line pairs.
struct PairReader<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> PairReader<'a> {
    fn new(text: &'a str) -> Self {
        let mut lines: Vec<&str> = text.lines().collect();
        // Trailing blank lines are padding, not a dangling group code.
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Self { lines, pos: 0 }
    }

    /// Returns the next non-comment pair with the 1-based line of its code.
    fn next_pair(&mut self) -> Result<Option<(usize, GroupPair)>, ParseError> {
        loop {
            let Some(code_text) = self.lines.get(self.pos) else {
                return Ok(None);
            };
            let line = self.pos + 1;
            let code: i32 =
                code_text
                    .trim()
                    .parse()
                    .map_err(|_| ParseError::InvalidGroupCode {
                        line,
                        text: code_text.trim().to_string(),
                    })?;

            let Some(raw) = self.lines.get(self.pos + 1) else {
                return Err(ParseError::MissingValue { line, code });
            };
            self.pos += 2;

            let text = raw.trim();
            let invalid = || ParseError::InvalidValue {
                line: line + 1,
                code,
                text: text.to_string(),
            };

            let value = match value_kind(code) {
                ValueKind::Comment => continue,
                ValueKind::Str => Value::Str(text.to_string()),
                // `parse` accepts `nan` and `inf`, which no drawing coordinate can hold.
                ValueKind::Float => match text.parse::<f64>() {
                    Ok(f) if f.is_finite() => Value::Float(f),
                    _ => return Err(invalid()),
                },
                ValueKind::Int => Value::Int(text.parse().map_err(|_| invalid())?),
            };

            return Ok(Some((line, GroupPair { code, value })));
        }
    }
}
