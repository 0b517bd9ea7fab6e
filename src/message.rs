//! ICU message template syntax.
//!
//! A template is parsed once into a tree of [`Element`]s. The grammar covers
//! what report strings use: plain `{id}` arguments, `number` arguments with an
//! optional style, `plural`/`selectordinal` with `offset:` and `=n` selectors,
//! `select`, the `#` shorthand inside plural options, and apostrophe quoting.

use crate::error::{I18nError, Result};
use crate::plural::PluralKind;

/// Named number styles understood by the formatter.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberStyle {
    /// `{id, number}` with no style.
    Default,
    Integer,
    Percent,
    /// Rounded to the nearest 10 ms before display.
    Milliseconds,
    /// One fraction digit; `timeInMs` values are converted from ms.
    Seconds,
    /// Converted from bytes to KiB before display.
    Bytes,
    /// Percent with up to two fraction digits.
    ExtendedPercent,
    /// Any other style name. Formatted like [`NumberStyle::Default`].
    Other(String),
}

impl NumberStyle {
    fn from_name(name: &str) -> Self {
        match name {
            "integer" => Self::Integer,
            "percent" => Self::Percent,
            "milliseconds" => Self::Milliseconds,
            "seconds" => Self::Seconds,
            "bytes" => Self::Bytes,
            "extendedPercent" => Self::ExtendedPercent,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Selector of a plural option.
#[derive(Debug, Clone, PartialEq)]
pub enum PluralSelector {
    /// `=n`, matched against the raw value.
    Exact(f64),
    /// CLDR keyword such as `one` or `other`.
    Category(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PluralOption {
    pub selector: PluralSelector,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub key: String,
    pub elements: Vec<Element>,
}

/// One node of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Literal(String),
    /// `{id}`
    Argument { id: String },
    /// `{id, number}` or `{id, number, style}`
    Number { id: String, style: NumberStyle },
    /// `{id, plural, ...}` or `{id, selectordinal, ...}`
    Plural {
        id: String,
        kind: PluralKind,
        offset: f64,
        options: Vec<PluralOption>,
    },
    /// `{id, select, ...}`
    Select { id: String, options: Vec<SelectOption> },
    /// `#` inside a plural option.
    Pound,
}

/// The formatting an argument placeholder asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentFormat {
    Plain,
    Number(NumberStyle),
    Plural,
    Select,
}

/// A parsed ICU message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    elements: Vec<Element>,
}

impl MessageTemplate {
    /// Parses `source` into an element tree.
    ///
    /// # Example
    ///
    /// ```rust
    /// use report_intl::message::{ArgumentFormat, MessageTemplate, NumberStyle};
    ///
    /// let template = MessageTemplate::parse("Potential savings of {wastedBytes, number, bytes} KiB").unwrap();
    /// assert_eq!(
    ///     template.arguments(),
    ///     vec![("wastedBytes".to_string(), ArgumentFormat::Number(NumberStyle::Bytes))]
    /// );
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser { source, pos: 0 };
        let elements = parser.parse_message(false)?;
        if parser.pos < source.len() {
            return Err(parser.error("unexpected '}'"));
        }
        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Collects every argument placeholder, descending into plural and select
    /// options.
    ///
    /// An id seen more than once keeps its first position and takes the format
    /// of its last occurrence.
    pub fn arguments(&self) -> Vec<(String, ArgumentFormat)> {
        let mut seen = Vec::new();
        collect_arguments(&self.elements, &mut seen);
        seen
    }
}

fn collect_arguments(elements: &[Element], seen: &mut Vec<(String, ArgumentFormat)>) {
    for element in elements {
        let (id, format) = match element {
            Element::Argument { id } => (id, ArgumentFormat::Plain),
            Element::Number { id, style } => (id, ArgumentFormat::Number(style.clone())),
            Element::Plural { id, .. } => (id, ArgumentFormat::Plural),
            Element::Select { id, .. } => (id, ArgumentFormat::Select),
            Element::Literal(_) | Element::Pound => continue,
        };

        match seen.iter_mut().find(|(seen_id, _)| seen_id == id) {
            Some(entry) => entry.1 = format,
            None => seen.push((id.clone(), format)),
        }

        match element {
            Element::Plural { options, .. } => {
                for option in options {
                    collect_arguments(&option.elements, seen);
                }
            }
            Element::Select { options, .. } => {
                for option in options {
                    collect_arguments(&option.elements, seen);
                }
            }
            _ => {}
        }
    }
}

// ---------- Parser ----------

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: &str) -> I18nError {
        I18nError::Syntax {
            message: self.source.to_string(),
            reason: reason.to_string(),
            offset: self.pos,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    /// Parses until end of input or an unconsumed `}`.
    fn parse_message(&mut self, in_plural: bool) -> Result<Vec<Element>> {
        let mut elements = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            match c {
                '{' => {
                    flush_literal(&mut text, &mut elements);
                    elements.push(self.parse_argument()?);
                }
                '}' => break,
                '#' if in_plural => {
                    self.bump();
                    flush_literal(&mut text, &mut elements);
                    elements.push(Element::Pound);
                }
                '\'' => {
                    self.bump();
                    self.parse_apostrophe(in_plural, &mut text);
                }
                _ => {
                    self.bump();
                    text.push(c);
                }
            }
        }

        flush_literal(&mut text, &mut elements);
        Ok(elements)
    }

    // The opening apostrophe has already been consumed.
    fn parse_apostrophe(&mut self, in_plural: bool, text: &mut String) {
        match self.peek() {
            Some('\'') => {
                self.bump();
                text.push('\'');
            }
            Some(c) if c == '{' || c == '}' || (in_plural && c == '#') => {
                while let Some(c) = self.bump() {
                    if c != '\'' {
                        text.push(c);
                        continue;
                    }
                    if self.peek() == Some('\'') {
                        self.bump();
                        text.push('\'');
                    } else {
                        break;
                    }
                }
            }
            _ => text.push('\''),
        }
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '{' | '}' | ',' | '#' | '\'' | '=') {
                break;
            }
            self.bump();
        }
        if start == self.pos {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn parse_decimal(&mut self) -> Result<f64> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '-')
        {
            self.bump();
        }
        self.source[start..self.pos]
            .parse()
            .map_err(|_| self.error("expected a number"))
    }

    fn parse_argument(&mut self) -> Result<Element> {
        self.expect('{')?;
        self.skip_whitespace();
        let id = self.parse_identifier()?;
        self.skip_whitespace();

        match self.bump() {
            Some('}') => return Ok(Element::Argument { id }),
            Some(',') => {}
            _ => return Err(self.error("expected ',' or '}' after argument name")),
        }

        self.skip_whitespace();
        let kind = self.parse_identifier()?;
        self.skip_whitespace();

        let element = match kind.as_str() {
            "number" => {
                let style = if self.peek() == Some(',') {
                    self.bump();
                    self.skip_whitespace();
                    let name = self.parse_identifier()?;
                    self.skip_whitespace();
                    NumberStyle::from_name(&name)
                } else {
                    NumberStyle::Default
                };
                Element::Number { id, style }
            }
            "plural" | "selectordinal" => {
                self.expect(',')?;
                let kind = if kind == "plural" {
                    PluralKind::Cardinal
                } else {
                    PluralKind::Ordinal
                };
                let (offset, options) = self.parse_plural_options()?;
                Element::Plural {
                    id,
                    kind,
                    offset,
                    options,
                }
            }
            "select" => {
                self.expect(',')?;
                let options = self.parse_select_options()?;
                Element::Select { id, options }
            }
            _ => return Err(self.error(&format!("unsupported argument type '{kind}'"))),
        };

        self.expect('}')?;
        Ok(element)
    }

    fn parse_plural_options(&mut self) -> Result<(f64, Vec<PluralOption>)> {
        self.skip_whitespace();
        let mut offset = 0.0;
        if self.source[self.pos..].starts_with("offset:") {
            self.pos += "offset:".len();
            self.skip_whitespace();
            offset = self.parse_decimal()?;
        }

        let mut options: Vec<PluralOption> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => break,
                None => return Err(self.error("unterminated plural argument")),
                _ => {}
            }

            let selector = if self.peek() == Some('=') {
                self.bump();
                PluralSelector::Exact(self.parse_decimal()?)
            } else {
                PluralSelector::Category(self.parse_identifier()?)
            };
            if options.iter().any(|option| option.selector == selector) {
                return Err(self.error("duplicate plural selector"));
            }

            self.skip_whitespace();
            self.expect('{')?;
            let elements = self.parse_message(true)?;
            self.expect('}')?;
            options.push(PluralOption { selector, elements });
        }

        let has_other = options
            .iter()
            .any(|option| matches!(&option.selector, PluralSelector::Category(c) if c == "other"));
        if !has_other {
            return Err(self.error("plural argument requires an 'other' option"));
        }
        Ok((offset, options))
    }

    fn parse_select_options(&mut self) -> Result<Vec<SelectOption>> {
        let mut options: Vec<SelectOption> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => break,
                None => return Err(self.error("unterminated select argument")),
                _ => {}
            }

            let key = self.parse_identifier()?;
            if options.iter().any(|option| option.key == key) {
                return Err(self.error("duplicate select key"));
            }
            self.skip_whitespace();
            self.expect('{')?;
            let elements = self.parse_message(false)?;
            self.expect('}')?;
            options.push(SelectOption { key, elements });
        }

        if !options.iter().any(|option| option.key == "other") {
            return Err(self.error("select argument requires an 'other' option"));
        }
        Ok(options)
    }
}

fn flush_literal(text: &mut String, elements: &mut Vec<Element>) {
    if !text.is_empty() {
        elements.push(Element::Literal(std::mem::take(text)));
    }
}
