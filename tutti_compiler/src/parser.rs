use tutti_schema::Accidental;

use crate::ast::{InstrumentCall, MusicData, NameToken, Node, ParseTree, TopLevel};
use crate::CompileError;

pub fn parse_score(src: &str) -> Result<ParseTree, CompileError> {
    let mut p = Parser::new(src);
    let mut children = Vec::new();

    p.skip_trivia();
    let mut globals = Vec::new();
    while p.peek() == Some('(') {
        globals.push(p.attribute_change()?);
        p.skip_trivia();
    }
    if !globals.is_empty() {
        children.push(TopLevel::GlobalAttributes(globals));
    }

    while !p.at_end() {
        children.push(TopLevel::Call(p.instrument_call()?));
    }

    Ok(ParseTree { children })
}

/// Parses `src` as a continuation of an instrument's music data, without a
/// call header.
pub fn parse_music_data(src: &str) -> Result<MusicData, CompileError> {
    let mut p = Parser::new(src);
    p.events(false)
}

struct Parser {
    chars: Vec<char>,
    /// Char offset at which each line begins.
    line_starts: Vec<usize>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        let chars: Vec<char> = src.chars().collect();
        let line_starts = std::iter::once(0)
            .chain(
                chars
                    .iter()
                    .enumerate()
                    .filter(|(_, &c)| c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self {
            chars,
            line_starts,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn line_col(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.chars.len());
        let line = self.line_starts.partition_point(|&start| start <= pos);
        (line, pos - self.line_starts[line - 1] + 1)
    }

    fn current_line_text(&self) -> String {
        let (line, _) = self.line_col(self.pos);
        let start = self.line_starts[line - 1];
        self.chars[start..]
            .iter()
            .take_while(|&&c| c != '\n')
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn error(&self, code: &'static str, message: impl Into<String>) -> CompileError {
        let (line, col) = self.line_col(self.pos);
        CompileError::new(code, message, line)
            .with_column(col)
            .with_context(self.current_line_text())
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn instrument_call(&mut self) -> Result<InstrumentCall, CompileError> {
        let (line, _) = self.line_col(self.pos);
        let Some(names) = self.call_header() else {
            return Err(self.error(
                "E1003",
                "expected instrument call header (e.g. `piano:`)",
            ));
        };
        let music = self.events(true)?;
        Ok(InstrumentCall { line, names, music })
    }

    /// Tries to read `name ('/' name)* nickname? ':'`. Restores the position
    /// and returns `None` when the input does not start with a header.
    fn call_header(&mut self) -> Option<Vec<NameToken>> {
        let start = self.pos;
        let names = self.call_header_inner();
        if names.is_none() {
            self.pos = start;
        }
        names
    }

    fn call_header_inner(&mut self) -> Option<Vec<NameToken>> {
        let mut names = vec![NameToken::Name(self.name()?)];
        loop {
            self.skip_trivia();
            if self.peek() != Some('/') {
                break;
            }
            self.bump();
            self.skip_trivia();
            names.push(NameToken::Name(self.name()?));
        }

        if self.peek() == Some('"') {
            self.bump();
            let nickname = self.name()?;
            if self.bump() != Some('"') {
                return None;
            }
            names.push(NameToken::Nickname(nickname));
            self.skip_trivia();
        }

        if self.bump() != Some(':') {
            return None;
        }
        self.skip_trivia();
        Some(names)
    }

    fn at_call_header(&mut self) -> bool {
        let start = self.pos;
        let found = self.call_header().is_some();
        self.pos = start;
        found
    }

    fn name(&mut self) -> Option<String> {
        let first = self.peek()?;
        let second = self.peek_at(1)?;
        if !first.is_ascii_alphabetic() || !second.is_ascii_alphabetic() {
            return None;
        }
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '\'' | '+') {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        Some(out)
    }

    fn events(&mut self, stop_at_header: bool) -> Result<MusicData, CompileError> {
        let mut events = Vec::new();
        loop {
            self.skip_trivia();
            if self.at_end() || (stop_at_header && self.at_call_header()) {
                break;
            }
            events.push(self.event()?);
        }
        Ok(MusicData(events))
    }

    fn event(&mut self) -> Result<Node, CompileError> {
        match self.peek() {
            Some('a'..='g') => {
                let first = self.note()?;
                if self.peek() != Some('/') {
                    return Ok(first);
                }
                let mut notes = vec![first];
                while self.peek() == Some('/') {
                    self.bump();
                    if !matches!(self.peek(), Some('a'..='g')) {
                        return Err(self.error("E1001", "expected a note after '/' in chord"));
                    }
                    notes.push(self.note()?);
                }
                Ok(Node::Chord(notes))
            }
            Some('r') => {
                self.bump();
                Ok(Node::Rest {
                    duration: self.duration()?.map(Box::new),
                })
            }
            Some('(') => self.attribute_change(),
            Some('o') if matches!(self.peek_at(1), Some('0'..='9')) => {
                self.bump();
                Ok(Node::OctaveSet(Box::new(Node::Number(self.digits()))))
            }
            Some('>') => {
                self.bump();
                Ok(Node::OctaveUp)
            }
            Some('<') => {
                self.bump();
                Ok(Node::OctaveDown)
            }
            Some('|') => {
                self.bump();
                Ok(Node::Barline)
            }
            Some(c) => Err(self.error("E1001", format!("unexpected character '{c}'"))),
            None => Err(self.error("E1001", "unexpected end of input")),
        }
    }

    fn note(&mut self) -> Result<Node, CompileError> {
        let letter = self
            .bump()
            .ok_or_else(|| self.error("E1001", "expected a note letter"))?;
        let mut accidentals = Vec::new();
        while let Some(c) = self.peek() {
            let accidental = match c {
                '+' => Accidental::Sharp,
                '-' => Accidental::Flat,
                '_' => Accidental::Natural,
                _ => break,
            };
            accidentals.push(accidental);
            self.pos += 1;
        }
        Ok(Node::Note {
            letter,
            accidentals,
            duration: self.duration()?.map(Box::new),
        })
    }

    /// `note-length? ('~' note-length)* '~'?` where a trailing `~` is a slur.
    fn duration(&mut self) -> Result<Option<Node>, CompileError> {
        let mut components = Vec::new();
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            components.push(self.note_length());
        }
        while self.peek() == Some('~') {
            self.bump();
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                components.push(Node::Tie);
                components.push(self.note_length());
            } else {
                components.push(Node::Slur);
                break;
            }
        }
        if components.is_empty() {
            return Ok(None);
        }
        Ok(Some(Node::Duration(components)))
    }

    fn note_length(&mut self) -> Node {
        let number = Node::Number(self.digits());
        let mut dots = String::new();
        while self.peek() == Some('.') {
            dots.push('.');
            self.pos += 1;
        }
        Node::NoteLength {
            number: Box::new(number),
            dots: (!dots.is_empty()).then(|| Box::new(Node::Dots(dots))),
        }
    }

    fn digits(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn attribute_change(&mut self) -> Result<Node, CompileError> {
        self.bump();
        self.skip_trivia();
        let attribute = self
            .name()
            .ok_or_else(|| self.error("E1001", "expected attribute name after '('"))?;
        self.skip_trivia();

        let value = match self.peek() {
            Some(c) if c.is_ascii_digit() => Node::Number(self.digits()),
            Some('-') if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.bump();
                Node::Number(format!("-{}", self.digits()))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let mut word = String::new();
                while let Some(c) = self
                    .peek()
                    .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '-' | '_'))
                {
                    word.push(c);
                    self.pos += 1;
                }
                Node::Word(word)
            }
            _ => {
                return Err(self.error(
                    "E1002",
                    format!("missing value for attribute change ({attribute})"),
                ))
            }
        };

        self.skip_trivia();
        if self.bump() != Some(')') {
            return Err(self.error(
                "E1002",
                format!("unterminated attribute change ({attribute})"),
            ));
        }
        Ok(Node::AttributeChange {
            attribute,
            value: Box::new(value),
        })
    }
}
