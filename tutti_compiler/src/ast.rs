use serde::{Deserialize, Serialize};
use tutti_schema::{Accidental, Instance};

/// Raw parser output: the top-level children of a score in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseTree {
    pub children: Vec<TopLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopLevel {
    GlobalAttributes(Vec<Node>),
    Call(InstrumentCall),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentCall {
    pub line: usize,
    pub names: Vec<NameToken>,
    pub music: MusicData,
}

impl InstrumentCall {
    pub fn nickname(&self) -> Option<&str> {
        self.names.iter().find_map(|t| match t {
            NameToken::Nickname(n) => Some(n.as_str()),
            NameToken::Name(_) => None,
        })
    }

    pub fn base_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|t| match t {
            NameToken::Name(n) => Some(n.as_str()),
            NameToken::Nickname(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameToken {
    Name(String),
    Nickname(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicData(pub Vec<Node>);

/// Hoisted score: only instrument calls remain at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub calls: Vec<InstrumentCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCall {
    pub line: usize,
    pub instances: Vec<Instance>,
    pub music: MusicData,
}

/// One variant per event node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    AttributeChanges(Vec<Node>),
    AttributeChange { attribute: String, value: Box<Node> },
    Note {
        letter: char,
        accidentals: Vec<Accidental>,
        duration: Option<Box<Node>>,
    },
    Rest { duration: Option<Box<Node>> },
    Chord(Vec<Node>),
    OctaveSet(Box<Node>),
    OctaveUp,
    OctaveDown,
    Barline,
    Duration(Vec<Node>),
    NoteLength {
        number: Box<Node>,
        dots: Option<Box<Node>>,
    },
    Number(String),
    Dots(String),
    Word(String),
    Tie,
    Slur,
}
