use serde::{Deserialize, Serialize};
use std::fmt;

/// A numbered occurrence of a base instrument, e.g. `clarinet-2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub number: u32,
}

impl Instance {
    pub fn new(name: impl Into<String>, number: u32) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Sharp,
    Flat,
    Natural,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CompiledScore {
    pub parts: Vec<Part>,
}

impl CompiledScore {
    pub fn part(&self, instance: &Instance) -> Option<&Part> {
        self.parts
            .iter()
            .find(|p| p.instrument == instance.name && p.number == instance.number)
    }

    pub fn instances(&self) -> Vec<Instance> {
        self.parts.iter().map(Part::instance).collect()
    }
}

/// The projected event stream of one instance. `instrument` and `number`
/// form the head of the part expression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub instrument: String,
    pub number: u32,
    pub events: Vec<Expr>,
}

impl Part {
    pub fn instance(&self) -> Instance {
        Instance::new(self.instrument.clone(), self.number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Expr {
    AttributeChanges {
        changes: Vec<Expr>,
    },
    AttributeChange {
        attribute: String,
        value: Box<Expr>,
    },
    Note {
        letter: char,
        #[serde(default)]
        accidentals: Vec<Accidental>,
        #[serde(default)]
        duration: Option<Box<Expr>>,
    },
    Rest {
        #[serde(default)]
        duration: Option<Box<Expr>>,
    },
    Chord {
        notes: Vec<Expr>,
    },
    OctaveSet {
        octave: Box<Expr>,
    },
    OctaveUp,
    OctaveDown,
    Barline,
    Duration {
        components: Vec<Expr>,
    },
    NoteLength {
        number: Box<Expr>,
        #[serde(default)]
        dots: Option<Box<Expr>>,
    },
    Int {
        value: i64,
    },
    Dots {
        count: u32,
    },
    Word {
        value: String,
    },
    Tie,
    Slur,
}

impl Expr {
    /// Integer payload of an `Int` node.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Expr::Int { value } => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expr_serialization_includes_type_tag() {
        let expr = Expr::NoteLength {
            number: Box::new(Expr::Int { value: 8 }),
            dots: Some(Box::new(Expr::Dots { count: 2 })),
        };

        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["type"], "note-length");
        assert_eq!(json["number"]["type"], "int");
        assert_eq!(json["number"]["value"], 8);
        assert_eq!(json["dots"]["count"], 2);
    }

    #[test]
    fn note_accidentals_and_duration_default_empty() {
        let v = serde_json::json!({
            "type": "note",
            "letter": "c"
        });

        let expr: Expr = serde_json::from_value(v).unwrap();
        match expr {
            Expr::Note {
                letter,
                accidentals,
                duration,
            } => {
                assert_eq!(letter, 'c');
                assert!(accidentals.is_empty());
                assert!(duration.is_none());
            }
            _ => panic!("unexpected expr"),
        }
    }

    #[test]
    fn part_lookup_by_instance() {
        let score = CompiledScore {
            parts: vec![
                Part {
                    instrument: "clarinet".to_string(),
                    number: 1,
                    events: vec![],
                },
                Part {
                    instrument: "clarinet".to_string(),
                    number: 2,
                    events: vec![Expr::Tie, Expr::Slur],
                },
            ],
        };

        let part = score.part(&Instance::new("clarinet", 2)).unwrap();
        assert_eq!(part.events.len(), 2);
        assert!(score.part(&Instance::new("oboe", 1)).is_none());
        assert_eq!(
            score.instances(),
            vec![Instance::new("clarinet", 1), Instance::new("clarinet", 2)]
        );
        assert_eq!(Instance::new("clarinet", 2).to_string(), "clarinet-2");
    }

    #[test]
    fn compiled_score_roundtrip_minimal() {
        let score = CompiledScore {
            parts: vec![Part {
                instrument: "piano".to_string(),
                number: 1,
                events: vec![Expr::Note {
                    letter: 'c',
                    accidentals: vec![Accidental::Sharp],
                    duration: Some(Box::new(Expr::Duration {
                        components: vec![Expr::NoteLength {
                            number: Box::new(Expr::Int { value: 4 }),
                            dots: None,
                        }],
                    })),
                }],
            }],
        };

        let json = serde_json::to_string(&score).unwrap();
        let back: CompiledScore = serde_json::from_str(&json).unwrap();
        assert_eq!(score, back);
    }
}
