use tutti_schema::{Expr, Instance, Part};

use crate::ast::Node;
use crate::CompileError;

/// Projects the consolidated events of `instance` into a part expression.
pub fn project_part(instance: &Instance, events: &[Node]) -> Result<Part, CompileError> {
    let events = project_events(events).map_err(|e| e.with_instance(instance.clone()))?;
    Ok(Part {
        instrument: instance.name.clone(),
        number: instance.number,
        events,
    })
}

pub fn project_events(events: &[Node]) -> Result<Vec<Expr>, CompileError> {
    events.iter().map(project_node).collect()
}

fn project_boxed(node: &Node) -> Result<Box<Expr>, CompileError> {
    project_node(node).map(Box::new)
}

fn project_opt(node: &Option<Box<Node>>) -> Result<Option<Box<Expr>>, CompileError> {
    node.as_deref().map(project_boxed).transpose()
}

pub fn project_node(node: &Node) -> Result<Expr, CompileError> {
    Ok(match node {
        Node::Number(text) => Expr::Int {
            value: text.parse().map_err(|_| {
                CompileError::new("E1004", format!("numeric literal out of range: {text}"), 0)
                    .with_context(text.clone())
            })?,
        },
        Node::Dots(text) => Expr::Dots {
            count: text.chars().filter(|&c| c == '.').count() as u32,
        },
        Node::Tie => Expr::Tie,
        Node::Slur => Expr::Slur,
        Node::NoteLength { number, dots } => Expr::NoteLength {
            number: project_boxed(number)?,
            dots: project_opt(dots)?,
        },
        Node::Duration(components) => Expr::Duration {
            components: project_events(components)?,
        },

        Node::AttributeChanges(changes) => Expr::AttributeChanges {
            changes: project_events(changes)?,
        },
        Node::AttributeChange { attribute, value } => Expr::AttributeChange {
            attribute: attribute.clone(),
            value: project_boxed(value)?,
        },
        Node::Note {
            letter,
            accidentals,
            duration,
        } => Expr::Note {
            letter: *letter,
            accidentals: accidentals.clone(),
            duration: project_opt(duration)?,
        },
        Node::Rest { duration } => Expr::Rest {
            duration: project_opt(duration)?,
        },
        Node::Chord(notes) => Expr::Chord {
            notes: project_events(notes)?,
        },
        Node::OctaveSet(octave) => Expr::OctaveSet {
            octave: project_boxed(octave)?,
        },
        Node::OctaveUp => Expr::OctaveUp,
        Node::OctaveDown => Expr::OctaveDown,
        Node::Barline => Expr::Barline,
        Node::Word(value) => Expr::Word {
            value: value.clone(),
        },
    })
}
