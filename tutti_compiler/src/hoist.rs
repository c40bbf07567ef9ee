use log::{debug, warn};

use crate::ast::{Node, ParseTree, Score, TopLevel};
use crate::CompileError;

/// Moves a leading global attribute block into the music data of the first
/// instrument call, as a leading `AttributeChanges` node.
pub fn hoist_global_attributes(tree: ParseTree) -> Result<Score, CompileError> {
    let mut children = tree.children.into_iter().peekable();

    let globals = children
        .next_if(|c| matches!(c, TopLevel::GlobalAttributes(_)))
        .and_then(|c| match c {
            TopLevel::GlobalAttributes(attrs) => Some(attrs),
            TopLevel::Call(_) => None,
        });

    let mut calls = Vec::new();
    for child in children {
        match child {
            TopLevel::Call(call) => calls.push(call),
            TopLevel::GlobalAttributes(_) => {
                let line = calls.last().map(|c| c.line).unwrap_or(0);
                return Err(CompileError::new(
                    "E1005",
                    "global attributes must precede the first instrument call",
                    line,
                ));
            }
        }
    }

    if let Some(attrs) = globals {
        match calls.first_mut() {
            Some(first) => {
                debug!(
                    "hoisting {} global attribute(s) into call at line {}",
                    attrs.len(),
                    first.line
                );
                first.music.0.insert(0, Node::AttributeChanges(attrs));
            }
            None => warn!(
                "dropping {} global attribute(s): score has no instrument call",
                attrs.len()
            ),
        }
    }

    Ok(Score { calls })
}
