use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use tutti_schema::Instance;

use crate::ast::{InstrumentCall, NameToken, ResolvedCall, Score};
use crate::CompileError;

/// Name bindings threaded through the resolver, one step per instrument call.
///
/// `table` maps every base name and nickname seen so far to the instances it
/// currently denotes; `nicknames` holds only the nickname entries. `score`
/// collects the rewritten calls of the current run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionState {
    pub table: HashMap<String, Vec<Instance>>,
    pub nicknames: HashMap<String, Vec<Instance>>,
    #[serde(skip)]
    pub score: Vec<ResolvedCall>,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&[Instance]> {
        self.table.get(name).map(Vec::as_slice)
    }

    /// Resolves `call` against the current bindings and returns the advanced
    /// state with the rewritten call appended to `score`.
    pub fn step(mut self, call: InstrumentCall) -> Result<Self, CompileError> {
        let nickname = single_nickname(&call)?;

        if let Some(nick) = nickname {
            if call.base_names().any(|n| n == nick) {
                return Err(CompileError::new(
                    "E3001",
                    format!("nickname \"{nick}\" is also used as an instrument name in the same call"),
                    call.line,
                )
                .with_context(nick.to_string()));
            }
        }

        let resolutions: Vec<(&str, Vec<Instance>)> = call
            .base_names()
            .map(|name| (name, self.resolve_name(name, nickname.is_some())))
            .collect();

        let whole_group: Vec<Instance> = resolutions
            .iter()
            .flat_map(|(_, set)| set.iter().cloned())
            .collect();
        if whole_group.is_empty() {
            return Err(CompileError::new(
                "E3003",
                "instrument call resolved to no instance",
                call.line,
            ));
        }

        for (name, set) in resolutions {
            self.table.insert(name.to_string(), set);
        }
        if let Some(nick) = nickname {
            self.table.insert(nick.to_string(), whole_group.clone());
            self.nicknames.insert(nick.to_string(), whole_group.clone());
        }

        trace!(
            "line {}: {} -> [{}]",
            call.line,
            describe_names(&call.names),
            whole_group
                .iter()
                .map(Instance::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.score.push(ResolvedCall {
            line: call.line,
            instances: whole_group,
            music: call.music,
        });
        Ok(self)
    }

    fn resolve_name(&self, name: &str, nicknamed: bool) -> Vec<Instance> {
        if !nicknamed {
            return self
                .table
                .get(name)
                .cloned()
                .unwrap_or_else(|| vec![Instance::new(name, 1)]);
        }

        if let Some(set) = self.nicknames.get(name) {
            return set.clone();
        }
        vec![Instance::new(name, self.max_number(name) + 1)]
    }

    fn max_number(&self, name: &str) -> u32 {
        self.table
            .values()
            .flatten()
            .filter(|i| i.name == name)
            .map(|i| i.number)
            .max()
            .unwrap_or(0)
    }

    /// Splits off the rewritten calls; the returned state keeps only the
    /// bindings, ready to be re-injected into a later run.
    pub fn finish(mut self) -> (Vec<ResolvedCall>, Self) {
        let score = std::mem::take(&mut self.score);
        (score, self)
    }
}

fn single_nickname(call: &InstrumentCall) -> Result<Option<&str>, CompileError> {
    let mut nicknames = call.names.iter().filter_map(|t| match t {
        NameToken::Nickname(n) => Some(n.as_str()),
        NameToken::Name(_) => None,
    });
    let first = nicknames.next();
    if let Some(second) = nicknames.next() {
        return Err(CompileError::new(
            "E3002",
            format!(
                "instrument call carries more than one nickname (\"{}\", \"{second}\")",
                first.unwrap_or_default()
            ),
            call.line,
        ));
    }
    Ok(first)
}

fn describe_names(names: &[NameToken]) -> String {
    names
        .iter()
        .map(|t| match t {
            NameToken::Name(n) => n.clone(),
            NameToken::Nickname(n) => format!("\"{n}\""),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolves every call of `score` in document order, starting from `state`.
pub fn resolve_instances(
    score: Score,
    state: ResolutionState,
) -> Result<(Vec<ResolvedCall>, ResolutionState), CompileError> {
    let state = score.calls.into_iter().try_fold(state, ResolutionState::step)?;
    debug!(
        "resolved {} call(s), {} name binding(s)",
        state.score.len(),
        state.table.len()
    );
    Ok(state.finish())
}
