use std::{fs, path::Path};

use log::debug;
use tutti_schema::{CompiledScore, Instance, Part};

pub mod ast;
mod consolidate;
mod duration;
mod error;
mod hoist;
mod parser;
mod project;
mod resolve;

pub use consolidate::{consolidate, InstanceEvents};
pub use duration::{duration_beats, note_length_beats};
pub use error::{CompileError, CompileErrorKind};
pub use hoist::hoist_global_attributes;
pub use parser::{parse_music_data, parse_score};
pub use project::{project_events, project_node, project_part};
pub use resolve::{resolve_instances, ResolutionState};

#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions<'a> {
    /// Bindings from an earlier run; numbering continues from them. The
    /// caller's copy is left untouched, so it survives a failed run.
    pub state: Option<&'a ResolutionState>,
}

#[derive(Debug)]
pub struct Compilation {
    pub score: CompiledScore,
    pub state: ResolutionState,
}

pub fn compile_file(path: impl AsRef<Path>) -> Result<CompiledScore, CompileError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|e| {
        CompileError::new("E2001", format!("failed to read input score: {e}"), 0)
            .with_file(path.display().to_string())
    })?;
    compile_str(&src).map_err(|e| e.with_file(path.display().to_string()))
}

pub fn compile_str(src: &str) -> Result<CompiledScore, CompileError> {
    compile_str_with_options(src, CompileOptions::default()).map(|c| c.score)
}

pub fn compile_str_with_options(
    src: &str,
    options: CompileOptions<'_>,
) -> Result<Compilation, CompileError> {
    let tree = parse_score(src)?;
    debug!("parsed {} top-level node(s)", tree.children.len());

    let score = hoist_global_attributes(tree)?;
    let (resolved, state) = resolve_instances(score, options.state.cloned().unwrap_or_default())?;
    let parts = consolidate(&resolved)
        .iter()
        .map(|entry| project_part(&entry.instance, &entry.events))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Compilation {
        score: CompiledScore { parts },
        state,
    })
}

/// Compiles `src` as a continuation of `instance`'s music data.
pub fn compile_fragment(src: &str, instance: &Instance) -> Result<Part, CompileError> {
    let music = parse_music_data(src)?;
    project_part(instance, &music.0)
}
