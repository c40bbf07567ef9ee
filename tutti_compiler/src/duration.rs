use tutti_schema::Expr;

use crate::CompileError;

/// Beats covered by a note of type `divisor` (4 = quarter) with `dots` dots.
/// Each dot adds half of the previous increment.
pub fn note_length_beats(divisor: u32, dots: u32) -> Result<f64, CompileError> {
    if divisor == 0 {
        return Err(CompileError::new(
            "E4002",
            "note length must have a non-zero divisor",
            0,
        ));
    }
    let base = 4.0 / f64::from(divisor);
    let mut beats = base;
    let mut increment = base;
    for _ in 0..dots {
        increment /= 2.0;
        beats += increment;
    }
    Ok(beats)
}

/// Beats of a projected `Duration` or `NoteLength` expression.
///
/// Only a single note length is supported. Ties, slurs and multi-part
/// durations are rejected until their timing semantics exist.
pub fn duration_beats(expr: &Expr) -> Result<f64, CompileError> {
    match expr {
        Expr::Duration { components } => match components.as_slice() {
            [single @ Expr::NoteLength { .. }] => duration_beats(single),
            _ => Err(unsupported(expr)),
        },
        Expr::NoteLength { number, dots } => {
            let divisor = number
                .as_int()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| unsupported(expr))?;
            let dots = match dots.as_deref() {
                None => 0,
                Some(Expr::Dots { count }) => *count,
                Some(_) => return Err(unsupported(expr)),
            };
            note_length_beats(divisor, dots)
        }
        _ => Err(unsupported(expr)),
    }
}

fn unsupported(expr: &Expr) -> CompileError {
    CompileError::new("E4001", "unsupported duration expression", 0).with_context(format!("{expr:?}"))
}
