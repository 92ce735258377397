use console::{style, StyledObject};
use std::fmt::Display;

use crate::build::PhaseVerdict;

pub fn success(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn failure(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().underlined()
}

pub fn dim(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn banner(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// Colour matching a phase verdict.
pub fn verdict(verdict: PhaseVerdict, text: impl Display) -> StyledObject<String> {
    match verdict {
        PhaseVerdict::Success => success(text),
        PhaseVerdict::Failed => failure(text),
        PhaseVerdict::InProgress => pending(text),
    }
}
