use std::str::FromStr;

use crate::control::{Control, InputState};

/// Errors produced while parsing an [`InputScript`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown control: {0:?}")]
    UnknownControl(String),
    #[error("invalid repeat count in segment {segment:?}")]
    InvalidCount { segment: String },
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
}

/// A sequence of input states, one per tick, for driving the simulation
/// without a keyboard.
///
/// Text form is a comma-separated list of segments. Each segment is a
/// `+`-joined set of controls (or `none`) with an optional `*count` repeat:
///
/// ```text
/// forward*60, forward+left*30, none*120
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputScript {
    segments: Vec<(InputState, u32)>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `frames` ticks holding `input`.
    pub fn hold(mut self, input: InputState, frames: u32) -> Self {
        if frames > 0 {
            self.segments.push((input, frames));
        }
        self
    }

    pub fn segments(&self) -> &[(InputState, u32)] {
        &self.segments
    }

    /// Total number of ticks the script covers.
    pub fn len(&self) -> u64 {
        self.segments.iter().map(|(_, n)| u64::from(*n)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Expand into one input state per tick.
    pub fn frames(&self) -> impl Iterator<Item = InputState> + '_ {
        self.segments
            .iter()
            .flat_map(|(input, n)| std::iter::repeat_n(*input, *n as usize))
    }
}

fn parse_segment(index: usize, raw: &str) -> Result<(InputState, u32), ScriptError> {
    let segment = raw.trim();
    if segment.is_empty() {
        return Err(ScriptError::EmptySegment(index));
    }

    let (controls, count) = match segment.split_once('*') {
        Some((controls, count)) => {
            let count = count
                .trim()
                .parse::<u32>()
                .map_err(|_| ScriptError::InvalidCount {
                    segment: segment.to_string(),
                })?;
            (controls.trim(), count)
        }
        None => (segment, 1),
    };

    if controls.is_empty() {
        return Err(ScriptError::EmptySegment(index));
    }
    if controls.eq_ignore_ascii_case("none") {
        return Ok((InputState::NONE, count));
    }

    let input = controls
        .split('+')
        .map(Control::from_str)
        .collect::<Result<InputState, _>>()?;
    Ok((input, count))
}

impl FromStr for InputScript {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut script = InputScript::new();
        if s.trim().is_empty() {
            return Ok(script);
        }
        for (index, raw) in s.split(',').enumerate() {
            let (input, count) = parse_segment(index, raw)?;
            script = script.hold(input, count);
        }
        tracing::debug!(
            segments = script.segments.len(),
            frames = script.len(),
            "parsed input script"
        );
        Ok(script)
    }
}
