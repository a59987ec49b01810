use std::fmt;
use std::time::Duration;

use crate::param::{ParamId, ParameterClass};

/// Longest fade a command may request, in seconds.
pub const MAX_FADE_SECS: f32 = 60.0;

/// A numeric command argument as it arrived on the wire.
///
/// Show controllers send either integer or float encodings for the same
/// field; both are accepted and normalized to `f32` here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeArg {
    Int(i32),
    Float(f32),
}

impl FadeArg {
    pub fn to_f32(self) -> f32 {
        match self {
            FadeArg::Int(v) => v as f32,
            FadeArg::Float(v) => v,
        }
    }

    /// The argument as an id, if it holds a whole number.
    ///
    /// Ids sent as whole-number floats (`5.0`) are accepted alongside ints;
    /// `5.5` is not an id.
    pub fn to_index(self) -> Option<i64> {
        match self {
            FadeArg::Int(v) => Some(v as i64),
            FadeArg::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
            FadeArg::Float(_) => None,
        }
    }
}

impl fmt::Display for FadeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FadeArg::Int(v) => write!(f, "{}", v),
            FadeArg::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Why a fade command was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    MissingArgument { expected: usize, got: usize },
    /// Argument at this position is neither an integer nor a float.
    UnsupportedArgument(usize),
    IndexNotInteger(FadeArg),
    IndexOutOfRange { class: ParameterClass, index: i64 },
    TargetOutOfRange(f32),
    DurationOutOfRange(f32),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument { expected, got } => {
                write!(f, "expected {} arguments, got {}", expected, got)
            }
            Self::UnsupportedArgument(pos) => {
                write!(f, "invalid argument format at position {}", pos)
            }
            Self::IndexNotInteger(arg) => write!(f, "ID is not an integer: {}", arg),
            Self::IndexOutOfRange { class, index } => write!(
                f,
                "ID out of range for {} (1..={}): {}",
                class.name(),
                class.count(),
                index
            ),
            Self::TargetOutOfRange(v) => write!(f, "target out of range (0..=1): {}", v),
            Self::DurationOutOfRange(v) => {
                write!(f, "duration out of range (0..={}): {}", MAX_FADE_SECS, v)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// A validated request to fade one fader to `target` over `duration` seconds.
///
/// Only `validate` builds one, so `target` is always in 0..=1 and `duration`
/// in 0..=`MAX_FADE_SECS`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeCommand {
    id: ParamId,
    target: f32,
    duration: f32,
}

impl FadeCommand {
    /// Validate raw `[id, target, duration]` arguments for `class`.
    ///
    /// Checks run in order (id shape, id range, target, duration) and the
    /// first failure is returned. Extra trailing arguments are ignored.
    pub fn validate(class: ParameterClass, args: &[FadeArg]) -> Result<Self, CommandError> {
        let [raw_id, raw_target, raw_duration] = match args {
            [a, b, c, ..] => [*a, *b, *c],
            _ => {
                return Err(CommandError::MissingArgument {
                    expected: 3,
                    got: args.len(),
                })
            }
        };

        let index = raw_id
            .to_index()
            .ok_or(CommandError::IndexNotInteger(raw_id))?;
        let id = ParamId::new(class, index)
            .ok_or(CommandError::IndexOutOfRange { class, index })?;

        let target = raw_target.to_f32();
        if !(0.0..=1.0).contains(&target) {
            return Err(CommandError::TargetOutOfRange(target));
        }

        let duration = raw_duration.to_f32();
        if !(0.0..=MAX_FADE_SECS).contains(&duration) {
            return Err(CommandError::DurationOutOfRange(duration));
        }

        Ok(Self {
            id,
            target,
            duration,
        })
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f32(self.duration)
    }
}
