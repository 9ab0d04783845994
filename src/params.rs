// src/params.rs
//
// The `-P num=value` parameter-override table.
//
// Eleven identifiers, each mapped to one Run Descriptor field. Identifiers
// 1..=9 carry integer values, 10..=11 floating-point values; the grammar
// picks the literal parser from the identifier before dispatch, so a
// mismatched value kind reaching `apply` is a contract violation, not a
// usage error.

use serde::{Deserialize, Serialize};

use crate::descriptor::RunDescriptor;
use crate::errors::ResolveError;

/// Lowest valid `-P` identifier.
pub const MIN_PARAM: i64 = 1;
/// Highest valid `-P` identifier.
pub const MAX_PARAM: i64 = 11;
/// Identifiers at or below this parse their value as an integer; the rest
/// parse as floating point.
pub const MAX_INT_PARAM: i64 = 9;

/// One overridable parameter, by its `-P` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamId {
    BlockFrequencyBlockLength,
    NonOverlappingTemplateLength,
    OverlappingTemplateLength,
    ApproximateEntropyBlockLength,
    SerialBlockLength,
    LinearComplexitySequenceLength,
    Iterations,
    UniformityBins,
    BitsPerStream,
    UniformityLevel,
    Alpha,
}

impl ParamId {
    /// Map a raw `-P` identifier to its parameter, if in range.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(ParamId::BlockFrequencyBlockLength),
            2 => Some(ParamId::NonOverlappingTemplateLength),
            3 => Some(ParamId::OverlappingTemplateLength),
            4 => Some(ParamId::ApproximateEntropyBlockLength),
            5 => Some(ParamId::SerialBlockLength),
            6 => Some(ParamId::LinearComplexitySequenceLength),
            7 => Some(ParamId::Iterations),
            8 => Some(ParamId::UniformityBins),
            9 => Some(ParamId::BitsPerStream),
            10 => Some(ParamId::UniformityLevel),
            11 => Some(ParamId::Alpha),
            _ => None,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            ParamId::BlockFrequencyBlockLength => 1,
            ParamId::NonOverlappingTemplateLength => 2,
            ParamId::OverlappingTemplateLength => 3,
            ParamId::ApproximateEntropyBlockLength => 4,
            ParamId::SerialBlockLength => 5,
            ParamId::LinearComplexitySequenceLength => 6,
            ParamId::Iterations => 7,
            ParamId::UniformityBins => 8,
            ParamId::BitsPerStream => 9,
            ParamId::UniformityLevel => 10,
            ParamId::Alpha => 11,
        }
    }

    /// True for the two floating-point parameters (ids 10 and 11).
    pub fn takes_float(self) -> bool {
        self.index() > MAX_INT_PARAM
    }
}

/// A parsed override value, integer or floating point per the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

/// One `id=value` sub-token of a `-P` flag, fully parsed and range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamAssignment {
    pub id: ParamId,
    pub value: ParamValue,
}

impl ParamAssignment {
    /// Parse one `id=value` sub-token. The value literal is parsed as an
    /// integer or a float depending on the identifier. Both literals are
    /// strict: no whitespace around the `=` or inside either side.
    ///
    /// Returns a human-readable cause quoting the offending token, suitable
    /// for a usage error (this is also the clap value-parser signature).
    pub fn parse(token: &str) -> Result<Self, String> {
        let (id_text, value_text) = token.split_once('=').ok_or_else(|| {
            format!(
                "failed to parse num=value, expecting integer=value: {}",
                token
            )
        })?;
        let index: i64 = id_text.parse().map_err(|_| {
            format!(
                "failed to parse num=value, expecting integer=value: {}",
                token
            )
        })?;
        let id = ParamId::from_index(index).ok_or_else(|| {
            format!(
                "num: {} must be in the range [{}-{}]",
                index, MIN_PARAM, MAX_PARAM
            )
        })?;
        let value = if id.takes_float() {
            let v: f64 = value_text.parse().map_err(|_| {
                format!("failed to parse num=value, expecting integer=float: {}", token)
            })?;
            ParamValue::Float(v)
        } else {
            let v: i64 = value_text.parse().map_err(|_| {
                format!(
                    "failed to parse num=value, expected integer=integer: {}",
                    token
                )
            })?;
            ParamValue::Int(v)
        };
        Ok(Self { id, value })
    }

    /// Store the override into its one mapped descriptor field.
    ///
    /// Overriding the iteration count through the table also marks the
    /// uniformity bins as customized; the original tool behaves this way
    /// and downstream assessments depend on the parity (see DESIGN.md).
    pub fn apply(self, desc: &mut RunDescriptor) -> Result<(), ResolveError> {
        let int = |value: ParamValue| match value {
            ParamValue::Int(v) => Ok(v),
            ParamValue::Float(_) => Err(ResolveError::contract(format!(
                "float value supplied for integer parameter {}",
                self.id.index()
            ))),
        };
        let float = |value: ParamValue| match value {
            ParamValue::Float(v) => Ok(v),
            ParamValue::Int(_) => Err(ResolveError::contract(format!(
                "integer value supplied for float parameter {}",
                self.id.index()
            ))),
        };

        match self.id {
            ParamId::BlockFrequencyBlockLength => {
                desc.params.block_frequency_block_length = int(self.value)?;
            }
            ParamId::NonOverlappingTemplateLength => {
                desc.params.non_overlapping_template_length = int(self.value)?;
            }
            ParamId::OverlappingTemplateLength => {
                desc.params.overlapping_template_length = int(self.value)?;
            }
            ParamId::ApproximateEntropyBlockLength => {
                desc.params.approximate_entropy_block_length = int(self.value)?;
            }
            ParamId::SerialBlockLength => {
                desc.params.serial_block_length = int(self.value)?;
            }
            ParamId::LinearComplexitySequenceLength => {
                desc.params.linear_complexity_sequence_length = int(self.value)?;
            }
            ParamId::Iterations => {
                desc.flags.uniformity_bins = true;
                desc.params.iterations = int(self.value)?;
            }
            ParamId::UniformityBins => {
                desc.flags.uniformity_bins = true;
                desc.params.uniformity_bins = int(self.value)?;
            }
            ParamId::BitsPerStream => {
                desc.params.bits_per_stream = int(self.value)?;
            }
            ParamId::UniformityLevel => {
                desc.params.uniformity_level = float(self.value)?;
            }
            ParamId::Alpha => {
                desc.params.alpha = float(self.value)?;
            }
        }
        Ok(())
    }
}
