//! Layout tags and layout inference.
//!
//! A tag lists primal axes in upper case (`NCHW`) optionally followed by
//! blocked sub-axes written as a factor and the lower-case axis name
//! (`NCHW16c`). The empty tag means "any layout".

use snafu::{OptionExt, ensure};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAxis {
    pub name: char,
    /// Block size of a sub-axis, `None` for primal axes.
    pub factor: Option<usize>,
}

impl LayoutAxis {
    pub fn is_primal(&self) -> bool {
        self.factor.is_none()
    }
}

/// Parsed layout tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    name: String,
    axes: SmallVec<[LayoutAxis; 6]>,
}

impl Layout {
    /// Parse a tag such as `NCHW` or `NCHW16c`.
    ///
    /// Every blocked axis needs a positive factor and a matching primal axis;
    /// no axis may repeat.
    pub fn parse(tag: &str) -> Result<Self> {
        let invalid = || InvalidLayoutSnafu { layout: tag };
        let mut axes: SmallVec<[LayoutAxis; 6]> = SmallVec::new();
        let mut factor: Option<usize> = None;

        for c in tag.chars() {
            if let Some(digit) = c.to_digit(10) {
                let f = factor.unwrap_or(0).checked_mul(10).and_then(|f| f.checked_add(digit as usize));
                factor = Some(f.context(invalid())?);
                continue;
            }
            ensure!(c.is_ascii_alphabetic(), invalid());
            ensure!(!axes.iter().any(|a| a.name == c), invalid());
            if c.is_ascii_uppercase() {
                ensure!(factor.is_none(), invalid());
                axes.push(LayoutAxis { name: c, factor: None });
            } else {
                let f = factor.take().filter(|&f| f > 0).context(invalid())?;
                let primal = c.to_ascii_uppercase();
                ensure!(axes.iter().any(|a| a.name == primal), invalid());
                axes.push(LayoutAxis { name: c, factor: Some(f) });
            }
        }
        ensure!(factor.is_none(), invalid());
        Ok(Self { name: tag.to_string(), axes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of axes, blocked sub-axes included.
    pub fn ndims(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[LayoutAxis] {
        &self.axes
    }

    /// Position of axis `name`.
    pub fn index_of(&self, name: char) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Result of layout inference: output layouts and the layouts inputs should be converted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredLayouts {
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
}

impl InferredLayouts {
    pub fn new(outputs: Vec<String>, inputs: Vec<String>) -> Self {
        Self { outputs, inputs }
    }
}

fn expect_inputs(operation: &str, expected: usize, actual: usize) -> Result<()> {
    ensure!(actual == expected, ArityMismatchSnafu { operation, expected, actual });
    Ok(())
}

/// Layouts of a broadcast-binary operator with two or three inputs.
///
/// Undefined layouts propagate as undefined. A single defined layout must
/// belong to the input of greater or equal rank. Of two defined layouts the
/// one with more axes wins. The winner is replicated into every input slot.
pub fn infer_broadcast_layout(shapes: &[Vec<usize>], layouts: &[String]) -> Result<InferredLayouts> {
    let n = layouts.len();
    ensure!(
        n == 2 || n == 3,
        ArityMismatchSnafu { operation: "broadcast layout inference", expected: 2usize, actual: n }
    );
    let (l0, l1) = (&layouts[0], &layouts[1]);

    let chosen = match (l0.is_empty(), l1.is_empty()) {
        (true, true) => return Ok(InferredLayouts::new(vec![l0.clone()], layouts.to_vec())),
        (false, true) | (true, false) => {
            let (def, undef) = if l0.is_empty() { (1, 0) } else { (0, 1) };
            let rank_of = |i: usize| {
                shapes.get(i).map(Vec::len).context(ArityMismatchSnafu {
                    operation: "broadcast layout inference",
                    expected: 2usize,
                    actual: shapes.len(),
                })
            };
            let (def_rank, undef_rank) = (rank_of(def)?, rank_of(undef)?);
            ensure!(
                def_rank >= undef_rank,
                LayoutRankViolationSnafu { layout: layouts[def].as_str(), rank: def_rank, other_rank: undef_rank }
            );
            layouts[def].clone()
        }
        (false, false) => {
            let (a, b) = (Layout::parse(l0)?, Layout::parse(l1)?);
            if a.ndims() >= b.ndims() { l0.clone() } else { l1.clone() }
        }
    };
    debug!(?layouts, layout = chosen.as_str(), "broadcast layout");
    Ok(InferredLayouts::new(vec![chosen.clone()], vec![chosen; n]))
}

/// Layouts of `argmin` / `argmax`: the input layout passes through.
pub fn infer_arg_reduce_layout(shapes: &[Vec<usize>], layouts: &[String]) -> Result<InferredLayouts> {
    expect_inputs("arg reduce layout inference", 1, shapes.len())?;
    expect_inputs("arg reduce layout inference", 1, layouts.len())?;
    Ok(InferredLayouts::new(layouts.to_vec(), layouts.to_vec()))
}

/// Layouts of `broadcast_to`: the configured output layouts, inputs unchanged.
pub fn infer_broadcast_to_layout(layouts: &[String], out_layouts: &[String]) -> Result<InferredLayouts> {
    expect_inputs("broadcast_to layout inference", 1, layouts.len())?;
    Ok(InferredLayouts::new(out_layouts.to_vec(), layouts.to_vec()))
}
