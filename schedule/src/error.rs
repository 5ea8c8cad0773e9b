use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("function `{name}` is not part of the module"))]
    UnknownFunction { name: String },

    #[snafu(display("no loop with variable id {loop_id} in `{function}`"))]
    UnknownLoop { function: String, loop_id: u64 },

    #[snafu(display("loops {loops:?} are not a perfectly nested chain"))]
    NotPerfectlyNested { loops: Vec<u64> },

    #[snafu(display("loop `{var}` must start at 0 to be {primitive}"))]
    NonZeroLoopStart { var: String, primitive: &'static str },

    #[snafu(display("loop `{var}` has a symbolic extent and cannot be {primitive}"))]
    SymbolicExtent { var: String, primitive: &'static str },

    #[snafu(display("invalid factor {factor} for {primitive}"))]
    InvalidFactor { factor: usize, primitive: &'static str },

    #[snafu(display("{kind} is not a GPU binding"))]
    NotGpuBinding { kind: String },

    #[snafu(display("IR construction failed: {source}"))]
    Ir { source: strata_ir::Error },
}
