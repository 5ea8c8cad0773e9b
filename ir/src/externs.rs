//! External functions callable from kernels.
//!
//! Symbols follow `strata_<backend>_<function>_<suffix>`, where the backend is
//! `host` or `cuda` and the suffix names the floating-point variant.

use std::collections::HashMap;

use strata_dtype::DType;

use crate::ConstValue;

/// Backends that provide extern functions.
pub const EXTERN_BACKENDS: [&str; 2] = ["host", "cuda"];

/// Dtype suffix of a floating-point extern variant, `None` for types without one.
pub fn float_suffix(dtype: DType) -> Option<&'static str> {
    [16, 32, 64].into_iter().find(|bits| dtype.is_float_of(*bits)).map(|_| dtype.short_name())
}

/// Symbol of `function` specialized for `dtype` on `backend`.
///
/// # Examples
///
/// ```rust
/// # use strata_ir::externs::extern_symbol;
/// # use strata_dtype::DType;
/// assert_eq!(extern_symbol("host", "reciprocal", DType::Float32).as_deref(), Some("strata_host_reciprocal_fp32"));
/// assert_eq!(extern_symbol("cuda", "reciprocal", DType::Int32), None);
/// ```
pub fn extern_symbol(backend: &str, function: &str, dtype: DType) -> Option<String> {
    float_suffix(dtype).map(|suffix| format!("strata_{backend}_{function}_{suffix}"))
}

/// Reference implementation of an extern.
pub type ExternFn = fn(&[ConstValue]) -> Option<ConstValue>;

#[derive(Debug, Clone, Copy)]
pub struct ExternDecl {
    pub arity: usize,
    pub func: ExternFn,
}

/// Name to implementation table consulted by the interpreter.
#[derive(Debug, Clone)]
pub struct ExternTable {
    decls: HashMap<String, ExternDecl>,
}

fn reciprocal(args: &[ConstValue]) -> Option<ConstValue> {
    args.first().map(|x| ConstValue::Float(1.0 / x.as_f64()))
}

impl ExternTable {
    pub fn empty() -> Self {
        Self { decls: HashMap::new() }
    }

    /// Table with every built-in extern for every backend.
    pub fn with_builtins() -> Self {
        let mut table = Self::empty();
        for backend in EXTERN_BACKENDS {
            for dtype in [DType::Float16, DType::Float32, DType::Float64] {
                if let Some(symbol) = extern_symbol(backend, "reciprocal", dtype) {
                    table.register(symbol, 1, reciprocal);
                }
            }
        }
        table
    }

    pub fn register(&mut self, name: impl Into<String>, arity: usize, func: ExternFn) {
        self.decls.insert(name.into(), ExternDecl { arity, func });
    }

    pub fn get(&self, name: &str) -> Option<&ExternDecl> {
        self.decls.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }
}

impl Default for ExternTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}
