//! Operator attributes.
//!
//! Graphs carry attributes as an untyped [`AttrMap`]. Each operator family
//! reads the keys it needs once into a typed config, so inference and
//! synthesis never touch the map directly.

use std::collections::BTreeMap;

use snafu::OptionExt;

use crate::error::*;

/// One attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Int(i64),
    Bool(bool),
    IntList(Vec<i64>),
    Str(String),
    StrList(Vec<String>),
}

macro_rules! impl_attr_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for AttrValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v.into())
            }
        })*
    };
}

impl_attr_from! {
    i64 => Int,
    i32 => Int,
    bool => Bool,
    Vec<i64> => IntList,
    String => Str,
    &str => Str,
    Vec<String> => StrList,
}

impl From<&[i64]> for AttrValue {
    fn from(v: &[i64]) -> Self {
        Self::IntList(v.to_vec())
    }
}

impl From<&[&str]> for AttrValue {
    fn from(v: &[&str]) -> Self {
        Self::StrList(v.iter().map(|s| s.to_string()).collect())
    }
}

/// Attribute name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrMap {
    attrs: BTreeMap<String, AttrValue>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace `name`, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        pick: impl FnOnce(&'a AttrValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.attrs.get(name) {
            None => Ok(None),
            Some(value) => pick(value).map(Some).context(AttributeTypeMismatchSnafu { name, expected }),
        }
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>> {
        self.typed(name, "an int", |v| match v {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        })
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>> {
        self.typed(name, "a bool", |v| match v {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        })
    }

    pub fn int_list(&self, name: &str) -> Result<Option<&[i64]>> {
        self.typed(name, "an int list", |v| match v {
            AttrValue::IntList(l) => Some(l.as_slice()),
            _ => None,
        })
    }

    pub fn str_list(&self, name: &str) -> Result<Option<&[String]>> {
        self.typed(name, "a string list", |v| match v {
            AttrValue::StrList(l) => Some(l.as_slice()),
            _ => None,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.context(MissingRequiredAttributeSnafu { name })
}

fn to_dims(name: &str, values: &[i64]) -> Result<Vec<usize>> {
    values
        .iter()
        .map(|&v| usize::try_from(v).ok().context(AttributeTypeMismatchSnafu { name, expected: "a non-negative int list" }))
        .collect()
}

/// Attributes of broadcast-binary operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Position in the first input where the second input is aligned.
    /// `None` (or `-1` in the map) aligns both shapes at their last dimension.
    pub axis: Option<i64>,
}

impl BroadcastConfig {
    pub fn from_attrs(attrs: &AttrMap) -> Result<Self> {
        let axis = attrs.int("axis")?.filter(|&a| a != -1);
        Ok(Self { axis })
    }
}

/// Attributes of `broadcast_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastToConfig {
    pub out_shape: Vec<usize>,
    /// For each input dimension, the output dimension it maps onto.
    pub broadcast_axes: Vec<usize>,
    pub out_layouts: Vec<String>,
}

impl BroadcastToConfig {
    pub fn from_attrs(attrs: &AttrMap) -> Result<Self> {
        let out_shape = to_dims("out_shape", required(attrs.int_list("out_shape")?, "out_shape")?)?;
        let broadcast_axes = to_dims("broadcast_axes", required(attrs.int_list("broadcast_axes")?, "broadcast_axes")?)?;
        let out_layouts = attrs.str_list("out_layouts")?.map_or_else(|| vec![String::new()], <[String]>::to_vec);
        Ok(Self { out_shape, broadcast_axes, out_layouts })
    }
}

/// Attributes of `argmin` and `argmax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgReduceConfig {
    /// Reduction axis; negative values count from the end.
    pub axis: i64,
    pub keep_dims: bool,
}

impl ArgReduceConfig {
    pub fn from_attrs(attrs: &AttrMap) -> Result<Self> {
        let axis = required(attrs.int("axis")?, "axis")?;
        let keep_dims = attrs.bool("keep_dim")?.unwrap_or(false);
        Ok(Self { axis, keep_dims })
    }
}
