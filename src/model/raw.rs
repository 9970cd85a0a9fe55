use std::collections::BTreeMap;
use std::fmt;

use alloy::primitives::{Address, I256, U256};

/// One ABI value returned by the chain, stripped of its Solidity bit width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField {
    Address(Address),
    Str(String),
    Uint(U256),
    Int(I256),
    Bool(bool),
    Bytes(Vec<u8>),
    Tuple(Vec<RawField>),
    Array(Vec<RawField>),
}

/// Shape tag for a `RawField`, used in decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Address,
    Str,
    Uint,
    Int,
    Bool,
    Bytes,
    Tuple,
    Array,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Address => "address",
            FieldKind::Str => "string",
            FieldKind::Uint => "uint",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
            FieldKind::Bytes => "bytes",
            FieldKind::Tuple => "tuple",
            FieldKind::Array => "array",
        };
        f.write_str(s)
    }
}

impl RawField {
    pub fn kind(&self) -> FieldKind {
        match self {
            RawField::Address(_) => FieldKind::Address,
            RawField::Str(_) => FieldKind::Str,
            RawField::Uint(_) => FieldKind::Uint,
            RawField::Int(_) => FieldKind::Int,
            RawField::Bool(_) => FieldKind::Bool,
            RawField::Bytes(_) => FieldKind::Bytes,
            RawField::Tuple(_) => FieldKind::Tuple,
            RawField::Array(_) => FieldKind::Array,
        }
    }

    /// Unsigned value. A non-negative signed int is accepted as well.
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            RawField::Uint(v) => Some(*v),
            RawField::Int(v) if !v.is_negative() => Some(v.into_raw()),
            _ => None,
        }
    }

    /// Signed value. An unsigned int that fits in 255 bits is accepted as well.
    pub fn as_int(&self) -> Option<I256> {
        match self {
            RawField::Int(v) => Some(*v),
            RawField::Uint(v) => I256::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawField::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            RawField::Address(a) => Some(*a),
            _ => None,
        }
    }
}

impl From<U256> for RawField {
    fn from(v: U256) -> Self {
        RawField::Uint(v)
    }
}

impl From<u64> for RawField {
    fn from(v: u64) -> Self {
        RawField::Uint(U256::from(v))
    }
}

impl From<u128> for RawField {
    fn from(v: u128) -> Self {
        RawField::Uint(U256::from(v))
    }
}

impl From<I256> for RawField {
    fn from(v: I256) -> Self {
        RawField::Int(v)
    }
}

impl From<Address> for RawField {
    fn from(v: Address) -> Self {
        RawField::Address(v)
    }
}

impl From<&str> for RawField {
    fn from(v: &str) -> Self {
        RawField::Str(v.to_string())
    }
}

impl From<String> for RawField {
    fn from(v: String) -> Self {
        RawField::Str(v)
    }
}

impl From<bool> for RawField {
    fn from(v: bool) -> Self {
        RawField::Bool(v)
    }
}

/// Raw, undecoded state for one reserve / market as handed over by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAsset {
    /// Fixed-layout ABI tuple, read by index.
    Positional(Vec<RawField>),
    /// Field-per-call record, read by name.
    Named(BTreeMap<String, RawField>),
}

impl RawAsset {
    /// Best-effort symbol for diagnostics, without validating the layout.
    pub fn label(&self) -> Option<String> {
        match self {
            RawAsset::Positional(fields) => fields
                .get(2)
                .and_then(RawField::as_str)
                .or_else(|| fields.first().and_then(RawField::as_str))
                .map(str::to_string)
                .or_else(|| fields.first().and_then(RawField::as_address).map(|a| a.to_string())),
            RawAsset::Named(map) => map
                .get("symbol")
                .and_then(RawField::as_str)
                .map(str::to_string)
                .or_else(|| {
                    map.get("asset_address")
                        .and_then(RawField::as_address)
                        .map(|a| a.to_string())
                }),
        }
    }

    pub fn layout(&self) -> &'static str {
        match self {
            RawAsset::Positional(_) => "positional",
            RawAsset::Named(_) => "named",
        }
    }
}

impl FromIterator<(String, RawField)> for RawAsset {
    fn from_iter<T: IntoIterator<Item = (String, RawField)>>(iter: T) -> Self {
        RawAsset::Named(iter.into_iter().collect())
    }
}
