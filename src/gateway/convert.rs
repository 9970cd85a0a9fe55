use alloy::dyn_abi::DynSolValue;
use anyhow::{Result, bail};

use crate::model::{RawAsset, RawField};

/// Strip Solidity bit widths off a decoded ABI value.
pub fn raw_field(value: DynSolValue) -> RawField {
    #[allow(unreachable_patterns)]
    match value {
        DynSolValue::Address(a) => RawField::Address(a),
        DynSolValue::String(s) => RawField::Str(s),
        DynSolValue::Uint(u, _) => RawField::Uint(u),
        DynSolValue::Int(i, _) => RawField::Int(i),
        DynSolValue::Bool(b) => RawField::Bool(b),
        DynSolValue::Bytes(b) => RawField::Bytes(b),
        DynSolValue::FixedBytes(word, size) => RawField::Bytes(word[..size].to_vec()),
        DynSolValue::Tuple(items) => RawField::Tuple(items.into_iter().map(raw_field).collect()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            RawField::Array(items.into_iter().map(raw_field).collect())
        }
        other => RawField::Bytes(other.abi_encode()),
    }
}

/// `getReservesData` returns `(AggregatedReserveData[], BaseCurrencyInfo)`;
/// each element of the first output becomes one positional asset.
pub fn reserves_from_outputs(outputs: Vec<DynSolValue>) -> Result<Vec<RawAsset>> {
    let Some(first) = outputs.into_iter().next() else {
        bail!("getReservesData returned no outputs");
    };
    let items = match first {
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => items,
        other => bail!(
            "getReservesData: expected an array of reserves, got {}",
            other
                .sol_type_name()
                .map(|n| n.into_owned())
                .unwrap_or_else(|| "unknown".into())
        ),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            DynSolValue::Tuple(fields) => Ok(RawAsset::Positional(
                fields.into_iter().map(raw_field).collect(),
            )),
            _ => bail!("getReservesData: reserve {i} is not a tuple"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};

    #[test]
    fn widths_are_dropped() {
        assert_eq!(
            raw_field(DynSolValue::Uint(U256::from(8000u64), 16)),
            RawField::Uint(U256::from(8000u64))
        );
        assert_eq!(
            raw_field(DynSolValue::Tuple(vec![
                DynSolValue::Address(Address::ZERO),
                DynSolValue::String("USDC".into()),
            ])),
            RawField::Tuple(vec![RawField::Address(Address::ZERO), RawField::Str("USDC".into())])
        );
    }

    #[test]
    fn reserves_become_positional_assets() {
        let reserve = DynSolValue::Tuple(vec![
            DynSolValue::Address(Address::ZERO),
            DynSolValue::Uint(U256::from(6u64), 256),
        ]);
        let outputs = vec![
            DynSolValue::Array(vec![reserve.clone(), reserve]),
            DynSolValue::Tuple(vec![]),
        ];
        let assets = reserves_from_outputs(outputs).unwrap();
        assert_eq!(assets.len(), 2);
        assert!(matches!(&assets[0], RawAsset::Positional(f) if f.len() == 2));
    }

    #[test]
    fn non_array_output_is_an_error() {
        let err = reserves_from_outputs(vec![DynSolValue::Bool(true)]).unwrap_err();
        assert!(err.to_string().contains("expected an array"));
        assert!(reserves_from_outputs(vec![]).is_err());
    }
}
