//! Contract-call ABI encoding.
//!
//! Encodes a function name plus a typed parameter list into the byte
//! layout the market contract expects: a 4-byte selector followed by
//! 32-byte-word-aligned arguments, with dynamic values (byte strings,
//! arrays) in a length-prefixed tail referenced by head offsets.
//!
//! The selector is the first four bytes of `keccak256` over the
//! canonical signature (`name(type1,type2)`, no spaces), so the
//! parameter type strings here must match the deployed contract's
//! declarations byte for byte.

use crate::{Error, Result};
use alloy_primitives::{keccak256, Address, Bytes, U256};

const WORD: usize = 32;

/// Solidity parameter types used by the Kuru market contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `uintN` for 8 <= N <= 256.
    Uint(u16),
    Bool,
    Address,
    /// Dynamic byte string.
    Bytes,
    /// Dynamic array of `uintN`.
    UintArray(u16),
}

impl ParamType {
    /// Type name as it appears in the canonical signature.
    pub fn sol_name(&self) -> String {
        match self {
            ParamType::Uint(bits) => format!("uint{bits}"),
            ParamType::Bool => "bool".to_string(),
            ParamType::Address => "address".to_string(),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::UintArray(bits) => format!("uint{bits}[]"),
        }
    }

    /// Whether the type is encoded in the tail section behind an
    /// offset word.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::Bytes | ParamType::UintArray(_))
    }
}

/// An argument value paired with a [`ParamType`] at encoding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Uint(U256),
    Bool(bool),
    Address(Address),
    Bytes(Vec<u8>),
    UintArray(Vec<U256>),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Uint(_) => "uint",
            ParamValue::Bool(_) => "bool",
            ParamValue::Address(_) => "address",
            ParamValue::Bytes(_) => "bytes",
            ParamValue::UintArray(_) => "uint[]",
        }
    }
}

/// Canonical signature string: `name(type1,type2)`, parameter names and
/// spaces dropped — the exact keccak input for selector computation.
pub fn canonical_signature(function: &str, params: &[(&str, ParamType)]) -> String {
    let types: Vec<String> = params.iter().map(|(_, ty)| ty.sol_name()).collect();
    format!("{}({})", function, types.join(","))
}

/// First four bytes of `keccak256(canonical_signature)`.
pub fn selector(function: &str, params: &[(&str, ParamType)]) -> [u8; 4] {
    let hash = keccak256(canonical_signature(function, params).as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a full contract call: selector followed by the ABI-encoded
/// argument words.
///
/// Fails with [`Error::Encoding`] on arity mismatch, a value/type
/// mismatch, or a value outside its declared bit width — values are
/// never silently truncated.
pub fn encode_call(
    function: &str,
    params: &[(&str, ParamType)],
    args: &[ParamValue],
) -> Result<Bytes> {
    if params.len() != args.len() {
        return Err(Error::Encoding {
            message: format!(
                "{} expects {} arguments, got {}",
                canonical_signature(function, params),
                params.len(),
                args.len()
            ),
        });
    }

    // All static types here occupy exactly one head word, so the tail
    // begins at params.len() * 32 within the argument section.
    let head_len = params.len() * WORD;
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for ((name, ty), value) in params.iter().zip(args) {
        match (ty, value) {
            (ParamType::Uint(bits), ParamValue::Uint(v)) => {
                head.extend_from_slice(&uint_word(name, *bits, v)?);
            }
            (ParamType::Bool, ParamValue::Bool(b)) => {
                let mut word = [0u8; WORD];
                word[WORD - 1] = *b as u8;
                head.extend_from_slice(&word);
            }
            (ParamType::Address, ParamValue::Address(addr)) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(addr.as_slice());
                head.extend_from_slice(&word);
            }
            (ParamType::Bytes, ParamValue::Bytes(data)) => {
                head.extend_from_slice(&offset_word(head_len + tail.len()));
                tail.extend_from_slice(&offset_word(data.len()));
                tail.extend_from_slice(data);
                // Right-pad the byte string to a word boundary.
                let rem = data.len() % WORD;
                if rem != 0 {
                    tail.extend(std::iter::repeat(0u8).take(WORD - rem));
                }
            }
            (ParamType::UintArray(bits), ParamValue::UintArray(values)) => {
                head.extend_from_slice(&offset_word(head_len + tail.len()));
                tail.extend_from_slice(&offset_word(values.len()));
                for v in values {
                    // Each element gets a full word, right-aligned,
                    // regardless of the logical bit width.
                    tail.extend_from_slice(&uint_word(name, *bits, v)?);
                }
            }
            (ty, value) => {
                return Err(Error::Encoding {
                    message: format!("{name}: expected {}, got {}", ty.sol_name(), value.kind()),
                });
            }
        }
    }

    let mut out = Vec::with_capacity(4 + head.len() + tail.len());
    out.extend_from_slice(&selector(function, params));
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(Bytes::from(out))
}

/// Decode call data produced by [`encode_call`] with the same type
/// list, recovering the original argument values.
pub fn decode_call(
    function: &str,
    params: &[(&str, ParamType)],
    data: &[u8],
) -> Result<Vec<ParamValue>> {
    if data.len() < 4 || data[..4] != selector(function, params) {
        return Err(Error::Encoding {
            message: format!(
                "selector mismatch for {}",
                canonical_signature(function, params)
            ),
        });
    }
    let args = &data[4..];

    let mut out = Vec::with_capacity(params.len());
    for (i, (name, ty)) in params.iter().enumerate() {
        let word = word_at(args, i * WORD, name)?;
        match ty {
            ParamType::Uint(bits) => {
                let v = U256::from_be_slice(word);
                if v.bit_len() > *bits as usize {
                    return Err(Error::Encoding {
                        message: format!("{name}: decoded value {v} does not fit uint{bits}"),
                    });
                }
                out.push(ParamValue::Uint(v));
            }
            ParamType::Bool => {
                if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
                    return Err(Error::Encoding {
                        message: format!("{name}: invalid bool word"),
                    });
                }
                out.push(ParamValue::Bool(word[WORD - 1] == 1));
            }
            ParamType::Address => {
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(Error::Encoding {
                        message: format!("{name}: dirty upper bytes in address word"),
                    });
                }
                out.push(ParamValue::Address(Address::from_slice(&word[12..])));
            }
            ParamType::Bytes => {
                let offset = usize_word(word, name)?;
                let len = usize_word(word_at(args, offset, name)?, name)?;
                let start = checked_offset(offset, WORD, name)?;
                let end = checked_offset(start, len, name)?;
                let bytes = args.get(start..end).ok_or_else(|| Error::Encoding {
                    message: format!("{name}: calldata truncated at offset {start}"),
                })?;
                out.push(ParamValue::Bytes(bytes.to_vec()));
            }
            ParamType::UintArray(bits) => {
                let offset = usize_word(word, name)?;
                let count = usize_word(word_at(args, offset, name)?, name)?;
                // Cap the preallocation: count comes off the wire and
                // cannot exceed the words actually present.
                let mut values = Vec::with_capacity(count.min(args.len() / WORD));
                for j in 0..count {
                    let at = checked_offset(offset, WORD.saturating_mul(j + 1), name)?;
                    let elem = word_at(args, at, name)?;
                    let v = U256::from_be_slice(elem);
                    if v.bit_len() > *bits as usize {
                        return Err(Error::Encoding {
                            message: format!("{name}[{j}]: decoded value {v} does not fit uint{bits}"),
                        });
                    }
                    values.push(v);
                }
                out.push(ParamValue::UintArray(values));
            }
        }
    }
    Ok(out)
}

/// A `uintN` value right-aligned in a 32-byte word, with a strict range
/// check against the declared width.
fn uint_word(name: &str, bits: u16, value: &U256) -> Result<[u8; WORD]> {
    if value.bit_len() > bits as usize {
        return Err(Error::Encoding {
            message: format!("{name}: value {value} does not fit uint{bits}"),
        });
    }
    Ok(value.to_be_bytes::<WORD>())
}

fn offset_word(value: usize) -> [u8; WORD] {
    U256::from(value).to_be_bytes::<WORD>()
}

fn word_at<'a>(buf: &'a [u8], at: usize, name: &str) -> Result<&'a [u8]> {
    let end = checked_offset(at, WORD, name)?;
    buf.get(at..end).ok_or_else(|| Error::Encoding {
        message: format!("{name}: calldata truncated at offset {at}"),
    })
}

/// Offset arithmetic over wire-supplied words must not wrap: a
/// near-`usize::MAX` offset is malformed calldata, not a panic.
fn checked_offset(base: usize, add: usize, name: &str) -> Result<usize> {
    base.checked_add(add).ok_or_else(|| Error::Encoding {
        message: format!("{name}: offset or length out of range"),
    })
}

fn usize_word(word: &[u8], name: &str) -> Result<usize> {
    usize::try_from(U256::from_be_slice(word)).map_err(|_| Error::Encoding {
        message: format!("{name}: offset or length out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT_PARAMS: &[(&str, ParamType)] = &[
        ("_price", ParamType::Uint(24)),
        ("size", ParamType::Uint(96)),
        ("_postOnly", ParamType::Bool),
    ];

    const CANCEL_PARAMS: &[(&str, ParamType)] = &[("_orderIds", ParamType::UintArray(40))];

    const MARKET_BUY_PARAMS: &[(&str, ParamType)] = &[
        ("_quoteSize", ParamType::Uint(24)),
        ("_minAmountOut", ParamType::Uint(256)),
        ("_isMargin", ParamType::Bool),
        ("_isFillOrKill", ParamType::Bool),
    ];

    const MARKET_SELL_PARAMS: &[(&str, ParamType)] = &[
        ("_size", ParamType::Uint(96)),
        ("_minAmountOut", ParamType::Uint(256)),
        ("_isMargin", ParamType::Bool),
        ("_isFillOrKill", ParamType::Bool),
    ];

    #[test]
    fn test_canonical_signature_has_no_spaces() {
        assert_eq!(
            canonical_signature("addBuyOrder", LIMIT_PARAMS),
            "addBuyOrder(uint24,uint96,bool)"
        );
        assert_eq!(
            canonical_signature("batchCancelOrders", CANCEL_PARAMS),
            "batchCancelOrders(uint40[])"
        );
    }

    #[test]
    fn test_selectors_match_reference_vectors() {
        assert_eq!(hex::encode(selector("addBuyOrder", LIMIT_PARAMS)), "cc57aec6");
        assert_eq!(hex::encode(selector("addSellOrder", LIMIT_PARAMS)), "5b16c9b6");
        assert_eq!(
            hex::encode(selector("placeAndExecuteMarketBuy", MARKET_BUY_PARAMS)),
            "3c133765"
        );
        assert_eq!(
            hex::encode(selector("placeAndExecuteMarketSell", MARKET_SELL_PARAMS)),
            "532c46db"
        );
        assert_eq!(
            hex::encode(selector("batchCancelOrders", CANCEL_PARAMS)),
            "23afbff3"
        );
    }

    #[test]
    fn test_encode_limit_buy_call() {
        let data = encode_call(
            "addBuyOrder",
            LIMIT_PARAMS,
            &[
                ParamValue::Uint(U256::from(150_000u64)),
                ParamValue::Uint(U256::from(2_500_000_000u64)),
                ParamValue::Bool(true),
            ],
        )
        .unwrap();

        // Three single-word arguments, each right-aligned: 0x249f0,
        // 0x9502f900, and bool true.
        let expected = format!(
            "cc57aec6{:064x}{:064x}{:064x}",
            150_000u64, 2_500_000_000u64, 1u64
        );
        assert_eq!(hex::encode(&data), expected);
    }

    #[test]
    fn test_encode_cancel_call_head_tail_layout() {
        let data = encode_call(
            "batchCancelOrders",
            CANCEL_PARAMS,
            &[ParamValue::UintArray(vec![
                U256::from(42u64),
                U256::from(7u64),
            ])],
        )
        .unwrap();

        let expected = concat!(
            "23afbff3",
            // head: offset of the array tail (0x20)
            "0000000000000000000000000000000000000000000000000000000000000020",
            // tail: element count, then one full word per element
            "0000000000000000000000000000000000000000000000000000000000000002",
            "000000000000000000000000000000000000000000000000000000000000002a",
            "0000000000000000000000000000000000000000000000000000000000000007",
        );
        assert_eq!(hex::encode(&data), expected);
    }

    #[test]
    fn test_uint24_overflow_fails() {
        let err = encode_call(
            "addBuyOrder",
            LIMIT_PARAMS,
            &[
                ParamValue::Uint(U256::from(1u64 << 24)),
                ParamValue::Uint(U256::from(1u64)),
                ParamValue::Bool(false),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
        assert!(err.to_string().contains("_price"));
    }

    #[test]
    fn test_uint96_overflow_fails() {
        let too_big = U256::from(1u8) << 96;
        let err = encode_call(
            "addBuyOrder",
            LIMIT_PARAMS,
            &[
                ParamValue::Uint(U256::from(100u64)),
                ParamValue::Uint(too_big),
                ParamValue::Bool(false),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("uint96"));
    }

    #[test]
    fn test_uint96_boundary_value_encodes() {
        let max = (U256::from(1u8) << 96) - U256::from(1u8);
        let data = encode_call(
            "addBuyOrder",
            LIMIT_PARAMS,
            &[
                ParamValue::Uint(U256::from(100u64)),
                ParamValue::Uint(max),
                ParamValue::Bool(false),
            ],
        )
        .unwrap();
        assert_eq!(data.len(), 4 + 3 * 32);
    }

    #[test]
    fn test_type_mismatch_fails() {
        let err = encode_call(
            "addBuyOrder",
            LIMIT_PARAMS,
            &[
                ParamValue::Bool(true),
                ParamValue::Uint(U256::from(1u64)),
                ParamValue::Bool(false),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected uint24"));
    }

    #[test]
    fn test_arity_mismatch_fails() {
        let err = encode_call("addBuyOrder", LIMIT_PARAMS, &[]).unwrap_err();
        assert!(err.to_string().contains("expects 3 arguments"));
    }

    #[test]
    fn test_round_trip_static_params() {
        let args = vec![
            ParamValue::Uint(U256::from(123_456u64)),
            ParamValue::Uint(U256::from(987_654_321u64)),
            ParamValue::Bool(true),
        ];
        let data = encode_call("addBuyOrder", LIMIT_PARAMS, &args).unwrap();
        let decoded = decode_call("addBuyOrder", LIMIT_PARAMS, &data).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn test_round_trip_uint_array() {
        let args = vec![ParamValue::UintArray(vec![
            U256::from(1u64),
            U256::from((1u64 << 40) - 1),
            U256::from(1_099_000_000u64),
        ])];
        let data = encode_call("batchCancelOrders", CANCEL_PARAMS, &args).unwrap();
        let decoded = decode_call("batchCancelOrders", CANCEL_PARAMS, &data).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn test_round_trip_dynamic_bytes() {
        let params: &[(&str, ParamType)] = &[
            ("to", ParamType::Address),
            ("payload", ParamType::Bytes),
        ];
        let args = vec![
            ParamValue::Address(Address::repeat_byte(0x11)),
            ParamValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef, 0x01]),
        ];
        let data = encode_call("relay", params, &args).unwrap();
        // head (2 words) + tail (length word + 1 padded data word)
        assert_eq!(data.len(), 4 + 2 * 32 + 2 * 32);
        let decoded = decode_call("relay", params, &data).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn test_decode_rejects_wrong_selector() {
        let data = encode_call("addBuyOrder", LIMIT_PARAMS, &[
            ParamValue::Uint(U256::from(1u64)),
            ParamValue::Uint(U256::from(1u64)),
            ParamValue::Bool(false),
        ])
        .unwrap();
        let err = decode_call("addSellOrder", LIMIT_PARAMS, &data).unwrap_err();
        assert!(err.to_string().contains("selector mismatch"));
    }

    #[test]
    fn test_decode_rejects_truncated_calldata() {
        let data = encode_call("addBuyOrder", LIMIT_PARAMS, &[
            ParamValue::Uint(U256::from(1u64)),
            ParamValue::Uint(U256::from(1u64)),
            ParamValue::Bool(false),
        ])
        .unwrap();
        let err = decode_call("addBuyOrder", LIMIT_PARAMS, &data[..data.len() - 1]).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_decode_rejects_overflowing_offset() {
        // A head offset of usize::MAX would wrap when the word bound is
        // added; must surface as an encoding error, not a panic.
        let params: &[(&str, ParamType)] = &[("payload", ParamType::Bytes)];
        let mut data = selector("relay", params).to_vec();
        data.extend_from_slice(&U256::from(usize::MAX).to_be_bytes::<32>());

        let err = decode_call("relay", params, &data).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_decode_rejects_overflowing_length() {
        // Valid offset, then a length word near usize::MAX that would
        // wrap the slice end.
        let params: &[(&str, ParamType)] = &[("payload", ParamType::Bytes)];
        let mut data = selector("relay", params).to_vec();
        data.extend_from_slice(&offset_word(WORD));
        data.extend_from_slice(&U256::from(usize::MAX).to_be_bytes::<32>());

        let err = decode_call("relay", params, &data).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_decode_rejects_overflowing_array_count() {
        // An element count of usize::MAX must fail on the first element
        // bound instead of wrapping or exhausting memory.
        let mut data = selector("batchCancelOrders", CANCEL_PARAMS).to_vec();
        data.extend_from_slice(&offset_word(WORD));
        data.extend_from_slice(&U256::from(usize::MAX).to_be_bytes::<32>());

        let err = decode_call("batchCancelOrders", CANCEL_PARAMS, &data).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_dynamic_types_marked_dynamic() {
        assert!(ParamType::Bytes.is_dynamic());
        assert!(ParamType::UintArray(40).is_dynamic());
        assert!(!ParamType::Uint(96).is_dynamic());
        assert!(!ParamType::Address.is_dynamic());
    }
}
