//! Module for data identifier (DID) codecs and their stored values
//!
//! Each 16 bit data identifier the simulator exposes is bound to a codec
//! describing its wire format, and to a current physical value. Numeric
//! codecs apply a linear transfer function (`physical = raw * factor +
//! offset`) the way production ECUs publish scaled sensor readings.

use std::collections::HashMap;
use std::sync::Mutex;

/// Codec operation result
pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Clone, thiserror::Error)]
/// Error produced when encoding or decoding a data identifier value
pub enum CodecError {
    /// The physical value cannot be represented by the codec
    #[error("invalid value for codec: {0}")]
    InvalidValue(String),
    /// The raw byte count does not match the codec's declared width
    #[error("codec expects {expected} bytes, got {found}")]
    LengthMismatch {
        /// Width the codec declares
        expected: usize,
        /// Width that was supplied
        found: usize,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
/// Wire format of a data identifier
pub enum DidCodec {
    /// Fixed length ASCII string. Factor/offset do not apply
    Ascii(usize),
    /// 1 byte unsigned with linear scaling
    UCharLinear {
        /// Scaling factor
        factor: f64,
        /// Scaling offset
        offset: f64,
    },
    /// 1 byte signed with linear scaling
    CharLinear {
        /// Scaling factor
        factor: f64,
        /// Scaling offset
        offset: f64,
    },
    /// 2 byte big endian unsigned with linear scaling
    UShortLinear {
        /// Scaling factor
        factor: f64,
        /// Scaling offset
        offset: f64,
    },
    /// 2 byte big endian signed with linear scaling
    ShortLinear {
        /// Scaling factor
        factor: f64,
        /// Scaling offset
        offset: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// A stored data identifier value
///
/// The value table is heterogeneous (the VIN is a string, sensor readings
/// are numbers), so values are carried as a tagged variant and coerced by
/// the codec on encode.
pub enum DidValue {
    /// Printable ASCII string
    Ascii(String),
    /// Integer physical value
    Int(i64),
    /// Floating point physical value (produced by decoding scaled codecs)
    Float(f64),
}

impl DidValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            DidValue::Ascii(_) => None,
            DidValue::Int(i) => Some(*i as f64),
            DidValue::Float(f) => Some(*f),
        }
    }
}

impl DidCodec {
    /// Number of bytes this codec occupies on the wire
    pub fn len(&self) -> usize {
        match self {
            DidCodec::Ascii(n) => *n,
            DidCodec::UCharLinear { .. } | DidCodec::CharLinear { .. } => 1,
            DidCodec::UShortLinear { .. } | DidCodec::ShortLinear { .. } => 2,
        }
    }

    /// True only for the degenerate zero-length ASCII codec
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encodes a physical value into its wire representation.
    ///
    /// Numeric codecs apply `raw = (physical - offset) / factor`, truncated
    /// toward zero, and emit big endian bytes of the declared width
    pub fn encode(&self, value: &DidValue) -> CodecResult<Vec<u8>> {
        match self {
            DidCodec::Ascii(n) => {
                let DidValue::Ascii(s) = value else {
                    return Err(CodecError::InvalidValue(
                        "ASCII codec requires a string value".to_string(),
                    ));
                };
                if s.len() != *n || !s.is_ascii() {
                    return Err(CodecError::InvalidValue(format!(
                        "string must be {n} ASCII characters long"
                    )));
                }
                Ok(s.as_bytes().to_vec())
            }
            DidCodec::UCharLinear { factor, offset } => {
                let raw = Self::scale_to_raw(value, *factor, *offset)?;
                if !(0..=u8::MAX as i64).contains(&raw) {
                    return Err(CodecError::InvalidValue(format!(
                        "raw value {raw} does not fit an unsigned byte"
                    )));
                }
                Ok(vec![raw as u8])
            }
            DidCodec::CharLinear { factor, offset } => {
                let raw = Self::scale_to_raw(value, *factor, *offset)?;
                if !(i8::MIN as i64..=i8::MAX as i64).contains(&raw) {
                    return Err(CodecError::InvalidValue(format!(
                        "raw value {raw} does not fit a signed byte"
                    )));
                }
                Ok(vec![(raw as i8) as u8])
            }
            DidCodec::UShortLinear { factor, offset } => {
                let raw = Self::scale_to_raw(value, *factor, *offset)?;
                if !(0..=u16::MAX as i64).contains(&raw) {
                    return Err(CodecError::InvalidValue(format!(
                        "raw value {raw} does not fit an unsigned short"
                    )));
                }
                Ok((raw as u16).to_be_bytes().to_vec())
            }
            DidCodec::ShortLinear { factor, offset } => {
                let raw = Self::scale_to_raw(value, *factor, *offset)?;
                if !(i16::MIN as i64..=i16::MAX as i64).contains(&raw) {
                    return Err(CodecError::InvalidValue(format!(
                        "raw value {raw} does not fit a signed short"
                    )));
                }
                Ok((raw as i16).to_be_bytes().to_vec())
            }
        }
    }

    /// Decodes wire bytes back into a physical value.
    ///
    /// Numeric codecs produce a floating point value via `raw * factor +
    /// offset`
    pub fn decode(&self, raw: &[u8]) -> CodecResult<DidValue> {
        match self {
            DidCodec::Ascii(n) => {
                if raw.len() != *n {
                    return Err(CodecError::InvalidValue(format!(
                        "trying to decode a string of {} bytes but codec expects {} bytes",
                        raw.len(),
                        n
                    )));
                }
                if !raw.is_ascii() {
                    return Err(CodecError::InvalidValue(
                        "string contains non ASCII bytes".to_string(),
                    ));
                }
                Ok(DidValue::Ascii(String::from_utf8_lossy(raw).into_owned()))
            }
            DidCodec::UCharLinear { factor, offset } => {
                self.check_len(raw)?;
                Ok(DidValue::Float(raw[0] as f64 * factor + offset))
            }
            DidCodec::CharLinear { factor, offset } => {
                self.check_len(raw)?;
                Ok(DidValue::Float((raw[0] as i8) as f64 * factor + offset))
            }
            DidCodec::UShortLinear { factor, offset } => {
                self.check_len(raw)?;
                let v = u16::from_be_bytes([raw[0], raw[1]]);
                Ok(DidValue::Float(v as f64 * factor + offset))
            }
            DidCodec::ShortLinear { factor, offset } => {
                self.check_len(raw)?;
                let v = i16::from_be_bytes([raw[0], raw[1]]);
                Ok(DidValue::Float(v as f64 * factor + offset))
            }
        }
    }

    fn check_len(&self, raw: &[u8]) -> CodecResult<()> {
        if raw.len() != self.len() {
            Err(CodecError::LengthMismatch {
                expected: self.len(),
                found: raw.len(),
            })
        } else {
            Ok(())
        }
    }

    fn scale_to_raw(value: &DidValue, factor: f64, offset: f64) -> CodecResult<i64> {
        let phys = value.as_f64().ok_or_else(|| {
            CodecError::InvalidValue("linear codec requires a numeric value".to_string())
        })?;
        let raw = (phys - offset) / factor;
        if !raw.is_finite() {
            return Err(CodecError::InvalidValue(format!(
                "scaled value {raw} is not representable"
            )));
        }
        // Truncation toward zero, matching integer conversion semantics
        Ok(raw as i64)
    }
}

/// Table of the data identifiers the simulated ECU exposes
///
/// The codec map is fixed at construction; only the value map mutates, and
/// only through WriteDataByIdentifier. Invariant: every codec key has a
/// stored value whose type matches the codec.
#[derive(Debug)]
pub struct DidTable {
    codecs: HashMap<u16, DidCodec>,
    values: Mutex<HashMap<u16, DidValue>>,
}

impl Default for DidTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DidTable {
    /// Creates the DID table with the simulator's factory data set
    pub fn new() -> Self {
        let codecs = HashMap::from([
            (0xF191, DidCodec::Ascii(17)), // VIN
            (
                0x0021,
                DidCodec::UCharLinear {
                    factor: 0.5,
                    offset: 0.0,
                }, // Throttle position %
            ),
            (
                0x0041,
                DidCodec::CharLinear {
                    factor: 0.2,
                    offset: 0.0,
                }, // Battery voltage V
            ),
            (
                0x0051,
                DidCodec::UShortLinear {
                    factor: 0.1,
                    offset: 0.0,
                }, // Engine speed rpm
            ),
            (
                0x0061,
                DidCodec::ShortLinear {
                    factor: 0.01,
                    offset: 0.0,
                }, // Vehicle speed km/h
            ),
        ]);
        let values = HashMap::from([
            (0xF191, DidValue::Ascii("FVB30FKA034ALDFA0".to_string())),
            (0x0021, DidValue::Int(100)),
            (0x0041, DidValue::Int(24)),
            (0x0051, DidValue::Int(1220)),
            (0x0061, DidValue::Int(220)),
        ]);
        Self {
            codecs,
            values: Mutex::new(values),
        }
    }

    /// Returns the codec bound to a DID
    pub fn codec(&self, did: u16) -> Option<DidCodec> {
        self.codecs.get(&did).copied()
    }

    /// Returns a snapshot of the value currently stored under a DID
    pub fn value(&self, did: u16) -> Option<DidValue> {
        self.values.lock().unwrap().get(&did).cloned()
    }

    /// Replaces the value stored under a DID
    pub fn set_value(&self, did: u16, value: DidValue) {
        self.values.lock().unwrap().insert(did, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_values_encode() {
        let table = DidTable::new();
        let cases: [(u16, &[u8]); 5] = [
            (0xF191, b"FVB30FKA034ALDFA0"),
            (0x0021, &[0xC8]),
            (0x0041, &[0x78]),
            (0x0051, &[0x2F, 0xA8]),
            (0x0061, &[0x55, 0xF0]),
        ];
        for (did, expected) in cases {
            let codec = table.codec(did).unwrap();
            let value = table.value(did).unwrap();
            assert_eq!(codec.encode(&value).unwrap(), expected, "DID 0x{did:04X}");
        }
    }

    #[test]
    fn encode_length_matches_declared_width() {
        let table = DidTable::new();
        for did in [0xF191u16, 0x0021, 0x0041, 0x0051, 0x0061] {
            let codec = table.codec(did).unwrap();
            let value = table.value(did).unwrap();
            assert_eq!(codec.encode(&value).unwrap().len(), codec.len());
        }
    }

    #[test]
    fn linear_roundtrip_within_quantization() {
        let codec = DidCodec::UShortLinear {
            factor: 0.1,
            offset: 0.0,
        };
        for phys in [0.0, 1.0, 55.5, 1220.0, 6553.5] {
            let encoded = codec.encode(&DidValue::Float(phys)).unwrap();
            let DidValue::Float(decoded) = codec.decode(&encoded).unwrap() else {
                panic!("linear decode must produce a float");
            };
            assert!(
                (decoded - phys).abs() <= 0.1,
                "{phys} decoded as {decoded}"
            );
        }
    }

    #[test]
    fn signed_roundtrip() {
        let codec = DidCodec::CharLinear {
            factor: 0.2,
            offset: 0.0,
        };
        let encoded = codec.encode(&DidValue::Float(-4.2)).unwrap();
        assert_eq!(encoded, vec![0xEBu8]); // -21
        let DidValue::Float(decoded) = codec.decode(&encoded).unwrap() else {
            panic!("linear decode must produce a float");
        };
        assert!((decoded - -4.2).abs() <= 0.2);
    }

    #[test]
    fn ascii_length_must_match() {
        let codec = DidCodec::Ascii(17);
        assert!(
            codec
                .encode(&DidValue::Ascii("too short".to_string()))
                .is_err()
        );
        assert!(codec.decode(b"too short").is_err());
    }

    #[test]
    fn linear_decode_rejects_wrong_width() {
        let codec = DidCodec::UShortLinear {
            factor: 0.1,
            offset: 0.0,
        };
        assert!(matches!(
            codec.decode(&[0x01]),
            Err(CodecError::LengthMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn encode_rejects_out_of_range_raw() {
        let codec = DidCodec::UCharLinear {
            factor: 0.5,
            offset: 0.0,
        };
        // raw would be 300
        assert!(codec.encode(&DidValue::Int(150)).is_err());
        // negative raw for unsigned codec
        assert!(codec.encode(&DidValue::Int(-1)).is_err());
    }

    #[test]
    fn written_values_replace_stored_ones() {
        let table = DidTable::new();
        table.set_value(0x0021, DidValue::Float(50.0));
        assert_eq!(table.value(0x0021), Some(DidValue::Float(50.0)));
    }
}
