//! SQL translation and native evaluation of the integer method family.
//!
//! Every entry is applied identically across the 8/16/32/64-bit widths,
//! with the width supplying the bit count, CAST target, and mask
//! constants. Unsigned arithmetic and bit operations have no native
//! counterpart in the target dialect and are emulated in plain SQL; the
//! emulations are lossy where noted.

use crate::error::{CompileError, Result};
use crate::operand::Operand;
use model::{data_type::DataType, value::Value};

/// Bit width of an integer family member, with the constants the
/// templates need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn of(ty: DataType) -> Option<IntWidth> {
        match ty {
            DataType::Int8 => Some(IntWidth::W8),
            DataType::Int16 => Some(IntWidth::W16),
            DataType::Int32 => Some(IntWidth::W32),
            DataType::Int64 => Some(IntWidth::W64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    pub fn sql_name(self) -> &'static str {
        match self {
            IntWidth::W8 => "TINYINT",
            IntWidth::W16 => "SMALLINT",
            IntWidth::W32 => "INTEGER",
            IntWidth::W64 => "BIGINT",
        }
    }

    pub fn min_value(self) -> i64 {
        match self {
            IntWidth::W8 => i8::MIN as i64,
            IntWidth::W16 => i16::MIN as i64,
            IntWidth::W32 => i32::MIN as i64,
            IntWidth::W64 => i64::MIN,
        }
    }

    pub fn max_value(self) -> i64 {
        match self {
            IntWidth::W8 => i8::MAX as i64,
            IntWidth::W16 => i16::MAX as i64,
            IntWidth::W32 => i32::MAX as i64,
            IntWidth::W64 => i64::MAX,
        }
    }

    pub fn unsigned_max(self) -> u64 {
        match self {
            IntWidth::W8 => u8::MAX as u64,
            IntWidth::W16 => u16::MAX as u64,
            IntWidth::W32 => u32::MAX as u64,
            IntWidth::W64 => u64::MAX,
        }
    }

    /// Wraps an i64 into the width's value member, truncating to the
    /// width's two's-complement range.
    fn wrap(self, v: i64) -> Value {
        match self {
            IntWidth::W8 => Value::Byte(v as i8),
            IntWidth::W16 => Value::Short(v as i16),
            IntWidth::W32 => Value::Int(v as i32),
            IntWidth::W64 => Value::Long(v),
        }
    }

    /// Zero-extending unsigned view of a value in this width.
    fn as_unsigned(self, v: i64) -> u64 {
        match self {
            IntWidth::W8 => (v as i8 as u8) as u64,
            IntWidth::W16 => (v as i16 as u16) as u64,
            IntWidth::W32 => (v as i32 as u32) as u64,
            IntWidth::W64 => v as u64,
        }
    }
}

/// One translatable integer method. The same enumeration backs both the
/// SQL template emission and the resolver's constant folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntTransform {
    Abs,
    Max,
    Min,
    Sum,
    Compare,
    CompareUnsigned,
    BitCount,
    HighestOneBit,
    LowestOneBit,
    LeadingZeros,
    TrailingZeros,
    RemainderUnsigned,
    Reverse,
    ReverseBytes,
    RotateLeft,
    RotateRight,
    Signum,
    ToBinaryString,
    ToHexString,
    ToOctalString,
    ToString,
    ToUnsignedString,
    ToUnsignedLong,
    ToUnsignedInt,
    Parse,
    ParseUnsigned,
    ValueOf,
}

impl IntTransform {
    pub fn of(method: &str) -> Option<IntTransform> {
        match method {
            "abs" => Some(IntTransform::Abs),
            "max" => Some(IntTransform::Max),
            "min" => Some(IntTransform::Min),
            "sum" => Some(IntTransform::Sum),
            "compare" => Some(IntTransform::Compare),
            "compareUnsigned" => Some(IntTransform::CompareUnsigned),
            "bitCount" => Some(IntTransform::BitCount),
            "highestOneBit" => Some(IntTransform::HighestOneBit),
            "lowestOneBit" => Some(IntTransform::LowestOneBit),
            "numberOfLeadingZeros" => Some(IntTransform::LeadingZeros),
            "numberOfTrailingZeros" => Some(IntTransform::TrailingZeros),
            "remainderUnsigned" => Some(IntTransform::RemainderUnsigned),
            "reverse" => Some(IntTransform::Reverse),
            "reverseBytes" => Some(IntTransform::ReverseBytes),
            "rotateLeft" => Some(IntTransform::RotateLeft),
            "rotateRight" => Some(IntTransform::RotateRight),
            "signum" => Some(IntTransform::Signum),
            "toBinaryString" => Some(IntTransform::ToBinaryString),
            "toHexString" => Some(IntTransform::ToHexString),
            "toOctalString" => Some(IntTransform::ToOctalString),
            "toString" => Some(IntTransform::ToString),
            "toUnsignedString" => Some(IntTransform::ToUnsignedString),
            "toUnsignedLong" => Some(IntTransform::ToUnsignedLong),
            "toUnsignedInt" => Some(IntTransform::ToUnsignedInt),
            "parseInt" | "parseLong" | "parseShort" | "parseByte" => Some(IntTransform::Parse),
            "parseUnsignedInt" | "parseUnsignedLong" => Some(IntTransform::ParseUnsigned),
            "valueOf" => Some(IntTransform::ValueOf),
            _ => None,
        }
    }

    /// Canonical method name, for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            IntTransform::Abs => "abs",
            IntTransform::Max => "max",
            IntTransform::Min => "min",
            IntTransform::Sum => "sum",
            IntTransform::Compare => "compare",
            IntTransform::CompareUnsigned => "compareUnsigned",
            IntTransform::BitCount => "bitCount",
            IntTransform::HighestOneBit => "highestOneBit",
            IntTransform::LowestOneBit => "lowestOneBit",
            IntTransform::LeadingZeros => "numberOfLeadingZeros",
            IntTransform::TrailingZeros => "numberOfTrailingZeros",
            IntTransform::RemainderUnsigned => "remainderUnsigned",
            IntTransform::Reverse => "reverse",
            IntTransform::ReverseBytes => "reverseBytes",
            IntTransform::RotateLeft => "rotateLeft",
            IntTransform::RotateRight => "rotateRight",
            IntTransform::Signum => "signum",
            IntTransform::ToBinaryString => "toBinaryString",
            IntTransform::ToHexString => "toHexString",
            IntTransform::ToOctalString => "toOctalString",
            IntTransform::ToString => "toString",
            IntTransform::ToUnsignedString => "toUnsignedString",
            IntTransform::ToUnsignedLong => "toUnsignedLong",
            IntTransform::ToUnsignedInt => "toUnsignedInt",
            IntTransform::Parse => "parseInt",
            IntTransform::ParseUnsigned => "parseUnsignedInt",
            IntTransform::ValueOf => "valueOf",
        }
    }

    /// Number of template arguments beyond the transformed operand.
    pub fn arity(&self) -> usize {
        match self {
            IntTransform::Max
            | IntTransform::Min
            | IntTransform::Sum
            | IntTransform::Compare
            | IntTransform::CompareUnsigned
            | IntTransform::RemainderUnsigned
            | IntTransform::RotateLeft
            | IntTransform::RotateRight => 1,
            _ => 0,
        }
    }

    /// Renders the SQL text of this transform applied to the rendered
    /// receiver expression. `args` must match [`arity`](Self::arity).
    pub fn sql(&self, width: IntWidth, receiver: &str, args: &[Operand]) -> String {
        let ty = width.sql_name();
        match self {
            IntTransform::Abs => format!("ABS({receiver})"),
            IntTransform::Max => format!("MAX({receiver}, {})", args[0].as_sql()),
            IntTransform::Min => format!("MIN({receiver}, {})", args[0].as_sql()),
            IntTransform::Sum => format!("{receiver} + {}", args[0].as_sql()),
            IntTransform::Compare => format!("SIGN({receiver} - {})", args[0].as_sql()),
            IntTransform::CompareUnsigned => format!(
                "SIGN(({}) - ({}))",
                to_unsigned(receiver, width),
                to_unsigned(&args[0].as_sql(), width)
            ),
            IntTransform::BitCount => {
                let terms = (0..width.bits())
                    .map(|i| format!("(({receiver} & {}) >> {i})", 1u64 << i))
                    .collect::<Vec<_>>()
                    .join(" + ");
                format!("CAST({terms} AS {ty})")
            }
            IntTransform::HighestOneBit => {
                format!("POWER(2, FLOOR(LOG(ABS({receiver}), 2)))")
            }
            IntTransform::LowestOneBit => {
                format!("POWER(2, FLOOR(LOG(ABS({receiver} & -{receiver}), 2)))")
            }
            IntTransform::LeadingZeros => format!(
                "CASE WHEN {receiver} = 0 THEN {} ELSE FLOOR(LOG(ABS({receiver}), 2)) END",
                width.bits()
            ),
            IntTransform::TrailingZeros => format!(
                "CASE WHEN {receiver} = 0 THEN {} ELSE FLOOR(LOG(ABS({receiver} & -{receiver}), 2)) END",
                width.bits()
            ),
            IntTransform::RemainderUnsigned => format!(
                "MOD({}, {})",
                to_unsigned(receiver, width),
                args[0].as_sql()
            ),
            IntTransform::Reverse => format!("CAST(REVERSE({receiver}) AS {ty})"),
            IntTransform::ReverseBytes => format!("CAST(REVERSE(BIN({receiver})) AS {ty})"),
            IntTransform::RotateLeft => {
                let shift = args[0].as_sql();
                let mask = width.min_value();
                format!(
                    "((({receiver} << {shift}) & {mask}) | ({receiver} >> ({} - {shift}) & {mask}))",
                    width.bits()
                )
            }
            IntTransform::RotateRight => {
                let shift = args[0].as_sql();
                let mask = width.min_value();
                format!(
                    "((({receiver} >> {shift}) & {mask}) | ({receiver} << ({} - {shift}) & {mask}))",
                    width.bits()
                )
            }
            IntTransform::Signum => format!("SIGN({receiver})"),
            IntTransform::ToBinaryString => format!("BIN({receiver})"),
            IntTransform::ToHexString => format!("HEX({receiver})"),
            IntTransform::ToOctalString => format!("OCT({receiver})"),
            IntTransform::ToString => format!("CAST({receiver} AS VARCHAR)"),
            IntTransform::ToUnsignedString => {
                format!("CAST({} AS VARCHAR)", to_unsigned(receiver, width))
            }
            IntTransform::ToUnsignedLong => {
                format!("CAST(CAST({receiver} AS NUMERIC) AS BIGINT)")
            }
            IntTransform::ToUnsignedInt => format!(
                "CAST(CASE WHEN {receiver} < 0 THEN {receiver} + {} + 1 ELSE {receiver} END AS INTEGER)",
                width.max_value()
            ),
            IntTransform::Parse | IntTransform::ValueOf => format!("CAST({receiver} AS {ty})"),
            IntTransform::ParseUnsigned => {
                to_unsigned(&format!("CAST({receiver} AS BIGINT)"), width)
            }
        }
    }

    /// Executes the method natively, with the host library's semantics.
    /// `args[0]` is the principal operand.
    pub fn eval(&self, width: IntWidth, args: &[Value]) -> Result<Value> {
        let expected = 1 + self.arity();
        if args.len() != expected {
            return Err(CompileError::evaluation(
                self.label(),
                format!("expected {expected} arguments, got {}", args.len()),
            ));
        }

        match self {
            IntTransform::Parse | IntTransform::ParseUnsigned | IntTransform::ValueOf => {
                return self.eval_conversion(width, &args[0]);
            }
            _ => {}
        }

        let a = self.int_arg(args, 0)?;
        match self {
            IntTransform::Abs => Ok(match width {
                IntWidth::W8 => Value::Byte((a as i8).wrapping_abs()),
                IntWidth::W16 => Value::Short((a as i16).wrapping_abs()),
                IntWidth::W32 => Value::Int((a as i32).wrapping_abs()),
                IntWidth::W64 => Value::Long(a.wrapping_abs()),
            }),
            IntTransform::Max => Ok(width.wrap(a.max(self.int_arg(args, 1)?))),
            IntTransform::Min => Ok(width.wrap(a.min(self.int_arg(args, 1)?))),
            IntTransform::Sum => {
                let b = self.int_arg(args, 1)?;
                Ok(match width {
                    IntWidth::W8 => Value::Byte((a as i8).wrapping_add(b as i8)),
                    IntWidth::W16 => Value::Short((a as i16).wrapping_add(b as i16)),
                    IntWidth::W32 => Value::Int((a as i32).wrapping_add(b as i32)),
                    IntWidth::W64 => Value::Long(a.wrapping_add(b)),
                })
            }
            IntTransform::Compare => {
                let b = self.int_arg(args, 1)?;
                Ok(Value::Int(match a.cmp(&b) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                }))
            }
            IntTransform::CompareUnsigned => {
                let au = width.as_unsigned(a);
                let bu = width.as_unsigned(self.int_arg(args, 1)?);
                Ok(Value::Int(match au.cmp(&bu) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                }))
            }
            IntTransform::BitCount => {
                Ok(Value::Int(width.as_unsigned(a).count_ones() as i32))
            }
            IntTransform::HighestOneBit => {
                let u = width.as_unsigned(a);
                let isolated = if u == 0 { 0 } else { 1u64 << (63 - u.leading_zeros()) };
                Ok(width.wrap(isolated as i64))
            }
            IntTransform::LowestOneBit => {
                let u = width.as_unsigned(a);
                Ok(width.wrap((u & u.wrapping_neg()) as i64))
            }
            IntTransform::LeadingZeros => {
                let u = width.as_unsigned(a);
                Ok(Value::Int(
                    u.leading_zeros() as i32 - (64 - width.bits()) as i32,
                ))
            }
            IntTransform::TrailingZeros => {
                let u = width.as_unsigned(a);
                let zeros = if u == 0 { width.bits() } else { u.trailing_zeros() };
                Ok(Value::Int(zeros as i32))
            }
            IntTransform::RemainderUnsigned => {
                let au = width.as_unsigned(a);
                let bu = width.as_unsigned(self.int_arg(args, 1)?);
                if bu == 0 {
                    return Err(CompileError::evaluation(self.label(), "division by zero"));
                }
                Ok(width.wrap((au % bu) as i64))
            }
            IntTransform::Reverse => Ok(match width {
                IntWidth::W8 => Value::Byte((a as i8).reverse_bits()),
                IntWidth::W16 => Value::Short((a as i16).reverse_bits()),
                IntWidth::W32 => Value::Int((a as i32).reverse_bits()),
                IntWidth::W64 => Value::Long(a.reverse_bits()),
            }),
            IntTransform::ReverseBytes => Ok(match width {
                IntWidth::W8 => Value::Byte(a as i8),
                IntWidth::W16 => Value::Short((a as i16).swap_bytes()),
                IntWidth::W32 => Value::Int((a as i32).swap_bytes()),
                IntWidth::W64 => Value::Long(a.swap_bytes()),
            }),
            IntTransform::RotateLeft | IntTransform::RotateRight => {
                let d = self.int_arg(args, 1)?.rem_euclid(width.bits() as i64) as u32;
                let left = matches!(self, IntTransform::RotateLeft);
                Ok(match width {
                    IntWidth::W8 => {
                        let v = a as i8;
                        Value::Byte(if left { v.rotate_left(d) } else { v.rotate_right(d) })
                    }
                    IntWidth::W16 => {
                        let v = a as i16;
                        Value::Short(if left { v.rotate_left(d) } else { v.rotate_right(d) })
                    }
                    IntWidth::W32 => {
                        let v = a as i32;
                        Value::Int(if left { v.rotate_left(d) } else { v.rotate_right(d) })
                    }
                    IntWidth::W64 => {
                        Value::Long(if left { a.rotate_left(d) } else { a.rotate_right(d) })
                    }
                })
            }
            IntTransform::Signum => Ok(Value::Int(a.signum() as i32)),
            IntTransform::ToBinaryString => {
                Ok(Value::String(format!("{:b}", width.as_unsigned(a))))
            }
            IntTransform::ToHexString => Ok(Value::String(format!("{:x}", width.as_unsigned(a)))),
            IntTransform::ToOctalString => Ok(Value::String(format!("{:o}", width.as_unsigned(a)))),
            IntTransform::ToString => Ok(Value::String(a.to_string())),
            IntTransform::ToUnsignedString => {
                Ok(Value::String(width.as_unsigned(a).to_string()))
            }
            IntTransform::ToUnsignedLong => Ok(Value::Long(width.as_unsigned(a) as i64)),
            IntTransform::ToUnsignedInt => Ok(Value::Int(width.as_unsigned(a) as i32)),
            IntTransform::Parse | IntTransform::ParseUnsigned | IntTransform::ValueOf => {
                unreachable!("conversions are handled above")
            }
        }
    }

    fn eval_conversion(&self, width: IntWidth, arg: &Value) -> Result<Value> {
        match arg {
            Value::String(s) => match self {
                IntTransform::ParseUnsigned => {
                    let u = s.parse::<u64>().map_err(|e| {
                        CompileError::evaluation(self.label(), e.to_string())
                    })?;
                    if u > width.unsigned_max() {
                        return Err(CompileError::evaluation(
                            self.label(),
                            format!("'{s}' is out of range for {}", width.sql_name()),
                        ));
                    }
                    Ok(width.wrap(u as i64))
                }
                _ => {
                    let v = s.parse::<i64>().map_err(|e| {
                        CompileError::evaluation(self.label(), e.to_string())
                    })?;
                    if v < width.min_value() || v > width.max_value() {
                        return Err(CompileError::evaluation(
                            self.label(),
                            format!("'{s}' is out of range for {}", width.sql_name()),
                        ));
                    }
                    Ok(width.wrap(v))
                }
            },
            other => match other.as_i64() {
                Some(v) => Ok(width.wrap(v)),
                None => Err(CompileError::evaluation(
                    self.label(),
                    format!("cannot convert {other:?}"),
                )),
            },
        }
    }

    fn int_arg(&self, args: &[Value], index: usize) -> Result<i64> {
        args[index].as_i64().ok_or_else(|| {
            CompileError::evaluation(
                self.label(),
                format!("argument {index} is not an integer: {:?}", args[index]),
            )
        })
    }
}

/// Unsigned reinterpretation of a signed expression, emulated with the
/// width's unsigned maximum. Bitwise-equivalent, not a true type change.
fn to_unsigned(expr: &str, width: IntWidth) -> String {
    format!(
        "CASE WHEN {expr} < 0 THEN (ABS(CAST({expr} AS NUMERIC) + {})) ELSE {expr} END",
        width.unsigned_max()
    )
}
