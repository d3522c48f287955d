//! SQL translation and native evaluation of the string method family.

use crate::error::{CompileError, Result};
use crate::operand::Operand;
use model::value::Value;
use regex::Regex;

/// One translatable string method. The same enumeration backs both the
/// SQL template emission and the resolver's constant folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringTransform {
    ToUpperCase,
    ToLowerCase,
    Trim,
    Strip,
    StripLeading,
    StripTrailing,
    Length,
    Substring,
    CharAt,
    Concat,
    Replace,
    ReplaceAll,
    ReplaceFirst,
    Repeat,
    Intern,
}

impl StringTransform {
    pub fn of(method: &str) -> Option<StringTransform> {
        match method {
            "toUpperCase" => Some(StringTransform::ToUpperCase),
            "toLowerCase" => Some(StringTransform::ToLowerCase),
            "trim" => Some(StringTransform::Trim),
            "strip" => Some(StringTransform::Strip),
            "stripLeading" => Some(StringTransform::StripLeading),
            "stripTrailing" => Some(StringTransform::StripTrailing),
            "length" => Some(StringTransform::Length),
            "substring" => Some(StringTransform::Substring),
            "charAt" => Some(StringTransform::CharAt),
            "concat" => Some(StringTransform::Concat),
            "replace" => Some(StringTransform::Replace),
            "replaceAll" => Some(StringTransform::ReplaceAll),
            "replaceFirst" => Some(StringTransform::ReplaceFirst),
            "repeat" => Some(StringTransform::Repeat),
            "intern" => Some(StringTransform::Intern),
            _ => None,
        }
    }

    /// Canonical method name, for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            StringTransform::ToUpperCase => "toUpperCase",
            StringTransform::ToLowerCase => "toLowerCase",
            StringTransform::Trim => "trim",
            StringTransform::Strip => "strip",
            StringTransform::StripLeading => "stripLeading",
            StringTransform::StripTrailing => "stripTrailing",
            StringTransform::Length => "length",
            StringTransform::Substring => "substring",
            StringTransform::CharAt => "charAt",
            StringTransform::Concat => "concat",
            StringTransform::Replace => "replace",
            StringTransform::ReplaceAll => "replaceAll",
            StringTransform::ReplaceFirst => "replaceFirst",
            StringTransform::Repeat => "repeat",
            StringTransform::Intern => "intern",
        }
    }

    /// Accepted argument counts.
    pub fn arity(&self) -> std::ops::RangeInclusive<usize> {
        match self {
            StringTransform::Substring => 1..=2,
            StringTransform::CharAt
            | StringTransform::Concat
            | StringTransform::Repeat => 1..=1,
            StringTransform::Replace
            | StringTransform::ReplaceAll
            | StringTransform::ReplaceFirst => 2..=2,
            _ => 0..=0,
        }
    }

    /// Renders the SQL text of this transform applied to the rendered
    /// receiver expression. `args` must match [`arity`](Self::arity).
    pub fn sql(&self, receiver: &str, args: &[Operand]) -> String {
        match self {
            StringTransform::ToUpperCase => format!("UPPER({receiver})"),
            StringTransform::ToLowerCase => format!("LOWER({receiver})"),
            StringTransform::Trim | StringTransform::Strip => {
                format!("LTRIM(RTRIM({receiver}))")
            }
            StringTransform::StripLeading => format!("LTRIM({receiver})"),
            StringTransform::StripTrailing => format!("RTRIM({receiver})"),
            StringTransform::Length => format!("LENGTH({receiver})"),
            StringTransform::Substring => {
                // 0-based half-open range to 1-based inclusive length
                let start = &args[0];
                let end = args.get(1);
                match (start.as_literal_int(), end.map(Operand::as_literal_int)) {
                    (Some(a), Some(Some(b))) => {
                        format!("SUBSTR({receiver}, {}, {})", a + 1, b - a)
                    }
                    (Some(a), None) => {
                        format!("SUBSTR({receiver}, {}, {})", a + 1, i32::MAX as i64 - a)
                    }
                    _ => {
                        let a = start.as_sql();
                        let b = end
                            .map(Operand::as_sql)
                            .unwrap_or_else(|| i32::MAX.to_string());
                        format!("SUBSTR({receiver}, {a} + 1, ({b} - {a}))")
                    }
                }
            }
            StringTransform::CharAt => {
                format!("SUBSTR({receiver}, {}, 1)", args[0].as_sql())
            }
            StringTransform::Concat => format!("CONCAT({receiver}, {})", args[0].as_sql()),
            StringTransform::Replace => format!(
                "REPLACE({receiver}, '{}', '{}')",
                args[0].raw_text(),
                args[1].raw_text()
            ),
            StringTransform::ReplaceAll => format!(
                "REGEXP_REPLACE({receiver}, '{}', '{}')",
                args[0].raw_text(),
                args[1].raw_text()
            ),
            StringTransform::ReplaceFirst => format!(
                "REGEXP_REPLACE({receiver}, '{}', '{}', 1)",
                args[0].raw_text(),
                args[1].raw_text()
            ),
            StringTransform::Repeat => {
                format!("RPAD('', {}, {receiver})", args[0].as_sql())
            }
            StringTransform::Intern => receiver.to_string(),
        }
    }

    /// Executes the method natively, with the host library's semantics.
    pub fn eval(&self, receiver: &Value, args: &[Value]) -> Result<Value> {
        let s = receiver.as_str().ok_or_else(|| {
            CompileError::evaluation(
                self.label(),
                format!("receiver is not a string: {receiver:?}"),
            )
        })?;
        if !self.arity().contains(&args.len()) {
            return Err(CompileError::evaluation(
                self.label(),
                format!("wrong number of arguments: {}", args.len()),
            ));
        }

        match self {
            StringTransform::ToUpperCase => Ok(Value::String(s.to_uppercase())),
            StringTransform::ToLowerCase => Ok(Value::String(s.to_lowercase())),
            // trim strips only chars up to U+0020, strip is full whitespace
            StringTransform::Trim => {
                Ok(Value::String(s.trim_matches(|c: char| c <= ' ').to_string()))
            }
            StringTransform::Strip => Ok(Value::String(s.trim().to_string())),
            StringTransform::StripLeading => Ok(Value::String(s.trim_start().to_string())),
            StringTransform::StripTrailing => Ok(Value::String(s.trim_end().to_string())),
            StringTransform::Length => Ok(Value::Int(s.chars().count() as i32)),
            StringTransform::Substring => {
                let chars: Vec<char> = s.chars().collect();
                let a = self.index_arg(&args[0])?;
                let b = match args.get(1) {
                    Some(arg) => self.index_arg(arg)?,
                    None => chars.len(),
                };
                if a > b || b > chars.len() {
                    return Err(CompileError::evaluation(
                        self.label(),
                        format!("range {a}..{b} out of bounds for length {}", chars.len()),
                    ));
                }
                Ok(Value::String(chars[a..b].iter().collect()))
            }
            StringTransform::CharAt => {
                let i = self.index_arg(&args[0])?;
                match s.chars().nth(i) {
                    Some(c) => Ok(Value::String(c.to_string())),
                    None => Err(CompileError::evaluation(
                        self.label(),
                        format!("index {i} out of bounds for length {}", s.chars().count()),
                    )),
                }
            }
            StringTransform::Concat => {
                let suffix = args[0].as_str().ok_or_else(|| {
                    CompileError::evaluation(self.label(), "argument is not a string")
                })?;
                Ok(Value::String(format!("{s}{suffix}")))
            }
            StringTransform::Replace => {
                let old = self.str_arg(&args[0])?;
                let new = self.str_arg(&args[1])?;
                Ok(Value::String(s.replace(old, new)))
            }
            StringTransform::ReplaceAll | StringTransform::ReplaceFirst => {
                let re = Regex::new(self.str_arg(&args[0])?)
                    .map_err(|e| CompileError::evaluation(self.label(), e.to_string()))?;
                let repl = self.str_arg(&args[1])?;
                let replaced = if matches!(self, StringTransform::ReplaceAll) {
                    re.replace_all(s, repl)
                } else {
                    re.replace(s, repl)
                };
                Ok(Value::String(replaced.into_owned()))
            }
            StringTransform::Repeat => {
                let n = self.index_arg(&args[0])?;
                Ok(Value::String(s.repeat(n)))
            }
            StringTransform::Intern => Ok(Value::String(s.to_string())),
        }
    }

    fn index_arg(&self, arg: &Value) -> Result<usize> {
        arg.as_i64()
            .filter(|v| *v >= 0)
            .map(|v| v as usize)
            .ok_or_else(|| {
                CompileError::evaluation(
                    self.label(),
                    format!("expected a non-negative integer, got {arg:?}"),
                )
            })
    }

    fn str_arg<'a>(&self, arg: &'a Value) -> Result<&'a str> {
        arg.as_str().ok_or_else(|| {
            CompileError::evaluation(self.label(), format!("expected a string, got {arg:?}"))
        })
    }
}
