//! Server and instance records as they appear in the inventory document.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, IgnoredAny, Visitor};
use serde::{Deserialize, Deserializer};

/// A machine reachable over SSH.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Server {
    /// Unique key used by instances to reference this server.
    pub alias: String,
    /// Address used for SSH and monitoring targets.
    pub ip: String,
    /// Remote user for SSH logins.
    pub user: String,
    /// Path to the private key used for SSH logins.
    pub key: String,
    /// Set when the record carries a non-null `server-payee` value.
    #[serde(default, rename = "server-payee", deserialize_with = "non_null")]
    pub payee: bool,
    /// Set when the record carries a `skip-ssh-check` key, whatever its value.
    #[serde(default, rename = "skip-ssh-check", deserialize_with = "present")]
    pub skip_ssh_check: bool,
}

impl Server {
    /// Returns `true` when the server is marked as paid for by the operator.
    #[must_use]
    pub const fn is_payee(&self) -> bool {
        self.payee
    }
}

/// A service deployment placed on one server.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Instance {
    /// Host alias used in SSH config and inventory groups.
    pub name: String,
    /// Alias of the server the instance runs on.
    pub server: String,
    /// Project the instance belongs to.
    pub project: String,
    /// Owner the instance is operated for.
    pub owner: String,
    /// Extra inventory variables, kept sorted by name.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableValue>,
}

/// Scalar value of an inventory variable.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableValue {
    /// Null scalar, rendered as `None`.
    Null,
    /// Boolean scalar, rendered as `True` or `False`.
    Bool(bool),
    /// Integer scalar, wide enough for any signed or unsigned 64-bit value.
    Integer(i128),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    String(String),
}

impl VariableValue {
    /// Renders the value for an INI inventory line.
    ///
    /// Only strings containing a space are double-quoted.
    #[must_use]
    pub fn to_inventory_value(&self) -> String {
        match self {
            Self::String(text) if text.contains(' ') => format!("\"{text}\""),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&render_float(*value)),
            Self::String(text) => f.write_str(text),
        }
    }
}

/// Formats a float with a signed, two-digit-minimum exponent (`1e+20`,
/// `1.5e-05`) and keeps the fractional part of whole values (`1.0`).
fn render_float(value: f64) -> String {
    if value.is_nan() {
        return String::from("nan");
    }
    // Debug picks the shortest round-trip digits and switches to an
    // exponent below 1e-4 and from 1e16 upwards.
    let debug = format!("{value:?}");
    let Some((mantissa, exponent)) = debug.split_once('e') else {
        return debug;
    };
    let (sign, digits) = exponent
        .strip_prefix('-')
        .map_or(("+", exponent), |digits| ("-", digits));
    format!("{mantissa}e{sign}{digits:0>2}")
}

impl<'de> Deserialize<'de> for VariableValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(VariableValueVisitor)
    }
}

struct VariableValueVisitor;

impl Visitor<'_> for VariableValueVisitor {
    type Value = VariableValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a scalar variable value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(VariableValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(VariableValue::Null)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(VariableValue::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(VariableValue::Integer(i128::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(VariableValue::Integer(i128::from(value)))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<Self::Value, E> {
        Ok(VariableValue::Integer(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Self::Value, E> {
        i128::try_from(value)
            .map(VariableValue::Integer)
            .map_err(|_| E::invalid_value(de::Unexpected::Other("integer above i128::MAX"), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(VariableValue::Float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(VariableValue::String(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(VariableValue::String(value))
    }
}

fn present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer).map(|_| true)
}

fn non_null<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IgnoredAny>::deserialize(deserializer).map(|value| value.is_some())
}

#[derive(Debug, Deserialize)]
pub(super) struct InventoryDocument {
    #[serde(default)]
    pub(super) servers: Vec<Server>,
    #[serde(default)]
    pub(super) instances: Vec<Instance>,
}
