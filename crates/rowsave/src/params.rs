//! Parameter sets built from records.

use crate::fields::fields;
use crate::record::Record;
use crate::value::Value;

/// Size/scale hint attached to a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionHint {
    pub size: u8,
    pub scale: u8,
}

/// Hint attached to every present date/time value: `yyyy-mm-dd hh:mm:ss.fff`
/// (23 characters, millisecond scale). Without it ODBC-style drivers bind
/// date/time values at full precision and the server rejects them as out of range.
pub const DATETIME_HINT: PrecisionHint = PrecisionHint { size: 23, scale: 3 };

/// One named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: Value,
    pub hint: Option<PrecisionHint>,
}

/// Ordered name → value bindings for one statement.
///
/// Adding a name that is already present replaces its value in place, so the
/// original position is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    params: Vec<Param>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Build the parameters of `record`, see [`build_params`].
    pub fn from_record<R: Record>(record: &R, keys: &[&str], exclude: &[&str]) -> Self {
        build_params(record, keys, exclude)
    }

    /// Add (or replace) a parameter without a hint.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(Param {
            name: name.into(),
            value: value.into(),
            hint: None,
        })
    }

    /// Add (or replace) a parameter with an explicit size/scale hint.
    pub fn add_with_hint(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        hint: PrecisionHint,
    ) -> &mut Self {
        self.push(Param {
            name: name.into(),
            value: value.into(),
            hint: Some(hint),
        })
    }

    fn push(&mut self, param: Param) -> &mut Self {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Turn the readable fields of `record` into a parameter set.
///
/// - fields named in `exclude` are skipped
/// - fields named in `keys` are skipped while their value is null, so
///   database-generated keys are not sent on insert
/// - present date, time and timestamp values carry [`DATETIME_HINT`]
pub fn build_params<R: Record>(record: &R, keys: &[&str], exclude: &[&str]) -> ParamSet {
    let descriptors = fields::<R>();
    let mut params = ParamSet::new();
    for field in descriptors.iter() {
        let name = field.name();
        if exclude.contains(&name) {
            continue;
        }
        let value = field.get(record);
        if value.is_null() && keys.contains(&name) {
            continue;
        }
        if value.is_datetime() {
            params.add_with_hint(name, value, DATETIME_HINT);
        } else {
            params.add(name, value);
        }
    }
    params
}
