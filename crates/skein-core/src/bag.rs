use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BagError, BagResult, CoreResult};
use crate::value::{Value, VarType};

/// The named-property contract with the narrative engine.
///
/// Variables are grouped into named sets (the engine's global variable
/// namespaces). Nothing about the contents of a set is assumed: callers
/// discover the relevant variables with [`list`](VariableBag::list) and
/// match names against the conventions in [`naming`](crate::naming).
pub trait VariableBag: fmt::Debug {
    /// Read a variable. `Ok(None)` means the variable is not declared.
    fn get(&self, set: &str, name: &str) -> BagResult<Option<Value>>;

    /// Write a variable.
    fn set(&mut self, set: &str, name: &str, value: Value) -> BagResult<()>;

    /// List every variable in a set with its declared type.
    fn list(&self, set: &str) -> BagResult<Vec<(String, VarType)>>;

    /// Read an integer variable, rejecting other types.
    fn get_int(&self, set: &str, name: &str) -> BagResult<Option<i64>> {
        match self.get(set, name)? {
            None => Ok(None),
            Some(Value::Integer(n)) => Ok(Some(n)),
            Some(other) => Err(mismatch(set, name, VarType::Integer, other.var_type())),
        }
    }

    /// Read a boolean variable, rejecting other types.
    fn get_bool(&self, set: &str, name: &str) -> BagResult<Option<bool>> {
        match self.get(set, name)? {
            None => Ok(None),
            Some(Value::Boolean(b)) => Ok(Some(b)),
            Some(other) => Err(mismatch(set, name, VarType::Boolean, other.var_type())),
        }
    }
}

fn mismatch(set: &str, name: &str, expected: VarType, found: VarType) -> BagError {
    BagError::TypeMismatch {
        set: set.to_string(),
        name: name.to_string(),
        expected,
        found,
    }
}

/// A declared variable: its type and current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Declared type.
    pub ty: VarType,
    /// Current value.
    pub value: Value,
}

/// On-disk declaration of one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum VarDecl {
    Enum { variants: Vec<i64>, value: i64 },
    Plain(Value),
}

/// An in-memory variable bag with declared, typed variables.
///
/// Writes to undeclared variables are rejected, as the authoring engine
/// rejects them. Sets and variables are kept in name order.
#[derive(Debug, Clone, Default)]
pub struct MemoryBag {
    sets: BTreeMap<String, BTreeMap<String, Variable>>,
}

impl MemoryBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load declarations from JSON of the form
    /// `{ "Set": { "name": value, "mood": { "variants": [0, 1], "value": 0 } } }`.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let raw: BTreeMap<String, BTreeMap<String, VarDecl>> = serde_json::from_str(json)?;
        let mut bag = Self::new();
        for (set, vars) in raw {
            bag.declare_set(&set);
            for (name, decl) in vars {
                match decl {
                    VarDecl::Enum { variants, value } => {
                        bag.declare(&set, &name, VarType::Enum(variants), Value::Integer(value))
                    }
                    VarDecl::Plain(value) => {
                        let ty = value.var_type();
                        bag.declare(&set, &name, ty, value)
                    }
                }
            }
        }
        Ok(bag)
    }

    /// Declare an empty variable set.
    pub fn declare_set(&mut self, set: &str) {
        self.sets.entry(set.to_string()).or_default();
    }

    /// Declare (or redeclare) a variable.
    pub fn declare(&mut self, set: &str, name: &str, ty: VarType, value: Value) {
        self.sets
            .entry(set.to_string())
            .or_default()
            .insert(name.to_string(), Variable { ty, value });
    }

    /// Builder-style declaration using the value's natural type.
    pub fn with_var(mut self, set: &str, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.var_type();
        self.declare(set, name, ty, value);
        self
    }

    /// Builder-style declaration of an enum variable.
    pub fn with_enum(mut self, set: &str, name: &str, variants: Vec<i64>, value: i64) -> Self {
        self.declare(set, name, VarType::Enum(variants), Value::Integer(value));
        self
    }

    /// Names of all declared sets.
    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// All variables in a set, in name order.
    pub fn variables(&self, set: &str) -> impl Iterator<Item = (&str, &Variable)> {
        self.sets
            .get(set)
            .into_iter()
            .flat_map(|vars| vars.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Serialize current values as `{ "Set": { "name": value } }`.
    pub fn to_json(&self) -> CoreResult<String> {
        let snapshot: BTreeMap<&str, BTreeMap<&str, &Value>> = self
            .sets
            .iter()
            .map(|(set, vars)| {
                let values = vars.iter().map(|(k, v)| (k.as_str(), &v.value)).collect();
                (set.as_str(), values)
            })
            .collect();
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

impl VariableBag for MemoryBag {
    fn get(&self, set: &str, name: &str) -> BagResult<Option<Value>> {
        let vars = self
            .sets
            .get(set)
            .ok_or_else(|| BagError::UnknownSet(set.to_string()))?;
        Ok(vars.get(name).map(|v| v.value.clone()))
    }

    fn set(&mut self, set: &str, name: &str, value: Value) -> BagResult<()> {
        let vars = self
            .sets
            .get_mut(set)
            .ok_or_else(|| BagError::UnknownSet(set.to_string()))?;
        let var = vars.get_mut(name).ok_or_else(|| BagError::UnknownVariable {
            set: set.to_string(),
            name: name.to_string(),
        })?;
        if !var.ty.accepts(&value) {
            return Err(mismatch(set, name, var.ty.clone(), value.var_type()));
        }
        var.value = match (&var.ty, value) {
            (VarType::Float, Value::Integer(n)) => Value::Float(n as f64),
            (_, value) => value,
        };
        Ok(())
    }

    fn list(&self, set: &str) -> BagResult<Vec<(String, VarType)>> {
        let vars = self
            .sets
            .get(set)
            .ok_or_else(|| BagError::UnknownSet(set.to_string()))?;
        Ok(vars.iter().map(|(k, v)| (k.clone(), v.ty.clone())).collect())
    }
}

/// Test doubles for code that talks to a [`VariableBag`].
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use std::collections::BTreeSet;

    use super::*;

    /// A [`MemoryBag`] that records every write and can be told to fail.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingBag {
        /// The wrapped bag.
        pub inner: MemoryBag,
        /// Every accepted write, in order, as `(set, name, value)`.
        pub writes: Vec<(String, String, Value)>,
        failing: BTreeSet<(String, String)>,
    }

    impl RecordingBag {
        /// Wrap an existing bag.
        pub fn new(inner: MemoryBag) -> Self {
            Self {
                inner,
                writes: Vec::new(),
                failing: BTreeSet::new(),
            }
        }

        /// Make every access to `set.name` fail with an engine error.
        pub fn fail_on(mut self, set: &str, name: &str) -> Self {
            self.failing.insert((set.to_string(), name.to_string()));
            self
        }

        /// Number of recorded writes.
        pub fn write_count(&self) -> usize {
            self.writes.len()
        }

        fn check(&self, set: &str, name: &str) -> BagResult<()> {
            if self.failing.contains(&(set.to_string(), name.to_string())) {
                return Err(BagError::Engine(format!("simulated failure on {set}.{name}")));
            }
            Ok(())
        }
    }

    impl VariableBag for RecordingBag {
        fn get(&self, set: &str, name: &str) -> BagResult<Option<Value>> {
            self.check(set, name)?;
            self.inner.get(set, name)
        }

        fn set(&mut self, set: &str, name: &str, value: Value) -> BagResult<()> {
            self.check(set, name)?;
            self.inner.set(set, name, value.clone())?;
            self.writes.push((set.to_string(), name.to_string(), value));
            Ok(())
        }

        fn list(&self, set: &str) -> BagResult<Vec<(String, VarType)>> {
            self.inner.list(set)
        }
    }
}
