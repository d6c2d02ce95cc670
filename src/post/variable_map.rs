use crate::TndmError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Defines a function transforming a sampled value before it is written
pub type FnTransform = Box<dyn Fn(f64) -> f64>;

/// Holds the mapping from mesh fields to output columns
///
/// The pairs are kept in insertion order, which defines the column order
/// of the output. Columns without a transform are written unchanged.
pub struct VariableMap {
    pairs: Vec<(String, String)>,
    transforms: HashMap<String, FnTransform>,
}

impl VariableMap {
    /// Allocates an empty map
    pub fn new() -> Self {
        VariableMap {
            pairs: Vec::new(),
            transforms: HashMap::new(),
        }
    }

    /// Allocates a map from (field, column) pairs without transforms
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut map = VariableMap::new();
        for (field, column) in pairs {
            map.add(field, column);
        }
        map
    }

    /// Maps a mesh field to an output column
    pub fn add(&mut self, field: &str, column: &str) -> &mut Self {
        self.pairs.push((field.to_string(), column.to_string()));
        self
    }

    /// Sets the transform applied to an output column
    pub fn set_transform(&mut self, column: &str, f: FnTransform) -> &mut Self {
        self.transforms.insert(column.to_string(), f);
        self
    }

    /// Returns the number of mapped variables
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no variable is mapped
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the names of the mesh fields in column order
    pub fn fields(&self) -> Vec<&str> {
        self.pairs.iter().map(|(f, _)| f.as_str()).collect()
    }

    /// Returns the output column names in order
    pub fn columns(&self) -> Vec<&str> {
        self.pairs.iter().map(|(_, c)| c.as_str()).collect()
    }

    /// Applies the transform of a column (identity if there is none)
    pub fn transform(&self, column: &str, value: f64) -> f64 {
        match self.transforms.get(column) {
            Some(f) => f(value),
            None => value,
        }
    }
}

impl fmt::Display for VariableMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, column) in &self.pairs {
            let kind = if self.transforms.contains_key(column) {
                "transformed"
            } else {
                "identity"
            };
            write!(f, "{} → {} ({})\n", field, column, kind)?;
        }
        Ok(())
    }
}

/// Defines the transforms available in configuration files
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Keeps the value
    Identity,

    /// Returns |x|
    Abs,

    /// Returns log10(|x|)
    Log10Abs,

    /// Returns factor · x
    Scale { factor: f64 },

    /// Converts the state variable of rate-and-state friction to log10(θ V0 / Dc)
    ///
    /// Returns `log10(exp((x - f0) / b) · dc / v0)`
    LogState { f0: f64, b: f64, dc: f64, v0: f64 },
}

impl Transform {
    /// Applies the transform
    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            Transform::Identity => x,
            Transform::Abs => f64::abs(x),
            Transform::Log10Abs => f64::log10(f64::abs(x)),
            Transform::Scale { factor } => factor * x,
            Transform::LogState { f0, b, dc, v0 } => f64::log10(f64::exp((x - f0) / b) * dc / v0),
        }
    }

    /// Returns a boxed closure computing the transform
    pub fn to_fn(&self) -> FnTransform {
        let t = *self;
        Box::new(move |x| t.apply(x))
    }
}

/// Holds one mapped variable of a configuration file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    /// Holds the name of the mesh field (e.g., "state1")
    pub field: String,

    /// Holds the name of the output column (e.g., "slip")
    pub column: String,

    /// Holds the transform (identity if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

/// Holds the serializable description of a [VariableMap]
///
/// ```text
/// {
///   "variables": [
///     { "field": "state1", "column": "slip" },
///     { "field": "state3", "column": "slip_rate", "transform": { "kind": "log10_abs" } }
///   ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    /// Holds the variables in column order
    pub variables: Vec<VariableEntry>,
}

impl Default for VariableConfig {
    /// Returns the mapping of the fault output of tandem
    fn default() -> Self {
        let entry = |field: &str, column: &str, transform: Option<Transform>| VariableEntry {
            field: field.to_string(),
            column: column.to_string(),
            transform,
        };
        VariableConfig {
            variables: vec![
                entry("state1", "slip", None),
                entry("state3", "slip_rate", Some(Transform::Log10Abs)),
                entry("state2", "shear_stress", None),
                entry("state4", "normal_stress", None),
                entry(
                    "state0",
                    "state",
                    Some(Transform::LogState {
                        f0: 0.6,
                        b: 0.015,
                        dc: 0.008,
                        v0: 1e-6,
                    }),
                ),
            ],
        }
    }
}

impl VariableConfig {
    /// Builds the variable map
    pub fn to_map(&self) -> VariableMap {
        let mut map = VariableMap::new();
        for v in &self.variables {
            map.add(&v.field, &v.column);
            if let Some(t) = &v.transform {
                map.set_transform(&v.column, t.to_fn());
            }
        }
        map
    }

    /// Reads a JSON file with the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, TndmError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path);
        if !path.is_file() {
            return Err(TndmError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| TndmError::io(path, e))?;
        let reader = BufReader::new(file);
        let config: VariableConfig =
            serde_json::from_reader(reader).map_err(|e| TndmError::format(path, e.to_string()))?;
        if config.variables.is_empty() {
            return Err(TndmError::format(path, "at least one variable must be given"));
        }
        Ok(config)
    }

    /// Writes a JSON file with the configuration
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), TndmError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path);
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|e| TndmError::io(p, e))?;
        }
        let mut file = File::create(path).map_err(|e| TndmError::io(path, e))?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|e| TndmError::format(path, e.to_string()))?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Transform, VariableConfig, VariableMap};
    use crate::TndmError;
    use russell_chk::assert_approx_eq;
    use std::fs;

    #[test]
    fn variable_map_works() {
        let mut map = VariableMap::from_pairs(&[("state1", "slip"), ("state3", "slip_rate")]);
        map.set_transform("slip_rate", Box::new(|x| 2.0 * x));
        assert_eq!(map.len(), 2);
        assert!(!map.is_empty());
        assert_eq!(map.fields(), &["state1", "state3"]);
        assert_eq!(map.columns(), &["slip", "slip_rate"]);
        assert_eq!(map.transform("slip", 3.0), 3.0);
        assert_eq!(map.transform("slip_rate", 3.0), 6.0);
        assert_eq!(
            format!("{}", map),
            "state1 → slip (identity)\n\
             state3 → slip_rate (transformed)\n"
        );
        assert!(VariableMap::new().is_empty());
    }

    #[test]
    fn transforms_work() {
        assert_eq!(Transform::Identity.apply(-2.0), -2.0);
        assert_eq!(Transform::Abs.apply(-2.0), 2.0);
        assert_approx_eq!(Transform::Log10Abs.apply(-100.0), 2.0, 1e-15);
        assert_eq!(Transform::Scale { factor: 0.5 }.apply(4.0), 2.0);
        let t = Transform::LogState {
            f0: 0.6,
            b: 0.015,
            dc: 0.008,
            v0: 1e-6,
        };
        // x = f0 gives log10(dc / v0)
        assert_approx_eq!(t.apply(0.6), f64::log10(8000.0), 1e-12);
        assert_approx_eq!(t.to_fn()(0.6), f64::log10(8000.0), 1e-12);
    }

    #[test]
    fn default_config_works() {
        let map = VariableConfig::default().to_map();
        assert_eq!(map.fields(), &["state1", "state3", "state2", "state4", "state0"]);
        assert_eq!(
            map.columns(),
            &["slip", "slip_rate", "shear_stress", "normal_stress", "state"]
        );
        assert_eq!(map.transform("slip", -1.5), -1.5);
        assert_approx_eq!(map.transform("slip_rate", -1e-3), -3.0, 1e-15);
        assert_eq!(map.transform("shear_stress", 20.0), 20.0);
    }

    #[test]
    fn json_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("variables.json");
        assert!(matches!(VariableConfig::read_json(&path).err(), Some(TndmError::NotFound(_))));

        let config = VariableConfig::default();
        config.write_json(&path).unwrap();
        let read = VariableConfig::read_json(&path).unwrap();
        assert_eq!(read, config);

        fs::write(
            &path,
            r#"{"variables": [
                {"field": "state1", "column": "slip"},
                {"field": "state3", "column": "v", "transform": {"kind": "scale", "factor": 2.0}}
            ]}"#,
        )
        .unwrap();
        let map = VariableConfig::read_json(&path).unwrap().to_map();
        assert_eq!(map.columns(), &["slip", "v"]);
        assert_eq!(map.transform("v", 1.5), 3.0);

        fs::write(&path, r#"{"variables": []}"#).unwrap();
        assert_eq!(
            VariableConfig::read_json(&path).err().map(|e| e.to_string()),
            Some(format!("{}: at least one variable must be given", path.display()))
        );
        fs::write(&path, r#"{"variables": [{"field": "a", "column": "b", "transform": {"kind": "cube"}}]}"#).unwrap();
        assert!(matches!(VariableConfig::read_json(&path).err(), Some(TndmError::Format { .. })));
    }
}
