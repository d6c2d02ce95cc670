use crate::TndmError;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Holds a point where the time history of the fields is recorded
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    /// Holds the name used in the output file name (the index is used otherwise)
    pub name: Option<String>,

    /// Holds the coordinates
    pub position: [f64; 3],
}

/// Holds an ordered set of stations
#[derive(Clone, Debug, PartialEq)]
pub struct StationSet {
    /// Holds all stations in file order
    pub stations: Vec<Station>,
}

impl StationSet {
    /// Reads a CSV file with a header containing `x`, `y`, `z` and (optionally) `name`
    ///
    /// Column names are case-insensitive and may appear in any order; other
    /// columns are ignored.
    ///
    /// ```text
    /// name,x,y,z
    /// S01,0.0,-1.5,0.0
    /// S02,0.0,-7.5,0.0
    /// ```
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_csv<P>(full_path: &P) -> Result<Self, TndmError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path);
        if !path.is_file() {
            return Err(TndmError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| TndmError::io(path, e))?;
        StationSet::from_reader(BufReader::new(file)).map_err(|message| TndmError::format(path, message))
    }

    /// Parses the CSV contents
    fn from_reader<R: Read>(reader: R) -> Result<Self, String> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| format!("cannot read the CSV header: {}", e))?
            .clone();
        let find = |key: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(key));
        let mut columns = [0; 3];
        for (d, key) in ["x", "y", "z"].into_iter().enumerate() {
            columns[d] = find(key).ok_or_else(|| format!("the CSV header must contain the column '{}'", key))?;
        }
        let name_column = find("name");

        let mut stations = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| format!("cannot read station {}: {}", i, e))?;
            let mut position = [0.0; 3];
            for d in 0..3 {
                let field = record.get(columns[d]).unwrap_or("");
                position[d] = field
                    .parse()
                    .map_err(|_| format!("cannot parse coordinate '{}' of station {}", field, i))?;
            }
            let name = name_column
                .and_then(|c| record.get(c))
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
            stations.push(Station { name, position });
        }
        Ok(StationSet { stations })
    }

    /// Returns the number of stations
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if there are no stations
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Returns the coordinates of all stations
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.stations.iter().map(|s| s.position).collect()
    }

    /// Returns the station names if all stations have one
    pub fn names(&self) -> Option<Vec<String>> {
        self.stations.iter().map(|s| s.name.clone()).collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Station, StationSet};
    use crate::TndmError;
    use std::fs;

    #[test]
    fn from_reader_captures_errors() {
        assert_eq!(
            StationSet::from_reader("name,x,y\nA,1,2\n".as_bytes()).err(),
            Some("the CSV header must contain the column 'z'".to_string())
        );
        assert_eq!(
            StationSet::from_reader("x,y,z\n1,two,3\n".as_bytes()).err(),
            Some("cannot parse coordinate 'two' of station 0".to_string())
        );
        assert!(StationSet::from_reader("x,y,z\n1,2\n".as_bytes()).is_err());
    }

    #[test]
    fn from_reader_works() {
        let set = StationSet::from_reader("Z, Name ,X,Y\n 3.0,S01,1.0,-2.0\n0,S02,0.5,-1e1\n".as_bytes()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.stations[0],
            Station {
                name: Some("S01".to_string()),
                position: [1.0, -2.0, 3.0]
            }
        );
        assert_eq!(set.positions(), &[[1.0, -2.0, 3.0], [0.5, -10.0, 0.0]]);
        assert_eq!(set.names(), Some(vec!["S01".to_string(), "S02".to_string()]));
    }

    #[test]
    fn names_are_optional() {
        let set = StationSet::from_reader("x,y,z\n0,0,0\n1,1,1\n".as_bytes()).unwrap();
        assert_eq!(set.names(), None);
        let set = StationSet::from_reader("name,x,y,z\nA,0,0,0\n,1,1,1\n".as_bytes()).unwrap();
        assert_eq!(set.stations[1].name, None);
        assert_eq!(set.names(), None);
        let set = StationSet::from_reader("x,y,z\n".as_bytes()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn read_csv_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.csv");
        assert!(matches!(StationSet::read_csv(&path).err(), Some(TndmError::NotFound(_))));
        fs::write(&path, "name,x,y,z\nS01,0,-1,0\n").unwrap();
        let set = StationSet::read_csv(&path).unwrap();
        assert_eq!(set.stations[0].position, [0.0, -1.0, 0.0]);
        fs::write(&path, "name,x,y\nS01,0,-1\n").unwrap();
        assert!(matches!(StationSet::read_csv(&path).err(), Some(TndmError::Format { .. })));
    }
}
