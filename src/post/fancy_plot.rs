use super::StackedStep;
use crate::TndmError;
use plotpy::{Curve, Plot};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Holds a list of RGB colors (components in [0, 1]) interpolated linearly
#[derive(Clone, Debug, PartialEq)]
pub struct Colormap {
    colors: Vec<[f64; 3]>,
}

impl Colormap {
    /// Allocates a new colormap
    pub fn new(colors: Vec<[f64; 3]>) -> Result<Self, TndmError> {
        if colors.is_empty() {
            return Err(TndmError::Invalid("the colormap must have at least one color"));
        }
        if colors.iter().flatten().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(TndmError::Invalid("the color components must be in [0, 1]"));
        }
        Ok(Colormap { colors })
    }

    /// Reads a text file with one `r g b` row per color
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_txt<P>(full_path: &P) -> Result<Self, TndmError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path);
        if !path.is_file() {
            return Err(TndmError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|e| TndmError::io(path, e))?;
        let mut colors = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let values: Vec<f64> = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(|s| s.parse())
                .collect::<Result<_, _>>()
                .map_err(|_| TndmError::format(path, format!("cannot parse line {}", i + 1)))?;
            if values.len() != 3 {
                return Err(TndmError::format(
                    path,
                    format!("line {} must have 3 values (r g b)", i + 1),
                ));
            }
            colors.push([values[0], values[1], values[2]]);
        }
        Colormap::new(colors).map_err(|e| TndmError::format(path, e.to_string()))
    }

    /// Returns the color at `t` in [0, 1] (clamped)
    pub fn color(&self, t: f64) -> [f64; 3] {
        let n = self.colors.len();
        if n == 1 || !t.is_finite() {
            return self.colors[0];
        }
        let s = f64::min(f64::max(t, 0.0), 1.0) * ((n - 1) as f64);
        let i = usize::min(s.floor() as usize, n - 2);
        let f = s - i as f64;
        let (a, b) = (self.colors[i], self.colors[i + 1]);
        [
            a[0] + f * (b[0] - a[0]),
            a[1] + f * (b[1] - a[1]),
            a[2] + f * (b[2] - a[2]),
        ]
    }

    /// Returns the color at `t` in [0, 1] as a hex string such as "#ff8000"
    pub fn hex(&self, t: f64) -> String {
        let c = self.color(t);
        let byte = |x: f64| (x * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(c[0]), byte(c[1]), byte(c[2]))
    }
}

impl Default for Colormap {
    /// Returns a blue-to-red colormap passing through white
    fn default() -> Self {
        Colormap {
            colors: vec![
                [0.230, 0.299, 0.754],
                [0.552, 0.690, 0.996],
                [0.865, 0.865, 0.865],
                [0.956, 0.604, 0.486],
                [0.706, 0.016, 0.150],
            ],
        }
    }
}

/// Holds the fault trace of one time step
#[derive(Clone, Debug, PartialEq)]
pub struct FaultLine {
    /// Holds the slip (horizontal axis of the figure)
    pub slip: Vec<f64>,

    /// Holds the depth coordinate (y)
    pub depth: Vec<f64>,

    /// Holds the stacked time coordinate (z) in years
    pub years: Vec<f64>,

    /// Holds log10 of the maximum absolute slip rate (NaN if the slip rate is zero everywhere)
    pub log_max_slip_rate: f64,
}

/// Draws slip versus depth versus time, colored by the slip rate
///
/// Each time step becomes a 3D line: the fault trace displaced by the slip
/// along x, at its depth (y), shifted along z by the time in years.
pub struct FancyPlot {
    slip: String,
    slip_rate: String,
    colormap: Colormap,
}

impl FancyPlot {
    /// Allocates a new instance given the names of the slip and slip rate fields
    pub fn new(slip: &str, slip_rate: &str) -> Self {
        FancyPlot {
            slip: slip.to_string(),
            slip_rate: slip_rate.to_string(),
            colormap: Colormap::default(),
        }
    }

    /// Sets the colormap
    pub fn set_colormap(&mut self, colormap: Colormap) -> &mut Self {
        self.colormap = colormap;
        self
    }

    /// Extracts the fault lines of stacked meshes (stacked along z)
    ///
    /// The points of each line are sorted by depth.
    pub fn lines(&self, steps: &[StackedStep]) -> Result<Vec<FaultLine>, TndmError> {
        let mut lines = Vec::with_capacity(steps.len());
        for step in steps {
            let grid = &step.grid;
            let field = |name: &str| {
                grid.point_field(name)
                    .filter(|a| a.num_components == 1)
                    .ok_or_else(|| TndmError::format(&step.file_path, format!("scalar point field '{}' is missing", name)))
            };
            let slip = field(&self.slip)?;
            let slip_rate = field(&self.slip_rate)?;
            let mut order: Vec<_> = (0..grid.npoint()).collect();
            order.sort_by(|&a, &b| grid.points[b][1].total_cmp(&grid.points[a][1]));
            let max_rate = slip_rate.values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()));
            lines.push(FaultLine {
                slip: order.iter().map(|&p| grid.points[p][0] + slip.values[p]).collect(),
                depth: order.iter().map(|&p| grid.points[p][1]).collect(),
                years: order.iter().map(|&p| grid.points[p][2]).collect(),
                log_max_slip_rate: if max_rate > 0.0 { max_rate.log10() } else { f64::NAN },
            });
        }
        Ok(lines)
    }

    /// Draws the figure and saves it
    ///
    /// # Input
    ///
    /// * `steps` -- the meshes stacked along z
    /// * `figure_path` -- may be a String, &str, or Path (the extension selects the format)
    pub fn save<P>(&self, steps: &[StackedStep], figure_path: &P) -> Result<(), TndmError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let lines = self.lines(steps)?;
        let finite: Vec<_> = lines.iter().map(|l| l.log_max_slip_rate).filter(|v| v.is_finite()).collect();
        let vmin = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let vmax = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut plot = Plot::new();
        for line in &lines {
            let t = if vmax > vmin {
                (line.log_max_slip_rate - vmin) / (vmax - vmin)
            } else {
                0.0
            };
            let mut curve = Curve::new();
            curve.set_line_color(&self.colormap.hex(t)).set_line_width(1.0);
            curve.draw_3d(&line.slip, &line.depth, &line.years);
            plot.add(&curve);
        }
        plot.set_title(&format!(
            "Slip rate: log10(max |v|) from {:.2} to {:.2}",
            if finite.is_empty() { f64::NAN } else { vmin },
            if finite.is_empty() { f64::NAN } else { vmax }
        ))
        .set_label_x("Displacement [m]")
        .set_label_y("Depth [km]")
        .set_label_z("Time [yr]");
        let path = Path::new(figure_path);
        if let Some(p) = path.parent() {
            if !p.as_os_str().is_empty() {
                fs::create_dir_all(p).map_err(|e| TndmError::io(p, e))?;
            }
        }
        plot.save(path).map_err(TndmError::Plot)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Colormap, FancyPlot};
    use crate::base::DEFAULT_TEST_DIR;
    use crate::post::StackedStep;
    use crate::vtk::*;
    use crate::TndmError;
    use std::fs;
    use std::path::PathBuf;

    const SAVE_FIGURE: bool = false;

    fn stacked_fault(time_in_years: f64, rate: f64) -> StackedStep {
        let mut grid = Samples::fault_2d(2, 1.0, 0.0);
        grid.point_data.push(FieldArray::scalar("v", vec![rate, -2.0 * rate, 0.0]));
        grid.translate([0.0, 0.0, time_in_years]);
        // unsorted depth
        grid.points.swap(0, 2);
        for array in &mut grid.point_data {
            array.values.swap(0, 2);
        }
        StackedStep {
            time: time_in_years,
            file_path: PathBuf::from("fault.vtu"),
            grid,
        }
    }

    #[test]
    fn colormap_captures_errors() {
        assert!(Colormap::new(Vec::new()).is_err());
        assert!(Colormap::new(vec![[0.0, 1.5, 0.0]]).is_err());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmap.txt");
        assert!(matches!(Colormap::read_txt(&path).err(), Some(TndmError::NotFound(_))));
        fs::write(&path, "0 0 0\n1 1\n").unwrap();
        assert_eq!(
            Colormap::read_txt(&path).err().map(|e| e.to_string()),
            Some(format!("{}: line 2 must have 3 values (r g b)", path.display()))
        );
        fs::write(&path, "0 0 x\n").unwrap();
        assert_eq!(
            Colormap::read_txt(&path).err().map(|e| e.to_string()),
            Some(format!("{}: cannot parse line 1", path.display()))
        );
    }

    #[test]
    fn colormap_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmap.txt");
        fs::write(&path, "# black to white\n0.0 0.0 0.0\n\n1.0, 1.0, 1.0\n").unwrap();
        let cmap = Colormap::read_txt(&path).unwrap();
        assert_eq!(cmap.color(0.5), [0.5, 0.5, 0.5]);
        assert_eq!(cmap.color(-1.0), [0.0, 0.0, 0.0]);
        assert_eq!(cmap.color(2.0), [1.0, 1.0, 1.0]);
        assert_eq!(cmap.hex(1.0), "#ffffff");
        assert_eq!(cmap.hex(0.0), "#000000");
        let single = Colormap::new(vec![[1.0, 0.5, 0.0]]).unwrap();
        assert_eq!(single.hex(0.7), "#ff8000");
        assert_eq!(Colormap::default().hex(f64::NAN), "#3b4cc0");
    }

    #[test]
    fn lines_capture_errors() {
        let fancy = FancyPlot::new("state1", "missing");
        assert_eq!(
            fancy.lines(&[stacked_fault(0.0, 1.0)]).err().map(|e| e.to_string()),
            Some("fault.vtu: scalar point field 'missing' is missing".to_string())
        );
    }

    #[test]
    fn lines_work() {
        let fancy = FancyPlot::new("state1", "v");
        let lines = fancy.lines(&[stacked_fault(0.0, 1e-3), stacked_fault(2.0, 0.0)]).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].depth, &[0.0, -0.5, -1.0]);
        assert_eq!(lines[0].slip, &[10.0, 10.5, 11.0]);
        assert_eq!(lines[1].years, &[2.0, 2.0, 2.0]);
        assert!((lines[0].log_max_slip_rate - f64::log10(2e-3)).abs() < 1e-15);
        assert!(lines[1].log_max_slip_rate.is_nan());
    }

    #[test]
    fn save_works() {
        let fancy = FancyPlot::new("state1", "v");
        let steps = [stacked_fault(0.0, 1e-9), stacked_fault(1.0, 1.0), stacked_fault(2.0, 1e-3)];
        assert_eq!(fancy.lines(&steps).unwrap().len(), 3);
        if SAVE_FIGURE {
            fancy
                .save(&steps, &format!("{}/fancy_plot_works.svg", DEFAULT_TEST_DIR))
                .unwrap();
        }
    }
}
