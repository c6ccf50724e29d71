//! Configuration handling for dscompare

/// Default absolute tolerance for numeric comparisons
pub const DEFAULT_ABS_TOL: f64 = 1.0e-9;
/// Default relative tolerance for numeric comparisons
pub const DEFAULT_REL_TOL: f64 = 1.0e-6;

/// Output format for comparison reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Terminal,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "terminal" => Ok(OutputFormat::Terminal),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Numeric tolerances. Two numbers are close when they are within
/// `abs_tol` of each other, or within `rel_tol` of the larger magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub abs_tol: f64,
    pub rel_tol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            abs_tol: DEFAULT_ABS_TOL,
            rel_tol: DEFAULT_REL_TOL,
        }
    }
}

/// Options for a single dataset comparison
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Columns to match observations by; empty means positional matching
    pub by: Vec<String>,
    /// Numeric tolerances
    pub tolerance: Tolerance,
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set key columns for row matching
    pub fn with_by(mut self, by: Vec<String>) -> Self {
        self.by = by;
        self
    }

    /// Set both tolerances
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the absolute tolerance
    pub fn with_abs_tol(mut self, abs_tol: f64) -> Self {
        self.tolerance.abs_tol = abs_tol;
        self
    }

    /// Set the relative tolerance
    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.tolerance.rel_tol = rel_tol;
        self
    }
}

/// Options for the reader layer
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// For Excel files: which sheet to read (first sheet when unset)
    pub sheet_name: Option<String>,
}

impl ReadOptions {
    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }
}

/// Process-level presentation settings.
///
/// Built once by the host application with [`Settings::configure`] and
/// passed to renderers explicitly. The comparison engine never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Seed for randomized tooling the host layers on top. Nothing in this
    /// crate draws random numbers; the CLI records the value in its debug log.
    pub seed: u64,
    /// Decimal places when rendering floats for humans
    pub float_precision: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::configure(42, 6)
    }
}

impl Settings {
    pub fn configure(seed: u64, float_precision: usize) -> Self {
        Self {
            seed,
            float_precision,
        }
    }

    /// Format a float with the configured precision
    pub fn format_float(&self, value: f64) -> String {
        format!("{:.*}", self.float_precision, value)
    }
}
