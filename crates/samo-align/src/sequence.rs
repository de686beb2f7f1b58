/// An ordered sequence of 3d backbone coordinates.
///
/// Each point may carry the name of its residue (e.g. `"ALA"`). Residue names
/// are only used for reporting and never enter the geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSequence {
    // Name used in logs and solution files.
    name: String,
    // The coordinates of the points.
    points: Vec<[f64; 3]>,
    // Residue names, one per point when present.
    residues: Option<Vec<String>>,
}

impl PointSequence {
    /// Create a new sequence from its points and optional residue names.
    ///
    /// Residue names are dropped when their count does not match the points.
    pub fn new(
        name: impl Into<String>,
        points: Vec<[f64; 3]>,
        residues: Option<Vec<String>>,
    ) -> Self {
        let name = name.into();
        let residues = residues.filter(|r| {
            let matches = r.len() == points.len();
            if !matches {
                log::warn!(
                    "Ignoring {} residue names for {} points of {}",
                    r.len(),
                    points.len(),
                    name
                );
            }
            matches
        });
        Self {
            name,
            points,
            residues,
        }
    }

    /// Create a sequence from bare coordinates.
    pub fn from_points(name: impl Into<String>, points: Vec<[f64; 3]>) -> Self {
        Self::new(name, points, None)
    }

    /// Name of the sequence.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The coordinates of all points.
    #[inline]
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Mutable access to the coordinates, used when rebuilding a consensus.
    pub(crate) fn points_mut(&mut self) -> &mut [[f64; 3]] {
        &mut self.points
    }

    /// The residue name of point `i`, if known.
    pub fn residue(&self, i: usize) -> Option<&str> {
        self.residues
            .as_ref()
            .and_then(|r| r.get(i))
            .map(String::as_str)
    }

    /// Whether the sequence carries residue names.
    pub fn has_residues(&self) -> bool {
        self.residues.is_some()
    }

    /// One-letter codes of the whole sequence, `-` for unknown residues.
    pub fn residue_codes(&self) -> String {
        (0..self.len())
            .map(|i| self.residue(i).map_or('-', residue_code))
            .collect()
    }

    /// Rename the sequence.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// One-letter code of a three-letter residue name.
pub fn residue_code(name: &str) -> char {
    match name.get(..3).unwrap_or(name) {
        "ALA" => 'A',
        "ASX" => 'B',
        "CYS" => 'C',
        "ASP" => 'D',
        "GLU" => 'E',
        "PHE" => 'F',
        "GLY" => 'G',
        "HIS" => 'H',
        "ILE" => 'I',
        "LYS" => 'K',
        "LEU" => 'L',
        "MET" => 'M',
        "ASN" => 'N',
        "PRO" => 'P',
        "GLN" => 'Q',
        "ARG" => 'R',
        "SER" => 'S',
        "THR" => 'T',
        "VAL" => 'V',
        "TRP" => 'W',
        "TYR" => 'Y',
        "GLX" => 'Z',
        _ => '-',
    }
}
