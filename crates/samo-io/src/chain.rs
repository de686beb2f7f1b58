use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use samo_align::PointSequence;

/// Error types for chain files.
#[derive(Debug, thiserror::Error)]
pub enum ChainFileError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),

    /// The header count does not match the number of point lines
    #[error("Expected {expected} points, found {found}")]
    LengthMismatch {
        /// Count given in the header.
        expected: usize,
        /// Number of point lines in the file.
        found: usize,
    },
}

/// Read a chain file.
///
/// The first line holds the number of points, followed by one `x y z [RESNAME]`
/// line per point. The sequence is named after the file stem.
///
/// # Arguments
///
/// * `path` - The path to the chain file.
///
/// # Returns
///
/// The point sequence of the chain.
pub fn read_chain_file(path: impl AsRef<Path>) -> Result<PointSequence, ChainFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_chain(&name, &text)
}

fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, ChainFileError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| ChainFileError::ParseError(format!("{}: {}", s, e)))
}

/// Parse the contents of a chain file.
pub fn parse_chain(name: &str, text: &str) -> Result<PointSequence, ChainFileError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| ChainFileError::ParseError("missing point count".to_string()))?;
    let expected: usize = parse_part(header.trim())?;

    let mut points = Vec::with_capacity(expected);
    let mut residues = Vec::with_capacity(expected);
    for line in lines {
        let parts = line.split_whitespace().collect::<Vec<_>>();
        if parts.len() < 3 {
            return Err(ChainFileError::ParseError(format!(
                "Invalid number of parts: {}",
                parts.len()
            )));
        }
        points.push([
            parse_part(parts[0])?,
            parse_part(parts[1])?,
            parse_part(parts[2])?,
        ]);
        residues.push(parts.get(3).map(|s| s.to_string()));
    }

    if points.len() != expected {
        return Err(ChainFileError::LengthMismatch {
            expected,
            found: points.len(),
        });
    }

    // residue names are only kept when every point has one
    let residues = residues.into_iter().collect::<Option<Vec<_>>>();
    log::debug!("Read chain {} with {} points", name, points.len());
    Ok(PointSequence::new(name, points, residues))
}

/// Format a sequence in the chain file layout.
pub fn format_chain(sequence: &PointSequence) -> String {
    let mut text = format!("{}\n", sequence.len());
    for (i, p) in sequence.points().iter().enumerate() {
        text.push_str(&format!("{:8.3} {:8.3} {:8.3}", p[0], p[1], p[2]));
        if let Some(residue) = sequence.residue(i) {
            text.push(' ');
            text.push_str(residue);
        }
        text.push('\n');
    }
    text
}

/// Write a chain file.
///
/// # Arguments
///
/// * `path` - The path to the chain file.
/// * `sequence` - The sequence to write.
pub fn write_chain_file(
    path: impl AsRef<Path>,
    sequence: &PointSequence,
) -> Result<(), ChainFileError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_chain(sequence).as_bytes())?;
    writer.flush()?;
    Ok(())
}
