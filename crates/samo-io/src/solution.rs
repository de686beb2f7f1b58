use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use samo_align::{AlignmentResult, Solution};

/// Number of alignment entries written per line.
const ENTRIES_PER_LINE: usize = 20;

/// Error types for solution files.
#[derive(Debug, thiserror::Error)]
pub enum SolutionError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),

    /// None of the alignment, translation or rotation sections is present
    #[error("No {0} section found")]
    MissingSection(&'static str),

    /// A section holds the wrong number of values
    #[error("Section [{section}] needs {expected} values, found {found}")]
    LengthMismatch {
        /// Name of the section.
        section: &'static str,
        /// Number of values the section needs.
        expected: usize,
        /// Number of values found.
        found: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Section {
    Alignment,
    Translation,
    Rotation,
    Other,
}

impl Section {
    fn from_header(header: &str) -> Self {
        match header {
            "Alignment" => Self::Alignment,
            "Translation" => Self::Translation,
            "Rotation" => Self::Rotation,
            _ => Self::Other,
        }
    }
}

/// Read a solution file.
///
/// # Arguments
///
/// * `path` - The path to the solution file.
///
/// # Returns
///
/// The sections of the file that could be found.
pub fn read_solution(path: impl AsRef<Path>) -> Result<Solution, SolutionError> {
    let text = std::fs::read_to_string(path)?;
    parse_solution(&text)
}

fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, SolutionError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| SolutionError::ParseError(format!("{}: {}", s, e)))
}

fn parse_values<T: std::str::FromStr>(tokens: &[&str]) -> Result<Vec<T>, SolutionError>
where
    T::Err: std::fmt::Display,
{
    tokens.iter().map(|s| parse_part(s)).collect()
}

fn check_len(section: &'static str, expected: usize, found: usize) -> Result<(), SolutionError> {
    if expected != found {
        return Err(SolutionError::LengthMismatch {
            section,
            expected,
            found,
        });
    }
    Ok(())
}

/// Parse the contents of a solution file.
///
/// Sections start with a `[Name]` line and run until the next one. Unknown
/// sections such as `[Abstract]` and `[Result]` are skipped.
pub fn parse_solution(text: &str) -> Result<Solution, SolutionError> {
    let mut sections: Vec<(Section, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            sections.push((Section::from_header(header.trim()), Vec::new()));
        } else if let Some((_, tokens)) = sections.last_mut() {
            tokens.extend(trimmed.split_whitespace());
        }
    }

    let mut solution = Solution::default();
    for (section, tokens) in &sections {
        match section {
            Section::Alignment => {
                solution.alignment = Some(parse_values(tokens)?);
            }
            Section::Translation => {
                let values: Vec<f64> = parse_values(tokens)?;
                check_len("Translation", 3, values.len())?;
                solution.translation = Some([values[0], values[1], values[2]]);
            }
            Section::Rotation => {
                let values: Vec<f64> = parse_values(tokens)?;
                check_len("Rotation", 9, values.len())?;
                solution.rotation = Some([
                    [values[0], values[1], values[2]],
                    [values[3], values[4], values[5]],
                    [values[6], values[7], values[8]],
                ]);
            }
            Section::Other => {}
        }
    }

    if solution == Solution::default() {
        return Err(SolutionError::MissingSection(
            "[Alignment], [Translation] or [Rotation]",
        ));
    }
    Ok(solution)
}

/// Format an alignment result as a solution file.
///
/// # Arguments
///
/// * `result` - The alignment to store.
/// * `name_a` - Name of the moved sequence.
/// * `name_b` - Name of the fixed sequence.
pub fn format_solution(result: &AlignmentResult, name_a: &str, name_b: &str) -> String {
    let mut text = String::new();

    text.push_str("[Abstract]\n");
    text.push_str(&format!("Alignment result of {} AND {}\n\n", name_a, name_b));

    text.push_str("[Result]\n");
    text.push_str(&format!(" {:.8} {}\n\n", result.rmsd, result.aligned_count));

    text.push_str("[Alignment]\n");
    for line in result.correspondence.to_indices().chunks(ENTRIES_PER_LINE) {
        for index in line {
            text.push_str(&format!(" {:3}", index));
        }
        text.push('\n');
    }
    text.push('\n');

    text.push_str("[Translation]\n");
    for t in result.transform.translation {
        text.push_str(&format!(" {:.8}", t));
    }
    text.push_str("\n\n");

    text.push_str("[Rotation]\n");
    for row in result.transform.rotation {
        for r in row {
            text.push_str(&format!(" {:.8}", r));
        }
        text.push('\n');
    }
    text
}

/// Write an alignment result to a solution file.
pub fn write_solution(
    path: impl AsRef<Path>,
    result: &AlignmentResult,
    name_a: &str,
    name_b: &str,
) -> Result<(), SolutionError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_solution(result, name_a, name_b).as_bytes())?;
    writer.flush()?;
    Ok(())
}
