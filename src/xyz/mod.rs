//! Reader for plain and extended XYZ coordinate files.
//!
//! A file is a sequence of frames. Each frame is an atom count, a comment
//! line and one line per atom. In the extended flavour the comment line
//! carries `key=value` pairs; `Properties` describes the per-atom columns,
//! `Lattice` and `pbc` describe an optional periodic cell. Everything else
//! is kept verbatim in [`Frame::info`].

pub mod error;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::Enumerate;
use std::path::Path;

use nalgebra::{Matrix3, Point3};

use crate::element::Element;
pub use error::XyzError;

/// One structure read from an XYZ file.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub symbols: Vec<String>,
    pub atomic_numbers: Vec<u8>,
    /// Cartesian positions in ångström.
    pub positions: Vec<Point3<f64>>,
    /// Cell vectors as matrix rows.
    pub lattice: Option<Matrix3<f64>>,
    pub pbc: [bool; 3],
    pub comment: String,
    pub info: BTreeMap<String, String>,
}

impl Frame {
    /// A non-periodic frame from atomic numbers and positions.
    pub fn new(atomic_numbers: Vec<u8>, positions: Vec<Point3<f64>>) -> Self {
        let symbols = atomic_numbers
            .iter()
            .map(|&z| {
                Element::from_atomic_num(z)
                    .map(|e| e.symbol())
                    .unwrap_or("*")
                    .to_string()
            })
            .collect();
        Self {
            symbols,
            atomic_numbers,
            positions,
            lattice: None,
            pbc: [false; 3],
            comment: String::new(),
            info: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.atomic_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atomic_numbers.is_empty()
    }

    pub fn is_periodic(&self) -> bool {
        self.lattice.is_some() && self.pbc.iter().any(|&p| p)
    }

    fn push(&mut self, element: Element, position: Point3<f64>) {
        self.symbols.push(element.symbol().to_string());
        self.atomic_numbers.push(element.atomic_num());
        self.positions.push(position);
    }
}

/// Opens `path`, which must carry a `.xyz` extension, for lazy reading.
pub fn open_file(path: impl AsRef<Path>) -> Result<Frames<BufReader<File>>, XyzError> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) != Some("xyz") {
        return Err(XyzError::Extension {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)?;
    Ok(Frames::new(BufReader::new(file)))
}

/// Reads every frame of `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<Frame>, XyzError> {
    collect_frames(open_file(path)?)
}

/// Reads only the first frame of `path`; whatever follows it is never parsed.
pub fn read_first_frame(path: impl AsRef<Path>) -> Result<Frame, XyzError> {
    open_file(path)?.next().unwrap_or(Err(XyzError::Empty))
}

/// Reads all concatenated frames from `reader`.
///
/// Blank lines between frames are skipped. At least one frame is required
/// and no frame may be empty.
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<Frame>, XyzError> {
    collect_frames(Frames::new(reader))
}

fn collect_frames<R: BufRead>(frames: Frames<R>) -> Result<Vec<Frame>, XyzError> {
    let frames = frames.collect::<Result<Vec<_>, _>>()?;
    if frames.is_empty() {
        return Err(XyzError::Empty);
    }
    Ok(frames)
}

/// Frames parsed one at a time from a reader. Iteration stops after the
/// first error.
pub struct Frames<R> {
    lines: Enumerate<Lines<R>>,
    done: bool,
}

impl<R: BufRead> Frames<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines().enumerate(),
            done: false,
        }
    }

    fn next_line(&mut self) -> Option<Result<(usize, String), XyzError>> {
        let (i, line) = self.lines.next()?;
        Some(line.map(|l| (i + 1, l)).map_err(XyzError::from))
    }

    fn read_frame(&mut self, count_no: usize, count_line: &str) -> Result<Frame, XyzError> {
        let count: usize = count_line.parse().map_err(|_| XyzError::InvalidCount {
            line: count_no,
            text: count_line.to_string(),
        })?;

        let (comment_no, comment) = match self.next_line() {
            Some(l) => l?,
            None => {
                return Err(XyzError::Truncated {
                    line: count_no,
                    expected: count,
                    found: 0,
                })
            }
        };
        let info = parse_key_values(&comment);
        let layout = parse_layout(&info, comment_no)?;
        let lattice = match lookup(&info, "Lattice") {
            Some(text) => Some(parse_lattice(text, comment_no)?),
            None => None,
        };
        let pbc = match lookup(&info, "pbc") {
            Some(text) => parse_pbc(text),
            None => [lattice.is_some(); 3],
        };

        let mut frame = Frame {
            symbols: Vec::with_capacity(count),
            atomic_numbers: Vec::with_capacity(count),
            positions: Vec::with_capacity(count),
            lattice,
            pbc,
            comment,
            info,
        };

        let mut last_no = comment_no;
        for found in 0..count {
            let (line_no, line) = match self.next_line() {
                Some(l) => l?,
                None => {
                    return Err(XyzError::Truncated {
                        line: last_no,
                        expected: count,
                        found,
                    })
                }
            };
            last_no = line_no;
            parse_atom_line(&line, line_no, &layout, &mut frame)?;
        }

        if frame.is_empty() {
            return Err(XyzError::Empty);
        }
        Ok(frame)
    }
}

impl<R: BufRead> Iterator for Frames<R> {
    type Item = Result<Frame, XyzError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let frame = loop {
            match self.next_line()? {
                Ok((_, line)) if line.trim().is_empty() => continue,
                Ok((no, line)) => break self.read_frame(no, line.trim()),
                Err(e) => break Err(e),
            }
        };
        self.done = frame.is_err();
        Some(frame)
    }
}

struct Layout {
    species: Option<usize>,
    z: Option<usize>,
    pos: usize,
    width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            species: Some(0),
            z: None,
            pos: 1,
            width: 4,
        }
    }
}

fn lookup<'a>(info: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    info.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

fn parse_layout(info: &BTreeMap<String, String>, line: usize) -> Result<Layout, XyzError> {
    let Some(props) = lookup(info, "Properties") else {
        return Ok(Layout::default());
    };
    let invalid = || XyzError::InvalidProperties {
        line,
        text: props.to_string(),
    };

    let fields: Vec<&str> = props.split(':').collect();
    if fields.len() % 3 != 0 {
        return Err(invalid());
    }

    let mut species = None;
    let mut z = None;
    let mut pos = None;
    let mut column = 0;
    for triple in fields.chunks(3) {
        let ncols: usize = triple[2].parse().map_err(|_| invalid())?;
        match (triple[0].to_ascii_lowercase().as_str(), ncols) {
            ("species", 1) => species = Some(column),
            ("z", 1) => z = Some(column),
            ("pos", 3) => pos = Some(column),
            _ => {}
        }
        column += ncols;
    }

    match pos {
        Some(pos) if species.is_some() || z.is_some() => Ok(Layout {
            species,
            z,
            pos,
            width: column,
        }),
        _ => Err(XyzError::MissingColumn { line }),
    }
}

fn parse_atom_line(
    line: &str,
    line_no: usize,
    layout: &Layout,
    frame: &mut Frame,
) -> Result<(), XyzError> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < layout.width {
        return Err(XyzError::TooFewColumns {
            line: line_no,
            expected: layout.width,
            found: cols.len(),
        });
    }

    let element = match (layout.species, layout.z) {
        (Some(c), _) => Element::parse_species(cols[c]),
        (None, Some(c)) => cols[c].parse::<u8>().ok().and_then(Element::from_atomic_num),
        (None, None) => None,
    };
    let element = element.ok_or_else(|| XyzError::UnknownElement {
        line: line_no,
        text: cols[layout.species.or(layout.z).unwrap_or(0)].to_string(),
    })?;

    let mut xyz = [0.0f64; 3];
    for (k, v) in xyz.iter_mut().enumerate() {
        let text = cols[layout.pos + k];
        *v = parse_float(text).ok_or_else(|| XyzError::InvalidNumber {
            line: line_no,
            text: text.to_string(),
        })?;
    }

    frame.push(element, Point3::new(xyz[0], xyz[1], xyz[2]));
    Ok(())
}

// Accepts Fortran-style exponents (1.0D-3) as well.
fn parse_float(text: &str) -> Option<f64> {
    let value = text
        .parse::<f64>()
        .ok()
        .or_else(|| text.replace(|c| c == 'D' || c == 'd', "e").parse().ok())?;
    value.is_finite().then_some(value)
}

fn parse_lattice(text: &str, line: usize) -> Result<Matrix3<f64>, XyzError> {
    let values: Vec<f64> = text.split_whitespace().filter_map(parse_float).collect();
    if values.len() != 9 || text.split_whitespace().count() != 9 {
        return Err(XyzError::InvalidLattice {
            line,
            text: text.to_string(),
        });
    }
    Ok(Matrix3::from_row_slice(&values))
}

fn parse_pbc(text: &str) -> [bool; 3] {
    let mut pbc = [false; 3];
    for (slot, token) in pbc.iter_mut().zip(text.split_whitespace()) {
        *slot = matches!(token.to_ascii_lowercase().as_str(), "t" | "true" | "1");
    }
    pbc
}

/// Splits an extended-XYZ comment line into `key=value` pairs.
///
/// Values may be wrapped in double quotes or braces. A key without a value
/// is stored as `"T"`. A line without any `=` is a plain comment and
/// yields an empty map.
fn parse_key_values(line: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if !line.contains('=') {
        return map;
    }

    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();
    let mut i = 0;
    while i < n {
        while i < n && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= n {
            break;
        }
        let start = i;
        while i < n && !chars[i].is_whitespace() && chars[i] != '=' {
            i += 1;
        }
        let key: String = chars[start..i].iter().collect();

        let mut j = i;
        while j < n && chars[j].is_whitespace() {
            j += 1;
        }
        if j < n && chars[j] == '=' {
            j += 1;
            while j < n && chars[j].is_whitespace() {
                j += 1;
            }
            let (value, end) = read_value(&chars, j);
            i = end;
            if !key.is_empty() {
                map.insert(key, value);
            }
        } else if !key.is_empty() {
            map.insert(key, "T".to_string());
        }
    }
    map
}

fn read_value(chars: &[char], start: usize) -> (String, usize) {
    let n = chars.len();
    let mut out = String::new();
    let mut i = start;
    let close = match chars.get(i) {
        Some('"') => Some('"'),
        Some('{') => Some('}'),
        _ => None,
    };
    match close {
        Some(close) => {
            i += 1;
            while i < n && chars[i] != close {
                if chars[i] == '\\' && i + 1 < n {
                    i += 1;
                }
                out.push(chars[i]);
                i += 1;
            }
            (out, (i + 1).min(n))
        }
        None => {
            while i < n && !chars[i].is_whitespace() {
                out.push(chars[i]);
                i += 1;
            }
            (out, i)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Vec<Frame>, XyzError> {
        read_frames(text.as_bytes())
    }

    const WATER: &str = "3
water
O 0.000000 0.000000 0.000000
H 0.957200 0.000000 0.000000
H -0.239988 0.926627 0.000000
";

    #[test]
    fn plain_water() {
        let frames = read(WATER).unwrap();
        assert_eq!(frames.len(), 1);
        let f = &frames[0];
        assert_eq!(f.atomic_numbers, vec![8, 1, 1]);
        assert_eq!(f.symbols, vec!["O", "H", "H"]);
        assert_eq!(f.comment, "water");
        assert!(f.info.is_empty());
        assert!(f.lattice.is_none());
        assert!(!f.is_periodic());
        assert!((f.positions[1].x - 0.9572).abs() < 1e-12);
    }

    #[test]
    fn multiple_frames_and_blank_separators() {
        let text = format!("{WATER}\n{WATER}\n");
        let frames = read(&text).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].len(), 3);
    }

    #[test]
    fn extended_properties_reordered() {
        let text = "2
Properties=pos:R:3:species:S:1:forces:R:3 energy=-1.5 note=\"two words\"
0.0 0.0 0.0 C 0.1 0.2 0.3
0.0 0.0 1.2 O 0.1 0.2 0.3
";
        let frames = read(text).unwrap();
        let f = &frames[0];
        assert_eq!(f.atomic_numbers, vec![6, 8]);
        assert!((f.positions[1].z - 1.2).abs() < 1e-12);
        assert_eq!(f.info.get("energy").map(String::as_str), Some("-1.5"));
        assert_eq!(f.info.get("note").map(String::as_str), Some("two words"));
    }

    #[test]
    fn extended_z_column() {
        let text = "1
Properties=Z:I:1:pos:R:3
7 0.0 0.0 0.0
";
        let frames = read(text).unwrap();
        assert_eq!(frames[0].atomic_numbers, vec![7]);
        assert_eq!(frames[0].symbols, vec!["N"]);
    }

    #[test]
    fn lattice_and_pbc() {
        let text = "1
Lattice=\"10.0 0.0 0.0 0.0 11.0 0.0 0.0 0.0 12.0\" pbc=\"T T F\"
He 0.0 0.0 0.0
";
        let frames = read(text).unwrap();
        let f = &frames[0];
        let lattice = f.lattice.unwrap();
        assert!((lattice[(1, 1)] - 11.0).abs() < 1e-12);
        assert!((lattice[(2, 2)] - 12.0).abs() < 1e-12);
        assert_eq!(f.pbc, [true, true, false]);
        assert!(f.is_periodic());
    }

    #[test]
    fn lattice_implies_pbc() {
        let text = "1
Lattice=\"5 0 0 0 5 0 0 0 5\"
Ar 0 0 0
";
        assert_eq!(read(text).unwrap()[0].pbc, [true; 3]);
    }

    #[test]
    fn bare_key_is_true() {
        let map = parse_key_values("Properties=species:S:1:pos:R:3 relaxed");
        assert_eq!(map.get("relaxed").map(String::as_str), Some("T"));
    }

    #[test]
    fn lenient_species_and_fortran_exponent() {
        let text = "2
c
CL 0.0 0.0 0.0
h 1.27D+00 0.0 0.0
";
        let f = &read(text).unwrap()[0];
        assert_eq!(f.atomic_numbers, vec![17, 1]);
        assert!((f.positions[1].x - 1.27).abs() < 1e-12);
    }

    #[test]
    fn invalid_count() {
        let err = read("three\ncomment\n").unwrap_err();
        assert!(matches!(err, XyzError::InvalidCount { line: 1, .. }));
    }

    #[test]
    fn truncated_frame() {
        let err = read("3\ncomment\nO 0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Truncated {
                expected: 3,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn frames_are_read_lazily() {
        let text = format!("{WATER}3\ncomment\nO 0 0 0\n");
        let mut frames = Frames::new(text.as_bytes());
        let first = frames.next().unwrap().unwrap();
        assert_eq!(first.atomic_numbers, vec![8, 1, 1]);
        assert!(matches!(
            frames.next(),
            Some(Err(XyzError::Truncated {
                line: 8,
                expected: 3,
                found: 1
            }))
        ));
        assert!(frames.next().is_none());
        assert!(read(&text).is_err());
    }

    #[test]
    fn unknown_element() {
        let err = read("1\n\nXx 0 0 0\n").unwrap_err();
        assert!(matches!(err, XyzError::UnknownElement { line: 3, .. }));
    }

    #[test]
    fn too_few_columns() {
        let err = read("1\n\nC 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::TooFewColumns {
                expected: 4,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn invalid_number() {
        let err = read("1\n\nC 0 nope 0\n").unwrap_err();
        assert!(matches!(err, XyzError::InvalidNumber { line: 3, .. }));
    }

    #[test]
    fn missing_pos_column() {
        let err = read("1\nProperties=species:S:1\nC\n").unwrap_err();
        assert!(matches!(err, XyzError::MissingColumn { line: 2 }));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(read("").unwrap_err(), XyzError::Empty));
        assert!(matches!(read("0\nnothing\n").unwrap_err(), XyzError::Empty));
    }

    #[test]
    fn extension_is_checked() {
        let err = read_file("molecule.pdb").unwrap_err();
        assert!(matches!(err, XyzError::Extension { .. }));
        assert!(matches!(
            read_first_frame("molecule.pdb"),
            Err(XyzError::Extension { .. })
        ));
    }
}
