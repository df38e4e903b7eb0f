//! Synthetic payload for the write/read probe.
//!
//! A dense `f64` matrix stored in a small self-describing binary container:
//!
//! - 8-byte magic `FSCANRY1`
//! - `u32` little-endian header length
//! - JSON header listing named datasets (dtype, shape, byte offset, byte length)
//! - raw little-endian `f64` data
//!
//! The container is written and read in full on every probe, so its cost
//! tracks the filesystem's sequential throughput.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

const MAGIC: &[u8; 8] = b"FSCANRY1";
const CONTAINER_VERSION: u32 = 1;
const DTYPE_F64LE: &str = "f64le";

/// Side length of the default payload matrix (4096 × 4096 doubles, 128 MiB).
pub const DEFAULT_MATRIX_SIZE: usize = 4096;

/// Dataset name used by the probe.
pub const DEFAULT_DATASET: &str = "dataset_1";

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// Row-major dense matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Matrix of independent uniform values in `[0, 1)`.
    ///
    /// `None` when `rows × cols` doubles do not fit in memory addressing.
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Option<Self> {
        payload_byte_len(rows, cols)?;
        let data = (0..rows * cols).map(|_| rng.random::<f64>()).collect();
        Some(Self { rows, cols, data })
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (rows.checked_mul(cols)? == data.len()).then_some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn byte_len(&self) -> u64 {
        (self.data.len() * std::mem::size_of::<f64>()) as u64
    }

    /// Index of the first element that differs bit-for-bit, if any.
    pub fn first_mismatch(&self, other: &Matrix) -> Option<usize> {
        if self.rows != other.rows || self.cols != other.cols {
            return Some(0);
        }
        self.data
            .iter()
            .zip(&other.data)
            .position(|(a, b)| a.to_bits() != b.to_bits())
    }
}

/// Size in bytes of a `rows × cols` payload, or `None` if it overflows.
pub fn payload_byte_len(rows: usize, cols: usize) -> Option<u64> {
    let bytes = rows
        .checked_mul(cols)?
        .checked_mul(std::mem::size_of::<f64>())?;
    // Vec<f64> cannot hold more than isize::MAX bytes.
    (bytes <= isize::MAX as usize).then_some(bytes as u64)
}

// ---------------------------------------------------------------------------
// Container header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContainerHeader {
    version: u32,
    datasets: Vec<DatasetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatasetEntry {
    name: String,
    dtype: String,
    shape: [usize; 2],
    offset: u64,
    length: u64,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Create (or truncate) `path` and store `matrix` as the single dataset `name`.
///
/// The file is flushed and closed before returning.
pub fn write_container(path: &Path, name: &str, matrix: &Matrix) -> io::Result<()> {
    // Offsets are relative to the end of the header, so the header can be
    // serialized before its own length is known.
    let header = ContainerHeader {
        version: CONTAINER_VERSION,
        datasets: vec![DatasetEntry {
            name: name.to_string(),
            dtype: DTYPE_F64LE.to_string(),
            shape: [matrix.rows, matrix.cols],
            offset: 0,
            length: matrix.byte_len(),
        }],
    };
    let header_json = serde_json::to_vec(&header).map_err(io::Error::other)?;
    let header_len = u32::try_from(header_json.len())
        .map_err(|_| invalid("container header too large"))?;

    let mut w = BufWriter::with_capacity(1 << 20, File::create(path)?);
    w.write_all(MAGIC)?;
    w.write_all(&header_len.to_le_bytes())?;
    w.write_all(&header_json)?;
    for v in &matrix.data {
        w.write_all(&v.to_le_bytes())?;
    }
    let file = w.into_inner().map_err(|e| e.into_error())?;
    drop(file);
    Ok(())
}

/// Open `path` and fully materialize dataset `name`.
pub fn read_container(path: &Path, name: &str) -> io::Result<Matrix> {
    let mut r = BufReader::with_capacity(1 << 20, File::open(path)?);

    let mut magic = [0u8; 8];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(invalid("not a payload container (bad magic)"));
    }

    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf)?;
    let header_len = u32::from_le_bytes(len_buf) as usize;
    let mut header_json = vec![0u8; header_len];
    r.read_exact(&mut header_json)?;
    let header: ContainerHeader = serde_json::from_slice(&header_json).map_err(invalid_json)?;
    if header.version != CONTAINER_VERSION {
        return Err(invalid(format!(
            "unsupported container version {}",
            header.version
        )));
    }

    let entry = header
        .datasets
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| invalid(format!("dataset `{name}` not found")))?;
    if entry.dtype != DTYPE_F64LE {
        return Err(invalid(format!("unsupported dtype `{}`", entry.dtype)));
    }
    let [rows, cols] = entry.shape;
    let expected = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(std::mem::size_of::<f64>()))
        .ok_or_else(|| invalid("dataset shape overflows"))?;
    if entry.length != expected as u64 {
        return Err(invalid(format!(
            "dataset `{name}` length {} does not match shape {rows}x{cols}",
            entry.length
        )));
    }

    let data_start = (MAGIC.len() + 4 + header_len) as u64;
    r.seek(SeekFrom::Start(data_start + entry.offset))?;
    let mut raw = vec![0u8; expected];
    r.read_exact(&mut raw)?;

    let data = raw
        .chunks_exact(8)
        .map(|c| {
            let mut b = [0u8; 8];
            b.copy_from_slice(c);
            f64::from_le_bytes(b)
        })
        .collect();
    Ok(Matrix { rows, cols, data })
}

fn invalid_json(e: serde_json::Error) -> io::Error {
    invalid(format!("bad container header: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_matrix_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::random(32, 16, &mut rng).unwrap();
        assert_eq!(m.rows(), 32);
        assert_eq!(m.cols(), 16);
        assert_eq!(m.as_slice().len(), 512);
        assert!(m.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
        // Uniform draws: all identical would indicate a broken generator.
        assert!(m.as_slice().iter().any(|v| *v != m.as_slice()[0]));
    }

    #[test]
    fn test_container_round_trip_is_bit_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".tempfile");
        let mut rng = StdRng::seed_from_u64(42);
        let m = Matrix::random(64, 48, &mut rng).unwrap();

        write_container(&path, DEFAULT_DATASET, &m).unwrap();
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > m.byte_len());

        let back = read_container(&path, DEFAULT_DATASET).unwrap();
        assert_eq!(back.first_mismatch(&m), None);
        assert_eq!(back, m);
    }

    #[test]
    fn test_missing_dataset_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.bin");
        let m = Matrix::from_vec(1, 2, vec![0.5, 0.25]).unwrap();
        write_container(&path, "a", &m).unwrap();
        let err = read_container(&path, "b").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, b"NOTACONTAINER...").unwrap();
        let err = read_container(&path, DEFAULT_DATASET).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_data_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        write_container(&path, DEFAULT_DATASET, &m).unwrap();
        let len = std::fs::metadata(&path).unwrap().len();
        let f = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        f.set_len(len - 8).unwrap();
        drop(f);
        let err = read_container(&path, DEFAULT_DATASET).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_oversized_matrix_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Matrix::random(usize::MAX, 2, &mut rng).is_none());
        assert!(Matrix::random(1 << 40, 1 << 40, &mut rng).is_none());
        assert_eq!(payload_byte_len(usize::MAX, 2), None);
        assert_eq!(payload_byte_len(4096, 4096), Some(128 * 1024 * 1024));
        assert_eq!(payload_byte_len(0, 7), Some(0));
    }

    #[test]
    fn test_from_vec_checks_shape() {
        assert!(Matrix::from_vec(2, 3, vec![0.0; 6]).is_some());
        assert!(Matrix::from_vec(2, 3, vec![0.0; 5]).is_none());
    }

    #[test]
    fn test_first_mismatch_reports_index() {
        let a = Matrix::from_vec(1, 3, vec![0.1, 0.2, 0.3]).unwrap();
        let b = Matrix::from_vec(1, 3, vec![0.1, 0.2, 0.4]).unwrap();
        assert_eq!(a.first_mismatch(&b), Some(2));
        let c = Matrix::from_vec(3, 1, vec![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(a.first_mismatch(&c), Some(0));
    }
}
