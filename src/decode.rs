//! Decodes the flat binary double buffers returned by trace and frequency
//! queries, and reshapes decoded wave traces into per-point 2x2 port matrices.
//!
//! This is the only place raw bytes become domain values; everything here is
//! pure and does not talk to the instrument.

use num_complex::Complex64;

use crate::{Error, Result};

/// On-wire byte order of binary doubles, selected on the instrument with
/// the `LSB`/`MSB` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Least significant byte first (little endian).
    #[default]
    Lsb,
    /// Most significant byte first (big endian).
    Msb,
}

/// Decode a flat buffer of 64-bit floating point values.
///
/// The buffer length must be a multiple of 8; an empty buffer decodes to an
/// empty vector.
pub fn decode_doubles(bytes: &[u8], order: ByteOrder) -> Result<Vec<f64>> {
    if bytes.len() % 8 != 0 {
        return Err(Error::MalformedData(format!(
            "buffer of {} bytes is not a whole number of doubles", bytes.len())));
    }
    Ok(bytes.chunks_exact(8)
        .map(|chunk| {
            let raw: [u8; 8] = chunk.try_into().unwrap();
            match order {
                ByteOrder::Lsb => f64::from_le_bytes(raw),
                ByteOrder::Msb => f64::from_be_bytes(raw),
            }
        })
        .collect())
}

/// Decode a flat buffer of interleaved `(re, im)` double pairs.
///
/// The double count must be even. Decoding is bit-exact: encoding the result
/// back to interleaved doubles reproduces the input.
pub fn decode_complex(bytes: &[u8], order: ByteOrder) -> Result<Vec<Complex64>> {
    let doubles = decode_doubles(bytes, order)?;
    if doubles.len() % 2 != 0 {
        return Err(Error::MalformedData(format!(
            "{} doubles cannot form (re, im) pairs", doubles.len())));
    }
    // Complex64 is repr(C) { re, im }, exactly the wire pair layout.
    Ok(bytemuck::cast_slice::<f64, Complex64>(&doubles).to_vec())
}

/// One wave parameter (A or B) of a full sweep: a 2x2 complex port matrix per
/// frequency point, indexed `[point, rx, tx]`.
///
/// Row index is the receiver (`A1`/`A2` or `B1`/`B2`), column index is the
/// driving port. This orientation follows the instrument's trace naming
/// (`A{receiver},1,PORT{source}`).
#[derive(Debug, Clone, PartialEq)]
pub struct WaveMatrix {
    points: usize,
    data: Vec<Complex64>, // [point][rx][tx], row-major
}

impl WaveMatrix {
    /// Assemble a wave matrix from the four traces of one wave, in slot order
    /// (`X1/PORT1`, `X1/PORT2`, `X2/PORT1`, `X2/PORT2`).
    ///
    /// All four traces must have equal length; a mismatch means the engine
    /// lost a trace and is reported as an invariant violation.
    pub fn from_traces(traces: &[Vec<Complex64>]) -> Result<WaveMatrix> {
        if traces.len() != 4 {
            return Err(Error::Invariant(format!(
                "wave matrix needs 4 traces, got {}", traces.len())));
        }
        let points = traces[0].len();
        for (index, trace) in traces.iter().enumerate() {
            if trace.len() != points {
                return Err(Error::Invariant(format!(
                    "trace {} has {} points, expected {}", index, trace.len(), points)));
            }
        }
        let mut data = Vec::with_capacity(points * 4);
        for point in 0..points {
            data.extend_from_slice(&[
                traces[0][point], traces[1][point],
                traces[2][point], traces[3][point],
            ]);
        }
        Ok(WaveMatrix { points, data })
    }

    /// Number of frequency points.
    pub fn points(&self) -> usize {
        self.points
    }

    pub fn at(&self, point: usize, rx: usize, tx: usize) -> Complex64 {
        assert!(point < self.points && rx < 2 && tx < 2);
        self.data[(point * 2 + rx) * 2 + tx]
    }

    /// The 2x2 port matrix at one frequency point, `[rx][tx]`.
    pub fn port_matrix(&self, point: usize) -> [[Complex64; 2]; 2] {
        [
            [self.at(point, 0, 0), self.at(point, 0, 1)],
            [self.at(point, 1, 0), self.at(point, 1, 1)],
        ]
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Encode doubles to the instrument's wire layout. Test-side inverse of
    /// `decode_doubles`.
    pub(crate) fn encode_doubles(values: &[f64], order: ByteOrder) -> Vec<u8> {
        match order {
            // on a little endian host this is exactly the wire layout
            #[cfg(target_endian = "little")]
            ByteOrder::Lsb => bytemuck::cast_slice::<f64, u8>(values).to_vec(),
            #[cfg(target_endian = "little")]
            ByteOrder::Msb =>
                values.iter().flat_map(|v| v.to_be_bytes()).collect(),
            #[cfg(target_endian = "big")]
            ByteOrder::Lsb =>
                values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            #[cfg(target_endian = "big")]
            ByteOrder::Msb => bytemuck::cast_slice::<f64, u8>(values).to_vec(),
        }
    }

    pub(crate) fn encode_complex(values: &[Complex64], order: ByteOrder) -> Vec<u8> {
        let doubles: Vec<f64> =
            values.iter().flat_map(|c| [c.re, c.im]).collect();
        encode_doubles(&doubles, order)
    }

    #[test]
    fn test_decode_doubles_lsb() {
        let bytes = encode_doubles(&[1.5, -2.25], ByteOrder::Lsb);
        assert_eq!(decode_doubles(&bytes, ByteOrder::Lsb).unwrap(), vec![1.5, -2.25]);
    }

    #[test]
    fn test_decode_doubles_msb() {
        let bytes = encode_doubles(&[1.5, -2.25], ByteOrder::Msb);
        assert_eq!(decode_doubles(&bytes, ByteOrder::Msb).unwrap(), vec![1.5, -2.25]);
    }

    #[test]
    fn test_decode_doubles_wrong_order_differs() {
        let bytes = encode_doubles(&[1.5], ByteOrder::Lsb);
        let wrong = decode_doubles(&bytes, ByteOrder::Msb).unwrap();
        assert_ne!(wrong, vec![1.5]);
    }

    #[test]
    fn test_decode_doubles_known_layout() {
        // 1.0f64 = 0x3FF0000000000000
        let lsb = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f];
        assert_eq!(decode_doubles(&lsb, ByteOrder::Lsb).unwrap(), vec![1.0]);
        let msb = [0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(decode_doubles(&msb, ByteOrder::Msb).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_decode_doubles_empty() {
        assert_eq!(decode_doubles(&[], ByteOrder::Lsb).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_decode_doubles_truncated() {
        let result = decode_doubles(&[0u8; 12], ByteOrder::Lsb);
        assert!(matches!(result, Err(Error::MalformedData(_))));
    }

    #[test]
    fn test_decode_complex_pairs() {
        let values = vec![
            Complex64::new(1.0, -1.0),
            Complex64::new(0.5, 0.25),
        ];
        let bytes = encode_complex(&values, ByteOrder::Lsb);
        assert_eq!(decode_complex(&bytes, ByteOrder::Lsb).unwrap(), values);
    }

    #[test]
    fn test_decode_complex_bit_exact_round_trip() {
        // exercise payloads that naive float formatting would mangle
        let values = vec![
            Complex64::new(f64::MIN_POSITIVE, -0.0),
            Complex64::new(f64::from_bits(0x0123_4567_89ab_cdef), f64::MAX),
        ];
        for order in [ByteOrder::Lsb, ByteOrder::Msb] {
            let bytes = encode_complex(&values, order);
            let decoded = decode_complex(&bytes, order).unwrap();
            assert_eq!(encode_complex(&decoded, order), bytes);
            for (decoded, original) in decoded.iter().zip(&values) {
                assert_eq!(decoded.re.to_bits(), original.re.to_bits());
                assert_eq!(decoded.im.to_bits(), original.im.to_bits());
            }
        }
    }

    #[test]
    fn test_decode_complex_odd_double_count() {
        let bytes = encode_doubles(&[1.0, 2.0, 3.0], ByteOrder::Lsb);
        let result = decode_complex(&bytes, ByteOrder::Lsb);
        assert!(matches!(result, Err(Error::MalformedData(_))));
    }

    #[test]
    fn test_decode_complex_empty() {
        assert_eq!(decode_complex(&[], ByteOrder::Lsb).unwrap(), vec![]);
    }

    fn sample(trace: usize, point: usize) -> Complex64 {
        Complex64::new((trace * 1000 + point) as f64, -((trace * 10 + point) as f64))
    }

    fn traces(points: usize) -> Vec<Vec<Complex64>> {
        (0..4).map(|t| (0..points).map(|p| sample(t, p)).collect()).collect()
    }

    #[test]
    fn test_wave_matrix_slot_to_port_mapping() {
        let matrix = WaveMatrix::from_traces(&traces(3)).unwrap();
        assert_eq!(matrix.points(), 3);
        for point in 0..3 {
            // slot order X1/P1, X1/P2, X2/P1, X2/P2 maps to [rx][tx]
            assert_eq!(matrix.at(point, 0, 0), sample(0, point));
            assert_eq!(matrix.at(point, 0, 1), sample(1, point));
            assert_eq!(matrix.at(point, 1, 0), sample(2, point));
            assert_eq!(matrix.at(point, 1, 1), sample(3, point));
        }
        let m = matrix.port_matrix(1);
        assert_eq!(m[1][0], sample(2, 1));
    }

    #[test]
    fn test_wave_matrix_wrong_trace_count() {
        let result = WaveMatrix::from_traces(&traces(3)[..3]);
        assert!(matches!(result, Err(Error::Invariant(_))));
    }

    #[test]
    fn test_wave_matrix_ragged_traces() {
        let mut ragged = traces(3);
        ragged[2].pop();
        let result = WaveMatrix::from_traces(&ragged);
        assert!(matches!(result, Err(Error::Invariant(_))));
    }

    #[test]
    fn test_wave_matrix_empty() {
        let matrix = WaveMatrix::from_traces(&traces(0)).unwrap();
        assert_eq!(matrix.points(), 0);
    }
}
