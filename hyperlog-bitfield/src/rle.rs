//! Run-length codec for sparse bitfield images.
//!
//! Each run is written as a zig-zag signed varint holding the run length,
//! followed by the repeated byte:
//!
//! ```text
//! "aaa"  =>  [0x06, 0x61]
//! ```
//!
//! [`Encoder`] accepts whole runs, so a sparse image can be encoded without
//! materialising its zero stretches. [`runs`] reads the stream back one run
//! at a time for the same reason.

use std::borrow::Cow;

use integer_encoding::VarInt;
use log::debug;

use crate::BitfieldError;

/// One decoded run: `length` copies of `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// The repeated byte.
    pub value: u8,
    /// Number of repetitions.
    pub length: u64,
}

/// Accumulates runs and emits the encoded stream.
///
/// Adjacent runs of the same byte are merged before being written.
#[derive(Debug, Default)]
pub struct Encoder {
    out: Vec<u8>,
    pending: Option<Run>,
    input_len: u64,
}

impl Encoder {
    /// An empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `length` copies of `value`.
    pub fn push_run(&mut self, value: u8, length: u64) {
        if length == 0 {
            return;
        }
        self.input_len += length;
        if let Some(run) = &mut self.pending {
            if run.value == value {
                run.length += length;
                return;
            }
        }
        self.flush();
        self.pending = Some(Run { value, length });
    }

    /// Append raw bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for run in bytes.chunk_by(|a, b| a == b) {
            self.push_run(run[0], run.len() as u64);
        }
    }

    /// Total number of input bytes pushed so far.
    pub fn input_len(&self) -> u64 {
        self.input_len
    }

    /// Write the pending run and return the encoded stream.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.out
    }

    fn flush(&mut self) {
        if let Some(Run { value, length }) = self.pending.take() {
            self.out
                .extend_from_slice(&(length as i64).encode_var_vec());
            self.out.push(value);
        }
    }
}

/// Run-length encode `input`.
///
/// Returns the encoded bytes and `true` when the encoding is strictly shorter
/// than `input`; otherwise returns `input` unchanged and `false`.
pub fn encode(input: &[u8]) -> (Cow<'_, [u8]>, bool) {
    if input.len() <= 1 {
        return (Cow::Borrowed(input), false);
    }

    let mut encoder = Encoder::new();
    encoder.push_bytes(input);
    let out = encoder.finish();

    if out.len() < input.len() {
        (Cow::Owned(out), true)
    } else {
        debug!(
            "run-length encoding of {} bytes is not smaller, keeping input",
            input.len()
        );
        (Cow::Borrowed(input), false)
    }
}

/// Iterate over the runs of an encoded stream without expanding them.
///
/// Iteration stops after the first error.
pub fn runs(input: &[u8]) -> Runs<'_> {
    Runs { input, position: 0 }
}

/// Iterator returned by [`runs`].
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    input: &'a [u8],
    position: usize,
}

impl Runs<'_> {
    fn read_run(&mut self) -> Result<Run, BitfieldError> {
        let position = self.position;
        let (length, read) = i64::decode_var(&self.input[position..])
            .ok_or(BitfieldError::TruncatedRunLength(position))?;
        if length < 0 {
            return Err(BitfieldError::InvalidRunLength { length, position });
        }
        let value = *self
            .input
            .get(position + read)
            .ok_or(BitfieldError::TruncatedRunValue(position + read))?;
        self.position = position + read + 1;
        Ok(Run {
            value,
            length: length as u64,
        })
    }
}

impl Iterator for Runs<'_> {
    type Item = Result<Run, BitfieldError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.input.len() {
            return None;
        }
        let run = self.read_run();
        if run.is_err() {
            self.position = self.input.len();
        }
        Some(run)
    }
}

/// Decode bytes produced by [`encode`], refusing to produce more than
/// `max_len` bytes.
pub fn decode(input: &[u8], max_len: u64) -> Result<Vec<u8>, BitfieldError> {
    let mut out = Vec::new();
    for run in runs(input) {
        let Run { value, length } = run?;
        let end = (out.len() as u64)
            .checked_add(length)
            .filter(|end| *end <= max_len)
            .ok_or(BitfieldError::DecodedLengthExceeded { limit: max_len })?;
        out.resize(end as usize, value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_encode() {
        let cases: &[(&[u8], &[u8])] = &[
            (b"aaa", &[0x06, 0x61]),
            (b"aaaaaaaa", &[0x10, 0x61]),
            (
                b"AAABBBCCCCDDDDEFFFFFFFFGGH",
                &[
                    0x06, 0x41, 0x06, 0x42, 0x08, 0x43, 0x08, 0x44, 0x02, 0x45, 0x10, 0x46, 0x04,
                    0x47, 0x02, 0x48,
                ],
            ),
        ];
        for (input, want) in cases {
            let (got, encoded) = encode(input);
            assert!(encoded, "{:?}", input);
            assert_eq!(got.as_ref(), *want);
        }
    }

    #[test]
    fn test_encode_falls_back_when_not_smaller() {
        for input in [&b""[..], b"a", b"ab", b"abcdefghijklmnopqrstuv"] {
            let (got, encoded) = encode(input);
            assert!(!encoded, "{:?}", input);
            assert_matches!(got, Cow::Borrowed(_));
            assert_eq!(got.as_ref(), input);
        }
    }

    #[test]
    fn test_encode_long_run_uses_multi_byte_length() {
        let input = vec![0u8; 1000];
        let (got, encoded) = encode(&input);
        assert!(encoded);
        // 1000 zig-zags to 2000, a two byte varint
        assert_eq!(got.as_ref(), &[0xd0, 0x0f, 0x00]);
    }

    #[test]
    fn test_encoder_merges_adjacent_runs() {
        let mut encoder = Encoder::new();
        encoder.push_bytes(b"aa");
        encoder.push_run(b'a', 1);
        encoder.push_run(0, 0);
        encoder.push_run(0, 1 << 40);
        encoder.push_bytes(b"\x00b");
        assert_eq!(encoder.input_len(), 4 + (1 << 40) + 1);

        let mut want = vec![0x06, b'a'];
        want.extend_from_slice(&(((1i64 << 40) + 1).encode_var_vec()));
        want.extend_from_slice(&[0x00, 0x02, b'b']);
        assert_eq!(encoder.finish(), want);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(b"\x02\x41", 16).expect("valid"), b"A");
        assert_eq!(decode(b"\x14\x41", 16).expect("valid"), b"AAAAAAAAAA");
        assert_eq!(
            decode(&[0x02, 0x41, 0x14, 0x42], 16).expect("valid"),
            b"ABBBBBBBBBB"
        );
        assert_eq!(decode(&[], 0).expect("valid"), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_errors() {
        assert_matches!(decode(b"\x42", 64), Err(BitfieldError::TruncatedRunValue(1)));
        assert_matches!(
            decode(b"\x02\x41\x42", 64),
            Err(BitfieldError::TruncatedRunValue(3))
        );
        assert_matches!(
            decode(&[0x80], 64),
            Err(BitfieldError::TruncatedRunLength(0))
        );
        assert_matches!(
            decode(&[0x02, 0x41, 0x03, 0x41], 64),
            Err(BitfieldError::InvalidRunLength {
                length: -2,
                position: 2
            })
        );
    }

    #[test]
    fn test_decode_rejects_oversized_run() {
        let mut input = (1i64 << 50).encode_var_vec();
        input.push(0xff);
        assert_matches!(
            decode(&input, 1 << 20),
            Err(BitfieldError::DecodedLengthExceeded { limit }) if limit == 1 << 20
        );

        assert_eq!(decode(b"\x14\x41", 10).expect("exactly at the limit").len(), 10);
        assert_matches!(
            decode(b"\x14\x41", 9),
            Err(BitfieldError::DecodedLengthExceeded { limit: 9 })
        );
    }

    #[test]
    fn test_runs_stop_after_error() {
        let mut iter = runs(&[0x02, 0x41, 0x80]);
        assert_eq!(
            iter.next(),
            Some(Ok(Run {
                value: 0x41,
                length: 1
            }))
        );
        assert_eq!(iter.next(), Some(Err(BitfieldError::TruncatedRunLength(2))));
        assert_eq!(iter.next(), None);
    }

    proptest! {
        #[test]
        fn encoded_output_decodes_to_input(
            input in prop::collection::vec(prop::sample::select(vec![0u8, 1, 0xff]), 0..512)
        ) {
            let (bytes, encoded) = encode(&input);
            if encoded {
                prop_assert!(bytes.len() < input.len());
                prop_assert_eq!(
                    decode(&bytes, input.len() as u64).expect("own output decodes"),
                    input
                );
            } else {
                prop_assert_eq!(bytes.as_ref(), input.as_slice());
            }
        }
    }
}
