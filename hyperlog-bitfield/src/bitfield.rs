//! Bit- and byte-addressable view over a [`Pager`].

use log::debug;

use crate::{BitfieldError, Pager, rle};

/// An unbounded bit array stored in sparse pages, 8 bits per byte.
///
/// `byte_length` is the exclusive upper bound of every byte index that has
/// been written. Bytes that were never written read as zero.
#[derive(Debug, Clone, Default)]
pub struct Bitfield {
    pager: Pager,
    byte_length: u64,
}

impl Bitfield {
    /// Create an empty bitfield. A `page_size` of 0 selects the default.
    pub fn new(page_size: usize) -> Self {
        Bitfield {
            pager: Pager::new(page_size),
            byte_length: 0,
        }
    }

    /// Size in bytes of the pages backing this bitfield.
    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    /// Exclusive upper bound of the written byte indices.
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    /// `byte_length * 8`, saturating at `u64::MAX`.
    pub fn len(&self) -> u64 {
        self.byte_length.saturating_mul(8)
    }

    /// Returns `true` if no page has been allocated.
    pub fn is_empty(&self) -> bool {
        self.pager.is_empty()
    }

    /// Set or clear the bit at `index`. Returns whether the bit changed.
    pub fn set_bit(&mut self, index: u64, value: bool) -> bool {
        let byte_index = index / 8;
        let current = self.get_byte(byte_index);
        let mask = 1u8 << (index % 8);
        let updated = if value {
            current | mask
        } else {
            current & !mask
        };
        if updated == current {
            return false;
        }
        self.set_byte(byte_index, updated)
    }

    /// Read the bit at `index`.
    pub fn get_bit(&self, index: u64) -> bool {
        self.get_byte(index / 8) & (1u8 << (index % 8)) != 0
    }

    /// Write the byte at `index`. Returns whether the stored value changed.
    ///
    /// Any write extends `byte_length` to cover `index`, even one that
    /// leaves the value unchanged.
    pub fn set_byte(&mut self, index: u64, value: u8) -> bool {
        if index >= self.byte_length {
            self.byte_length = index + 1;
        }
        let (page_num, buffer_offset) = self.locate(index);
        // an absent page already reads as zero
        if value == 0 && self.pager.get(page_num).is_none() {
            return false;
        }
        let buffer = self.pager.get_or_alloc(page_num).buffer_mut();
        if buffer[buffer_offset] == value {
            return false;
        }
        buffer[buffer_offset] = value;
        true
    }

    /// Read the byte at `index`. Bytes in unallocated pages read as zero.
    pub fn get_byte(&self, index: u64) -> u8 {
        let (page_num, buffer_offset) = self.locate(index);
        self.pager
            .get(page_num)
            .map_or(0, |page| page.buffer()[buffer_offset])
    }

    /// Copy bytes `[0, byte_length)` into a dense buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let page_size = self.page_size() as u64;
        let mut bytes = vec![0u8; self.byte_length as usize];
        for (page_num, chunk) in bytes.chunks_mut(page_size as usize).enumerate() {
            if let Some(page) = self.pager.get(page_num) {
                chunk.copy_from_slice(&page.buffer()[..chunk.len()]);
            }
        }
        bytes
    }

    /// Rebuild a bitfield from a dense byte image.
    ///
    /// `byte_length` becomes `bytes.len()`; pages that would be all zero are
    /// left unallocated.
    pub fn from_bytes(page_size: usize, bytes: &[u8]) -> Self {
        let mut bitfield = Bitfield::new(page_size);
        let page_size = bitfield.page_size();
        for (page_num, chunk) in bytes.chunks(page_size).enumerate() {
            if chunk.iter().any(|b| *b != 0) {
                bitfield.pager.set(page_num, chunk);
            }
        }
        bitfield.byte_length = bytes.len() as u64;
        bitfield
    }

    /// The byte image, run-length encoded when that is smaller.
    ///
    /// The flag reports whether the returned bytes are encoded. Pages that
    /// were never allocated are encoded as zero runs without being expanded,
    /// so the dense image is only built when it is the shorter form.
    pub fn to_compressed(&self) -> (Vec<u8>, bool) {
        let page_size = self.page_size() as u64;
        let mut encoder = rle::Encoder::new();
        let mut position = 0u64;
        for page_num in 0..self.pager.len() {
            if position >= self.byte_length {
                break;
            }
            let len = page_size.min(self.byte_length - position);
            match self.pager.get(page_num) {
                Some(page) => encoder.push_bytes(&page.buffer()[..len as usize]),
                None => encoder.push_run(0, len),
            }
            position += len;
        }
        encoder.push_run(0, self.byte_length - position);

        let encoded = encoder.finish();
        if (encoded.len() as u64) < self.byte_length {
            (encoded, true)
        } else {
            debug!(
                "bitfield of {} bytes left unencoded",
                self.byte_length
            );
            (self.to_bytes(), false)
        }
    }

    /// Rebuild a bitfield from the output of [`Bitfield::to_compressed`].
    ///
    /// The result may not exceed `max_byte_length` bytes. Zero runs are
    /// skipped without allocating pages.
    pub fn from_compressed(
        page_size: usize,
        bytes: &[u8],
        encoded: bool,
        max_byte_length: u64,
    ) -> Result<Self, BitfieldError> {
        if !encoded {
            if bytes.len() as u64 > max_byte_length {
                return Err(BitfieldError::DecodedLengthExceeded {
                    limit: max_byte_length,
                });
            }
            return Ok(Self::from_bytes(page_size, bytes));
        }

        let mut bitfield = Bitfield::new(page_size);
        let mut position = 0u64;
        for run in rle::runs(bytes) {
            let rle::Run { value, length } = run?;
            let end = position
                .checked_add(length)
                .filter(|end| *end <= max_byte_length)
                .ok_or(BitfieldError::DecodedLengthExceeded {
                    limit: max_byte_length,
                })?;
            if value != 0 {
                bitfield.fill(position, end, value);
            }
            position = end;
        }
        bitfield.byte_length = position;

        debug!(
            "decoded {} run-length bytes into {} bitfield bytes",
            bytes.len(),
            position
        );
        Ok(bitfield)
    }

    /// Write `value` to bytes `[start, end)` page by page.
    fn fill(&mut self, start: u64, end: u64, value: u8) {
        let page_size = self.page_size() as u64;
        let mut position = start;
        while position < end {
            let (page_num, buffer_offset) = self.locate(position);
            let len = (page_size - buffer_offset as u64).min(end - position);
            self.pager.get_or_alloc(page_num).buffer_mut()
                [buffer_offset..buffer_offset + len as usize]
                .fill(value);
            position += len;
        }
    }

    fn locate(&self, byte_index: u64) -> (usize, usize) {
        let page_size = self.pager.page_size() as u64;
        (
            (byte_index / page_size) as usize,
            (byte_index % page_size) as usize,
        )
    }
}
