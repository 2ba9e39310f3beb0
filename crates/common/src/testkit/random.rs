use std::io::{self, Read};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A seeded, bounded stream of pseudo-random bytes.
///
/// Bytes are produced on demand, and the stream is the same for a given
///  seed however the caller sizes its reads.
#[derive(Debug, Clone)]
pub struct PseudoRandomReader {
    rng: StdRng,
    remaining: u64,
    word: [u8; 8],
    offset: usize,
}

impl PseudoRandomReader {
    pub fn new(len: u64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: len,
            word: [0; 8],
            offset: 8,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn next_byte(&mut self) -> u8 {
        if self.offset == self.word.len() {
            self.word = self.rng.next_u64().to_le_bytes();
            self.offset = 0;
        }
        let byte = self.word[self.offset];
        self.offset += 1;
        byte
    }
}

impl Read for PseudoRandomReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        for byte in &mut buf[..n] {
            *byte = self.next_byte();
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

/// Collect `len` pseudo-random bytes
pub fn pseudo_random_bytes(len: u64, seed: u64) -> Vec<u8> {
    let mut reader = PseudoRandomReader::new(len, seed);
    (0..len).map(|_| reader.next_byte()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded() {
        let bytes = pseudo_random_bytes(1000, 1);
        assert_eq!(bytes.len(), 1000);

        let mut reader = PseudoRandomReader::new(3, 1);
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_seed_determines_stream() {
        assert_eq!(pseudo_random_bytes(4096, 1), pseudo_random_bytes(4096, 1));
        assert_ne!(pseudo_random_bytes(4096, 1), pseudo_random_bytes(4096, 2));
    }

    #[test]
    fn test_read_sizes_do_not_matter() {
        let whole = pseudo_random_bytes(777, 9);

        let mut reader = PseudoRandomReader::new(777, 9);
        let mut pieces = Vec::new();
        let mut buf = [0u8; 5];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            pieces.extend_from_slice(&buf[..n]);
        }
        assert_eq!(pieces, whole);
    }
}
