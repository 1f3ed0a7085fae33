use digest::Digest;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ChecksumVerifierError {
    #[error("Checksum is not valid hex: {checksum}")]
    InvalidChecksum { checksum: String },
    #[error("Checksum has incorrect length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Hashes everything written through it, to be checked against the expected checksum once the
/// download is complete.
pub struct ChecksumVerifier<D, W> {
    checksum: Box<[u8]>,
    checksummer: D,
    delegate: W,
}

impl<D: Digest, W: Write> ChecksumVerifier<D, W> {
    pub fn new(checksum: &str, delegate: W) -> Result<Self, ChecksumVerifierError> {
        let checksum = hex::decode(checksum)
            .map_err(|_| ChecksumVerifierError::InvalidChecksum {
                checksum: checksum.to_string(),
            })?
            .into_boxed_slice();
        let expected = <D as Digest>::output_size();
        if checksum.len() != expected {
            return Err(ChecksumVerifierError::InvalidLength {
                expected,
                actual: checksum.len(),
            });
        }
        Ok(Self {
            checksum,
            checksummer: D::new(),
            delegate,
        })
    }

    /// Checks the checksum, returning the underlying writer if it matches.
    pub fn verify(self) -> Result<W, ChecksumVerifierError> {
        let actual = self.checksummer.finalize();
        if actual.as_slice() == &*self.checksum {
            Ok(self.delegate)
        } else {
            Err(ChecksumVerifierError::ChecksumMismatch {
                expected: hex::encode(&self.checksum),
                actual: hex::encode(actual),
            })
        }
    }
}

impl<D: Digest, W: Write> Write for ChecksumVerifier<D, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.delegate.write(buf)?;
        self.checksummer.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.delegate.flush()
    }
}
