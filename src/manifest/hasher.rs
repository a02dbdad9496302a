//! Content digests for regular files.
//!
//! A digest is rendered as `<algorithm>:<lowercase hex>`, e.g.
//! `sha256:2c26b46b...`. The algorithm is chosen per build through
//! [`DigestAlgorithm`]; implementations only need to honor the streaming
//! [`Digester`] contract.

use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Supported content digest algorithms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256, the canonical algorithm
    #[default]
    Sha256,
    /// BLAKE3 with the default 32-byte output
    Blake3,
}

impl DigestAlgorithm {
    /// Tag used as the digest string prefix
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    /// Length of the raw digest in bytes
    pub fn output_len(&self) -> usize {
        32
    }

    /// Start a fresh streaming digest
    pub fn digester(&self) -> Box<dyn Digester> {
        match self {
            DigestAlgorithm::Sha256 => Box::new(Sha256Digester(sha2::Sha256::new())),
            DigestAlgorithm::Blake3 => Box::new(Blake3Digester(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            other => Err(format!(
                "unknown digest algorithm '{}' (expected 'sha256' or 'blake3')",
                other
            )),
        }
    }
}

/// Streaming digest computation
pub trait Digester {
    /// Feed more bytes
    fn write(&mut self, bytes: &[u8]);

    /// Consume the digester and produce the tagged digest
    fn finalize(self: Box<Self>) -> Digest;
}

struct Sha256Digester(sha2::Sha256);

impl Digester for Sha256Digester {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from_parts(DigestAlgorithm::Sha256, &self.0.finalize())
    }
}

struct Blake3Digester(blake3::Hasher);

impl Digester for Blake3Digester {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from_parts(DigestAlgorithm::Blake3, self.0.finalize().as_bytes())
    }
}

/// Algorithm-tagged content digest
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    fn from_parts(algorithm: DigestAlgorithm, bytes: &[u8]) -> Self {
        Digest(format!("{}:{}", algorithm.name(), hex::encode(bytes)))
    }

    /// Parse and validate a `<algorithm>:<hex>` string
    pub fn parse(s: &str) -> Result<Self, ManifestError> {
        let invalid = || ManifestError::InvalidDigest(s.to_string());
        let (name, encoded) = s.split_once(':').ok_or_else(invalid)?;
        let algorithm = DigestAlgorithm::from_str(name).map_err(|_| invalid())?;
        let is_lower_hex = encoded
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !is_lower_hex || encoded.len() != algorithm.output_len() * 2 {
            return Err(invalid());
        }
        Ok(Digest(s.to_string()))
    }

    /// Algorithm that produced this digest
    pub fn algorithm(&self) -> DigestAlgorithm {
        // The prefix is validated on construction.
        match self.0.split_once(':') {
            Some(("blake3", _)) => DigestAlgorithm::Blake3,
            _ => DigestAlgorithm::Sha256,
        }
    }

    /// Hex-encoded digest without the algorithm tag
    pub fn hex(&self) -> &str {
        self.0.split_once(':').map(|(_, hex)| hex).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Digest {
    type Error = ManifestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Digest::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

/// Digest an in-memory byte slice
pub fn compute_digest(algorithm: DigestAlgorithm, content: &[u8]) -> Digest {
    let mut digester = algorithm.digester();
    digester.write(content);
    digester.finalize()
}

/// Stream a reader to the end through a fresh digester
pub fn digest_reader<R: Read>(algorithm: DigestAlgorithm, mut reader: R) -> io::Result<Digest> {
    let mut digester = algorithm.digester();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        digester.write(&buf[..n]);
    }
    Ok(digester.finalize())
}

/// Digest the content of the file at `path`.
///
/// The file handle and the partial digest state are dropped before this
/// returns, on success and on error.
pub fn digest_file(algorithm: DigestAlgorithm, path: &Path) -> Result<Digest, ManifestError> {
    let to_error = |source| ManifestError::Digest {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(to_error)?;
    digest_reader(algorithm, file).map_err(to_error)
}
