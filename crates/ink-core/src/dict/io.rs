use std::fs;
use std::path::Path;

use super::{DictError, WordDictionary};

pub(super) const MAGIC: &[u8; 4] = b"INKD";
pub(super) const VERSION: u8 = 1;
/// magic(4) + version(1) + reserved(3) + crc32(4)
pub(super) const HEADER_SIZE: usize = 12;

impl WordDictionary {
    /// Serialize to the INKD binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let body = bincode::serialize(&self.entries()).map_err(DictError::Serialize)?;
        let crc = crc32fast::hash(&body);

        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&[0u8; 3]); // reserved
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        if data.len() < 5 {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(DictError::UnsupportedVersion(data[4]));
        }
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }

        let mut crc_bytes = [0u8; 4];
        crc_bytes.copy_from_slice(&data[8..12]);
        let expected = u32::from_le_bytes(crc_bytes);
        let body = &data[HEADER_SIZE..];
        let actual = crc32fast::hash(body);
        if expected != actual {
            return Err(DictError::ChecksumMismatch { expected, actual });
        }

        let entries: Vec<(String, u32)> =
            bincode::deserialize(body).map_err(DictError::Deserialize)?;
        Ok(Self::from_entries(entries))
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Open either a binary INKD file or a plain word list, detected by the
    /// magic bytes.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let data = fs::read(path)?;
        if data.starts_with(MAGIC) {
            return Self::from_bytes(&data);
        }
        let text = String::from_utf8(data).map_err(|e| DictError::Parse {
            line: 0,
            reason: format!("not UTF-8: {e}"),
        })?;
        Self::from_word_list(&text)
    }
}
