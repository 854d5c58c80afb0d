use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::core::errors::{KeyringSyncError, Result};

const BEGIN_PREFIX: &str = "-----BEGIN PGP ";
const END_PREFIX: &str = "-----END PGP ";

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;

/// Converts downloaded key data into binary OpenPGP form.
///
/// Handles both shapes a key source can take:
/// - binary keyrings (as published for `signed-by=`), returned unchanged
/// - ASCII-armored blocks, possibly several concatenated, decoded and joined
///
/// Anything else (an HTML error page, an empty body, a truncated block)
/// is rejected as `MalformedArtifact`.
pub struct ArmorParser;

impl ArmorParser {
    /// Whether `data` is text carrying an armor header line. The header
    /// may follow a plain-text preamble.
    pub fn is_armored(data: &[u8]) -> bool {
        armored_text(data).is_some()
    }

    pub fn normalize(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(malformed("downloaded file is empty"));
        }

        let Some(text) = armored_text(data) else {
            check_packet_header(data)?;
            return Ok(data.to_vec());
        };

        let binary = self.dearmor(text)?;
        check_packet_header(&binary)?;
        Ok(binary)
    }

    /// Decode every armored block in `text` and concatenate the results.
    pub fn dearmor(&self, text: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut blocks = 0;
        let mut lines = text.lines();

        while let Some(line) = lines.next() {
            if !line.trim().starts_with(BEGIN_PREFIX) {
                continue;
            }
            blocks += 1;
            out.extend(decode_block(&mut lines)?);
        }

        if blocks == 0 {
            return Err(malformed("no armor header line found"));
        }
        if out.is_empty() {
            return Err(malformed("armored block has no content"));
        }
        Ok(out)
    }
}

fn armored_text(data: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(data).ok()?;
    text.lines()
        .any(|line| line.trim().starts_with(BEGIN_PREFIX))
        .then_some(text)
}

fn decode_block<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Result<Vec<u8>> {
    let mut body = String::new();
    let mut checksum: Option<String> = None;
    let mut in_headers = true;

    loop {
        let Some(line) = lines.next() else {
            return Err(malformed("armored block has no END line"));
        };
        let line = line.trim();

        if line.starts_with(END_PREFIX) {
            break;
        }

        if in_headers {
            if line.is_empty() {
                in_headers = false;
                continue;
            }
            // Armor headers such as "Version: GnuPG v2" or "Comment: ...".
            if line.contains(": ") {
                continue;
            }
            in_headers = false;
        }

        if line.is_empty() {
            continue;
        }

        if let Some(crc) = line.strip_prefix('=') {
            checksum = Some(crc.to_string());
            continue;
        }

        body.push_str(line);
    }

    let decoded = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| malformed(&format!("invalid base64 in armored block: {e}")))?;

    if let Some(crc) = checksum {
        verify_checksum(&decoded, &crc)?;
    }

    Ok(decoded)
}

fn verify_checksum(data: &[u8], encoded: &str) -> Result<()> {
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| malformed("invalid armor checksum line"))?;

    let [a, b, c] = bytes[..] else {
        return Err(malformed("armor checksum must be 3 bytes"));
    };
    let expected = (u32::from(a) << 16) | (u32::from(b) << 8) | u32::from(c);
    let computed = crc24(data);

    if expected != computed {
        return Err(malformed(&format!(
            "armor checksum mismatch (expected {expected:06X}, computed {computed:06X})"
        )));
    }
    Ok(())
}

/// CRC-24 as used by OpenPGP ASCII armor.
pub fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for &byte in data {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}

/// Binary key data must open with an OpenPGP packet tag byte.
fn check_packet_header(data: &[u8]) -> Result<()> {
    let Some(&first) = data.first() else {
        return Err(malformed("key data is empty"));
    };

    if first & 0x80 == 0 {
        return Err(malformed(&format!(
            "not an OpenPGP packet (first byte 0x{first:02X})"
        )));
    }

    let tag = if first & 0x40 != 0 {
        first & 0x3F
    } else {
        (first >> 2) & 0x0F
    };
    if tag == 0 {
        return Err(malformed("reserved OpenPGP packet tag 0"));
    }

    Ok(())
}

fn malformed(reason: &str) -> KeyringSyncError {
    KeyringSyncError::MalformedArtifact {
        url: String::new(),
        reason: reason.to_string(),
    }
}
