//! Stream filter decoders.
//!
//! Covers the filters that appear on text-bearing streams: FlateDecode (with
//! PNG/TIFF predictors), LZWDecode, ASCIIHexDecode, ASCII85Decode, and
//! RunLengthDecode. Image-only filters are rejected with a typed error.

use std::io::Read;

use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::object::{Dict, Object};

/// Applies a resolved filter chain in order.
///
/// Each entry is the filter name (abbreviations accepted) and its decode
/// parameter dict (empty when absent).
pub fn decode_chain(filters: &[(String, Dict)], data: &[u8]) -> Result<Vec<u8>> {
    let mut output = data.to_vec();
    for (name, params) in filters {
        output = match name.as_str() {
            "FlateDecode" | "Fl" => apply_predictor(params, flate_decode(&output)?)?,
            "LZWDecode" | "LZW" => apply_predictor(params, lzw_decode(&output, params))?,
            "ASCIIHexDecode" | "AHx" => ascii_hex_decode(&output),
            "ASCII85Decode" | "A85" => ascii85_decode(&output)?,
            "RunLengthDecode" | "RL" => run_length_decode(&output)?,
            "Crypt" if crypt_is_identity(params) => output,
            "Crypt" => return Err(ExtractError::Encrypted),
            "DCTDecode" | "DCT" | "JPXDecode" | "CCITTFaxDecode" | "CCF" | "JBIG2Decode" => {
                return Err(ExtractError::Decode(format!(
                    "image filter {name} on a text-path stream"
                )));
            }
            other => {
                return Err(ExtractError::Decode(format!("unknown filter {other}")));
            }
        };
    }
    Ok(output)
}

fn crypt_is_identity(params: &Dict) -> bool {
    match params.get("Name") {
        None => true,
        Some(Object::Name(n)) => n == "Identity",
        Some(_) => false,
    }
}

fn param_i64(params: &Dict, key: &str, default: i64) -> i64 {
    params
        .get(key)
        .and_then(|v| v.as_i64().ok())
        .unwrap_or(default)
}

/// Zlib inflate; corrupted streams keep whatever prefix decoded cleanly.
fn flate_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    if decoder.read_to_end(&mut out).is_ok() {
        return Ok(out);
    }
    debug!("corrupt deflate stream, salvaging partial output");
    let salvaged = inflate_salvage(data);
    if salvaged.is_empty() {
        return Err(ExtractError::Decode("corrupt deflate stream".to_string()));
    }
    Ok(salvaged)
}

/// Best-effort inflate: feed the decoder until it errors and return the
/// bytes produced up to that point (truncated streams and bad checksums
/// near the end are common in the wild).
fn inflate_salvage(data: &[u8]) -> Vec<u8> {
    use flate2::{Decompress, FlushDecompress, Status};
    let mut decoder = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut buf = [0u8; 4096];
    loop {
        let consumed = decoder.total_in() as usize;
        if consumed >= data.len() {
            break;
        }
        let before_out = decoder.total_out();
        let before_in = decoder.total_in();
        let res = decoder.decompress(&data[consumed..], &mut buf, FlushDecompress::None);
        let produced = (decoder.total_out() - before_out) as usize;
        if produced > 0 {
            out.extend_from_slice(&buf[..produced]);
        }
        match res {
            Ok(Status::StreamEnd) | Err(_) => break,
            Ok(_) => {
                // No progress on either side means a stall.
                if produced == 0 && decoder.total_in() == before_in {
                    break;
                }
            }
        }
    }
    out
}

/// Reverses `/Predictor` post-processing on inflated data.
fn apply_predictor(params: &Dict, data: Vec<u8>) -> Result<Vec<u8>> {
    let predictor = param_i64(params, "Predictor", 1);
    match predictor {
        1 => Ok(data),
        2 => tiff_predictor(params, data),
        p if p >= 10 => png_predictor(params, &data),
        p => Err(ExtractError::Decode(format!("unsupported predictor {p}"))),
    }
}

fn predictor_geometry(params: &Dict) -> (usize, usize) {
    let columns = param_i64(params, "Columns", 1).max(1) as usize;
    let colors = param_i64(params, "Colors", 1).max(1) as usize;
    let bits = param_i64(params, "BitsPerComponent", 8).max(1) as usize;
    let row_bytes = (columns * colors * bits).div_ceil(8);
    let bpp = (colors * bits / 8).max(1);
    (row_bytes, bpp)
}

fn tiff_predictor(params: &Dict, mut data: Vec<u8>) -> Result<Vec<u8>> {
    let bits = param_i64(params, "BitsPerComponent", 8);
    if bits != 8 {
        return Err(ExtractError::Decode(format!(
            "TIFF predictor with {bits} bits per component"
        )));
    }
    let (row_bytes, bpp) = predictor_geometry(params);
    for row in data.chunks_mut(row_bytes) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }
    Ok(data)
}

/// PNG row filters (None/Sub/Up/Average/Paeth); each row carries a leading
/// filter-type byte. A trailing partial row is dropped.
fn png_predictor(params: &Dict, data: &[u8]) -> Result<Vec<u8>> {
    let (row_bytes, bpp) = predictor_geometry(params);
    let row_size = row_bytes + 1;
    let mut result = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; row_bytes];

    for row_start in (0..data.len()).step_by(row_size) {
        if row_start + row_size > data.len() {
            break;
        }
        let filter_type = data[row_start];
        let row_data = &data[row_start + 1..row_start + row_size];
        let mut row = vec![0u8; row_bytes];
        match filter_type {
            0 => row.copy_from_slice(row_data),
            1 => {
                for i in 0..row_bytes {
                    let left = if i >= bpp { row[i - bpp] } else { 0 };
                    row[i] = row_data[i].wrapping_add(left);
                }
            }
            2 => {
                for i in 0..row_bytes {
                    row[i] = row_data[i].wrapping_add(prev_row[i]);
                }
            }
            3 => {
                for i in 0..row_bytes {
                    let left = if i >= bpp { row[i - bpp] as u16 } else { 0 };
                    let up = prev_row[i] as u16;
                    row[i] = row_data[i].wrapping_add(((left + up) / 2) as u8);
                }
            }
            4 => {
                for i in 0..row_bytes {
                    let left = if i >= bpp { row[i - bpp] } else { 0 };
                    let up = prev_row[i];
                    let up_left = if i >= bpp { prev_row[i - bpp] } else { 0 };
                    row[i] = row_data[i].wrapping_add(paeth(left, up, up_left));
                }
            }
            other => {
                return Err(ExtractError::Decode(format!(
                    "unknown PNG filter type {other}"
                )));
            }
        }
        result.extend_from_slice(&row);
        prev_row = row;
    }
    Ok(result)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Hex pairs up to `>`; whitespace and stray bytes are ignored, an odd
/// final digit is padded with zero.
fn ascii_hex_decode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;
    for &b in data {
        if b == b'>' {
            break;
        }
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => continue,
        };
        match pending.take() {
            Some(hi) => out.push(hi << 4 | digit),
            None => pending = Some(digit),
        }
    }
    if let Some(hi) = pending {
        out.push(hi << 4);
    }
    out
}

/// Base-85 groups of 5 chars to 4 bytes; `z` is four zero bytes, `~>` ends
/// the data, and a partial final group is `u`-padded.
fn ascii85_decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let mut out = Vec::with_capacity(data.len() * 4 / 5);
    let mut group = [0u8; 5];
    let mut len = 0usize;
    for &b in data {
        match b {
            b'~' => break,
            b'z' if len == 0 => out.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group[len] = b;
                len += 1;
                if len == 5 {
                    out.extend_from_slice(&decode_ascii85_group(&group)?);
                    len = 0;
                }
            }
            b if b.is_ascii_whitespace() || b == 0 => {}
            other => {
                return Err(ExtractError::Decode(format!(
                    "invalid ascii85 byte 0x{other:02x}"
                )));
            }
        }
    }
    match len {
        0 => {}
        1 => {
            return Err(ExtractError::Decode(
                "truncated ascii85 group".to_string(),
            ));
        }
        n => {
            for slot in group.iter_mut().skip(n) {
                *slot = b'u';
            }
            let bytes = decode_ascii85_group(&group)?;
            out.extend_from_slice(&bytes[..n - 1]);
        }
    }
    Ok(out)
}

fn decode_ascii85_group(group: &[u8; 5]) -> Result<[u8; 4]> {
    let mut value: u64 = 0;
    for &b in group {
        value = value * 85 + (b - b'!') as u64;
    }
    if value > u32::MAX as u64 {
        return Err(ExtractError::Decode("ascii85 group overflow".to_string()));
    }
    Ok((value as u32).to_be_bytes())
}

/// Length byte below 128 copies n+1 literals, above repeats the next byte
/// 257-n times, 128 ends the data.
fn run_length_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0usize;
    while i < data.len() {
        let n = data[i] as usize;
        i += 1;
        match n {
            128 => break,
            0..=127 => {
                let count = n + 1;
                if i + count > data.len() {
                    return Err(ExtractError::Decode(
                        "truncated run-length literal".to_string(),
                    ));
                }
                out.extend_from_slice(&data[i..i + count]);
                i += count;
            }
            _ => {
                let Some(&byte) = data.get(i) else {
                    return Err(ExtractError::Decode(
                        "truncated run-length repeat".to_string(),
                    ));
                };
                i += 1;
                out.extend(std::iter::repeat_n(byte, 257 - n));
            }
        }
    }
    Ok(out)
}

/// PDF LZW: MSB-first 9..12-bit codes over 8-bit symbols. `/EarlyChange 1`
/// (the default) widens codes one step early, matching the TIFF variant.
/// Corrupt tails keep the partial output, as inflate does.
fn lzw_decode(data: &[u8], params: &Dict) -> Vec<u8> {
    use weezl::{BitOrder, decode::Decoder};
    let early_change = param_i64(params, "EarlyChange", 1);
    let mut decoder = if early_change == 0 {
        Decoder::new(BitOrder::Msb, 8)
    } else {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    };
    let mut output = Vec::new();
    let result = decoder.into_vec(&mut output).decode(data);
    if let Err(err) = result.status {
        debug!("lzw stream ended abnormally: {err:?}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn chain(name: &str, data: &[u8]) -> Result<Vec<u8>> {
        decode_chain(&[(name.to_string(), Dict::new())], data)
    }

    fn zlib_compress(data: &[u8]) -> Vec<u8> {
        let mut enc =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_flate_roundtrip() {
        let compressed = zlib_compress(b"stream payload");
        assert_eq!(chain("FlateDecode", &compressed).unwrap(), b"stream payload");
        // Abbreviated name accepted.
        assert_eq!(chain("Fl", &compressed).unwrap(), b"stream payload");
    }

    #[test]
    fn test_flate_salvages_truncated_stream() {
        let compressed = zlib_compress(&vec![b'x'; 10_000]);
        let truncated = &compressed[..compressed.len() - 6];
        let out = chain("FlateDecode", truncated).unwrap();
        assert!(!out.is_empty());
        assert!(out.iter().all(|&b| b == b'x'));
    }

    #[test]
    fn test_flate_garbage_is_an_error() {
        assert!(chain("FlateDecode", b"definitely not zlib").is_err());
    }

    #[test]
    fn test_ascii_hex() {
        assert_eq!(
            chain("ASCIIHexDecode", b"48 65 6C 6C 6F>").unwrap(),
            b"Hello"
        );
        // Odd digit pads with zero; hex crate spells the expectation.
        assert_eq!(
            chain("AHx", b"7>").unwrap(),
            hex::decode("70").unwrap()
        );
    }

    #[test]
    fn test_ascii85() {
        assert_eq!(
            chain("ASCII85Decode", b"87cURD_;~>").unwrap(),
            b"Hello."
        );
        // z expands to four zero bytes.
        assert_eq!(chain("A85", b"z~>").unwrap(), vec![0, 0, 0, 0]);
        // Partial group: "Hi" encodes to three chars.
        assert_eq!(chain("A85", b"88/~>").unwrap(), b"Hi");
    }

    #[test]
    fn test_ascii85_rejects_garbage() {
        assert!(chain("ASCII85Decode", b"\x80\x81~>").is_err());
    }

    #[test]
    fn test_run_length() {
        // 2 literals "ab", repeat 'c' x4 (257-253), EOD.
        let encoded = [1, b'a', b'b', 253, b'c', 128];
        assert_eq!(chain("RunLengthDecode", &encoded).unwrap(), b"abcccc");
    }

    #[test]
    fn test_run_length_truncated() {
        assert!(chain("RunLengthDecode", &[5, b'a']).is_err());
    }

    #[test]
    fn test_lzw_roundtrip() {
        use weezl::{BitOrder, encode::Encoder};
        let data = b"ABCABCABCABCABCABC";
        let compressed = Encoder::new(BitOrder::Msb, 8).encode(data).unwrap();
        let mut params = Dict::new();
        params.insert("EarlyChange".to_string(), Object::Integer(0));
        let out =
            decode_chain(&[("LZWDecode".to_string(), params)], &compressed).unwrap();
        assert_eq!(out, data);
        // Short data never reaches a code-width boundary, so the default
        // early-change decoder reads it identically.
        let out = decode_chain(
            &[("LZWDecode".to_string(), Dict::new())],
            &compressed,
        )
        .unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_png_up_predictor() {
        // Two rows of three bytes, Up filter: second row adds to the first.
        let mut params = Dict::new();
        params.insert("Predictor".to_string(), Object::Integer(12));
        params.insert("Columns".to_string(), Object::Integer(3));
        let raw = [2u8, 1, 2, 3, 2, 1, 1, 1];
        let compressed = zlib_compress(&raw);
        let out =
            decode_chain(&[("FlateDecode".to_string(), params)], &compressed).unwrap();
        assert_eq!(out, vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn test_png_sub_and_paeth_rows() {
        let mut params = Dict::new();
        params.insert("Predictor".to_string(), Object::Integer(15));
        params.insert("Columns".to_string(), Object::Integer(4));
        // Sub row: cumulative sums; Paeth row over it.
        let raw = [1u8, 10, 10, 10, 10, 4, 1, 1, 1, 1];
        let compressed = zlib_compress(&raw);
        let out =
            decode_chain(&[("FlateDecode".to_string(), params)], &compressed).unwrap();
        assert_eq!(out[..4], [10, 20, 30, 40]);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_image_filter_rejected() {
        assert!(matches!(
            chain("DCTDecode", b"\xff\xd8"),
            Err(ExtractError::Decode(_))
        ));
    }

    #[test]
    fn test_filter_chain_order() {
        // Flate then ASCIIHex over the compressed bytes: outer first.
        let compressed = zlib_compress(b"chained");
        let hexed: Vec<u8> = compressed
            .iter()
            .flat_map(|b| format!("{b:02X}").into_bytes())
            .chain(std::iter::once(b'>'))
            .collect();
        let filters = vec![
            ("ASCIIHexDecode".to_string(), Dict::new()),
            ("FlateDecode".to_string(), Dict::new()),
        ];
        assert_eq!(decode_chain(&filters, &hexed).unwrap(), b"chained");
    }
}
