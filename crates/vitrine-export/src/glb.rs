//! Binary glTF container

/// `glTF` in little-endian
pub const GLB_MAGIC: u32 = 0x4654_6C67;
pub const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Pad to a 4-byte boundary with `fill`
pub(crate) fn pad_to_four(data: &mut Vec<u8>, fill: u8) {
    while data.len() % 4 != 0 {
        data.push(fill);
    }
}

/// Assemble a GLB: 12-byte header, a JSON chunk padded with spaces and an
/// optional BIN chunk padded with zeros.
pub fn write_glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = json.to_vec();
    pad_to_four(&mut json_chunk, b' ');
    let mut bin_chunk = bin.to_vec();
    pad_to_four(&mut bin_chunk, 0);

    let mut total = HEADER_LEN + CHUNK_HEADER_LEN + json_chunk.len();
    if !bin_chunk.is_empty() {
        total += CHUNK_HEADER_LEN + bin_chunk.len();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json_chunk);

    if !bin_chunk.is_empty() {
        out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin_chunk);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn header_and_chunks_are_aligned() {
        let glb = write_glb(br#"{"a":1}"#, &[1, 2, 3]);
        assert_eq!(read_u32(&glb, 0), GLB_MAGIC);
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);

        let json_len = read_u32(&glb, 12) as usize;
        assert_eq!(json_len, 8);
        assert_eq!(read_u32(&glb, 16), CHUNK_JSON);
        assert_eq!(glb[20 + 7], b' ');

        let bin_at = 20 + json_len;
        assert_eq!(read_u32(&glb, bin_at), 4);
        assert_eq!(read_u32(&glb, bin_at + 4), CHUNK_BIN);
        assert_eq!(&glb[bin_at + 8..], &[1, 2, 3, 0]);
    }

    #[test]
    fn bin_chunk_omitted_when_empty() {
        let glb = write_glb(b"{}", &[]);
        assert_eq!(glb.len(), 12 + 8 + 4);
    }
}
