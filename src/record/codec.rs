//! Byte Codec
//!
//! Little-endian encoding of [`SampleRecord`] for anything that crosses the process
//! boundary as bytes rather than as a shared array: buffer dumps, test fixtures, and
//! decoders on the consumer side that read raw memory.

use bytes::{Buf, BufMut};

use super::{SampleRecord, RECORD_SIZE};
use crate::error::{RelayError, Result};

/// Append the 32-byte wire image of `record` to `buf`
pub fn encode(record: &SampleRecord, buf: &mut impl BufMut) {
    let r = *record;
    buf.put_f32_le(r.position_x);
    buf.put_f32_le(r.position_y);
    buf.put_f32_le(r.pressure);
    buf.put_f32_le(r.tilt_x);
    buf.put_f32_le(r.tilt_y);
    buf.put_u16_le(r.buttons);
    buf.put_u32_le(r.estimation_update_index);
    buf.put_f32_le(r.padding1);
    buf.put_u16_le(r.padding2);
}

/// Wire image of a single record
pub fn to_bytes(record: &SampleRecord) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    encode(record, &mut &mut out[..]);
    out
}

/// Read one record from the front of `buf`
pub fn decode(buf: &mut impl Buf) -> Result<SampleRecord> {
    if buf.remaining() < RECORD_SIZE {
        return Err(RelayError::TruncatedRecord {
            expected: RECORD_SIZE,
            actual: buf.remaining(),
        });
    }

    Ok(SampleRecord {
        position_x: buf.get_f32_le(),
        position_y: buf.get_f32_le(),
        pressure: buf.get_f32_le(),
        tilt_x: buf.get_f32_le(),
        tilt_y: buf.get_f32_le(),
        buttons: buf.get_u16_le(),
        estimation_update_index: buf.get_u32_le(),
        padding1: buf.get_f32_le(),
        padding2: buf.get_u16_le(),
    })
}

/// Decode a whole packed buffer image
pub fn decode_all(mut image: &[u8]) -> Result<Vec<SampleRecord>> {
    if image.len() % RECORD_SIZE != 0 {
        return Err(RelayError::MisalignedImage(image.len()));
    }

    let mut records = Vec::with_capacity(image.len() / RECORD_SIZE);
    while image.has_remaining() {
        records.push(decode(&mut image)?);
    }
    Ok(records)
}

/// Encode a slice of records into one contiguous image
pub fn encode_all(records: &[SampleRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * RECORD_SIZE);
    for record in records {
        encode(record, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{offsets, ButtonState, PenSample};

    fn record() -> SampleRecord {
        SampleRecord::from_sample(&PenSample {
            position: (1.5, -2.0),
            pressure: 0.5,
            tilt: (0.25, 0.125),
            buttons: ButtonState {
                tip: true,
                pending_estimates: 2,
                ..Default::default()
            },
            estimation_update_index: 0xDEAD_BEEF,
        })
    }

    #[test]
    fn test_field_offsets_in_image() {
        let bytes = to_bytes(&record());
        let at = |o: usize| &bytes[o..o + 4];

        assert_eq!(at(offsets::POSITION_X), &1.5f32.to_le_bytes());
        assert_eq!(at(offsets::POSITION_Y), &(-2.0f32).to_le_bytes());
        assert_eq!(at(offsets::PRESSURE), &0.5f32.to_le_bytes());
        assert_eq!(
            &bytes[offsets::BUTTONS..offsets::BUTTONS + 2],
            &0b0000_0101u16.to_le_bytes()
        );
        assert_eq!(
            at(offsets::ESTIMATION_UPDATE_INDEX),
            &0xDEAD_BEEFu32.to_le_bytes()
        );
        assert!(bytes[offsets::PADDING1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_image_matches_in_memory_layout() {
        let r = record();
        // SAFETY: SampleRecord is repr(C, packed) plain-old-data, 32 bytes.
        #[allow(unsafe_code)]
        let raw: [u8; RECORD_SIZE] = unsafe { std::mem::transmute(r) };
        if cfg!(target_endian = "little") {
            assert_eq!(raw, to_bytes(&r));
        }
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = to_bytes(&record());
        let err = decode(&mut &bytes[..20]).unwrap_err();
        assert!(matches!(
            err,
            RelayError::TruncatedRecord {
                expected: 32,
                actual: 20
            }
        ));
    }

    #[test]
    fn test_decode_all_rejects_partial_image() {
        let mut image = encode_all(&[record(), SampleRecord::barrel_tap()]);
        assert_eq!(decode_all(&image).unwrap().len(), 2);

        image.pop();
        assert!(matches!(
            decode_all(&image),
            Err(RelayError::MisalignedImage(63))
        ));
    }
}
