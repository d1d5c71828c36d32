//! Binary amino encoding primitives.
//!
//! Amino binary is a protobuf-compatible format. Every struct field is
//! written as `uvarint(field_number << 3 | typ3)` followed by the value:
//!
//! | Value                   | typ3 | Encoding                      |
//! |-------------------------|------|-------------------------------|
//! | `bool`, `u64`, `i64`    | 0    | uvarint (two's complement)    |
//! | string, bytes, struct   | 2    | uvarint length, then payload  |
//!
//! Zero scalars, empty strings, byte strings and lists are omitted
//! entirely, and so is a nested struct whose body encodes to nothing.
//! Struct elements of a list are written even when empty. Values
//! stored behind an interface (messages, public keys) carry the 4-byte
//! prefix of their registered type name in front of their own encoding;
//! see [`Codec`](crate::codec::Codec).

use bytes::BufMut;

use crate::codec::Codec;
use crate::error::BuildError;

/// Varint wire type.
pub const TYP3_VARINT: u8 = 0;
/// Length-delimited wire type.
pub const TYP3_BYTE_LENGTH: u8 = 2;

/// Types that can be written as an amino struct body.
pub trait AminoEncode {
    /// Write struct fields (without any length prefix) to `out`.
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError>;
}

/// Buffer with field-level amino helpers.
#[derive(Clone, Debug, Default)]
pub struct AminoWriter {
    buf: Vec<u8>,
}

impl AminoWriter {
    pub fn new() -> Self {
        //! Empty writer.
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        //! Consume the writer, returning the written bytes.
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        //! Bytes written so far.
        &self.buf
    }

    pub fn put_uvarint(&mut self, mut value: u64) {
        //! Append an unsigned LEB128 varint.
        while value >= 0x80 {
            self.buf.put_u8((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }

    pub fn put_raw(&mut self, bytes: &[u8]) {
        //! Append bytes verbatim, without a key or length.
        self.buf.put_slice(bytes);
    }

    fn put_key(&mut self, field: u32, typ3: u8) {
        self.put_uvarint(u64::from(field) << 3 | u64::from(typ3));
    }

    fn put_length_delimited(&mut self, field: u32, payload: &[u8]) {
        self.put_key(field, TYP3_BYTE_LENGTH);
        self.put_uvarint(payload.len() as u64);
        self.buf.put_slice(payload);
    }

    pub fn bytes_field(&mut self, field: u32, value: &[u8]) {
        //! Byte string field, skipped when empty.
        if !value.is_empty() {
            self.put_length_delimited(field, value);
        }
    }

    pub fn string_field(&mut self, field: u32, value: &str) {
        //! String field, skipped when empty.
        self.bytes_field(field, value.as_bytes())
    }

    pub fn uvarint_field(&mut self, field: u32, value: u64) {
        //! Unsigned integer field, skipped when zero.
        if value != 0 {
            self.put_key(field, TYP3_VARINT);
            self.put_uvarint(value);
        }
    }

    pub fn varint_field(&mut self, field: u32, value: i64) {
        //! Signed integer field, skipped when zero.
        self.uvarint_field(field, value as u64)
    }

    pub fn bool_field(&mut self, field: u32, value: bool) {
        //! Boolean field, skipped when false.
        self.uvarint_field(field, u64::from(value))
    }

    pub fn repeated_bytes_field<'a, I>(&mut self, field: u32, items: I)
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        //! One length-delimited entry per element, empty elements included.
        for item in items {
            self.put_length_delimited(field, item);
        }
    }

    pub fn struct_field<T: AminoEncode + ?Sized>(
        &mut self,
        codec: &Codec,
        field: u32,
        value: &T,
    ) -> Result<(), BuildError> {
        //! Nested struct field, skipped when its body is empty.
        self.put_struct(codec, field, value, false)
    }

    fn put_struct<T: AminoEncode + ?Sized>(
        &mut self,
        codec: &Codec,
        field: u32,
        value: &T,
        always: bool,
    ) -> Result<(), BuildError> {
        let mut inner = Self::new();
        value.encode_amino(codec, &mut inner)?;
        if always || !inner.buf.is_empty() {
            self.put_length_delimited(field, &inner.buf);
        }
        Ok(())
    }

    pub fn repeated_struct_field<'a, T, I>(
        &mut self,
        codec: &Codec,
        field: u32,
        items: I,
    ) -> Result<(), BuildError>
    where
        T: AminoEncode + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        //! One length-delimited entry per element, empty elements included.
        for item in items {
            self.put_struct(codec, field, item, true)?;
        }
        Ok(())
    }

    pub fn interface_field(&mut self, field: u32, prefix: [u8; 4], body: &[u8]) {
        //! Registered concrete value stored in an interface slot.
        let mut payload = Vec::with_capacity(prefix.len() + body.len());
        payload.extend_from_slice(&prefix);
        payload.extend_from_slice(body);
        self.put_length_delimited(field, &payload);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_uvarint() {
        let cases: [(u64, &[u8]); 5] = [
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
        ];
        for (value, expected) in cases {
            let mut w = AminoWriter::new();
            w.put_uvarint(value);
            assert_eq!(w.as_slice(), expected, "{value}");
        }
    }

    #[test]
    fn test_skips_defaults() {
        let mut w = AminoWriter::new();
        w.string_field(1, "");
        w.uvarint_field(2, 0);
        w.bool_field(3, false);
        w.bytes_field(4, &[]);
        assert!(w.as_slice().is_empty());

        w.string_field(1, "ok");
        w.uvarint_field(2, 5);
        w.bool_field(3, true);
        assert_eq!(w.as_slice(), &[0x0a, 0x02, b'o', b'k', 0x10, 0x05, 0x18, 0x01]);
    }

    #[test]
    fn test_negative_varint_is_twos_complement() {
        let mut w = AminoWriter::new();
        w.varint_field(1, -1);
        assert_eq!(
            w.as_slice(),
            &[0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    struct Pair(u64);

    impl AminoEncode for Pair {
        fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
            out.uvarint_field(1, self.0);
            Ok(())
        }
    }

    #[test]
    fn test_empty_struct_field_is_omitted() {
        let codec = Codec::new();
        let mut w = AminoWriter::new();
        w.struct_field(&codec, 2, &Pair(0)).unwrap();
        assert!(w.as_slice().is_empty());

        w.struct_field(&codec, 2, &Pair(3)).unwrap();
        assert_eq!(w.as_slice(), &[0x12, 0x02, 0x08, 0x03]);
    }

    #[test]
    fn test_empty_list_elements_are_kept() {
        let codec = Codec::new();
        let mut w = AminoWriter::new();
        w.repeated_struct_field(&codec, 1, [Pair(0), Pair(1)].iter())
            .unwrap();
        assert_eq!(w.as_slice(), &[0x0a, 0x00, 0x0a, 0x02, 0x08, 0x01]);
    }

    #[test]
    fn test_interface_field() {
        let mut w = AminoWriter::new();
        w.interface_field(1, [0xde, 0xad, 0xbe, 0xef], &[0x01]);
        assert_eq!(w.as_slice(), &[0x0a, 0x05, 0xde, 0xad, 0xbe, 0xef, 0x01]);
    }
}
