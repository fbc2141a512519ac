#![no_main]

use arbitrary::Arbitrary;
use commonware_writer::{BufferWriter, Config, Endianness, Error};
use libfuzzer_sys::fuzz_target;

// Keep allocations small enough for the fuzzer to explore many sequences.
const MAX_INITIAL_CAPACITY: usize = 1 << 16;

#[derive(Arbitrary, Debug)]
enum Operation {
    WriteU8(u8),
    WriteI8(i8),
    WriteU16(u16),
    WriteI16(i16),
    WriteU32(u32),
    WriteI32(i32),
    WriteU64(u64),
    WriteI64(i64),
    WriteF32(f32),
    WriteF64(f64),
    WriteBool(bool),
    WriteString(Vec<u8>, Option<u8>),
    WriteStringRaw(Vec<u8>, Option<u8>),
    SetCursor(u16),
    ResetCursor,
    Shrink,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    initial_capacity: u16,
    big_endian: bool,
    operations: Vec<Operation>,
}

fn fuzz(input: FuzzInput) {
    let endianness = if input.big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    };
    let initial_capacity = (input.initial_capacity as usize).min(MAX_INITIAL_CAPACITY);
    let mut writer = BufferWriter::with_config(Config {
        initial_capacity,
        endianness,
        ..Default::default()
    });
    let mut shrunk = false;

    for op in input.operations {
        let size = writer.size();
        let cursor = writer.cursor();
        let (result, width) = match op {
            Operation::WriteU8(v) => (writer.write_u8(v), 1),
            Operation::WriteI8(v) => (writer.write_i8(v), 1),
            Operation::WriteU16(v) => (writer.write_u16(v), 2),
            Operation::WriteI16(v) => (writer.write_i16(v), 2),
            Operation::WriteU32(v) => (writer.write_u32(v), 4),
            Operation::WriteI32(v) => (writer.write_i32(v), 4),
            Operation::WriteU64(v) => (writer.write_u64(v), 8),
            Operation::WriteI64(v) => (writer.write_i64(v), 8),
            Operation::WriteF32(v) => (writer.write_f32(v), 4),
            Operation::WriteF64(v) => (writer.write_f64(v), 8),
            Operation::WriteBool(v) => (writer.write_bool(v), 1),
            Operation::WriteString(s, len) => {
                let len = len.map(usize::from);
                let expected = len.map_or(s.len(), |l| l.min(s.len()));
                let result = writer.write_string(&s, len);
                let bytes = writer.to_bytes();
                let prefix = &bytes[cursor..cursor + 4];
                let stored = match endianness {
                    Endianness::Little => u32::from_le_bytes(prefix.try_into().unwrap()),
                    Endianness::Big => u32::from_be_bytes(prefix.try_into().unwrap()),
                };
                assert_eq!(stored as usize, expected);
                assert_eq!(&bytes[cursor + 4..cursor + 4 + expected], &s[..expected]);
                (result, expected + 4)
            }
            Operation::WriteStringRaw(s, len) => {
                let len = len.map(usize::from);
                let expected = len.map_or(s.len(), |l| l.min(s.len()));
                let result = writer.write_string_raw(&s, len);
                assert_eq!(
                    &writer.to_bytes()[cursor..cursor + expected],
                    &s[..expected]
                );
                (result, expected)
            }
            Operation::SetCursor(position) => {
                let position = position as usize;
                match writer.set_cursor(position) {
                    Ok(()) => assert_eq!(writer.cursor(), position),
                    Err(Error::CursorOutOfRange(p, s)) => {
                        assert_eq!((p, s), (position, size));
                        assert!(position > size);
                        assert_eq!(writer.cursor(), cursor);
                    }
                    Err(e) => panic!("unexpected error: {e}"),
                }
                continue;
            }
            Operation::ResetCursor => {
                writer.reset_cursor();
                assert_eq!(writer.cursor(), 0);
                continue;
            }
            Operation::Shrink => {
                writer.shrink();
                shrunk = true;
                assert_eq!(writer.capacity(), size);
                assert_eq!(writer.cursor(), cursor);
                continue;
            }
        };

        // Writes never fail below the size limit
        result.expect("write failed");
        assert_eq!(writer.cursor(), cursor + width);
        assert_eq!(writer.size(), size.max(cursor + width));

        // Invariants
        assert!(writer.cursor() <= writer.size());
        assert!(writer.size() <= writer.capacity());
        assert_eq!(writer.buffer().len(), writer.capacity());
        if !shrunk && writer.capacity() > initial_capacity {
            assert!(writer.capacity().is_power_of_two());
        }
    }

    assert_eq!(writer.to_bytes().len(), writer.size());
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
