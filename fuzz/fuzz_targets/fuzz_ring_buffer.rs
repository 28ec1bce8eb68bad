//! Fuzz target: `RingBuffer`
//!
//! Interprets the input as a capacity byte followed by an op stream and
//! checks against a `VecDeque` model:
//! - No panics for any op sequence or capacity
//! - Accepted bytes come out in FIFO order
//! - Rejected transfers leave `len` unchanged
//!
//! cargo fuzz run fuzz_ring_buffer

#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use thermolog::ring_buffer::RingBuffer;

fuzz_target!(|data: &[u8]| {
    let Some((&cap, ops)) = data.split_first() else {
        return;
    };

    let mut mem = vec![0u8; cap as usize];
    let Ok(mut buf) = RingBuffer::new(&mut mem) else {
        assert!(cap < 2, "capacity {cap} rejected");
        return;
    };
    let mut model = VecDeque::new();

    // Each op: tag byte, size byte, then `size` payload bytes for writes.
    let mut i = 0;
    while i + 1 < ops.len() {
        let (tag, size) = (ops[i], ops[i + 1] as usize % 40);
        i += 2;
        let before = buf.len();

        match tag % 3 {
            0 => {
                let payload = &ops[i..(i + size).min(ops.len())];
                i += payload.len();
                if buf.write(payload).is_ok() {
                    model.extend(payload);
                } else {
                    assert_eq!(buf.len(), before);
                }
            }
            1 => {
                let mut out = vec![0u8; size];
                if buf.read(&mut out).is_ok() {
                    let expected: Vec<u8> = model.drain(..size).collect();
                    assert_eq!(out, expected);
                } else {
                    assert_eq!(buf.len(), before);
                }
            }
            _ => {
                buf.init();
                model.clear();
            }
        }

        assert_eq!(buf.len(), model.len());
        assert!(buf.len() <= buf.capacity());
    }
});
