//! End-to-end scenarios from the format's test matrix: ChunkedBytes
//! re-chunking equivalence, incremental suspension/resume, and the
//! ADB-like / length-prefixed / switch-with-stop wire formats.

use binspec::{
    chunked_bytes::ChunkedBytes, compile_default, encode, value::DecodedValue, Endian,
    IncrementalParser, IntSpec, Partial, Spec,
};

fn chunks(slices: &[&[u8]]) -> ChunkedBytes {
    let mut c = ChunkedBytes::new();
    for s in slices {
        c.append_slice(s);
    }
    c
}

#[test]
fn s1_chunked_bytes_equality_across_rechunkings() {
    let whole: Vec<u8> = (1..=16).collect();

    let a = chunks(&[&[1, 2, 3, 4, 5], &[6, 7], &[8], &[9, 10], &whole[10..16]]);
    let b = chunks(&[&[1, 2, 3, 4], &[5, 6, 7], &whole[7..16]]);
    let c = chunks(&[&whole]);

    assert_eq!(a, b);
    assert_eq!(b, c);

    let mut d = chunks(&[&whole]);
    d.append_slice(&[17]);
    assert_ne!(a, d);
}

#[test]
fn s2_prefix_extraction() {
    let whole: Vec<u8> = (1..=16).collect();
    let mut buf = chunks(&[&whole[0..5], &[6, 7], &[8], &[9, 10], &whole[10..16]]);

    let p1 = buf.split_prefix(4).unwrap();
    assert_eq!(p1, chunks(&[&whole[0..4]]));

    let p2 = buf.split_prefix(1).unwrap();
    assert_eq!(p2, chunks(&[&whole[4..5]]));

    let p3 = buf.split_prefix(4).unwrap();
    assert_eq!(p3, chunks(&[&whole[5..9]]));

    let p4 = buf.split_prefix(7).unwrap();
    assert_eq!(p4, chunks(&[&whole[9..16]]));

    assert!(buf.is_empty());
    assert!(buf.split_prefix(4).is_err());
}

#[test]
fn s3_underflow_preserves_buffer() {
    let mut buf = chunks(&[&[1, 2, 3], &[4, 5, 6]]);

    assert_eq!(buf.split_prefix(20).unwrap_err().0, 14);
    assert_eq!(buf.len(), 6);

    let p = buf.split_prefix(4).unwrap();
    assert_eq!(p, chunks(&[&[1, 2, 3, 4]]));
    assert_eq!(buf, chunks(&[&[5, 6]]));

    assert_eq!(buf.split_prefix(4).unwrap_err().0, 2);
    assert_eq!(buf, chunks(&[&[5, 6]]));
}

#[test]
fn s4_adb_like_frame_round_trips_and_binds_length() {
    let spec = compile_default("<3I%I2Is").unwrap();

    let payload = vec![0xAAu8; 5];
    let value = DecodedValue::Seq(vec![
        DecodedValue::Seq(vec![
            DecodedValue::Integer(1),
            DecodedValue::Integer(2),
            DecodedValue::Integer(3),
        ]),
        DecodedValue::Integer(payload.len() as u64),
        DecodedValue::Seq(vec![DecodedValue::Integer(4), DecodedValue::Integer(5)]),
        DecodedValue::Bytes(ChunkedBytes::from(payload.clone())),
    ]);

    let wire = encode(&spec, &value);
    assert_eq!(wire.len(), 24 + payload.len());

    let mut parser = IncrementalParser::new(spec);
    parser.supply(&wire.to_vec());
    assert_eq!(parser.next(), Partial::Value(value));
    assert!(parser.remaining().is_empty());
}

#[test]
fn s5_big_endian_length_prefixed_block() {
    let spec = compile_default(">%TBBIs").unwrap();

    let mut parser = IncrementalParser::new(spec.clone());
    // 3-byte length = 4, two bytes, a u32, and only 2 of the 4 declared
    // payload bytes so far.
    parser.supply(&[0x00, 0x00, 0x04, 0xAA, 0xBB, 0x00, 0x00, 0x00, 0x01, 0x11, 0x22]);
    assert_eq!(parser.next(), Partial::Incomplete(2));

    parser.supply(&[0x33, 0x44]);
    let v = match parser.next() {
        Partial::Value(v) => v,
        other => panic!("expected value, got {other:?}"),
    };
    let seq = v.as_seq();
    assert_eq!(seq[0].as_integer(), 4);
    assert_eq!(seq[1].as_integer(), 0xAA);
    assert_eq!(seq[2].as_integer(), 0xBB);
    assert_eq!(seq[3].as_integer(), 1);
    assert_eq!(seq[4].as_bytes().to_vec(), vec![0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn s6_switch_with_stop_default() {
    let spec = Spec::Seq(vec![
        Spec::variable(IntSpec::new(1, Endian::Big), "sel"),
        Spec::switch(
            "sel",
            vec![
                (1, Spec::Integer(IntSpec::new(2, Endian::Big))),
                (2, Spec::Skip(4)),
            ],
            Spec::Stop,
        ),
    ]);

    let mut matched = IncrementalParser::new(spec.clone());
    matched.supply(&[1, 0x00, 0x05]);
    assert_eq!(
        matched.next(),
        Partial::Value(DecodedValue::Seq(vec![
            DecodedValue::Integer(1),
            DecodedValue::Integer(5),
        ]))
    );

    let mut skipped = IncrementalParser::new(spec.clone());
    skipped.supply(&[2, 0, 0, 0, 0]);
    assert_eq!(
        skipped.next(),
        Partial::Value(DecodedValue::Seq(vec![
            DecodedValue::Integer(2),
            DecodedValue::Empty,
        ]))
    );

    let mut rejected = IncrementalParser::new(spec);
    rejected.supply(&[3]);
    let v = match rejected.next() {
        Partial::Value(v) => v,
        other => panic!("expected value, got {other:?}"),
    };
    assert!(v.is_stop());
}

#[test]
fn s6_switch_stop_absorbed_inside_until() {
    let case_spec = Spec::switch(
        "tag",
        vec![(1, Spec::Integer(IntSpec::new(2, Endian::Big)))],
        Spec::Stop,
    );
    let case_spec = Spec::Seq(vec![
        Spec::variable(IntSpec::new(1, Endian::Big), "tag"),
        case_spec,
    ]);
    let spec = Spec::Seq(vec![
        Spec::variable(IntSpec::new(1, Endian::Big), "len"),
        Spec::until("len", case_spec),
    ]);

    let mut parser = IncrementalParser::new(spec);
    // len = 5: one matching case (tag 1, u16 value, 3 bytes total), then
    // tag 3 -> Stop (1 byte), leaving 1 trailing byte silently discarded.
    parser.supply(&[5, 1, 0x00, 0x2A, 3, 0xFF]);

    let v = match parser.next() {
        Partial::Value(v) => v,
        other => panic!("expected value, got {other:?}"),
    };
    let results = v.as_seq()[1].as_seq();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_seq()[1].as_integer(), 0x2A);
    assert!(results[1].is_stop());
}

#[test]
fn incrementality_equivalence_across_chunk_splits() {
    let spec = compile_default("<3I%I2Is").unwrap();
    let payload = vec![7u8; 3];
    let value = DecodedValue::Seq(vec![
        DecodedValue::Seq(vec![
            DecodedValue::Integer(10),
            DecodedValue::Integer(20),
            DecodedValue::Integer(30),
        ]),
        DecodedValue::Integer(payload.len() as u64),
        DecodedValue::Seq(vec![DecodedValue::Integer(40), DecodedValue::Integer(50)]),
        DecodedValue::Bytes(ChunkedBytes::from(payload)),
    ]);
    let wire = encode(&spec, &value).to_vec();

    // Feed as a single chunk.
    let mut whole = IncrementalParser::new(spec.clone());
    whole.supply(&wire);
    let whole_result = whole.next();

    // Feed split across arbitrary chunk boundaries.
    let mut split = IncrementalParser::new(spec);
    let mut result = Partial::Incomplete(0);
    for byte in &wire {
        split.supply(std::slice::from_ref(byte));
        result = split.next();
        if !result.is_incomplete() {
            break;
        }
    }

    assert_eq!(whole_result, result);
    assert_eq!(whole.remaining(), split.remaining());
}

#[test]
fn idempotent_suspension_without_new_input() {
    let mut parser = IncrementalParser::new(Spec::Integer(IntSpec::new(4, Endian::Big)));
    parser.supply(&[1, 2]);
    assert_eq!(parser.next(), Partial::Incomplete(2));
    assert_eq!(parser.next(), Partial::Incomplete(2));
    assert_eq!(parser.next(), Partial::Incomplete(2));
}

#[test]
fn reset_semantics_consume_residual_buffer_once() {
    let spec = Spec::Integer(IntSpec::new(2, Endian::Big));
    let mut parser = IncrementalParser::new(spec);
    parser.supply(&[0x00, 0x01, 0x00, 0x02]);

    assert_eq!(parser.next(), Partial::Value(DecodedValue::Integer(1)));
    parser.reset();
    assert_eq!(parser.next(), Partial::Value(DecodedValue::Integer(2)));
    parser.reset();
    assert_eq!(parser.next(), Partial::Incomplete(2));
}

#[test]
fn boundary_int_spec_widths_one_and_eight() {
    let one = IntSpec::new(1, Endian::Big);
    assert_eq!(one.encode(0xFF).to_vec(), vec![0xFF]);

    let eight = IntSpec::new(8, Endian::Little);
    let v = u64::MAX - 1;
    let encoded = eight.encode(v);
    assert_eq!(encoded.len(), 8);
    assert_eq!(eight.decode(&encoded), v);
}
