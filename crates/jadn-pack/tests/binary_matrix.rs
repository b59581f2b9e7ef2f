use jadn_pack::{BinaryReader, BinaryWriter, Mapping, ReadError, Value};
use proptest::prelude::*;

fn any_bytes(v: &Value) -> Vec<u8> {
    let mut w = BinaryWriter::new();
    w.any(v);
    w.into_bytes()
}

#[test]
fn binary_writer_wire_matrix() {
    let mut w = BinaryWriter::new();
    w.bool(true);
    w.zigzag(42);
    w.zigzag(-1);
    w.bytes(&[1, 2, 3, 4]);
    w.str("hello");
    assert_eq!(
        w.into_bytes(),
        vec![1, 84, 1, 4, 1, 2, 3, 4, 5, b'h', b'e', b'l', b'l', b'o']
    );

    let mut w = BinaryWriter::new();
    w.varint(300);
    assert_eq!(w.as_slice(), &[0xac, 0x02]);

    let mut w = BinaryWriter::new();
    w.f64(1.0);
    assert_eq!(w.as_slice(), &1.0f64.to_le_bytes());
}

#[test]
fn binary_any_marker_matrix() {
    assert_eq!(any_bytes(&Value::Null), vec![0x00]);
    assert_eq!(any_bytes(&Value::Bool(false)), vec![0x01]);
    assert_eq!(any_bytes(&Value::Bool(true)), vec![0x02]);
    assert_eq!(any_bytes(&Value::Int(-2)), vec![0x03, 0x03]);
    assert_eq!(any_bytes(&Value::from("a")), vec![0x05, 0x01, b'a']);
    assert_eq!(any_bytes(&Value::Bytes(vec![9])), vec![0x06, 0x01, 9]);
    assert_eq!(
        any_bytes(&Value::Sequence(vec![Value::Null])),
        vec![0x07, 0x01, 0x00]
    );
    let m: Mapping = [(Value::Int(1), Value::Bool(true))].into_iter().collect();
    assert_eq!(
        any_bytes(&Value::Mapping(m)),
        vec![0x08, 0x01, 0x03, 0x02, 0x02]
    );
}

#[test]
fn binary_reader_error_matrix() {
    assert_eq!(
        BinaryReader::new(&[]).u8(),
        Err(ReadError::EndOfInput { offset: 0 })
    );
    assert_eq!(
        BinaryReader::new(&[7]).bool(),
        Err(ReadError::InvalidBool { byte: 7, offset: 0 })
    );
    assert_eq!(
        BinaryReader::new(&[0x02, 0xff, 0xfe]).str(),
        Err(ReadError::InvalidUtf8 { offset: 0 })
    );
    assert_eq!(
        BinaryReader::new(&[0x2a]).any(8),
        Err(ReadError::UnknownMarker {
            marker: 0x2a,
            offset: 0
        })
    );
    // A huge declared length must fail before anything is allocated.
    let mut w = BinaryWriter::new();
    w.u8(0x07);
    w.varint(u64::MAX);
    let bytes = w.into_bytes();
    assert!(matches!(
        BinaryReader::new(&bytes).any(8),
        Err(ReadError::EndOfInput { .. })
    ));
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9).prop_map(Value::Real),
        "[a-z]{0,8}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            proptest::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(|entries| {
                Value::Mapping(
                    entries
                        .into_iter()
                        .map(|(k, v)| (Value::Text(k), v))
                        .collect(),
                )
            }),
        ]
    })
}

proptest! {
    #[test]
    fn any_round_trips(v in arb_value()) {
        let bytes = any_bytes(&v);
        let mut r = BinaryReader::new(&bytes);
        prop_assert_eq!(r.any(16).unwrap(), v);
        prop_assert!(r.finish().is_ok());
    }

    #[test]
    fn truncated_any_never_yields_a_value(v in arb_value()) {
        let bytes = any_bytes(&v);
        for cut in 0..bytes.len() {
            let mut r = BinaryReader::new(&bytes[..cut]);
            let complete = r.any(16).is_ok() && r.finish().is_ok();
            prop_assert!(!complete);
        }
    }
}
