use ciborium::value::Value;
use pretty_assertions::assert_eq;

use crate::{Compiler, Options};

fn compile(text: &str) -> Vec<u8> {
    Compiler::new(Options::default())
        .compile(text, "[test]")
        .unwrap()
}

fn decode(bytes: &[u8]) -> Value {
    ciborium::de::from_reader(bytes).unwrap()
}

fn map_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let Value::Map(entries) = value else {
        panic!("expected map, got {value:?}");
    };
    entries
        .iter()
        .find(|(k, _)| matches!(k, Value::Text(t) if t == key))
        .map(|(_, v)| v)
}

fn exprs(doc: &Value) -> &[Value] {
    match map_get(doc, "exprs") {
        Some(Value::Array(items)) => items,
        other => panic!("bad exprs entry: {other:?}"),
    }
}

#[test]
fn document_framing() {
    let doc = decode(&compile(": Byte[_rem]"));
    assert_eq!(exprs(&doc).len(), 1);
    assert!(map_get(&doc, "src").is_none());
}

#[test]
fn source_locations_embed_the_source() {
    let text = "len : UInt32LE\n: Byte[len]\n";
    let bytes = Compiler::new(Options::default().with_source_locations(true))
        .compile(text, "[test]")
        .unwrap();
    let doc = decode(&bytes);
    assert_eq!(map_get(&doc, "src"), Some(&Value::Text(text.to_string())));

    // Every serialized node carries a "dbg" byte range.
    let first = &exprs(&doc)[0];
    let loc = map_get(map_get(first, "dbg").unwrap(), "loc").unwrap();
    let Value::Array(range) = loc else {
        panic!("bad dbg loc entry: {loc:?}");
    };
    assert_eq!(range.len(), 2);
}

#[test]
fn one_item_per_statement() {
    let doc = decode(&compile("two = 2;\nexpect 2 + two == 4;"));
    let items = exprs(&doc);
    assert_eq!(items.len(), 2);
    assert!(map_get(&items[0], "assign").is_some());
    assert!(map_get(&items[1], "expect").is_some());
}

#[test]
fn builtin_fields_serialize_as_atoms() {
    let doc = decode(&compile("Byte"));
    let send = map_get(&exprs(&doc)[0], "send").unwrap();
    let Value::Array(args) = send else {
        panic!("bad send args: {send:?}");
    };
    assert_eq!(map_get(&args[0], "atom"), Some(&Value::Text("byte".to_string())));
    assert!(map_get(&args[1], "dest").is_some());
}

#[test]
fn output_is_deterministic() {
    let text = "width = 4;\nRow = Byte[width];\n: Row[_rem / width]";
    assert_eq!(compile(text), compile(text));
}

#[test]
fn whitespace_and_comments_do_not_change_output() {
    let plain = compile("two = 2\nexpect two * 2 == 4");
    let noisy = compile("# leading comment\n\ntwo   =  2   # trailing\n\n\nexpect two * 2 == 4\n");
    assert_eq!(plain, noisy);
}

#[test]
fn star_catalog_description_compiles() {
    let text = "\
HeaderInt = UInt32LE

Header = {
    STAR0: HeaderInt
    STARN: HeaderInt  # Number of stars in file
    NBENT: HeaderInt  # Number of bytes per star entry
}

Row = {
    SRA0 : Float64LE  # Right ascension in degrees
    SDEC0: Float64LE  # Declination in degrees
    IS   : Byte[2]    # Instrument status flags
    MAG  : UInt16LE   # Magnitude * 100
}

header: Header
expect header.NBENT == sizeof Row
data: Row[header.STARN]
";
    let doc = decode(&compile(text));
    assert_eq!(exprs(&doc).len(), 6);
}

#[test]
fn compile_errors_propagate() {
    let err = Compiler::new(Options::default())
        .compile("= foo;", "[test]")
        .unwrap_err();
    assert!(err.message().contains("left-hand argument"));
    assert!(err.render().contains("[test]"));
}

#[test]
fn nothing_is_produced_for_unclosed_lists() {
    let err = Compiler::new(Options::default())
        .compile("Row = {\n  x : UInt8\n", "[test]")
        .unwrap_err();
    assert!(err.message().contains("closing token"));
}
