//! Integration tests for interface implementation search

use tyscope_analyzer::{Analyzer, AnalyzerConfig, SelectorId, TypeIdx};
use tyscope_types::{BasicKind, FieldDef, MethodDef, ProgramBuilder, RawType};

fn analyze_with(b: ProgramBuilder, config: AnalyzerConfig) -> Analyzer {
    let mut analyzer = Analyzer::new(b.build(), config);
    analyzer.analyze().unwrap();
    analyzer
}

fn analyze(b: ProgramBuilder) -> Analyzer {
    analyze_with(b, AnalyzerConfig::default())
}

fn idx(analyzer: &Analyzer, raw: RawType) -> TypeIdx {
    analyzer.lookup_type(raw).expect("type registered")
}

fn sorted(mut types: Vec<TypeIdx>) -> Vec<TypeIdx> {
    types.sort();
    types
}

/// Method-set inclusion, straight from the collected selector lists.
fn naive_implements(analyzer: &Analyzer, t: TypeIdx, interface: TypeIdx) -> bool {
    let registry = analyzer.registry();
    let own = &registry.get(t).unwrap().all_methods;
    registry
        .get(interface)
        .unwrap()
        .all_methods
        .iter()
        .all(|m| own.iter().any(|o| o.id == m.id && o.ty() == m.ty()))
}

struct Fmt {
    builder: ProgramBuilder,
    stringer: RawType,
    value: RawType,
    value_ptr: RawType,
    buf: RawType,
    buf_ptr: RawType,
}

/// `Stringer`, value-receiver `Value` and pointer-receiver `Buf`.
fn fmt_program() -> Fmt {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/fmt");
    let string = b.basic(BasicKind::String);
    let int = b.basic(BasicKind::Int);
    let string_sig = b.signature(vec![], vec![string], false);

    let stringer = b.declare_type(p, "Stringer");
    b.define_interface(stringer, vec![MethodDef::new("String", string_sig)], vec![])
        .unwrap();
    let value = b.declare_type(p, "Value");
    b.define_type(value, int).unwrap();
    b.method(value, false, "String", string_sig);
    let buf = b.declare_type(p, "Buf");
    b.define_struct(buf, vec![]).unwrap();
    b.method(buf, true, "String", string_sig);

    let value_ptr = b.pointer_to(value);
    let buf_ptr = b.pointer_to(buf);
    Fmt {
        builder: b,
        stringer,
        value,
        value_ptr,
        buf,
        buf_ptr,
    }
}

#[test]
fn test_value_and_pointer_receivers() {
    let f = fmt_program();
    let (stringer, value, value_ptr, buf, buf_ptr) = (f.stringer, f.value, f.value_ptr, f.buf, f.buf_ptr);
    let analyzer = analyze(f.builder);
    let stringer = idx(&analyzer, stringer);
    let (value, value_ptr) = (idx(&analyzer, value), idx(&analyzer, value_ptr));
    let (buf, buf_ptr) = (idx(&analyzer, buf), idx(&analyzer, buf_ptr));

    // *Value is implied by Value
    assert_eq!(sorted(analyzer.implementers_of(stringer)), sorted(vec![value, buf_ptr]));

    assert!(analyzer.implements_interface(value, stringer));
    assert!(analyzer.implements_interface(value_ptr, stringer));
    assert!(analyzer.implements_interface(buf_ptr, stringer));
    assert!(!analyzer.implements_interface(buf, stringer));
    assert!(!analyzer.implements_interface(stringer, stringer));

    let string_id = SelectorId::new("String", None);
    assert_eq!(analyzer.interface_methods_implemented_by(value, &string_id), [stringer]);
    assert_eq!(analyzer.interface_methods_implemented_by(buf_ptr, &string_id), [stringer]);
    assert!(analyzer.interface_methods_implemented_by(buf, &string_id).is_empty());
}

#[test]
fn test_named_interfaces_share_implementers_with_their_literal() {
    let mut f = fmt_program();
    let b = &mut f.builder;
    let p = b.package("example.com/fmt");
    let string = b.basic(BasicKind::String);
    let string_sig = b.signature(vec![], vec![string], false);
    let literal = b.interface_type(p, vec![MethodDef::new("String", string_sig)], vec![]);
    b.var(p, "anything", literal);
    let (stringer, value) = (f.stringer, f.value);
    let analyzer = analyze(f.builder);

    let stringer = idx(&analyzer, stringer);
    let literal = idx(&analyzer, literal);
    let value = idx(&analyzer, value);
    assert_eq!(analyzer.type_info(stringer).unwrap().underlying, literal);
    assert_eq!(
        sorted(analyzer.implementers_of(literal)),
        sorted(analyzer.implementers_of(stringer))
    );

    // the named face is recorded, not the literal
    let implements = &analyzer.type_info(value).unwrap().implements;
    assert_eq!(implements.len(), 1);
    assert_eq!(implements[0].interface, stringer);
    assert!(analyzer.implements_interface(value, literal));
}

#[test]
fn test_builtin_error_interface() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/errs");
    let string = b.basic(BasicKind::String);
    let sig = b.signature(vec![], vec![string], false);
    let not_found = b.declare_type(p, "NotFound");
    b.define_struct(not_found, vec![FieldDef::named("Key", string)]).unwrap();
    b.method(not_found, false, "Error", sig);
    let error = b.error_type();
    let analyzer = analyze(b);

    let error = idx(&analyzer, error);
    let not_found = idx(&analyzer, not_found);
    assert!(analyzer.implementers_of(error).contains(&not_found));
    assert!(analyzer.implements_interface(not_found, error));
}

#[test]
fn test_signatures_must_match_exactly() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/log");
    let string = b.basic(BasicKind::String);
    let int = b.basic(BasicKind::Int);
    let strings = b.slice_of(string);
    let variadic = b.signature(vec![strings], vec![], true);
    let sliced = b.signature(vec![strings], vec![], false);
    let count_sig = b.signature(vec![], vec![int], false);
    let wrong_count = b.signature(vec![], vec![string], false);

    let logger = b.declare_type(p, "Logger");
    b.define_interface(
        logger,
        vec![MethodDef::new("Log", variadic), MethodDef::new("Count", count_sig)],
        vec![],
    )
    .unwrap();
    let good = b.declare_type(p, "Good");
    b.method(good, false, "Log", variadic);
    b.method(good, false, "Count", count_sig);
    let slice_param = b.declare_type(p, "SliceParam");
    b.method(slice_param, false, "Log", sliced);
    b.method(slice_param, false, "Count", count_sig);
    let bad_result = b.declare_type(p, "BadResult");
    b.method(bad_result, false, "Log", variadic);
    b.method(bad_result, false, "Count", wrong_count);
    let partial = b.declare_type(p, "Partial");
    b.method(partial, false, "Log", variadic);
    let analyzer = analyze(b);

    let logger = idx(&analyzer, logger);
    assert_eq!(analyzer.implementers_of(logger), [idx(&analyzer, good)]);
    for t in [slice_param, bad_result, partial] {
        assert!(!analyzer.implements_interface(idx(&analyzer, t), logger));
    }
}

#[test]
fn test_unexported_methods_match_within_their_package_only() {
    let mut b = ProgramBuilder::new();
    let a = b.package("example.com/a");
    let sig = b.signature(vec![], vec![], false);
    let closer = b.declare_type(a, "closer");
    b.define_interface(closer, vec![MethodDef::new("close", sig)], vec![])
        .unwrap();
    let local = b.declare_type(a, "local");
    b.method(local, false, "close", sig);

    let other = b.package("example.com/other");
    b.depend(other, "example.com/a");
    let foreign = b.declare_type(other, "Foreign");
    b.method(foreign, false, "close", sig);
    let analyzer = analyze(b);

    let closer = idx(&analyzer, closer);
    assert!(analyzer.implements_interface(idx(&analyzer, local), closer));
    assert!(!analyzer.implements_interface(idx(&analyzer, foreign), closer));
}

#[test]
fn test_promoted_methods_count() {
    let mut f = fmt_program();
    let b = &mut f.builder;
    let p = b.package("example.com/fmt");
    let buf_ptr = f.buf_ptr;
    let by_pointer = b.declare_type(p, "ByPointer");
    b.define_struct(by_pointer, vec![FieldDef::embedded(buf_ptr)]).unwrap();
    let by_value = b.declare_type(p, "ByValue");
    b.define_struct(by_value, vec![FieldDef::embedded(f.buf)]).unwrap();
    let by_value_ptr = b.pointer_to(by_value);
    let stringer = f.stringer;
    let analyzer = analyze(f.builder);

    let stringer = idx(&analyzer, stringer);
    assert!(analyzer.implements_interface(idx(&analyzer, by_pointer), stringer));
    assert!(!analyzer.implements_interface(idx(&analyzer, by_value), stringer));
    assert!(analyzer.implements_interface(idx(&analyzer, by_value_ptr), stringer));
}

#[test]
fn test_empty_interface_is_implemented_by_everything() {
    let f = fmt_program();
    let mut b = f.builder;
    let any = b.universe().empty_interface();
    let (stringer, value) = (f.stringer, f.value);
    let analyzer = analyze(b);

    let any = idx(&analyzer, any);
    let stringer = idx(&analyzer, stringer);
    let value = idx(&analyzer, value);
    let implementers = analyzer.implementers_of(any);
    assert!(implementers.contains(&value));
    assert!(!implementers.contains(&stringer));
    assert!(implementers
        .iter()
        .all(|&t| !analyzer.registry().is_interface(t)));
    assert!(analyzer.implements_interface(value, any));
    // interfaces implement it too, though only concrete types are listed
    assert!(analyzer.implements_interface(stringer, any));
    assert!(!analyzer.implements_interface(any, any));
    // nothing is materialized for it
    assert!(analyzer.type_info(any).unwrap().implemented_by.is_empty());
}

#[test]
fn test_interfaces_implement_the_interfaces_they_embed() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/io");
    let int = b.basic(BasicKind::Int);
    let error = b.error_type();
    let io_sig = b.signature(vec![int], vec![int, error], false);
    let reader = b.declare_type(p, "Reader");
    b.define_interface(reader, vec![MethodDef::new("Read", io_sig)], vec![])
        .unwrap();
    let writer = b.declare_type(p, "Writer");
    b.define_interface(writer, vec![MethodDef::new("Write", io_sig)], vec![])
        .unwrap();
    let read_writer = b.declare_type(p, "ReadWriter");
    let body = b.define_interface(read_writer, vec![], vec![reader, writer]).unwrap();
    let file = b.declare_type(p, "File");
    b.method(file, true, "Read", io_sig);
    b.method(file, true, "Write", io_sig);
    let file_ptr = b.pointer_to(file);
    let analyzer = analyze(b);

    let reader = idx(&analyzer, reader);
    let writer = idx(&analyzer, writer);
    let read_writer = idx(&analyzer, read_writer);
    let body = idx(&analyzer, body);
    assert!(analyzer.implements_interface(read_writer, reader));
    assert!(analyzer.implements_interface(read_writer, writer));
    assert!(analyzer.implements_interface(body, reader));
    assert!(!analyzer.implements_interface(reader, read_writer));
    assert!(!analyzer.implements_interface(read_writer, read_writer));

    // the named interface mirrors its underlying
    let info = analyzer.type_info(read_writer).unwrap();
    let interfaces: Vec<TypeIdx> = info.implements.iter().map(|imp| imp.interface).collect();
    assert_eq!(sorted(interfaces), sorted(vec![reader, writer]));
    assert!(info.implements.iter().all(|imp| imp.impler == read_writer));
    assert_eq!(info.direct_selectors, analyzer.type_info(body).unwrap().direct_selectors);
    assert_eq!(info.direct_selectors.len(), 2);

    // implementer lists stay concrete
    assert_eq!(analyzer.implementers_of(reader), [idx(&analyzer, file_ptr)]);
    assert!(analyzer.type_info(reader).unwrap().interface_methods.is_empty());
    assert!(analyzer.type_info(read_writer).unwrap().interface_methods.is_empty());
}

#[test]
fn test_unnamed_only_interfaces_follow_config() {
    let build = || {
        let mut b = ProgramBuilder::new();
        let p = b.package("example.com/res");
        let error = b.error_type();
        let sig = b.signature(vec![], vec![error], false);
        let literal = b.interface_type(p, vec![MethodDef::new("Release", sig)], vec![]);
        b.var(p, "pending", literal);
        let handle = b.declare_type(p, "Handle");
        b.method(handle, false, "Release", sig);
        (b, literal, handle)
    };

    let (b, literal, handle) = build();
    let analyzer = analyze(b);
    let (literal_idx, handle_idx) = (idx(&analyzer, literal), idx(&analyzer, handle));
    let implements = &analyzer.type_info(handle_idx).unwrap().implements;
    assert_eq!(implements.len(), 1);
    assert_eq!(implements[0].interface, literal_idx);

    let (b, literal, handle) = build();
    let config = AnalyzerConfig {
        record_unnamed_interface_implementations: false,
        ..AnalyzerConfig::default()
    };
    let analyzer = analyze_with(b, config);
    let (literal_idx, handle_idx) = (idx(&analyzer, literal), idx(&analyzer, handle));
    assert!(analyzer.type_info(handle_idx).unwrap().implements.is_empty());
    assert_eq!(analyzer.implementers_of(literal_idx), [handle_idx]);
}

#[test]
fn test_generic_instance_implements_interface() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/coll");
    let int = b.basic(BasicKind::Int);
    let any = b.universe().empty_interface();
    let len_sig = b.signature(vec![], vec![int], false);
    let lener = b.declare_type(p, "Lener");
    b.define_interface(lener, vec![MethodDef::new("Len", len_sig)], vec![])
        .unwrap();
    let (set, params) = b.declare_generic_type(p, "Set", &[("K", any)]);
    let bool_ty = b.basic(BasicKind::Bool);
    let members = b.universe().map_of(params[0], bool_ty);
    b.define_struct(set, vec![FieldDef::named("members", members)]).unwrap();
    b.method(set, true, "Len", len_sig);
    let set_int = b.instantiate(set, vec![int]).unwrap();
    let set_int_ptr = b.pointer_to(set_int);
    b.var(p, "ids", set_int);
    let analyzer = analyze(b);

    let lener = idx(&analyzer, lener);
    assert!(analyzer.implements_interface(idx(&analyzer, set_int_ptr), lener));
    assert!(!analyzer.implements_interface(idx(&analyzer, set_int), lener));
}

#[test]
fn test_search_agrees_with_method_set_inclusion() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/zoo");
    let string = b.basic(BasicKind::String);
    let int = b.basic(BasicKind::Int);
    let error = b.error_type();
    let name_sig = b.signature(vec![], vec![string], false);
    let feed_sig = b.signature(vec![int], vec![error], false);
    let legs_sig = b.signature(vec![], vec![int], false);

    let named = b.declare_type(p, "Named");
    b.define_interface(named, vec![MethodDef::new("Name", name_sig)], vec![])
        .unwrap();
    let feeder = b.declare_type(p, "Feeder");
    b.define_interface(feeder, vec![MethodDef::new("Feed", feed_sig)], vec![])
        .unwrap();
    let animal = b.declare_type(p, "Animal");
    b.define_interface(animal, vec![MethodDef::new("Legs", legs_sig)], vec![named, feeder])
        .unwrap();

    let cat = b.declare_type(p, "Cat");
    b.method(cat, false, "Name", name_sig);
    b.method(cat, true, "Feed", feed_sig);
    b.method(cat, false, "Legs", legs_sig);
    let bird = b.declare_type(p, "Bird");
    b.method(bird, false, "Name", name_sig);
    b.method(bird, false, "Feed", feed_sig);
    let pet = b.declare_type(p, "Pet");
    b.define_struct(pet, vec![FieldDef::embedded(cat), FieldDef::named("Owner", string)])
        .unwrap();
    let cat_ptr = b.pointer_to(cat);
    let wild = b.declare_type(p, "Wild");
    b.define_struct(wild, vec![FieldDef::embedded(cat_ptr)]).unwrap();
    let flock = b.declare_type(p, "Flock");
    b.define_struct(flock, vec![FieldDef::embedded(bird), FieldDef::embedded(cat)])
        .unwrap();
    let anon = b.struct_type(p, vec![FieldDef::embedded(bird)]);
    b.var(p, "stray", anon);
    let tag = b.declare_type(p, "Tag");
    b.define_type(tag, string).unwrap();
    b.method(tag, false, "Name", name_sig);
    let analyzer = analyze(b);

    let registry = analyzer.registry();
    let interfaces: Vec<TypeIdx> = registry
        .indices()
        .filter(|&i| registry.is_interface(i))
        .collect();
    let mut positives = 0;
    for t in registry.indices().filter(|&i| !registry.is_interface(i)) {
        for &interface in &interfaces {
            let expected = naive_implements(&analyzer, t, interface);
            assert_eq!(
                analyzer.implements_interface(t, interface),
                expected,
                "{} implements {}",
                analyzer.type_display(t),
                analyzer.type_display(interface)
            );
            if expected && !analyzer.type_info(interface).unwrap().all_methods.is_empty() {
                positives += 1;
            }
        }
    }
    assert!(positives > 10);

    // Flock gets Name from both Bird and Cat at depth 1, so it has none
    let flock = idx(&analyzer, flock);
    assert!(!analyzer.implements_interface(flock, idx(&analyzer, named)));
}
