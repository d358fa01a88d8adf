//! Integration tests for selector collection and promotion

use tyscope_analyzer::{Analyzer, AnalyzerConfig, ConflictKind, EmbedMode, Selector, SelectorId, TypeInfo};
use tyscope_types::{BasicKind, FieldDef, MethodDef, ProgramBuilder, RawType, ToolchainInfo};

fn analyze(b: ProgramBuilder) -> Analyzer {
    let mut analyzer = Analyzer::new(b.build(), AnalyzerConfig::default());
    analyzer.analyze().unwrap();
    assert!(
        analyzer.check_failures().is_empty(),
        "check failures: {:?}",
        analyzer.check_failures()
    );
    analyzer
}

fn info(analyzer: &Analyzer, raw: RawType) -> &TypeInfo {
    let idx = analyzer.lookup_type(raw).expect("type registered");
    analyzer.type_info(idx).unwrap()
}

fn names(selectors: &[Selector]) -> Vec<&str> {
    selectors.iter().map(Selector::name).collect()
}

/// `Base{ID int}` with value method `Name` and pointer method `SetName`.
struct Shapes {
    builder: ProgramBuilder,
    base: RawType,
    outer: RawType,
    outer_ptr: RawType,
}

fn shapes() -> Shapes {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/shapes");
    let int = b.basic(BasicKind::Int);
    let string = b.basic(BasicKind::String);

    let base = b.declare_type(p, "Base");
    b.define_struct(base, vec![FieldDef::named("ID", int)]).unwrap();
    let name_sig = b.signature(vec![], vec![string], false);
    let set_sig = b.signature(vec![string], vec![], false);
    b.method(base, false, "Name", name_sig);
    b.method(base, true, "SetName", set_sig);

    let outer = b.declare_type(p, "Outer");
    b.define_struct(
        outer,
        vec![FieldDef::embedded(base), FieldDef::named("Extra", string)],
    )
    .unwrap();
    let outer_ptr = b.pointer_to(outer);

    Shapes {
        builder: b,
        base,
        outer,
        outer_ptr,
    }
}

#[test]
fn test_promotes_fields_and_methods_through_embedding() {
    let fixture = shapes();
    let (outer, outer_ptr, base) = (fixture.outer, fixture.outer_ptr, fixture.base);
    let analyzer = analyze(fixture.builder);

    let outer_info = info(&analyzer, outer);
    assert_eq!(names(&outer_info.all_fields), ["Base", "Extra", "ID"]);

    let id = outer_info.selector("ID").unwrap();
    assert_eq!(id.depth, 1);
    assert!(!id.indirect);
    let embedded = outer_info.selector("Base").unwrap().as_field().unwrap();
    assert_eq!(embedded.mode, EmbedMode::Direct);
    assert_eq!(embedded.ty, analyzer.lookup_type(base).unwrap());

    // SetName needs an addressable receiver
    assert_eq!(names(&outer_info.all_methods), ["Name"]);
    let ptr_info = info(&analyzer, outer_ptr);
    assert_eq!(names(&ptr_info.all_methods), ["Name", "SetName"]);
    assert_eq!(names(&ptr_info.all_fields), names(&outer_info.all_fields));
}

#[test]
fn test_pointer_embedding_brings_pointer_methods() {
    let mut fixture = shapes();
    let b = &mut fixture.builder;
    let p = b.package("example.com/shapes");
    let base_ptr = b.pointer_to(fixture.base);
    let holder = b.declare_type(p, "Holder");
    b.define_struct(holder, vec![FieldDef::embedded(base_ptr)]).unwrap();
    let analyzer = analyze(fixture.builder);

    let holder_info = info(&analyzer, holder);
    assert_eq!(names(&holder_info.all_methods), ["Name", "SetName"]);
    let set_name = holder_info.selector("SetName").unwrap();
    assert!(set_name.indirect);
    assert!(!set_name.pointer_receiver_only());
    let embedded = holder_info.selector("Base").unwrap().as_field().unwrap();
    assert_eq!(embedded.mode, EmbedMode::Indirect);
}

#[test]
fn test_chain_lists_embedded_fields_outermost_first() {
    let mut fixture = shapes();
    let b = &mut fixture.builder;
    let p = b.package("example.com/shapes");
    let deep = b.declare_type(p, "Deep");
    b.define_struct(deep, vec![FieldDef::embedded(fixture.outer)]).unwrap();
    let analyzer = analyze(fixture.builder);

    let deep_info = info(&analyzer, deep);
    let id = deep_info.selector("ID").unwrap();
    assert_eq!(id.depth, 2);
    let chain: Vec<&str> = analyzer
        .selector_chain(id)
        .into_iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(chain, ["Outer", "Base"]);

    let outer = deep_info.selector("Outer").unwrap();
    assert!(analyzer.selector_chain(outer).is_empty());
    assert_eq!(outer.depth, 0);
}

#[test]
fn test_same_depth_collision_hides_both() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/p");
    let int = b.basic(BasicKind::Int);
    let string = b.basic(BasicKind::String);
    let boolean = b.basic(BasicKind::Bool);

    let a = b.declare_type(p, "A");
    b.define_struct(a, vec![FieldDef::named("X", int), FieldDef::named("Y", int)])
        .unwrap();
    let c = b.declare_type(p, "C");
    b.define_struct(c, vec![FieldDef::named("X", string)]).unwrap();
    let both = b.declare_type(p, "Both");
    b.define_struct(both, vec![FieldDef::embedded(a), FieldDef::embedded(c)])
        .unwrap();
    let shadow = b.declare_type(p, "Shadow");
    b.define_struct(shadow, vec![FieldDef::embedded(a), FieldDef::named("X", boolean)])
        .unwrap();
    let analyzer = analyze(b);

    let both_info = info(&analyzer, both);
    assert!(both_info.selector("X").is_none());
    assert_eq!(both_info.selector("Y").unwrap().depth, 1);
    assert_eq!(names(&both_info.all_fields), ["A", "C", "Y"]);

    let shadow_info = info(&analyzer, shadow);
    let x = shadow_info.selector("X").unwrap();
    assert_eq!(x.depth, 0);
    assert_eq!(x.ty(), analyzer.lookup_type(boolean).unwrap());
    assert_eq!(shadow_info.all_fields.iter().filter(|s| s.name() == "X").count(), 1);
}

#[test]
fn test_collision_hides_deeper_selector_too() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/p");
    let int = b.basic(BasicKind::Int);

    let inner = b.declare_type(p, "Inner");
    b.define_struct(inner, vec![FieldDef::named("X", int)]).unwrap();
    let left = b.declare_type(p, "Left");
    b.define_struct(left, vec![FieldDef::named("X", int)]).unwrap();
    let right = b.declare_type(p, "Right");
    b.define_struct(right, vec![FieldDef::named("X", int), FieldDef::embedded(inner)])
        .unwrap();
    let top = b.declare_type(p, "Top");
    b.define_struct(top, vec![FieldDef::embedded(left), FieldDef::embedded(right)])
        .unwrap();
    let analyzer = analyze(b);

    // Left.X and Right.X collide at depth 1; Inner.X at depth 2 stays shadowed
    let top_info = info(&analyzer, top);
    assert!(top_info.selector("X").is_none());
    assert_eq!(names(&top_info.all_fields), ["Left", "Right", "Inner"]);
}

#[test]
fn test_unexported_names_from_different_packages_coexist() {
    let mut b = ProgramBuilder::new();
    let a = b.package("example.com/a");
    let int = b.basic(BasicKind::Int);
    let string = b.basic(BasicKind::String);
    let inner = b.declare_type(a, "Inner");
    b.define_struct(inner, vec![FieldDef::named("secret", int), FieldDef::named("Public", int)])
        .unwrap();

    let w = b.package("example.com/w");
    let wrap = b.declare_type(w, "Wrap");
    b.define_struct(wrap, vec![FieldDef::embedded(inner), FieldDef::named("secret", string)])
        .unwrap();
    let analyzer = analyze(b);

    let wrap_info = info(&analyzer, wrap);
    let secrets: Vec<&Selector> = wrap_info
        .all_fields
        .iter()
        .filter(|s| s.name() == "secret")
        .collect();
    assert_eq!(secrets.len(), 2);
    assert_eq!(secrets[0].id, SelectorId::new("secret", Some("example.com/w")));
    assert_eq!(secrets[1].id, SelectorId::new("secret", Some("example.com/a")));
    assert_eq!(secrets[1].depth, 1);
    assert!(!secrets[0].is_exported());
}

#[test]
fn test_field_and_method_clash_keeps_field() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/p");
    let string = b.basic(BasicKind::String);
    let rec = b.declare_type(p, "Rec");
    b.define_struct(rec, vec![FieldDef::named("Name", string)]).unwrap();
    let sig = b.signature(vec![], vec![string], false);
    b.method(rec, false, "Name", sig);
    let analyzer = analyze(b);

    let rec_idx = analyzer.lookup_type(rec).unwrap();
    let rec_info = info(&analyzer, rec);
    assert!(rec_info.selector("Name").unwrap().is_field());
    assert!(rec_info.all_methods.is_empty());
    assert_eq!(rec_info.conflicts, [SelectorId::new("Name", None)]);

    let conflict = analyzer
        .conflicts()
        .iter()
        .find(|c| c.ty == rec_idx)
        .unwrap();
    assert_eq!(conflict.kind, ConflictKind::FieldAndMethod);
    assert_eq!(conflict.selector, "Name");
    assert_eq!(conflict.display, "p.Rec");
}

#[test]
fn test_interface_embedding_unions_method_sets() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/io");
    let int = b.basic(BasicKind::Int);
    let byte = b.basic(BasicKind::Uint8);
    let error = b.error_type();
    let bytes = b.slice_of(byte);
    let rw_sig = b.signature(vec![bytes], vec![int, error], false);
    let close_sig = b.signature(vec![], vec![error], false);

    let reader = b.declare_type(p, "Reader");
    b.define_interface(reader, vec![MethodDef::new("Read", rw_sig)], vec![])
        .unwrap();
    let writer = b.declare_type(p, "Writer");
    b.define_interface(writer, vec![MethodDef::new("Write", rw_sig)], vec![])
        .unwrap();
    let rw = b.declare_type(p, "ReadWriter");
    b.define_interface(rw, vec![], vec![reader, writer]).unwrap();
    let rwc = b.declare_type(p, "ReadWriteCloser");
    b.define_interface(rwc, vec![MethodDef::new("Close", close_sig)], vec![rw, reader])
        .unwrap();
    let analyzer = analyze(b);

    assert_eq!(names(&info(&analyzer, rw).all_methods), ["Read", "Write"]);
    let rwc_info = info(&analyzer, rwc);
    assert_eq!(names(&rwc_info.all_methods), ["Close", "Read", "Write"]);
    assert!(rwc_info.all_methods.iter().all(|m| m.depth == 0 && m.chain.is_none()));
    assert!(rwc_info.conflicts.is_empty());

    // the named type and its literal share the method set
    let underlying = analyzer.type_info(rwc_info.underlying).unwrap();
    assert_eq!(names(&underlying.all_methods), names(&rwc_info.all_methods));
}

#[test]
fn test_conflicting_interface_methods_are_reported() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/p");
    let int = b.basic(BasicKind::Int);
    let int64 = b.basic(BasicKind::Int64);
    let size_int = b.signature(vec![], vec![int], false);
    let size_int64 = b.signature(vec![], vec![int64], false);

    let small = b.declare_type(p, "Small");
    b.define_interface(small, vec![MethodDef::new("Size", size_int)], vec![])
        .unwrap();
    let large = b.declare_type(p, "Large");
    b.define_interface(large, vec![MethodDef::new("Size", size_int64)], vec![])
        .unwrap();
    let sized = b.declare_type(p, "Sized");
    b.define_interface(sized, vec![], vec![small, large]).unwrap();
    let analyzer = analyze(b);

    let sized_info = info(&analyzer, sized);
    assert_eq!(sized_info.conflicts, [SelectorId::new("Size", None)]);
    assert_eq!(names(&sized_info.all_methods), ["Size"]);
    assert!(analyzer
        .conflicts()
        .iter()
        .any(|c| c.kind == ConflictKind::MethodSignature && c.selector == "Size"));
}

#[test]
fn test_interface_embedding_cycle_settles() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/p");
    let sig = b.signature(vec![], vec![], false);
    let i = b.declare_type(p, "I");
    let j = b.declare_type(p, "J");
    b.define_interface(i, vec![MethodDef::new("M", sig)], vec![j]).unwrap();
    b.define_interface(j, vec![MethodDef::new("N", sig)], vec![i]).unwrap();
    let analyzer = analyze(b);

    let mut i_methods = names(&info(&analyzer, i).all_methods);
    let mut j_methods = names(&info(&analyzer, j).all_methods);
    i_methods.sort_unstable();
    j_methods.sort_unstable();
    assert_eq!(i_methods, ["M", "N"]);
    assert_eq!(j_methods, ["M", "N"]);
    assert!(analyzer.conflicts().is_empty());
}

#[test]
fn test_struct_embedding_interface_promotes_its_methods() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/log");
    let string = b.basic(BasicKind::String);
    let sig = b.signature(vec![string], vec![], false);
    let sink = b.declare_type(p, "Sink");
    b.define_interface(sink, vec![MethodDef::new("Emit", sig)], vec![])
        .unwrap();
    let logger = b.declare_type(p, "Logger");
    b.define_struct(logger, vec![FieldDef::embedded(sink)]).unwrap();
    let analyzer = analyze(b);

    let logger_info = info(&analyzer, logger);
    let emit = logger_info.selector("Emit").unwrap();
    assert!(emit.is_method());
    assert_eq!(emit.depth, 1);
    assert_eq!(emit.ty(), analyzer.lookup_type(sig).unwrap());
    assert_eq!(analyzer.selector_chain(emit)[0].name, "Sink");
}

#[test]
fn test_self_embedding_through_pointer_terminates() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/p");
    let int = b.basic(BasicKind::Int);
    let node = b.declare_type(p, "Node");
    let node_ptr = b.pointer_to(node);
    b.define_struct(node, vec![FieldDef::embedded(node_ptr), FieldDef::named("Val", int)])
        .unwrap();
    let analyzer = analyze(b);

    let node_info = info(&analyzer, node);
    assert_eq!(names(&node_info.all_fields), ["Node", "Val"]);
    assert!(node_info.all_fields.iter().all(|s| s.depth == 0));
}

#[test]
fn test_instantiated_generic_type_gets_substituted_selectors() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/coll");
    let int = b.basic(BasicKind::Int);
    let any = b.universe().empty_interface();
    let (list, params) = b.declare_generic_type(p, "List", &[("T", any)]);
    let t = params[0];
    let items = b.slice_of(t);
    b.define_struct(list, vec![FieldDef::named("items", items), FieldDef::named("Head", t)])
        .unwrap();
    let push_sig = b.signature(vec![t], vec![], false);
    let len_sig = b.signature(vec![], vec![int], false);
    b.method(list, true, "Push", push_sig);
    b.method(list, false, "Len", len_sig);

    let list_int = b.instantiate(list, vec![int]).unwrap();
    let list_int_ptr = b.pointer_to(list_int);
    let push_int = b.signature(vec![int], vec![], false);
    b.var(p, "Numbers", list_int);
    let analyzer = analyze(b);

    let instance = info(&analyzer, list_int);
    assert_eq!(names(&instance.all_methods), ["Len"]);
    let head = instance.selector("Head").unwrap();
    assert_eq!(head.ty(), analyzer.lookup_type(int).unwrap());
    assert!(head.position().is_some());

    let ptr = info(&analyzer, list_int_ptr);
    let push = ptr.selector("Push").unwrap();
    assert_eq!(push.ty(), analyzer.lookup_type(push_int).unwrap());
    assert!(push.as_method().unwrap().function.is_some());
}

#[test]
fn test_generics_disabled_leaves_instances_bare() {
    let mut b = ProgramBuilder::new();
    b.set_toolchain(ToolchainInfo::new("go1.17"));
    let p = b.package("example.com/coll");
    let int = b.basic(BasicKind::Int);
    let any = b.universe().empty_interface();
    let (boxed, params) = b.declare_generic_type(p, "Box", &[("T", any)]);
    b.define_struct(boxed, vec![FieldDef::named("Value", params[0])])
        .unwrap();
    let get_sig = b.signature(vec![], vec![params[0]], false);
    b.method(boxed, false, "Get", get_sig);
    let box_int = b.instantiate(boxed, vec![int]).unwrap();
    b.var(p, "B", box_int);
    let analyzer = analyze(b);

    assert!(info(&analyzer, box_int).all_methods.is_empty());
    assert_eq!(names(&info(&analyzer, boxed).all_methods), ["Get"]);
}
