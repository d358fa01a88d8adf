//! Integration tests for program construction and loading

use tyscope_types::{
    BasicKind, ExprKind, FieldDef, MethodDef, ObjectResolver, Object, ProgramBuilder, RawKind,
    Spec, ToolchainInfo, TypeInfoResolver, Decl, Program,
};

#[test]
fn test_json_round_trip_keeps_interning() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/p");
    let int = b.basic(BasicKind::Int);
    let point = b.declare_type(p, "Point");
    b.define_struct(point, vec![FieldDef::named("X", int), FieldDef::named("Y", int)])
        .unwrap();
    b.set_toolchain(ToolchainInfo::new("go1.17"));
    let program = b.build();

    let json = program.to_json().unwrap();
    let mut loaded = Program::from_json(&json).unwrap();
    assert_eq!(loaded.packages.len(), program.packages.len());
    assert!(!loaded.toolchain.supports_generics());

    let ptr_before = program.universe.lookup(&RawKind::Pointer(point));
    let ptr_after = loaded.universe.pointer_to(point);
    if let Some(ptr) = ptr_before {
        assert_eq!(ptr, ptr_after);
    }
    assert_eq!(loaded.universe.display(point), "p.Point");

    let pkg = loaded.package("example.com/p").unwrap();
    let Decl::Gen(gen) = &pkg.files[0].decls[0] else {
        panic!("expected a type declaration");
    };
    let Spec::Type(spec) = &gen.specs[0] else {
        panic!("expected a type spec");
    };
    assert_eq!(
        pkg.objects.object_of(&spec.name),
        Some(&Object::TypeName { ty: point, alias: false })
    );
}

#[test]
fn test_generic_method_receiver_syntax() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/coll");
    let any = b.universe().empty_interface();
    let (list, params) = b.declare_generic_type(p, "List", &[("T", any)]);
    let elems = b.slice_of(params[0]);
    b.define_struct(list, vec![FieldDef::named("items", elems)]).unwrap();
    let int = b.basic(BasicKind::Int);
    let len_sig = b.signature(vec![], vec![int], false);
    b.method(list, true, "Len", len_sig);
    let program = b.build();

    let pkg = program.package("example.com/coll").unwrap();
    let func = pkg.files[0].funcs().next().unwrap();
    let base = func.receiver_base().unwrap();
    assert_eq!(base.name.name, "List");
    assert!(base.pointer);
    assert_eq!(base.type_params.len(), 1);
    let ExprKind::Ident(param) = &base.type_params[0].kind else {
        panic!("expected a type parameter name");
    };
    assert_eq!(
        pkg.objects.object_of(param),
        Some(&Object::TypeParam { ty: params[0] })
    );
}

#[test]
fn test_interface_syntax_lists_methods_then_embeddeds() {
    let mut b = ProgramBuilder::new();
    let p = b.package("example.com/io");
    let error = b.error_type();
    let close_sig = b.signature(vec![], vec![error], false);
    let closer = b.declare_type(p, "Closer");
    b.define_interface(closer, vec![MethodDef::new("Close", close_sig)], vec![])
        .unwrap();
    let rc = b.declare_type(p, "ReadCloser");
    let bytes = {
        let byte = b.basic(BasicKind::Uint8);
        b.slice_of(byte)
    };
    let int = b.basic(BasicKind::Int);
    let read_sig = b.signature(vec![bytes], vec![int, error], false);
    b.define_interface(rc, vec![MethodDef::new("Read", read_sig)], vec![closer])
        .unwrap();
    let program = b.build();

    let pkg = program.package("example.com/io").unwrap();
    let specs: Vec<_> = pkg.files[0]
        .specs(tyscope_types::DeclToken::Type)
        .collect();
    assert_eq!(specs.len(), 2);
    let Spec::Type(spec) = specs[1] else {
        panic!("expected a type spec");
    };
    let ExprKind::Interface(body) = &spec.ty.kind else {
        panic!("expected an interface body");
    };
    assert_eq!(body.elems.len(), 2);
    assert!(!body.elems[0].is_embedded());
    assert!(body.elems[1].is_embedded());
    assert_eq!(pkg.types.type_of(&body.elems[1].ty), Some(closer));
}
