//! Declaration binding scenarios: package clauses, parameter lists, and
//! short variable declarations

use bind_tests::Fixture;
use expect_test::expect;
use std::path::Path;
use std::sync::Arc;
use tn_bind::{BindSession, BinderConfig, MemorySource, PackageBinder};
use tn_syntax::{Argument, Decl, Stmt};

#[test]
fn test_package_name_must_agree() {
    let mut fixture = Fixture::new();
    let mut files = Vec::new();
    for (path, name) in [
        ("src/foo/a.go", "foo"),
        ("src/foo/b.go", "foo"),
        ("src/foo/c.go", "bar"),
    ] {
        let mut builder = fixture.file(path);
        let package = builder.package_clause(name);
        files.push(builder.finish(package, Vec::new(), Vec::new()));
    }

    let session = fixture.session();
    let bindings = session.bind("example.com/foo", "src/foo", &[&files[0], &files[1], &files[2]]);

    expect![[r#"
        c.go:0..3: package example.com/foo: found packages foo (a.go) and bar (c.go) in src/foo
    "#]]
    .assert_eq(&session.diagnostics(&bindings));
    assert!(bindings.package.is_inconsistent());

    let exported = bindings.export(session.session.files());
    assert_eq!(exported.name, "foo");
    assert!(exported.inconsistent);
    assert_eq!(exported.named_by.as_deref(), Some(Path::new("src/foo/a.go")));
}

#[test]
fn test_parameter_list_shapes() {
    let mut fixture = Fixture::new();
    let mut b = fixture.file("src/p/p.go");
    let package = b.package_clause("p");
    let mut decls = Vec::new();

    let list = vec![b.param_type("int"), b.param_type("string")];
    let params = b.parameters(list);
    decls.push(Decl::Func(b.func("f1", params, None, None)));

    let list = vec![b.param_type("a"), b.param_named("b", "int")];
    let params = b.parameters(list);
    decls.push(Decl::Func(b.func("f2", params, None, None)));

    let list = vec![
        b.param_named("a", "int"),
        b.param_type("b"),
        b.param_named("c", "string"),
    ];
    let params = b.parameters(list);
    decls.push(Decl::Func(b.func("f3", params, None, None)));

    let list = vec![b.param_named("a", "int"), b.param_type("string")];
    let params = b.parameters(list);
    decls.push(Decl::Func(b.func("f4", params, None, None)));

    let list = vec![b.param_named_variadic("a", "int"), b.param_named("b", "int")];
    let params = b.parameters(list);
    decls.push(Decl::Func(b.func("f5", params, None, None)));

    let file = b.finish(package, Vec::new(), decls);
    let session = fixture.session();
    let bindings = session.bind("example.com/p", "src/p", &[&file]);

    expect![[r#"
        p.go:53..59: mixed named and unnamed parameters
        p.go:63..68: can only use ... as final argument in list
    "#]]
    .assert_eq(&session.diagnostics(&bindings));
    expect![[r#"
        Package 0:
        File 1 p.go:
        Function 2:
        Function 3: param a param b
        Function 4: param a param b param c
        Function 5: param a
        Function 6: param ...a param b
    "#]]
    .assert_eq(&session.scopes(&bindings));
}

#[test]
fn test_receiver_results_and_body_share_function_scope() {
    let mut fixture = Fixture::new();
    let mut b = fixture.file("src/p/p.go");
    let package = b.package_clause("p");

    let receiver_type = b.named_type("T");
    let receiver_type = b.pointer_type(receiver_type);
    let receiver = vec![b.param_named_of("s", receiver_type)];
    let receiver = b.parameters(receiver);

    let list = vec![b.param_named("x", "int"), b.param_named("x", "string")];
    let params = b.parameters(list);
    let list = vec![b.param_named("n", "int"), b.param_named("err", "error")];
    let results = b.parameters(list);

    let one = b.int_lit("1");
    let shadow = b.var_spec(&["s"], vec![one]);
    let body = b.block(vec![Stmt::Var(vec![shadow])]);
    let mut method = b.func("m", params, Some(results), Some(body));
    method.receiver = Some(receiver);

    let file = b.finish(package, Vec::new(), vec![Decl::Func(method)]);
    let session = fixture.session();
    let bindings = session.bind("example.com/p", "src/p", &[&file]);

    expect![[r#"
        p.go:12..13: x redeclared in parameter list
          previous declaration at p.go:6..7
        p.go:39..40: s redeclared in this block
          previous declaration at p.go:4..5
    "#]]
    .assert_eq(&session.diagnostics(&bindings));
    expect![[r#"
        Package 0:
        File 1 p.go:
        Function 2: param s param x param n param err
    "#]]
    .assert_eq(&session.scopes(&bindings));
}

#[test]
fn test_range_and_case_clauses_open_scopes() {
    let mut fixture = Fixture::new();
    let mut b = fixture.file("src/p/p.go");
    let package = b.package_clause("p");
    let params = b.parameters(Vec::new());

    let key = b.ident("k");
    let value = b.ident("v");
    let items = b.ident("items");
    let range = b.range_define(vec![key, value], items);
    let zero = b.int_lit("0");
    let inner = b.var_spec(&["k"], vec![zero]);
    let loop_body = b.block(vec![Stmt::Var(vec![inner])]);
    let for_stmt = b.for_range(range, loop_body);

    let value = b.ident("v");
    let ok = b.ident("ok");
    let guard = b.ident("x");
    let one = b.int_lit("1");
    let repeat = b.var_spec(&["ok"], vec![one]);
    let first = b.case_define(
        vec![Argument::Expr(value), Argument::Expr(ok)],
        guard,
        vec![Stmt::Var(vec![repeat])],
    );
    let targets = ["a", "b", "c"].map(|name| Argument::Expr(b.ident(name)));
    let guard = b.ident("y");
    let second = b.case_define(targets.to_vec(), guard, Vec::new());
    let switch = b.switch(None, vec![first, second]);

    let body = b.block(vec![for_stmt, switch]);
    let run = b.func("run", params, None, Some(body));
    let file = b.finish(package, Vec::new(), vec![Decl::Func(run)]);

    let session = fixture.session();
    let bindings = session.bind("example.com/p", "src/p", &[&file]);

    expect![[r#"
        p.go:31..33: ok redeclared in this block
          previous declaration at p.go:24..26
        p.go:38..39: too many variables declared by the case clause
    "#]]
    .assert_eq(&session.diagnostics(&bindings));
    expect![[r#"
        Package 0:
        File 1 p.go:
        Function 2:
        Block 3: var k var v
        Block 4: var k
        Block 5: var v var ok
        Block 6: var a var b
    "#]]
    .assert_eq(&session.scopes(&bindings));

    let interner = session.session.interner();
    let (loop_scope, _) = bindings.tree.scopes().nth(3).unwrap();
    let (body_scope, _) = bindings.tree.scopes().nth(4).unwrap();
    let k = interner.intern("k");
    let inner_k = bindings.tree.lookup(body_scope, k).unwrap();
    let outer_k = bindings.tree.lookup(loop_scope, k).unwrap();
    assert_ne!(inner_k, outer_k);
    assert_eq!(bindings.tree.lookup(body_scope, interner.intern("v")), bindings.tree.lookup_local(loop_scope, interner.intern("v")));
    assert_eq!(bindings.tree.lookup(body_scope, interner.intern("items")), None);
}

#[test]
fn test_bound_package_is_importable() {
    let mut fixture = Fixture::new();
    let mut b = fixture.file("src/shapes/shapes.go");
    let package = b.package_clause("shapes");
    let pi = b.int_lit("3");
    let constant = b.const_spec(&["Pi"], vec![pi]);
    let two = b.int_lit("2");
    let hidden = b.var_spec(&["scale"], vec![two]);
    let shapes = b.finish(
        package,
        Vec::new(),
        vec![Decl::Const(vec![constant]), Decl::Var(vec![hidden])],
    );

    let mut b = fixture.file("src/app/main.go");
    let package = b.package_clause("main");
    let imports = vec![b.import(None, "example.com/shapes"), b.import(Some("."), "example.com/shapes")];
    let main = b.finish(package, imports, Vec::new());

    let first = fixture.session();
    let bound = first.bind("example.com/shapes", "src/shapes", &[&shapes]);
    let interner = first.session.interner();
    assert!(bound.package_binding(interner.intern("Pi")).is_some());
    assert!(bound.package_binding(interner.intern("scale")).is_some());
    assert!(bound.package_binding(interner.intern("shapes")).is_none());
    let exported = bound.export(first.session.files());
    assert_eq!(exported.exports().map(|decl| decl.name()).collect::<Vec<_>>(), ["Pi"]);

    let source = Arc::new(MemorySource::new().with_package(exported));
    let second = BindSession::new(
        first.session.interner().clone(),
        first.session.files().clone(),
        BinderConfig::default(),
        Arc::clone(&source) as Arc<dyn tn_bind::PackageSource>,
    );
    let mut binder = PackageBinder::new(&second, "example.com/app", "src/app");
    binder.bind_file(&main);
    let bindings = binder.finish();

    assert!(bindings.diagnostics.is_empty());
    assert_eq!(source.load_count("example.com/shapes"), 1);
    let scope = bindings.tree.get_scope(bindings.files[0].scope);
    let names: Vec<&str> = scope
        .bindings()
        .map(|(_, decl)| bindings.tree.declaration(decl).name())
        .collect();
    assert_eq!(names, ["shapes", "Pi"]);
}
