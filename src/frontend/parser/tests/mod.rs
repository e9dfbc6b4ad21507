use crate::frontend::lexer::lexer::Lexer;
use crate::frontend::parser::ast::*;
use crate::frontend::parser::error::ParseResult;
use crate::frontend::parser::parser::Parser;

fn parse(src: &str) -> ParseResult<CompileUnit> {
    let mut lexer = Lexer::new(src.to_string()).unwrap();
    let tokens = lexer.tokenize().unwrap();
    let mut parser = Parser::new(tokens);
    parser.parse()
}

fn parse_ok(src: &str) -> CompileUnit {
    parse(src).expect("parse succeeds")
}

#[test]
fn function_and_global_items() {
    let unit = parse_ok("int g = 1; int main() { return g; }");
    assert_eq!(unit.items.len(), 2);
    assert!(matches!(unit.items[0], Item::Decl(_)));
    let Item::FuncDef(ref main) = unit.items[1] else {
        panic!("second item should be a function");
    };
    assert_eq!(main.name, "main");
    assert_eq!(main.return_type, TypeSpec::Int);
    assert!(main.params.is_empty());
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let unit = parse_ok("int main() { return 1+2*3; }");
    let Item::FuncDef(ref main) = unit.items[0] else {
        panic!();
    };
    let BlockItem::Stmt(Stmt::Return {
        value: Some(expr), ..
    }) = &main.body.items[0]
    else {
        panic!("expected return with value");
    };
    let Expr::Binary { op, rhs, .. } = expr else {
        panic!("expected binary expression");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(
        **rhs,
        Expr::Binary {
            op: BinOp::Mul,
            ..
        }
    ));
}

#[test]
fn relational_binds_tighter_than_logical() {
    let unit = parse_ok("int main() { return 1 < 2 && 3 < 4; }");
    let Item::FuncDef(ref main) = unit.items[0] else {
        panic!();
    };
    let BlockItem::Stmt(Stmt::Return {
        value: Some(expr), ..
    }) = &main.body.items[0]
    else {
        panic!();
    };
    let Expr::Binary { op, lhs, rhs, .. } = expr else {
        panic!();
    };
    assert_eq!(*op, BinOp::And);
    assert!(matches!(**lhs, Expr::Binary { op: BinOp::Lt, .. }));
    assert!(matches!(**rhs, Expr::Binary { op: BinOp::Lt, .. }));
}

#[test]
fn array_parameter_with_erased_leading_dimension() {
    let unit = parse_ok("int f(int b[][4], int n) { return n; }");
    let Item::FuncDef(ref f) = unit.items[0] else {
        panic!();
    };
    assert_eq!(f.params.len(), 2);
    let dims = f.params[0].array_dims.as_ref().expect("array dims");
    assert_eq!(dims.len(), 1);
    assert!(matches!(dims[0], Expr::LiteralUint { value: 4, .. }));
    assert!(f.params[1].array_dims.is_none());
}

#[test]
fn multi_variable_declaration() {
    let unit = parse_ok("int main() { int a = 1, b[2][3], c; return a; }");
    let Item::FuncDef(ref main) = unit.items[0] else {
        panic!();
    };
    let BlockItem::Decl(ref decl) = main.body.items[0] else {
        panic!("expected declaration");
    };
    assert_eq!(decl.defs.len(), 3);
    assert!(matches!(
        decl.defs[0],
        VarDef::Scalar { init: Some(_), .. }
    ));
    let VarDef::Array { ref dims, .. } = decl.defs[1] else {
        panic!("second definition should be an array");
    };
    assert_eq!(dims.len(), 2);
    assert!(matches!(decl.defs[2], VarDef::Scalar { init: None, .. }));
}

#[test]
fn array_definition_rejects_initializer() {
    // Scalar-init and array-dims are mutually exclusive alternatives.
    assert!(parse("int main() { int a[3] = 5; return 0; }").is_err());
    assert!(parse("int a[2] = 1; int main() { return 0; }").is_err());
}

#[test]
fn assignment_versus_expression_statement() {
    let unit = parse_ok("void f() { } int main() { int x; x = 1; f(); return x; }");
    let Item::FuncDef(ref main) = unit.items[1] else {
        panic!();
    };
    assert!(matches!(
        main.body.items[1],
        BlockItem::Stmt(Stmt::Assign(_))
    ));
    assert!(matches!(
        main.body.items[2],
        BlockItem::Stmt(Stmt::Expr(Expr::Call { .. }))
    ));
}

#[test]
fn array_access_target() {
    let unit = parse_ok("int a[2][2]; int main() { a[0][1] = 5; return 0; }");
    let Item::FuncDef(ref main) = unit.items[1] else {
        panic!();
    };
    let BlockItem::Stmt(Stmt::Assign(ref assign)) = main.body.items[0] else {
        panic!("expected assignment");
    };
    let Expr::ArrayAccess { ref indices, .. } = assign.target else {
        panic!("expected array access target");
    };
    assert_eq!(indices.len(), 2);
}

#[test]
fn dangling_else_binds_to_inner_if() {
    let unit = parse_ok("int main() { if (1) if (0) return 1; else return 2; return 3; }");
    let Item::FuncDef(ref main) = unit.items[0] else {
        panic!();
    };
    let BlockItem::Stmt(Stmt::If(ref outer)) = main.body.items[0] else {
        panic!();
    };
    assert!(outer.else_stmt.is_none());
    let Stmt::If(ref inner) = outer.then_stmt else {
        panic!("inner statement should be the nested if");
    };
    assert!(inner.else_stmt.is_some());
}

#[test]
fn unary_operators_nest() {
    let unit = parse_ok("int main() { return -!1; }");
    let Item::FuncDef(ref main) = unit.items[0] else {
        panic!();
    };
    let BlockItem::Stmt(Stmt::Return {
        value: Some(expr), ..
    }) = &main.body.items[0]
    else {
        panic!();
    };
    let Expr::Unary {
        op: UnOp::Neg,
        operand,
        ..
    } = expr
    else {
        panic!("expected unary minus");
    };
    assert!(matches!(
        **operand,
        Expr::Unary {
            op: UnOp::Not,
            ..
        }
    ));
}

#[test]
fn missing_semicolon_is_an_error() {
    assert!(parse("int main() { return 0 }").is_err());
}

#[test]
fn stray_top_level_token_is_an_error() {
    assert!(parse("return 0;").is_err());
}

#[test]
fn literal_bases_decode() {
    let unit = parse_ok("int main() { return 0x10 + 010 + 9; }");
    let Item::FuncDef(ref main) = unit.items[0] else {
        panic!();
    };
    let BlockItem::Stmt(Stmt::Return {
        value: Some(expr), ..
    }) = &main.body.items[0]
    else {
        panic!();
    };
    // ((0x10 + 010) + 9): 16, 8, 9
    let Expr::Binary { lhs, rhs, .. } = expr else {
        panic!();
    };
    assert!(matches!(**rhs, Expr::LiteralUint { value: 9, .. }));
    let Expr::Binary { lhs, rhs, .. } = &**lhs else {
        panic!();
    };
    assert!(matches!(**lhs, Expr::LiteralUint { value: 16, .. }));
    assert!(matches!(**rhs, Expr::LiteralUint { value: 8, .. }));
}
