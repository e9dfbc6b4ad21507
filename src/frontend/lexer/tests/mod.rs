use crate::frontend::lexer::error::LexError;
use crate::frontend::lexer::lexer::Lexer;
use crate::frontend::lexer::token::TokenType;

fn tokenize(src: &str) -> Vec<crate::frontend::lexer::token::Token> {
    let mut lexer = Lexer::new(src.to_string()).unwrap();
    lexer.tokenize().unwrap()
}

#[test]
fn keywords_and_identifiers() {
    let tokens = tokenize("int void if else while break continue return main _x1");
    let expected = [
        TokenType::Int,
        TokenType::Void,
        TokenType::If,
        TokenType::Else,
        TokenType::While,
        TokenType::Break,
        TokenType::Continue,
        TokenType::Return,
        TokenType::Identifier,
        TokenType::Identifier,
        TokenType::Eof,
    ];
    assert_eq!(tokens.len(), expected.len());
    for (token, expected_type) in tokens.iter().zip(expected) {
        assert_eq!(token.token_type, expected_type, "token {:?}", token);
    }
    assert_eq!(tokens[8].lexeme, "main");
    assert_eq!(tokens[9].lexeme, "_x1");
}

#[test]
fn two_char_operators_win_over_single() {
    let tokens = tokenize("<= >= == != && || < > = !");
    let expected = [
        TokenType::LEq,
        TokenType::GEq,
        TokenType::EqEq,
        TokenType::NEq,
        TokenType::AndAnd,
        TokenType::OrOr,
        TokenType::Lt,
        TokenType::Gt,
        TokenType::Eq,
        TokenType::Not,
        TokenType::Eof,
    ];
    for (token, expected_type) in tokens.iter().zip(expected) {
        assert_eq!(token.token_type, expected_type, "token {:?}", token);
    }
}

#[test]
fn integer_literal_forms() {
    let tokens = tokenize("0 42 017 0x1F");
    assert_eq!(tokens[0].lexeme, "0");
    assert_eq!(tokens[1].lexeme, "42");
    assert_eq!(tokens[2].lexeme, "017");
    assert_eq!(tokens[3].lexeme, "0x1F");
    for token in &tokens[..4] {
        assert_eq!(token.token_type, TokenType::UintLiteral);
    }
}

#[test]
fn comments_are_skipped() {
    let tokens = tokenize("int a; // line comment\n/* block\ncomment */ int b;");
    let idents: Vec<_> = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::Identifier)
        .map(|t| t.lexeme.as_str())
        .collect();
    assert_eq!(idents, ["a", "b"]);
}

#[test]
fn line_numbers_advance() {
    let tokens = tokenize("int a;\nint b;");
    let b = tokens
        .iter()
        .find(|t| t.lexeme == "b")
        .expect("b tokenized");
    assert_eq!(b.position.line, 2);
}

#[test]
fn unknown_character_is_reported() {
    let mut lexer = Lexer::new("int a = $;".to_string()).unwrap();
    let err = lexer.tokenize().unwrap_err();
    assert!(matches!(err, LexError::InvalidToken { ref text, .. } if text == "$"));
}

#[test]
fn unterminated_block_comment_is_reported() {
    let mut lexer = Lexer::new("int a; /* no end".to_string()).unwrap();
    let err = lexer.tokenize().unwrap_err();
    assert!(matches!(err, LexError::Generic { .. }));
}
