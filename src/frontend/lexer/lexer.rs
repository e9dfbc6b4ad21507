use crate::frontend::lexer::error::{LexError, LexResult};
use crate::frontend::lexer::token::{Position, Token, TokenType};
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct TokenRule {
    token_type: TokenType,
    pattern: Regex,
}

impl TokenRule {
    fn new(token_type: TokenType, pattern: &str) -> LexResult<Self> {
        let regex = Regex::new(pattern).map_err(|_| LexError::Generic {
            message: "Invalid regex pattern".to_string(),
            line: 0,
            column: 0,
        })?;

        Ok(Self {
            token_type,
            pattern: regex,
        })
    }
}

pub struct Lexer {
    rules: Vec<TokenRule>,
    keywords: HashMap<&'static str, TokenType>,
    input: String,
    pos: Position,
}

impl Lexer {
    pub fn new(input: String) -> LexResult<Self> {
        let mut lexer = Self {
            rules: Vec::new(),
            keywords: HashMap::new(),
            input,
            pos: Position::start(),
        };
        lexer.initialize()?;
        Ok(lexer)
    }

    fn initialize(&mut self) -> LexResult<()> {
        // Rules are tried in order; longer operators first.
        self.add_rule(TokenType::LEq, r"<=")?;
        self.add_rule(TokenType::GEq, r">=")?;
        self.add_rule(TokenType::EqEq, r"==")?;
        self.add_rule(TokenType::NEq, r"!=")?;
        self.add_rule(TokenType::AndAnd, r"&&")?;
        self.add_rule(TokenType::OrOr, r"\|\|")?;

        // Number literals: hex, octal (leading zero), decimal
        self.add_rule(
            TokenType::UintLiteral,
            r"(0[xX][0-9a-fA-F]+)|(0[0-7]*)|([1-9][0-9]*)",
        )?;

        self.add_rule(TokenType::Lt, r"<")?;
        self.add_rule(TokenType::Gt, r">")?;
        self.add_rule(TokenType::Eq, r"=")?;
        self.add_rule(TokenType::Not, r"!")?;
        self.add_rule(TokenType::Plus, r"\+")?;
        self.add_rule(TokenType::Minus, r"-")?;
        self.add_rule(TokenType::Mul, r"\*")?;
        self.add_rule(TokenType::Div, r"/")?;
        self.add_rule(TokenType::Percent, r"%")?;
        self.add_rule(TokenType::LParen, r"\(")?;
        self.add_rule(TokenType::RParen, r"\)")?;
        self.add_rule(TokenType::LBrace, r"\{")?;
        self.add_rule(TokenType::RBrace, r"\}")?;
        self.add_rule(TokenType::LBracket, r"\[")?;
        self.add_rule(TokenType::RBracket, r"\]")?;
        self.add_rule(TokenType::Comma, r",")?;
        self.add_rule(TokenType::Semicolon, r";")?;

        // Identifiers
        self.add_rule(TokenType::Identifier, r"[a-zA-Z_][a-zA-Z0-9_]*")?;

        // Keywords
        let keywords = [
            ("int", TokenType::Int),
            ("void", TokenType::Void),
            ("if", TokenType::If),
            ("else", TokenType::Else),
            ("while", TokenType::While),
            ("break", TokenType::Break),
            ("continue", TokenType::Continue),
            ("return", TokenType::Return),
        ];

        for (keyword, token_type) in keywords {
            self.keywords.insert(keyword, token_type);
        }

        Ok(())
    }

    fn add_rule(&mut self, token_type: TokenType, pattern: &str) -> LexResult<()> {
        let anchored_pattern = if !pattern.starts_with('^') {
            format!("^({})", pattern)
        } else {
            pattern.to_string()
        };
        let rule = TokenRule::new(token_type, &anchored_pattern)?;
        self.rules.push(rule);
        Ok(())
    }

    pub fn tokenize(&mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;
            if self.is_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        tokens.push(Token {
            token_type: TokenType::Eof,
            lexeme: String::new(),
            position: self.pos,
        });

        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self) -> LexResult<()> {
        loop {
            if !self.is_end() && self.current_char().is_whitespace() {
                self.advance();
            } else if self.current_char() == '/' && self.peek() == '/' {
                self.lex_line_comment();
            } else if self.current_char() == '/' && self.peek() == '*' {
                self.lex_block_comment()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn lex_line_comment(&mut self) {
        while !self.is_end() && self.current_char() != '\n' {
            self.advance();
        }
    }

    fn lex_block_comment(&mut self) -> LexResult<()> {
        let start_line = self.pos.line;
        let start_column = self.pos.column;
        self.advance();
        self.advance();

        while !self.is_end() {
            if self.current_char() == '*' && self.peek() == '/' {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::Generic {
            message: "Unterminated block comment".to_string(),
            line: start_line,
            column: start_column,
        })
    }

    fn advance(&mut self) {
        if self.current_char() == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        self.pos.index += 1;
    }

    fn current_char(&self) -> char {
        self.input[self.pos.index..].chars().next().unwrap_or('\0')
    }

    fn peek(&self) -> char {
        if self.pos.index + 1 >= self.input.len() {
            return '\0';
        }
        self.input[self.pos.index + 1..].chars().next().unwrap_or('\0')
    }

    fn is_end(&self) -> bool {
        self.pos.index >= self.input.len()
    }

    fn next_token(&mut self) -> LexResult<Token> {
        let remaining = &self.input[self.pos.index..];
        for rule in &self.rules {
            if let Some(mat) = rule.pattern.find(remaining) {
                let lexeme = mat.as_str().to_string();
                let position = self.pos;
                self.pos.index += lexeme.len();
                self.pos.column += lexeme.len();

                let mut token_type = rule.token_type;
                if token_type == TokenType::Identifier {
                    if let Some(&keyword_type) = self.keywords.get(lexeme.as_str()) {
                        token_type = keyword_type;
                    }
                }
                return Ok(Token {
                    token_type,
                    lexeme,
                    position,
                });
            }
        }

        Err(LexError::InvalidToken {
            text: self.current_char().to_string(),
            line: self.pos.line,
            column: self.pos.column,
        })
    }
}
