//! Template tokenizer and format-spec parsing

mod argument;
pub mod lexer;

pub use argument::ReplacementArgument;
pub use lexer::{split_key_format, tokenize, Delimiters, Token, TokenKind, Tokenizer};
