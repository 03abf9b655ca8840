// Internal modules
pub mod config;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod stream;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{FinishOutcome, InputView, LexerError, LexerState, Tokenizer, TokenizerMetrics};
pub use stream::{StreamError, StreamReport, StreamTokenizer};
pub use tokens::{OwnedToken, Token};
pub use utils::{TextPosition, TextSpan};
