//! Path indexing, import extraction and module resolution

pub mod extractor;
pub mod heuristics;
pub mod languages;
pub mod parser_pool;
pub mod path_index;
pub mod paths;
pub mod syntax;
pub mod walker;


pub use extractor::{
    ExtractedImport, Extraction, HEURISTIC_CONFIDENCE, ImportExtractor, ModuleParser,
    ModuleReference, PARSER_CONFIDENCE,
};
pub use languages::{CODE_EXTENSIONS, ResolveContext, SourceLanguage};
pub use parser_pool::{FileType, ParseRequest, ParseResult, ParserPool, create_parser_pool};
pub use path_index::{PathIndex, PathIndexBuilder, SuffixMatch};
pub use syntax::TreeSitterParser;
