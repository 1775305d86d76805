pub mod downloader;
pub mod parser;
pub mod renamer;
pub mod retag;
pub mod scanner;
pub mod tagger;
pub mod url;
