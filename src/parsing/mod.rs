pub mod cpp;
pub mod factory;
pub mod go;
pub mod java;
pub mod javascript;
pub mod language;
pub mod parser;
pub mod python;
pub mod rust;

pub use cpp::CppExtractor;
pub use factory::ExtractorFactory;
pub use go::GoExtractor;
pub use java::JavaExtractor;
pub use javascript::JavaScriptExtractor;
pub use language::Language;
pub use parser::LanguageExtractor;
pub use python::PythonExtractor;
pub use rust::RustExtractor;
