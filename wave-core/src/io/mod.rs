/// Serializable summaries of instances and solutions
pub mod ext_repr;

/// Writing and reading solutions in the plain text format
pub mod export;

/// Parsing instances from the plain text format
pub mod import;
