//! Line-level processing: `$$` expansion and tokenizing into a `CommandLine`.

pub mod parser;
pub mod variable_expansion;
