//! Translate linear LaTeX into braille math code or spoken output.
//!
//! A [`Translator`] scans LaTeX source and looks every control sequence or
//! character up in a [`CommandTable`]. An [`Entry`] is a literal substitution,
//! an argument [`Template`] or a custom [`Procedure`]. Arguments are found by the
//! extractors in [`args`] and translated recursively.
//!
//! ```
//! use latex_access::{Template, Translator};
//!
//! let mut translator = Translator::new().with_separator(" ");
//! translator.table_mut().insert("\\alpha", "alpha");
//! translator
//!     .table_mut()
//!     .insert("\\frac", Template::delimiters(["begin fraction", "over", "end fraction"]));
//!
//! assert_eq!(
//!     translator.translate("\\frac{1}{\\alpha}"),
//!     " begin fraction 1 over alpha end fraction "
//! );
//! ```

pub mod args;
pub mod entry;
pub mod error;
pub mod parser;
pub mod procedures;
pub mod table;
pub mod translator;

pub use args::{Argument, SubSup, extract_argument, extract_optional, extract_subsup};
pub use entry::{Entry, Procedure, Template, TemplatePart};
pub use error::{Error, Result};
pub use table::CommandTable;
pub use translator::{TranslatingReader, Translator};
