//! Output formats for decision trees
//!
//! Every format implements [Formatter] and is looked up by name in a [FormatRegistry]:
//!
//! - `json`: nested `{question, branches}` maps, bare strings for outcomes
//! - `yaml`: the same shape as YAML
//! - `treeviz`: one line per node, box-drawing connectors
//! - `outline`: the transcript format itself, canonically indented

pub mod outline;
pub mod registry;
pub mod structured;
pub mod treeviz;

pub use outline::OutlineFormatter;
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use structured::{JsonFormatter, YamlFormatter};
pub use treeviz::TreevizFormatter;
