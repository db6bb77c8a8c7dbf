//! Render engine adapters.
//!
//! # Placeholders
//!
//! | Placeholder       | Value                                         |
//! |-------------------|-----------------------------------------------|
//! | `{{FILE_NAME}}`   | target file name, `User.cs`                   |
//! | `{{FILE_STEM}}`   | target file stem, `User`                      |
//! | `{{NAMESPACE}}`   | declared namespace, empty when there is none  |
//! | `{{TYPE_COUNT}}`  | number of declared types                      |
//!
//! Text between `{{#types}}` and `{{/types}}` is repeated once per declared
//! type, with `{{name}}` and `{{kind}}` substituted.

mod simple;

pub use simple::SimpleRenderer;

pub const TYPES_OPEN: &str = "{{#types}}";
pub const TYPES_CLOSE: &str = "{{/types}}";
