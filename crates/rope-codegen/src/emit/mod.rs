//! Artifact emitters.
//!
//! Each emitter renders the whole [`Registry`] into one file. Output is a
//! pure function of the registry: the same registry always produces the same
//! bytes, so the drift check can compare committed files line by line.

mod native;
mod stubs;

pub use native::NativeEmitter;
pub use stubs::StubEmitter;

use crate::descriptor::Registry;

pub(crate) const HEADER: &str =
    "@generated by `rope generate` from the operator registry. Do not edit by hand.";
pub(crate) const HEADER_VERIFY: &str =
    "`rope verify` fails when this file drifts from `ops/kind.rs`.";

pub trait Emitter {
    /// Short name used in logs and drift reports.
    fn name(&self) -> &'static str;

    /// Path of the artifact, relative to the workspace root.
    fn relative_path(&self) -> &'static str;

    fn emit(&self, registry: &Registry) -> String;
}

/// The native dispatch module and the typed stub surface, in write order.
pub fn default_emitters() -> Vec<Box<dyn Emitter>> {
    vec![Box::new(NativeEmitter), Box::new(StubEmitter)]
}

/// Line buffer with indentation, shared by the emitters.
#[derive(Debug, Default)]
pub(crate) struct Source {
    out: String,
    indent: usize,
}

impl Source {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    /// Columns taken by the current indentation.
    pub(crate) fn width(&self) -> usize {
        self.indent * 4
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

/// `text_ops` -> `TextOps`
pub(crate) fn camel_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_indents_non_empty_lines() {
        let mut src = Source::new();
        src.line("a {");
        src.indent();
        src.line("b");
        src.line("");
        src.dedent();
        src.line("}");
        assert_eq!(src.finish(), "a {\n    b\n\n}\n");
    }

    #[test]
    fn camel_case_names() {
        assert_eq!(camel_case("text"), "Text");
        assert_eq!(camel_case("json_decode"), "JsonDecode");
    }
}
