//! The pipeline: lex → group → parse → serialize → frame.

use ciborium::value::Value;
use sddl_diagnostic::{CompilerError, Result, Source, SourceLocation};
use tracing::debug;

use crate::options::Options;

pub struct Compiler {
    options: Options,
}

impl Compiler {
    pub fn new(options: Options) -> Compiler {
        Compiler { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Compile an SDDL description into its binary document.
    ///
    /// `filename` is a logical name used in diagnostics; no IO happens
    /// here. The returned bytes are a CBOR map with an `"exprs"` array
    /// holding one item per statement, plus the source text under `"src"`
    /// when source locations are enabled.
    pub fn compile(&self, text: &str, filename: &str) -> Result<Vec<u8>> {
        let src = Source::new(filename, text);

        let tokens = sddl_lexer::tokenize(&src)?;
        debug!(tokens = tokens.len(), file = filename, "lexed");

        let stmts = sddl_parse::group(tokens)?;
        debug!(statements = stmts.len(), "grouped");

        let roots = sddl_parse::parse(stmts)?;

        let exprs = roots
            .iter()
            .map(|root| root.serialize(self.options.include_source_locations))
            .collect::<Result<Vec<_>>>()?;

        let mut entries = vec![(Value::Text("exprs".to_string()), Value::Array(exprs))];
        if self.options.include_source_locations {
            entries.push((Value::Text("src".to_string()), Value::Text(text.to_string())));
        }

        let mut out = Vec::new();
        ciborium::ser::into_writer(&Value::Map(entries), &mut out).map_err(|e| {
            CompilerError::serialization(
                format!("Failed to encode CBOR document: {e}"),
                SourceLocation::none(),
            )
        })?;
        debug!(bytes = out.len(), "encoded document");
        Ok(out)
    }
}
