/// Configuration for a compilation run.
#[derive(Clone, Debug)]
pub struct Options {
    /// Diagnostic chattiness. Negative values suppress even failure output
    /// in consumers that respect it; the library itself only logs through
    /// `tracing` and leaves filtering to the subscriber.
    pub verbosity: i32,
    /// Embed source byte ranges (and the source text itself) in the
    /// compiled document, for consumers that map execution failures back
    /// to the description.
    pub include_source_locations: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            verbosity: 0,
            include_source_locations: false,
        }
    }
}

impl Options {
    pub fn with_verbosity(mut self, verbosity: i32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_source_locations(mut self, include: bool) -> Self {
        self.include_source_locations = include;
        self
    }
}
