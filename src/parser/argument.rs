//! Structured view over a parameter's format-spec

/// The format-spec part of a parameter (`{key:this:part}`), as handed to resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplacementArgument<'a> {
    raw: Option<&'a str>,
}

impl<'a> ReplacementArgument<'a> {
    pub fn new(raw: Option<&'a str>) -> Self {
        Self { raw }
    }

    /// The format-spec exactly as written, if the parameter had a `:`
    pub fn raw(&self) -> Option<&'a str> {
        self.raw
    }

    /// True when the format-spec is present and not blank
    pub fn has_argument(&self) -> bool {
        self.raw.is_some_and(|raw| !raw.trim().is_empty())
    }

    /// The format-spec split on `:`; empty when [`Self::has_argument`] is false
    pub fn arguments(&self) -> Vec<&'a str> {
        match self.raw {
            Some(raw) if self.has_argument() => raw.split(':').collect(),
            _ => Vec::new(),
        }
    }

    /// The format-spec to hand to a formatter, if any
    pub fn format_spec(&self) -> Option<&'a str> {
        self.raw.filter(|_| self.has_argument())
    }
}
