//! Narrative provider boundary
//!
//! Narrative prose (`what`/`why`/`guardrails`) comes from an external,
//! non-deterministic collaborator. The trait below is the whole boundary:
//! a provider receives only the declaration's name and source snippet and
//! returns prose. Deterministically collected metadata never crosses this
//! boundary in either direction; the signature makes that structural, not
//! a convention.

use crate::docblock::Narrative;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// External source of narrative prose for a declaration.
pub trait NarrativeProvider {
    /// Produce narrative content for the named declaration. `snippet` is the
    /// declaration's source text and nothing else.
    fn narrate(&self, declaration_name: &str, snippet: &str) -> Result<Narrative>;
}

/// A provider backed by a JSON file mapping declaration names to narratives:
///
/// ```json
/// { "resolve": { "what": "...", "why": "...", "guardrails": ["..."] } }
/// ```
///
/// This is the CLI's offline stand-in for a remote completion service.
pub struct FileNarrativeProvider {
    narratives: HashMap<String, Narrative>,
}

impl FileNarrativeProvider {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let narratives: HashMap<String, Narrative> = serde_json::from_str(&contents)
            .map_err(|e| Error::Narrative(format!("{}: {e}", path.display())))?;
        Ok(Self { narratives })
    }

    pub fn len(&self) -> usize {
        self.narratives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.narratives.is_empty()
    }
}

impl NarrativeProvider for FileNarrativeProvider {
    fn narrate(&self, declaration_name: &str, _snippet: &str) -> Result<Narrative> {
        self.narratives
            .get(declaration_name)
            .cloned()
            .ok_or_else(|| {
                Error::Narrative(format!("no narrative entry for '{declaration_name}'"))
            })
    }
}

/// A provider that returns the same narrative for every declaration.
/// Useful in tests and for single-declaration invocations.
pub struct FixedNarrativeProvider {
    narrative: Narrative,
}

impl FixedNarrativeProvider {
    pub fn new(narrative: Narrative) -> Self {
        Self { narrative }
    }
}

impl NarrativeProvider for FixedNarrativeProvider {
    fn narrate(&self, _declaration_name: &str, _snippet: &str) -> Result<Narrative> {
        Ok(self.narrative.clone())
    }
}
