//! Challenge catalog loaded from content files.
//!
//! Each `.yaml`/`.yml` file holds one challenge, each `.json` file one
//! challenge. Files are read once; the catalog is immutable afterwards.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::challenge::Challenge;
use crate::error::{ContentError, Result};

/// Ordered, validated set of challenges.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    challenges: Vec<Challenge>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from already parsed challenges.
    pub fn from_challenges(challenges: Vec<Challenge>) -> Result<Self> {
        let mut index = HashMap::with_capacity(challenges.len());
        for (position, challenge) in challenges.iter().enumerate() {
            if index.insert(challenge.id.clone(), position).is_some() {
                return Err(ContentError::DuplicateChallenge(challenge.id.clone()));
            }
        }

        let catalog = Self { challenges, index };
        catalog.check()?;
        Ok(catalog)
    }

    /// Load every challenge file in a directory, sorted by file name.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| ContentError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| ContentError::Io {
                    path: dir.display().to_string(),
                    source,
                })?
                .path();
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml" | "json")
            ) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut challenges = Vec::with_capacity(paths.len());
        for path in &paths {
            let challenge = Self::load_file(path)?;
            debug!(id = %challenge.id, path = %path.display(), "Loaded challenge");
            challenges.push(challenge);
        }

        info!(count = challenges.len(), dir = %dir.display(), "Challenge catalog loaded");
        Self::from_challenges(challenges)
    }

    /// Parse a single challenge file.
    pub fn load_file(path: &Path) -> Result<Challenge> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: display.clone(),
            source,
        })?;

        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(|source| ContentError::Json {
                path: display,
                source,
            })
        } else {
            serde_yaml::from_str(&content).map_err(|source| ContentError::Yaml {
                path: display,
                source,
            })
        }
    }

    /// Look up a challenge by id.
    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.index.get(id).map(|&position| &self.challenges[position])
    }

    /// All challenges in load order.
    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    fn check(&self) -> Result<()> {
        for challenge in &self.challenges {
            for prerequisite in &challenge.prerequisites {
                if !self.index.contains_key(prerequisite) {
                    return Err(ContentError::UnknownPrerequisite {
                        challenge_id: challenge.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }

            for (step_index, step) in challenge.steps.iter().enumerate() {
                let Some(validation) = &step.validation else {
                    continue;
                };
                for (rule_index, rule) in validation.rules.iter().enumerate() {
                    if rule.hints().is_empty() {
                        return Err(ContentError::MissingHints {
                            challenge_id: challenge.id.clone(),
                            step: step_index,
                            rule: rule_index,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
