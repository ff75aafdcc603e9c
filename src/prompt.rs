//! Prompt templates and the role/adjective vocabulary injected into them.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::Config;

const SYSTEM_RULES: &str = include_str!("../assets/prompts/system_common.txt");
const RECRUITING_INVITE: &str = include_str!("../assets/prompts/recruiting_invite.txt");
const JOB_APPLICATION: &str = include_str!("../assets/prompts/job_application.txt");
const ONBOARDING: &str = include_str!("../assets/prompts/onboarding.txt");
const DEFAULT_VOCABULARY: &str = include_str!("../assets/vocabulary.yaml");

pub const PRESETS: [&str; 3] = ["recruiting_invite", "job_application", "onboarding"];

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("unknown prompt preset {0:?} (expected one of recruiting_invite, job_application, onboarding)")]
    UnknownPreset(String),
    #[error("I/O error reading vocabulary: {0}")]
    Io(#[from] std::io::Error),
    #[error("vocabulary YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("vocabulary list `{0}` is empty")]
    EmptyVocabulary(&'static str),
}

/// System instruction plus a user prompt with `{role}` and `{adjective}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    pub fn preset(name: &str) -> Result<Self, PromptError> {
        let (persona, user) = match name {
            "recruiting_invite" => ("a recruiting email generator", RECRUITING_INVITE),
            "job_application" => ("a job candidate email generator", JOB_APPLICATION),
            "onboarding" => ("an HR email generator", ONBOARDING),
            other => return Err(PromptError::UnknownPreset(other.to_string())),
        };
        Ok(Self {
            name: name.to_string(),
            system: format!("You are {}. {}", persona, SYSTEM_RULES.trim()),
            user: user.to_string(),
        })
    }

    /// The configured preset with any `prompt.system` / `prompt.user` overrides applied.
    pub fn from_config(cfg: &Config) -> Result<Self, PromptError> {
        let mut template = Self::preset(&cfg.prompt.preset)?;
        if let Some(system) = &cfg.prompt.system {
            template.system = system.clone();
        }
        if let Some(user) = &cfg.prompt.user {
            template.user = user.clone();
        }
        Ok(template)
    }

    pub fn render(&self, role: &str, adjective: &str) -> String {
        self.user
            .replace("{role}", role)
            .replace("{adjective}", adjective)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vocabulary {
    pub roles: Vec<String>,
    pub adjectives: Vec<String>,
}

impl Vocabulary {
    pub fn builtin() -> Result<Self, PromptError> {
        Self::from_yaml(DEFAULT_VOCABULARY)
    }

    pub fn load(path: &Path) -> Result<Self, PromptError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    pub fn from_config(cfg: &Config) -> Result<Self, PromptError> {
        match &cfg.vocabulary.file {
            Some(file) => Self::load(Path::new(file)),
            None => Self::builtin(),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, PromptError> {
        let mut vocab: Vocabulary = serde_yaml::from_str(content)?;
        vocab.roles.retain(|r| !r.trim().is_empty());
        vocab.adjectives.retain(|a| !a.trim().is_empty());
        vocab.validate()?;
        Ok(vocab)
    }

    fn validate(&self) -> Result<(), PromptError> {
        if self.roles.is_empty() {
            return Err(PromptError::EmptyVocabulary("roles"));
        }
        if self.adjectives.is_empty() {
            return Err(PromptError::EmptyVocabulary("adjectives"));
        }
        Ok(())
    }

    /// Uniformly pick one role and one adjective.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> (&str, &str) {
        let role = self.roles.choose(rng).map(String::as_str).unwrap_or_default();
        let adjective = self.adjectives.choose(rng).map(String::as_str).unwrap_or_default();
        (role, adjective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn presets_exist_and_fill_slots() {
        for name in PRESETS {
            let t = PromptTemplate::preset(name).unwrap();
            assert!(t.system.contains("SUBJECT, BODY, TONE, INTENT"));
            let rendered = t.render("Welder", "diligent");
            assert!(rendered.contains("Welder"), "{name} should mention the role");
            assert!(!rendered.contains("{role}"));
            assert!(!rendered.contains("{adjective}"));
        }
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            PromptTemplate::preset("cover_letter"),
            Err(PromptError::UnknownPreset(_))
        ));
    }

    #[test]
    fn config_overrides_replace_preset_text() {
        let mut cfg: Config = serde_yaml::from_str(crate::config::example()).unwrap();
        cfg.prompt.preset = "onboarding".into();
        cfg.prompt.user = Some("Write to a new {adjective} {role}.".into());
        let t = PromptTemplate::from_config(&cfg).unwrap();
        assert_eq!(t.name, "onboarding");
        assert!(t.system.starts_with("You are an HR email generator."));
        assert_eq!(t.render("Pilot", "calm"), "Write to a new calm Pilot.");
    }

    #[test]
    fn builtin_vocabulary_loads() {
        let v = Vocabulary::builtin().unwrap();
        assert!(v.roles.iter().any(|r| r == "Software Engineer"));
        assert!(v.adjectives.iter().any(|a| a == "passionate"));
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let err = Vocabulary::from_yaml("roles: []\nadjectives: [calm]\n").unwrap_err();
        assert!(matches!(err, PromptError::EmptyVocabulary("roles")));
        let err = Vocabulary::from_yaml("roles: [Chef]\nadjectives: []\n").unwrap_err();
        assert!(matches!(err, PromptError::EmptyVocabulary("adjectives")));
    }

    #[test]
    fn blank_entries_are_dropped() {
        let v = Vocabulary::from_yaml("roles: ['', Chef, '  ']\nadjectives: [calm, '']\n").unwrap();
        assert_eq!(v.roles, vec!["Chef"]);
        assert_eq!(v.adjectives, vec!["calm"]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(v.pick(&mut rng), ("Chef", "calm"));
        }
        let err = Vocabulary::from_yaml("roles: ['  ']\nadjectives: [calm]\n").unwrap_err();
        assert!(matches!(err, PromptError::EmptyVocabulary("roles")));
    }

    #[test]
    fn pick_is_reproducible_with_a_seed() {
        let v = Vocabulary::builtin().unwrap();
        let a: Vec<(String, String)> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..5).map(|_| { let (r, a) = v.pick(&mut rng); (r.to_string(), a.to_string()) }).collect()
        };
        let b: Vec<(String, String)> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..5).map(|_| { let (r, a) = v.pick(&mut rng); (r.to_string(), a.to_string()) }).collect()
        };
        assert_eq!(a, b);
        assert!(v.roles.contains(&a[0].0));
    }
}
