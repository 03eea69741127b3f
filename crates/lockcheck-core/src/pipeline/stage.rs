//! Stage identities and the plan a pipeline runs.

use std::fmt;

/// The four stages, in the only order they may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Locate,
    Parse,
    Verify,
    Fetch,
}

impl Stage {
    pub fn title(self) -> &'static str {
        match self {
            Stage::Locate => "Looking for package-lock.json",
            Stage::Parse => "Reading package-lock.json",
            Stage::Verify => "Verifying dependencies",
            Stage::Fetch => "Downloading packages",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A stage plus whether configuration turned it off. Decided before the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedStage {
    pub stage: Stage,
    pub skip: bool,
}

impl PlannedStage {
    pub fn run(stage: Stage) -> Self {
        Self { stage, skip: false }
    }

    pub fn skip_if(stage: Stage, skip: bool) -> Self {
        Self { stage, skip }
    }
}
