//! Pipeline stages, worker roles and the static tables that bind them
//!
//! Every stage is served by exactly one role and queues at a fixed priority.
//! Lower priority numbers are served first: work closest to release jumps the
//! queue ahead of fresh work.
//!
//! | Stage      | Role             | Priority |
//! |------------|------------------|----------|
//! | Release    | Developer        | 0        |
//! | Regression | Developer        | 1        |
//! | Rework     | Developer        | 2        |
//! | Test       | Tester           | 3        |
//! | SmokeTest  | BusinessAnalyst  | 3        |
//! | Develop    | Developer        | 4        |
//! | Backlog    | Developer        | 5        |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A class of worker with a fixed headcount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Developer,
    Tester,
    BusinessAnalyst,
}

impl Role {
    /// All roles in reporting order
    pub const ALL: [Role; 3] = [Role::Developer, Role::Tester, Role::BusinessAnalyst];

    /// Dense index for array-backed tables
    pub fn index(self) -> usize {
        match self {
            Role::Developer => 0,
            Role::Tester => 1,
            Role::BusinessAnalyst => 2,
        }
    }

    /// Plural label used in reports
    pub fn label(self) -> &'static str {
        match self {
            Role::Developer => "Developers",
            Role::Tester => "Testers",
            Role::BusinessAnalyst => "Business Analysts",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One step of the delivery pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Backlog,
    Develop,
    SmokeTest,
    Test,
    Rework,
    Regression,
    Release,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 7] = [
        Stage::Backlog,
        Stage::Develop,
        Stage::SmokeTest,
        Stage::Test,
        Stage::Rework,
        Stage::Regression,
        Stage::Release,
    ];

    /// Dense index for array-backed tables
    pub fn index(self) -> usize {
        match self {
            Stage::Backlog => 0,
            Stage::Develop => 1,
            Stage::SmokeTest => 2,
            Stage::Test => 3,
            Stage::Rework => 4,
            Stage::Regression => 5,
            Stage::Release => 6,
        }
    }

    /// Role whose pool serves this stage
    pub fn role(self) -> Role {
        match self {
            Stage::Test => Role::Tester,
            Stage::SmokeTest => Role::BusinessAnalyst,
            Stage::Backlog
            | Stage::Develop
            | Stage::Rework
            | Stage::Regression
            | Stage::Release => Role::Developer,
        }
    }

    /// Queueing priority (lower is served first)
    pub fn priority(self) -> u8 {
        match self {
            Stage::Release => 0,
            Stage::Regression => 1,
            Stage::Rework => 2,
            Stage::Test | Stage::SmokeTest => 3,
            Stage::Develop => 4,
            Stage::Backlog => 5,
        }
    }

    /// Display name, matching the keys of the `durations` config map
    pub fn name(self) -> &'static str {
        match self {
            Stage::Backlog => "Backlog",
            Stage::Develop => "Develop",
            Stage::SmokeTest => "SmokeTest",
            Stage::Test => "Test",
            Stage::Rework => "Rework",
            Stage::Regression => "Regression",
            Stage::Release => "Release",
        }
    }

    /// Whether time spent in service here counts as value-adding
    ///
    /// Backlog time is part of lead time but not of active time.
    pub fn counts_as_active(self) -> bool {
        self != Stage::Backlog
    }

    /// Stages followed by a pass/fail draw
    pub fn is_test_gate(self) -> bool {
        matches!(self, Stage::Test | Stage::SmokeTest)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One instruction in a work item's program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Queue for, hold and release the stage's resource
    Visit(Stage),
    /// Pass through the WIP admission gate
    Admit,
    /// Draw for failure of the given test gate; on failure detour through
    /// Rework and one retest
    ReworkCheck(Stage),
    /// Leave the system
    Complete,
}

/// Which stage layout the run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pipeline {
    /// Develop, Test, Regression, Release
    Standard,
    /// Adds a business-analyst smoke test between Develop and Test
    SmokeTested,
}

const STANDARD_PROGRAM: &[Step] = &[
    Step::Visit(Stage::Backlog),
    Step::Admit,
    Step::Visit(Stage::Develop),
    Step::Visit(Stage::Test),
    Step::ReworkCheck(Stage::Test),
    Step::Visit(Stage::Regression),
    Step::Visit(Stage::Release),
    Step::Complete,
];

const SMOKE_TESTED_PROGRAM: &[Step] = &[
    Step::Visit(Stage::Backlog),
    Step::Admit,
    Step::Visit(Stage::Develop),
    Step::Visit(Stage::SmokeTest),
    Step::ReworkCheck(Stage::SmokeTest),
    Step::Visit(Stage::Test),
    Step::ReworkCheck(Stage::Test),
    Step::Visit(Stage::Regression),
    Step::Visit(Stage::Release),
    Step::Complete,
];

impl Pipeline {
    /// The nominal step sequence every work item follows
    pub fn program(self) -> &'static [Step] {
        match self {
            Pipeline::Standard => STANDARD_PROGRAM,
            Pipeline::SmokeTested => SMOKE_TESTED_PROGRAM,
        }
    }

    /// Stages this pipeline can visit, in order
    pub fn stages(self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.uses(*stage))
            .collect()
    }

    /// Whether the pipeline ever visits `stage`
    pub fn uses(self, stage: Stage) -> bool {
        match stage {
            Stage::SmokeTest => self == Pipeline::SmokeTested,
            _ => true,
        }
    }

    /// Roles whose pools the pipeline needs
    pub fn roles(self) -> Vec<Role> {
        let mut roles = vec![Role::Developer, Role::Tester];
        if self == Pipeline::SmokeTested {
            roles.push(Role::BusinessAnalyst);
        }
        roles
    }
}
