use serde::{Deserialize, Serialize};

use crate::exit_codes;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
}

/// A version passes when every one of its checkpoints passed.
pub fn classify_checkpoints<I>(checkpoints: I) -> Outcome
where
    I: IntoIterator<Item = bool>,
{
    if checkpoints.into_iter().all(|passed| passed) {
        Outcome::Pass
    } else {
        Outcome::Fail
    }
}

/// A run passes when every version passed.
pub fn classify_run<I>(versions: I) -> Outcome
where
    I: IntoIterator<Item = Outcome>,
{
    classify_checkpoints(versions.into_iter().map(|outcome| outcome == Outcome::Pass))
}

pub fn exit_code(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Pass => exit_codes::OK,
        Outcome::Fail => exit_codes::MISMATCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_when_all_checkpoints_pass() {
        assert_eq!(classify_checkpoints([true, true, true]), Outcome::Pass);
    }

    #[test]
    fn fail_when_any_checkpoint_fails() {
        assert_eq!(classify_checkpoints([true, false, true]), Outcome::Fail);
    }

    #[test]
    fn run_fails_with_one_failed_version() {
        let outcome = classify_run([Outcome::Pass, Outcome::Fail]);
        assert_eq!(outcome, Outcome::Fail);
        assert_eq!(exit_code(outcome), exit_codes::MISMATCH);
        assert_eq!(exit_code(classify_run([Outcome::Pass])), exit_codes::OK);
    }
}
