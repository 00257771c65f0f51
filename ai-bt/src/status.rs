#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of executing a node for one frame.
///
/// `Invalid` doubles as the "never ticked / was reset" sentinel stored in fresh contexts.
/// `Running` and `Breaking` are ordinary return values: a running node is simply polled again on
/// the next frame, and a breaking node pauses descent until the debugger resumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Status {
    #[default]
    Invalid = 0,
    Success = 1,
    Failure = 2,
    Running = 3,
    Breaking = 4,
}

impl Status {
    /// Stable integer code used in status notifications.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Status::Invalid),
            1 => Some(Status::Success),
            2 => Some(Status::Failure),
            3 => Some(Status::Running),
            4 => Some(Status::Breaking),
            _ => None,
        }
    }

    /// `Success` or `Failure`: the run that produced it is over.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for status in [
            Status::Invalid,
            Status::Success,
            Status::Failure,
            Status::Running,
            Status::Breaking,
        ] {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::from_code(9), None);
    }

    #[test]
    fn only_success_and_failure_are_terminal() {
        assert!(Status::Success.is_terminal());
        assert!(Status::Failure.is_terminal());
        assert!(!Status::Running.is_terminal());
        assert!(!Status::Breaking.is_terminal());
        assert!(!Status::Invalid.is_terminal());
    }
}
