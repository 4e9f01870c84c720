//! Canned feedback messages.
//!
//! Each message is an ordered list of lines. How the lines are laid out on
//! screen is the renderer's business.

use serde::{Deserialize, Serialize};

/// Identifies one canned message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageId {
    /// The student has never run the plant in the dark.
    TryLightOff,
    /// Every trial so far was stopped almost immediately.
    TrialsTooShort,
    /// The student has never let the plant die.
    TryPlantDeath,
    /// The student has simulated plenty of days.
    MoveOn,
    /// Experiment wording: enough exploring, move on or ask the teacher.
    MoveOnOrAskTeacher,
    /// Experiment B: run four days lit, then switch the light off.
    TryFourWeeksOnThenOff,
}

impl MessageId {
    /// The message text, one entry per line.
    pub const fn lines(self) -> &'static [&'static str] {
        match self {
            Self::TryLightOff => &[
                "What happens to the plant when it gets no light?",
                "Try turning the light off while the simulation runs.",
            ],
            Self::TrialsTooShort => &[
                "Your runs have been very short.",
                "Let the simulation run for a while so you can see how glucose changes.",
            ],
            Self::TryPlantDeath => &[
                "Can you find a way to make the plant die?",
                "Watch the stored glucose line as you experiment.",
            ],
            Self::MoveOn => &[
                "You have run the model for a long time.",
                "You may be ready to move on to the next page.",
            ],
            Self::MoveOnOrAskTeacher => &[
                "You have explored the model quite a bit.",
                "Move on to the next page, or ask your teacher if you are stuck.",
            ],
            Self::TryFourWeeksOnThenOff => &[
                "Try running the model with the light on for 4 days,",
                "then turn the light off and see what happens.",
            ],
        }
    }
}

/// A selected feedback message, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    /// Which message was chosen.
    pub id: MessageId,
    /// Lines to show, in order.
    pub lines: Vec<String>,
    /// Number of completed trials when the message was chosen.
    pub trial_count: usize,
}

impl FeedbackMessage {
    /// Build the message for `id`.
    pub fn new(id: MessageId, trial_count: usize) -> Self {
        Self {
            id,
            lines: id.lines().iter().map(|line| (*line).to_owned()).collect(),
            trial_count,
        }
    }
}
