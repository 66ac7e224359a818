use serde::{Deserialize, Serialize};

/// Value of [`Task::correct_choice`] when no choice is marked correct.
pub const NO_CORRECT_CHOICE: i64 = -1;

// ---------------------------------------------------------------------------
// ContentPack - one playable quiz after transformation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPack {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub question_text: String,
    pub audio_url: Option<String>,
    /// Index into `choices`, or [`NO_CORRECT_CHOICE`].
    pub correct_choice: i64,
    pub choices: Vec<TaskChoice>,
}

impl Task {
    /// The correct choice index, if the task has one.
    pub fn correct_index(&self) -> Option<usize> {
        usize::try_from(self.correct_choice).ok()
    }

    /// Whether selecting `index` answers the task correctly. A task without a
    /// correct choice never matches.
    pub fn is_correct_choice(&self, index: usize) -> bool {
        self.correct_index() == Some(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskChoice {
    pub id: i64,
    pub text: String,
    pub image_url: Option<String>,
    pub is_correct: bool,
}

// ---------------------------------------------------------------------------
// PackSummary - menu entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSummary {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(rename = "questionsCount")]
    pub questions_count: usize,
    pub is_free: bool,
    pub is_purchased: bool,
}
