use serde::{Deserialize, Serialize};

/// Inclusive range of table numbers a question may be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: u32,
    pub max: u32,
}

impl NumberRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// A single arithmetic fact presented to the player.
///
/// For multiplication `operand_a × operand_b = correct_answer`.
/// For division `operand_a ÷ operand_b = correct_answer`, where `operand_a`
/// is the product the question was built from, so the division is always exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub operand_a: u32,
    pub operand_b: u32,
    pub correct_answer: u32,
    pub is_division: bool,
    /// Fact family the question was drawn from; this is what gets credited
    /// in the player's completed tables.
    pub table: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<u32>,
}

impl Question {
    pub fn prompt(&self) -> String {
        let sign = if self.is_division { '÷' } else { '×' };
        format!("{} {} {} = ?", self.operand_a, sign, self.operand_b)
    }

    pub fn is_multiple_choice(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Question as sent to the client: the answer stays on the server.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionPrompt {
    pub prompt: String,
    pub operand_a: u32,
    pub operand_b: u32,
    pub is_division: bool,
    pub table: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<u32>,
}

impl From<&Question> for QuestionPrompt {
    fn from(question: &Question) -> Self {
        Self {
            prompt: question.prompt(),
            operand_a: question.operand_a,
            operand_b: question.operand_b,
            is_division: question.is_division,
            table: question.table,
            options: question.options.clone(),
        }
    }
}

/// One row of a learning-mode table listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFact {
    pub multiplier: u32,
    pub result: u32,
}
