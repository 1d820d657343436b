// SPDX-License-Identifier: MIT

//! Daily prompt model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of response a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PromptType {
    Written,
    Upload,
    Snapshot,
}

impl PromptType {
    /// Interpret a stored prompt type string.
    ///
    /// Unknown values degrade to `Written` rather than failing; old
    /// documents may carry types this build doesn't know about.
    pub fn parse_or_written(raw: &str) -> Self {
        match raw {
            "UPLOAD" => PromptType::Upload,
            "SNAPSHOT" => PromptType::Snapshot,
            _ => PromptType::Written,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::Written => "WRITTEN",
            PromptType::Upload => "UPLOAD",
            PromptType::Snapshot => "SNAPSHOT",
        }
    }
}

/// A daily prompt stored in the `prompts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPrompt {
    /// Prompt ID (also used as document ID)
    pub id: String,
    /// The question/task text
    pub text: String,
    /// Secondary line shown under the prompt
    pub subtext: String,
    /// Calendar day the prompt is served (YYYY-MM-DD)
    pub date: NaiveDate,
    /// One of WRITTEN / UPLOAD / SNAPSHOT
    pub prompt_type: String,
}

impl DailyPrompt {
    pub fn prompt_type(&self) -> PromptType {
        PromptType::parse_or_written(&self.prompt_type)
    }
}
