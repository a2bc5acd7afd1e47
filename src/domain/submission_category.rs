/// The kinds of submission the share form accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionCategory {
    Template,
    Screenshot,
    Story,
}

impl SubmissionCategory {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "template" => Ok(Self::Template),
            "screenshot" => Ok(Self::Screenshot),
            "story" => Ok(Self::Story),
            other => Err(format!("{other} is not a supported submission type.")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Screenshot => "screenshot",
            Self::Story => "story",
        }
    }
}

impl std::fmt::Display for SubmissionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
