use serde::{Deserialize, Serialize};

/// A single role in the candidate's work history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Experience {
    /// Flatten the record into one lowercased string for keyword scoring
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {} {}", self.role, self.company, self.impact);
        for h in &self.highlights {
            text.push(' ');
            text.push_str(h);
        }
        for s in &self.skills {
            text.push(' ');
            text.push_str(s);
        }
        text.to_lowercase()
    }

    /// Render the record as a single fact line for the prompt
    pub fn fact_line(&self) -> String {
        let mut line = format!("Experience: {} at {}.", self.role, self.company);
        if !self.highlights.is_empty() {
            line.push(' ');
            line.push_str(&self.highlights.join(" "));
        }
        if !self.impact.is_empty() {
            line.push_str(" Impact: ");
            line.push_str(&self.impact);
        }
        if !self.skills.is_empty() {
            line.push_str(" Skills: ");
            line.push_str(&self.skills.join(", "));
            line.push('.');
        }
        line
    }
}

/// A portfolio project with supporting evidence lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(rename = "skillsUsed", default)]
    pub skills_used: Vec<String>,
}

impl Project {
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.title, self.company);
        for e in &self.evidence {
            text.push(' ');
            text.push_str(e);
        }
        for s in &self.skills_used {
            text.push(' ');
            text.push_str(s);
        }
        text.to_lowercase()
    }

    pub fn fact_line(&self) -> String {
        let mut line = format!("Project: {}", self.title);
        if !self.company.is_empty() {
            line.push_str(&format!(" ({})", self.company));
        }
        line.push('.');
        if !self.evidence.is_empty() {
            line.push(' ');
            line.push_str(&self.evidence.join(" "));
        }
        line
    }
}

/// Per-bucket sentence banks for locally chosen lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketPhrases {
    #[serde(default)]
    pub strong_fit: Vec<String>,
    #[serde(default)]
    pub good_fit: Vec<String>,
    #[serde(default)]
    pub stretch_fit: Vec<String>,
    #[serde(default)]
    pub exploratory_fit: Vec<String>,
}

impl BucketPhrases {
    pub fn for_bucket(&self, bucket: crate::models::FitBucket) -> &[String] {
        use crate::models::FitBucket::*;
        match bucket {
            StrongFit => &self.strong_fit,
            GoodFit => &self.good_fit,
            StretchFit => &self.stretch_fit,
            ExploratoryFit => &self.exploratory_fit,
        }
    }
}

/// Optional tone and rule configuration carried on the profile
///
/// Everything here is optional; built-in defaults apply when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneConfig {
    #[serde(default)]
    pub quick_takes: Option<BucketPhrases>,
    #[serde(default)]
    pub closings: Option<BucketPhrases>,
    /// Closing used when the posting is consulting/contract work
    #[serde(default)]
    pub consulting_closing: Option<String>,
    #[serde(default)]
    pub quote_min: Option<usize>,
    #[serde(default)]
    pub quote_max: Option<usize>,
    #[serde(default)]
    pub quote_max_words: Option<usize>,
    #[serde(default)]
    pub forbidden_phrases: Vec<String>,
    /// Evidence citation rules injected verbatim into the prompt
    #[serde(default)]
    pub citation_rules: Option<String>,
    #[serde(default)]
    pub provenance_softeners: Vec<String>,
}

/// The static, read-only professional profile
///
/// Owned by the external profile store; this subsystem never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tone: Option<ToneConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_searchable_text_is_lowercase() {
        let exp = Experience {
            company: "Karolinska".to_string(),
            role: "UX Researcher".to_string(),
            highlights: vec!["Led User Interviews".to_string()],
            impact: "Cut errors".to_string(),
            skills: vec!["Figma".to_string()],
        };

        let text = exp.searchable_text();
        assert!(text.contains("ux researcher"));
        assert!(text.contains("user interviews"));
        assert!(text.contains("figma"));
        assert_eq!(text, text.to_lowercase());
    }

    #[test]
    fn test_project_fact_line() {
        let project = Project {
            title: "Patient portal redesign".to_string(),
            company: "Region Stockholm".to_string(),
            evidence: vec!["Redesigned triage flows for 2M patients.".to_string()],
            skills_used: vec![],
        };

        let line = project.fact_line();
        assert!(line.starts_with("Project: Patient portal redesign (Region Stockholm)."));
        assert!(line.contains("triage flows"));
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let profile: CandidateProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.experiences.is_empty());
        assert!(profile.projects.is_empty());
        assert!(profile.tone.is_none());
    }
}
