//! # Prompt Templates
//!
//! The fixed template catalog. Git templates embed `$(git ...)` substitutions,
//! file templates embed the `$(files)` token.

use std::fmt;

/// Which source a prompt is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    File,
    Git,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptKind::File => write!(f, "file"),
            PromptKind::Git => write!(f, "git"),
        }
    }
}

pub struct Template {
    pub name: &'static str,
    pub body: &'static str,
}

const GIT_TEMPLATES: &[Template] = &[
    Template {
        name: "Code Review",
        body: "Please review this diff and provide feedback:\n\n$(git diff --cached)\n\nFocus on:\n- Code quality\n- Security issues\n- Performance considerations",
    },
    Template {
        name: "Commit Message",
        body: "Generate a concise commit message for the following staged changes:\n```\n$(git diff --cached)\n```\n\nFollow the format used in recent commits:\n```\n$(git log -n 3 --pretty=format:%s)\n```\n\nFormat: type(scope): description\n\nOnly return the commit message in plain text. Do not include explanations or comments.",
    },
    Template {
        name: "Change Summary",
        body: "Summarize the changes in this commit:\n\n$(git log --oneline -1)\n$(git diff HEAD~1)",
    },
    Template {
        name: "Custom...",
        body: "$(git diff --cached)",
    },
];

const FILE_TEMPLATES: &[Template] = &[
    Template {
        name: "Code Review",
        body: "Please review this code and provide feedback:\n\n$(files)\n\nFocus on:\n- Code quality\n- Best practices\n- Potential issues",
    },
    Template {
        name: "Documentation",
        body: "Generate documentation for this code:\n\n$(files)\n\nInclude:\n- Function descriptions\n- Usage examples\n- Parameters and return values",
    },
    Template {
        name: "Custom...",
        body: "Please add your prompt with $(files)",
    },
];

impl PromptKind {
    pub fn templates(self) -> &'static [Template] {
        match self {
            PromptKind::File => FILE_TEMPLATES,
            PromptKind::Git => GIT_TEMPLATES,
        }
    }

    /// Template names in display order.
    pub fn template_names(self) -> Vec<String> {
        self.templates().iter().map(|t| t.name.to_string()).collect()
    }

    /// Body for `name`, or `""` when the name is not in this kind's catalog.
    pub fn template_body(self, name: &str) -> &'static str {
        self.templates()
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.body)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names() {
        assert_eq!(
            PromptKind::Git.template_names(),
            vec!["Code Review", "Commit Message", "Change Summary", "Custom..."]
        );
        assert_eq!(
            PromptKind::File.template_names(),
            vec!["Code Review", "Documentation", "Custom..."]
        );
    }

    #[test]
    fn test_same_name_resolves_per_kind() {
        assert!(PromptKind::Git.template_body("Code Review").contains("$(git diff --cached)"));
        assert!(PromptKind::File.template_body("Code Review").contains("$(files)"));
    }

    #[test]
    fn test_unknown_name_is_empty() {
        assert_eq!(PromptKind::File.template_body("Commit Message"), "");
        assert_eq!(PromptKind::Git.template_body("nope"), "");
    }
}
