// src/github/repo.rs
// =============================================================================
// The `owner/name` pair that identifies a repository.
//
// Operators type this in all sorts of ways, so we accept:
//   - owner/name
//   - https://github.com/owner/name
//   - github.com/owner/name.git
// and normalize them to one value.
// =============================================================================

use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

/// A GitHub repository, e.g. `rust-lang/rust`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Web URL of pull request `number` in this repository.
    pub fn pull_request_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/pull/{}", self.owner, self.name, number)
    }

    /// File name of the output table: `owner_name.csv`.
    pub fn output_file_name(&self) -> String {
        format!("{}_{}.csv", self.owner, self.name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        // Remove common prefixes
        let path = input
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.");
        let path = path.strip_prefix("github.com/").unwrap_or(path);
        let path = path.trim_end_matches('/');

        let parts: Vec<&str> = path.split('/').collect();
        let [owner, name] = parts.as_slice() else {
            return Err(anyhow!(
                "Invalid repository '{}': expected owner/name",
                input.trim()
            ));
        };

        let name = name.strip_suffix(".git").unwrap_or(name);
        if owner.is_empty() || name.is_empty() {
            return Err(anyhow!(
                "Invalid repository '{}': owner and name must not be empty",
                input.trim()
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_name() {
        let repo: RepoId = "rust-lang/rust".parse().unwrap();
        assert_eq!(repo.owner, "rust-lang");
        assert_eq!(repo.name, "rust");
        assert_eq!(repo.to_string(), "rust-lang/rust");
    }

    #[test]
    fn test_parse_github_url_forms() {
        for input in [
            "https://github.com/user/repo",
            "https://github.com/user/repo/",
            "http://www.github.com/user/repo.git",
            "github.com/user/repo",
            "  user/repo\n",
        ] {
            let repo: RepoId = input.parse().unwrap();
            assert_eq!(repo, RepoId { owner: "user".into(), name: "repo".into() }, "{input}");
        }
    }

    #[test]
    fn test_parse_invalid() {
        assert!("just-a-name".parse::<RepoId>().is_err());
        assert!("a/b/c".parse::<RepoId>().is_err());
        assert!("/repo".parse::<RepoId>().is_err());
        assert!("owner/".parse::<RepoId>().is_err());
        assert!("https://gitlab.com/user/repo".parse::<RepoId>().is_err());
        assert!("".parse::<RepoId>().is_err());
    }

    #[test]
    fn test_derived_names() {
        let repo: RepoId = "octo/widgets".parse().unwrap();
        assert_eq!(repo.pull_request_url(42), "https://github.com/octo/widgets/pull/42");
        assert_eq!(repo.output_file_name(), "octo_widgets.csv");
    }
}
