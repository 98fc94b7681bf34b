//! Document templates for export mode
//!
//! A template file carries three sections introduced by marker lines
//! (`== page ==`, `== directory ==`, `== file ==`). Sections are rendered
//! with `${NAME}` substitution; unknown variables pass through untouched so
//! template authors notice a typo instead of losing output.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template is missing its '{0}' section")]
    MissingSection(&'static str),
}

/// The three render sections of an export template.
#[derive(Debug, Clone)]
pub struct Template {
    pub page: String,
    pub directory: String,
    pub file: String,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Split `text` into its marker-introduced sections. Content before the
    /// first marker and unknown sections are ignored.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut sections: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            if let Some(name) = section_marker(line) {
                sections.push((name.to_string(), String::new()));
            } else if let Some((_, body)) = sections.last_mut() {
                body.push_str(line);
                body.push('\n');
            }
        }

        let take = |name: &str| {
            sections
                .iter()
                .find(|(section, _)| section == name)
                .map(|(_, body)| body.trim_end_matches('\n').to_string())
        };

        Ok(Self {
            page: take("page").ok_or(TemplateError::MissingSection("page"))?,
            directory: take("directory").ok_or(TemplateError::MissingSection("directory"))?,
            file: take("file").ok_or(TemplateError::MissingSection("file"))?,
        })
    }

    /// The built-in HTML template used when no template path is configured.
    pub fn builtin() -> Self {
        Self {
            page: PAGE_TEMPLATE.to_string(),
            directory: DIRECTORY_TEMPLATE.to_string(),
            file: FILE_TEMPLATE.to_string(),
        }
    }
}

/// Recognize a `== name ==` marker line.
fn section_marker(line: &str) -> Option<&str> {
    let line = line.trim();
    let inner = line.strip_prefix("==")?.strip_suffix("==")?;
    let name = inner.trim();
    (!name.is_empty()).then_some(name)
}

/// Replace each `${NAME}` with its value; unknown variables stay as-is.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        let needle = format!("${{{name}}}");
        if out.contains(&needle) {
            out = out.replace(&needle, value);
        }
    }
    out
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>${TITLE}</title>
${CSS}
</head>
<body>
<h1>${TITLE}</h1>
<p>${INTROTEXT}</p>
<p>Root: <code>${TRAVERSALROOTDIR}</code></p>
${TREE}
<hr>
<p>${NDIRS} directories, ${NFILES} files (top level: ${LNDIRS}/${LNFILES}), status ${TERMINATIONCODE}</p>
<p>Generated ${GENERATED}</p>
<!-- criteria: ${CRITERIA} -->
</body>
</html>"#;

const DIRECTORY_TEMPLATE: &str = r#"<details open id="d${ID}">
<summary>${DIRNAME}/ <small>${NDIRS} dirs, ${NFILES} files</small></summary>
<div class="subtree">
${SUBDIRECTORY}
</div>
</details>"#;

const FILE_TEMPLATE: &str =
    r#"<div class="file" id="f${ID}">${FILENAME} <small>${SIZEH}, modified ${MODIFIED}</small></div>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_sections() {
        let text = "== page ==\nP ${TREE}\n== directory ==\nD ${DIRNAME}\n== file ==\nF ${FILENAME}\n";
        let template = Template::parse(text).unwrap();
        assert_eq!(template.page, "P ${TREE}");
        assert_eq!(template.directory, "D ${DIRNAME}");
        assert_eq!(template.file, "F ${FILENAME}");
    }

    #[test]
    fn missing_section_is_an_error() {
        let text = "== page ==\nP\n== directory ==\nD\n";
        assert!(matches!(
            Template::parse(text),
            Err(TemplateError::MissingSection("file"))
        ));
    }

    #[test]
    fn preamble_and_unknown_sections_are_ignored() {
        let text = "junk\n== notes ==\nignored\n== page ==\nP\n== directory ==\nD\n== file ==\nF\n";
        let template = Template::parse(text).unwrap();
        assert_eq!(template.page, "P");
    }

    #[test]
    fn fill_substitutes_and_keeps_unknowns() {
        let out = fill("${A} and ${B} and ${C}", &[("A", "1"), ("B", "2")]);
        assert_eq!(out, "1 and 2 and ${C}");
    }

    #[test]
    fn fill_replaces_every_occurrence() {
        assert_eq!(fill("${X}${X}", &[("X", "y")]), "yy");
    }

    #[test]
    fn builtin_template_has_the_core_variables() {
        let template = Template::builtin();
        assert!(template.page.contains("${TREE}"));
        assert!(template.page.contains("${TERMINATIONCODE}"));
        assert!(template.directory.contains("${SUBDIRECTORY}"));
        assert!(template.file.contains("${FILENAME}"));
    }
}
