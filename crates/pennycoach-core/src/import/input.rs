use std::fs;
use std::io::{IsTerminal, Read};

use crate::import::invalid_input_error;
use crate::{CoachError, CoachResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: Option<String>,
    pub(crate) content: String,
}

/// A path of `-` reads stdin; `stdin_override` stands in for stdin in tests.
pub(crate) fn resolve_source(
    path: &str,
    stdin_override: Option<String>,
) -> CoachResult<ResolvedSource> {
    if path == "-" {
        let Some(stdin_value) = read_stdin(stdin_override)? else {
            return Err(invalid_input_error(
                "Path `-` means stdin input, but stdin was empty. Pipe CSV input or pass a file path.",
            ));
        };
        return Ok(ResolvedSource {
            source_kind: SourceKind::Stdin,
            source_ref: None,
            content: stdin_value,
        });
    }

    let file_body = fs::read_to_string(path).map_err(|error| {
        CoachError::invalid_argument_with_recovery(
            &format!("Could not read import file `{path}`: {error}"),
            vec![
                "Verify the path exists and is readable.".to_string(),
                "Rerun pennycoach import <path>.".to_string(),
            ],
        )
    })?;

    Ok(ResolvedSource {
        source_kind: SourceKind::File,
        source_ref: Some(path.to_string()),
        content: file_body,
    })
}

fn read_stdin(stdin_override: Option<String>) -> CoachResult<Option<String>> {
    if let Some(value) = stdin_override {
        return Ok(Some(value).filter(|body| !body.trim().is_empty()));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| {
            CoachError::invalid_argument_with_recovery(
                &format!("Could not read stdin: {error}"),
                vec![
                    "Retry with an explicit file path argument.".to_string(),
                    "Or rerun with valid stdin content.".to_string(),
                ],
            )
        })?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(buffer))
}
