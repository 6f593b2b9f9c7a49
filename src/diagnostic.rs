//! Human-readable rendering of a [`Rejection`] against its source text.

use crate::error::Rejection;
use crate::whitelist::WHITELIST;
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<expression>";

/// Render to a `String`, with or without ANSI colors. Falls back to the bare
/// rejection message if the report cannot be written.
pub fn render_rejection(source: &str, rejection: &Rejection, color: bool) -> String {
    let mut buf = Vec::new();
    match write_rejection(source, rejection, &mut buf, color) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => {
            tracing::warn!("diagnostic report failed: {e}");
            rejection.to_string()
        }
    }
}

pub fn write_rejection(
    source: &str,
    rejection: &Rejection,
    writer: &mut dyn Write,
    color: bool,
) -> std::io::Result<()> {
    let span = rejection.span();
    let range = span.start.min(source.len())..span.end.min(source.len());

    let mut report = Report::build(ReportKind::Error, (SOURCE_ID, range.clone()))
        .with_message(rejection.to_string())
        .with_config(
            Config::default()
                .with_color(color)
                .with_index_type(IndexType::Byte),
        )
        .with_label(
            Label::new((SOURCE_ID, range))
                .with_message(label(rejection))
                .with_color(Color::Red),
        );
    if let Some(help) = help(rejection) {
        report = report.with_help(help);
    }
    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}

fn label(rejection: &Rejection) -> String {
    match rejection {
        Rejection::Syntax { .. } => "here".to_string(),
        Rejection::DisallowedName { name, .. } => format!("'{name}' is not available"),
        Rejection::DisallowedCall { name, .. } => format!("cannot call '{name}'"),
        Rejection::Unsupported { construct, .. } => format!("{construct} not allowed"),
        Rejection::ArityMismatch { expected, .. } => format!("expects {expected} argument(s)"),
    }
}

fn help(rejection: &Rejection) -> Option<String> {
    match rejection {
        Rejection::DisallowedName { .. } | Rejection::DisallowedCall { .. } => {
            let names: Vec<&str> = WHITELIST.iter().map(|(name, _)| *name).collect();
            Some(format!("available names: {}", names.join(", ")))
        }
        Rejection::Unsupported { .. } => {
            Some("use arithmetic, bitwise and shift operators on numbers and 't'".to_string())
        }
        Rejection::Syntax { .. } | Rejection::ArityMismatch { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;
    use crate::validator::validate;

    fn render(source: &str) -> String {
        let rejection = validate(source).unwrap_err();
        render_rejection(source, &rejection, false)
    }

    #[test]
    fn shows_source_and_message() {
        let out = render("t + foo");
        assert!(out.contains("Error"));
        assert!(out.contains("t + foo"));
        assert!(out.contains("use of name 'foo' is not allowed"));
        assert!(out.contains("available names: t, sin"));
    }

    #[test]
    fn syntax_errors_render() {
        let out = render("t +");
        assert!(out.contains("syntax error"));
    }

    #[test]
    fn non_ascii_source() {
        let out = render("é + t");
        assert!(out.contains("é + t"));
    }

    #[test]
    fn unsupported_constructs_get_help() {
        let out = render("t if 1 else 2");
        assert!(out.contains("conditional expression"));
        assert!(out.contains("Help"));
    }

    #[test]
    fn no_color_means_no_escapes() {
        assert!(!render("os.system(t)").contains('\u{1b}'));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_returned() {
        let rejection = validate("t + foo").unwrap_err();
        assert!(write_rejection("t + foo", &rejection, &mut Broken, false).is_err());
    }

    #[test]
    fn span_past_the_source_still_renders() {
        let rejection = Rejection::DisallowedName {
            name: "x".into(),
            span: Span::new(50, 60),
        };
        let out = render_rejection("t", &rejection, false);
        assert!(out.contains("use of name 'x' is not allowed"));
    }
}
