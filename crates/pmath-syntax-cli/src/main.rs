use anyhow::{Context, Result, bail};
use pmath_syntax::{
    Diagnostic, ParseHooks, SourceMap, SyntaxNode, build_tree, from_units, materialize, parse,
    to_units,
};
use pmath_syntax_config::{Config, Show};
use std::fmt::Write as _;
use std::io::{BufRead, StdinLock};
use std::{env, io, path::PathBuf, process};

struct Args {
    show: Option<Show>,
    quiet: bool,
    raw: bool,
    file: Option<PathBuf>,
}

const USAGE: &str = "Usage: pmath-syntax [--spans|--boxes|--tree] [--quiet] [--raw] [FILE]";

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        show: None,
        quiet: false,
        raw: false,
        file: None,
    };
    for arg in args {
        match arg.as_str() {
            "--spans" => parsed.show = Some(Show::Spans),
            "--boxes" => parsed.show = Some(Show::Boxes),
            "--tree" => parsed.show = Some(Show::Tree),
            "--quiet" => parsed.quiet = true,
            "--raw" => parsed.raw = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if parsed.file.is_some() => bail!("only one input file is supported"),
            path => parsed.file = Some(PathBuf::from(path)),
        }
    }
    Ok(parsed)
}

/// Prints diagnostics as `line:column: severity: message` and feeds further
/// stdin lines to the parser when a statement is incomplete.
struct Session<'a> {
    stdin: Option<StdinLock<'a>>,
    /// Line number of the first line of the current statement.
    first_line: usize,
    lines_read: usize,
}

impl Session<'_> {
    fn next_line(&mut self) -> Option<String> {
        let stdin = self.stdin.as_mut()?;
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                self.lines_read += 1;
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Some(line)
            }
            Err(e) => {
                log::warn!("failed to read stdin: {e}");
                None
            }
        }
    }
}

impl ParseHooks for Session<'_> {
    fn read_line(&mut self) -> Option<String> {
        log::debug!("statement incomplete, reading another line");
        self.next_line()
    }

    fn syntax_error(&mut self, text: &[u16], diagnostic: &Diagnostic) {
        let at = SourceMap::new(text).line_column(diagnostic.position);
        eprintln!(
            "{}:{}: {}: {}",
            self.first_line + at.line - 1,
            at.column + 1,
            diagnostic.severity,
            diagnostic.kind
        );
    }
}

fn format_tree(node: &SyntaxNode, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    let _ = writeln!(out, "{prefix}{:?}@{:?}", node.kind(), node.text_range());
    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => format_tree(&n, indent + 1, out),
            rowan::NodeOrToken::Token(t) => {
                let _ = writeln!(out, "{prefix}  {:?}@{:?} {:?}", t.kind(), t.text_range(), t.text());
            }
        }
    }
}

/// Parse one chunk of input and render it. Returns whether a critical error
/// occurred.
fn run_one(text: &str, session: &mut Session<'_>, config: &Config) -> (String, bool) {
    let mut units = to_units(text);
    let result = parse(&mut units, session, &config.parse_options());
    if result.aborted {
        log::info!("parse cancelled");
    }

    let output = match config.show {
        Show::Spans => result.spans.dump(&units),
        Show::Boxes => {
            materialize(&result.spans, &units, &config.group_options(), &mut ()).to_string()
        }
        Show::Tree => {
            let mut out = String::new();
            format_tree(&build_tree(&result.spans, &units), 0, &mut out);
            out
        }
    };
    log::debug!("parsed {} units: {:?}", units.len(), from_units(&units));
    (output.trim_end().to_string(), result.has_critical_error)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    let mut config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            log::warn!("ignoring config file: {e}");
            Config::default()
        }
    };
    if let Some(show) = args.show {
        config.show = show;
    }
    config.quiet |= args.quiet;
    if args.raw {
        config.parseable = false;
    }

    let mut failed = false;
    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut session = Session {
            stdin: None,
            first_line: 1,
            lines_read: 0,
        };
        let (output, critical) = run_one(&content, &mut session, &config);
        println!("{output}");
        failed = critical;
    } else {
        let mut session = Session {
            stdin: Some(io::stdin().lock()),
            first_line: 1,
            lines_read: 0,
        };
        while let Some(line) = session.next_line() {
            session.first_line = session.lines_read;
            let (output, critical) = run_one(&line, &mut session, &config);
            println!("{output}");
            failed |= critical;
        }
    }

    if failed {
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(ToString::to_string))
    }

    fn file_session() -> Session<'static> {
        Session {
            stdin: None,
            first_line: 1,
            lines_read: 0,
        }
    }

    #[test]
    fn flags_and_file_are_recognised() {
        let parsed = args(&["--tree", "--raw", "input.pmath"]).unwrap();
        assert_eq!(parsed.show, Some(Show::Tree));
        assert!(parsed.raw);
        assert!(!parsed.quiet);
        assert_eq!(parsed.file, Some(PathBuf::from("input.pmath")));
    }

    #[test]
    fn unknown_flags_and_extra_files_are_rejected() {
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a.pmath", "b.pmath"]).is_err());
    }

    #[test]
    fn boxes_are_the_default_output() {
        let (output, critical) = run_one("1+2*3", &mut file_session(), &Config::default());
        assert!(!critical);
        assert_eq!(output, r#"{"1", "+", {"2", "*", "3"}}"#);
    }

    #[test]
    fn spans_output_is_the_dump() {
        let config = Config {
            show: Show::Spans,
            ..Config::default()
        };
        let (output, _) = run_one("a+b", &mut file_session(), &config);
        assert_eq!(output, "a+b\n+|+\n0..2");
    }

    #[test]
    fn tree_output_starts_at_the_root() {
        let config = Config {
            show: Show::Tree,
            ..Config::default()
        };
        let (output, _) = run_one("f(x)", &mut file_session(), &config);
        assert!(output.starts_with("ROOT@0..4\n  SPAN@0..4"), "{output}");
    }

    #[test]
    fn critical_errors_are_reported() {
        let config = Config {
            quiet: true,
            ..Config::default()
        };
        let (_, critical) = run_one("(1+2", &mut file_session(), &config);
        assert!(critical);
    }
}
