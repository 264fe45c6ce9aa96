//! cssval - CSS checker
//!
//! Usage: cssval [OPTIONS] [FILE]

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use serde_json::json;
use thiserror::Error;

use cssval_css::{
    extract_urls, parse_a_stylesheet, parse_media_queries, tokenize, BlockType, CssError,
    ParsingConfig, ToJson, JSON_KEY_PRIORITY,
};
use cssval_testutil::{make_json_key_cmp_fn, render_json};
use cssval_validator::{parsing_config, validate_keyframes_css};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Css(#[from] CssError),

    #[error("{0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Version,
    Check(Options),
}

#[derive(Debug, PartialEq)]
struct Options {
    /// File to read; stdin when absent or "-"
    path: Option<String>,
    config: ParsingConfig,
    keyframes: bool,
    urls: bool,
    media: bool,
    json: bool,
    line: usize,
    col: usize,
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("cssval");

    let command = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try '{} --help' for more information.", program);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            print_usage(program);
            ExitCode::SUCCESS
        }
        Command::Version => {
            println!("cssval {}", VERSION);
            ExitCode::SUCCESS
        }
        Command::Check(options) => match run(&options) {
            Ok(0) => ExitCode::SUCCESS,
            Ok(count) => {
                log::info!("{} problems found", count);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn print_usage(program: &str) {
    println!(
        r#"cssval {} - CSS tokenizer, parser and validator

USAGE:
    {} [OPTIONS] [FILE]

Reads FILE, or stdin when FILE is absent or "-".

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --keyframes             Validate as a keyframes-only stylesheet
    --amp                   Use the AMP at-rule parsing config
    --config <PATH>         Load the at-rule parsing config from JSON
    --at-rule <NAME=TYPE>   Parse the block of @NAME as TYPE (repeatable)
    --default <TYPE>        Block type for at-rules not configured
    --urls                  Extract the URLs referenced by declarations
    --media                 Check @media queries
    --json                  Print the stylesheet and diagnostics as JSON
    --line <N>              Line number of the first line (default 1)
    --col <N>               Column of the first character (default 0)

TYPE is one of PARSE_AS_RULES, PARSE_AS_DECLARATIONS, PARSE_AS_IGNORE.

EXAMPLES:
    {} style.css
    {} --keyframes animations.css
    {} --amp --urls --media --json page.css
    {} --at-rule media=PARSE_AS_RULES --default PARSE_AS_IGNORE -

"#,
        VERSION, program, program, program, program, program
    );
}

fn parse_args(args: &[String]) -> CliResult<Command> {
    let mut path = None;
    let mut base_config = None;
    let mut at_rules = Vec::new();
    let mut default_block_type = None;
    let mut keyframes = false;
    let mut urls = false;
    let mut media = false;
    let mut json = false;
    let mut line = 1;
    let mut col = 0;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .cloned()
                .ok_or_else(|| CliError::Usage(format!("{} requires a value", flag)))
        };

        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--keyframes" => keyframes = true,
            "--amp" => base_config = Some(ParsingConfig::amp()),
            "--config" => {
                let config_path = value("--config")?;
                let contents = read_file(&config_path)?;
                base_config = Some(ParsingConfig::from_json(&contents)?);
            }
            "--at-rule" => {
                let setting = value("--at-rule")?;
                let (name, block_type) = setting.split_once('=').ok_or_else(|| {
                    CliError::Usage(format!("--at-rule expects NAME=TYPE, got '{}'", setting))
                })?;
                at_rules.push((name.trim().to_string(), block_type.parse::<BlockType>()?));
            }
            "--default" => default_block_type = Some(value("--default")?.parse::<BlockType>()?),
            "--urls" => urls = true,
            "--media" => media = true,
            "--json" => json = true,
            "--line" => line = parse_number("--line", &value("--line")?)?,
            "--col" => col = parse_number("--col", &value("--col")?)?,
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("Unknown option '{}'", flag)));
            }
            file => {
                if path.replace(file.to_string()).is_some() {
                    return Err(CliError::Usage("Only one input file is allowed".to_string()));
                }
            }
        }
    }

    let mut config = base_config.unwrap_or_else(|| {
        if keyframes {
            parsing_config()
        } else {
            ParsingConfig::default()
        }
    });
    for (name, block_type) in at_rules {
        config = config.with_at_rule(name, block_type);
    }
    if let Some(block_type) = default_block_type {
        config.default_block_type = block_type;
    }

    Ok(Command::Check(Options {
        path,
        config,
        keyframes,
        urls,
        media,
        json,
        line,
        col,
    }))
}

fn parse_number(flag: &str, value: &str) -> CliResult<usize> {
    value
        .parse()
        .map_err(|_| CliError::Usage(format!("{} expects a number, got '{}'", flag, value)))
}

fn read_file(path: &str) -> CliResult<String> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_string(),
        source,
    })
}

fn read_source(path: Option<&str>) -> CliResult<String> {
    match path {
        Some(path) if path != "-" => read_file(path),
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|source| CliError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(source)
        }
    }
}

/// Check the input and print the results. Returns the number of
/// diagnostics.
fn run(options: &Options) -> CliResult<usize> {
    let source = read_source(options.path.as_deref())?;

    let mut errors = Vec::new();
    let tokens = tokenize(&source, options.line, options.col, &mut errors);
    let stylesheet = parse_a_stylesheet(&tokens, &options.config, &mut errors);

    if options.keyframes {
        validate_keyframes_css(&stylesheet, &mut errors);
    }

    let mut parsed_urls = Vec::new();
    if options.urls {
        extract_urls(&stylesheet, &mut parsed_urls, &mut errors);
    }

    let mut media_types = Vec::new();
    let mut media_features = Vec::new();
    if options.media {
        parse_media_queries(&stylesheet, &mut media_types, &mut media_features, &mut errors);
    }

    if options.json {
        let mut output = json!({
            "stylesheet": stylesheet.to_json(),
            "errors": errors.to_json(),
        });
        if options.urls {
            output["urls"] = parsed_urls.to_json();
        }
        if options.media {
            output["mediaTypes"] = media_types.to_json();
            output["mediaFeatures"] = media_features.to_json();
        }
        let cmp = make_json_key_cmp_fn(JSON_KEY_PRIORITY);
        println!("{}", render_json(&output, &cmp, 0));
    } else {
        for url in &parsed_urls {
            let scope = if url.at_rule_scope.is_empty() {
                String::new()
            } else {
                format!(" (@{})", url.at_rule_scope)
            };
            println!("{} url {}{}", url.pos, url.utf8_url, scope);
        }
        for token in media_types.iter().chain(&media_features) {
            println!(
                "{} media {}",
                token.pos,
                token.string_value().unwrap_or_default()
            );
        }
        for error in &errors {
            println!("{}", error);
        }
    }

    Ok(errors.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    fn check_options(list: &[&str]) -> Options {
        match parse_args(&args(list)) {
            Ok(Command::Check(options)) => options,
            other => panic!("expected options, got {:?}", other),
        }
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), Command::Help);
        assert_eq!(parse_args(&args(&["--urls", "--version"])).unwrap(), Command::Version);
    }

    #[test]
    fn test_defaults() {
        let options = check_options(&[]);
        assert_eq!(options.path, None);
        assert_eq!(options.config, ParsingConfig::default());
        assert_eq!((options.line, options.col), (1, 0));
        assert!(!options.keyframes && !options.urls && !options.media && !options.json);
    }

    #[test]
    fn test_flags() {
        let options = check_options(&[
            "--urls", "--media", "--json", "--line", "3", "--col", "7", "style.css",
        ]);
        assert_eq!(options.path.as_deref(), Some("style.css"));
        assert!(options.urls && options.media && options.json);
        assert_eq!((options.line, options.col), (3, 7));
    }

    #[test]
    fn test_keyframes_uses_keyframes_config() {
        let options = check_options(&["--keyframes", "-"]);
        assert!(options.keyframes);
        assert_eq!(options.config, parsing_config());
        assert_eq!(options.path.as_deref(), Some("-"));
    }

    #[test]
    fn test_at_rule_overrides() {
        let options = check_options(&[
            "--amp",
            "--at-rule",
            "font-face=rules",
            "--at-rule",
            "page = PARSE_AS_IGNORE",
            "--default",
            "declarations",
        ]);
        assert_eq!(options.config.block_type_for("font-face"), BlockType::Rules);
        assert_eq!(options.config.block_type_for("page"), BlockType::Ignore);
        assert_eq!(options.config.block_type_for("media"), BlockType::Rules);
        assert_eq!(options.config.block_type_for("import"), BlockType::Declarations);
    }

    #[test]
    fn test_usage_errors() {
        let cases: &[&[&str]] = &[
            &["--line"],
            &["--line", "x"],
            &["--at-rule", "media"],
            &["--bogus"],
            &["a.css", "b.css"],
        ];
        for case in cases {
            let result = parse_args(&args(case));
            assert!(matches!(result, Err(CliError::Usage(_))), "{:?}", case);
        }
    }

    #[test]
    fn test_bad_block_type() {
        let result = parse_args(&args(&["--default", "sometimes"]));
        assert!(matches!(
            result,
            Err(CliError::Css(CssError::UnknownBlockType(_)))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let result = parse_args(&args(&["--config", "/nonexistent/cssval.json"]));
        assert!(matches!(result, Err(CliError::Io { .. })));
    }
}
