use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, LevelFilter};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokenshift::config::{load_config, AppConfig};
use tokenshift::convert::{convert_to_array_format_with, convert_to_standard_format};
use tokenshift::export::{generate_figma_json, generate_figma_plugin_code, FigmaExportFormat};
use tokenshift::parser::is_array_document;
use tokenshift::store::{FileStorage, TokenStore};
use tokenshift::tokens::{
    create_token, delete_token, flatten_tokens, group_tokens_by_type, update_token, NewToken,
    TokenFilter, TokenUpdate,
};
use tokenshift::{TokenData, TokenType};

#[derive(Parser)]
#[command(name = "tokenshift")]
#[command(version, about = "Import, edit and convert design tokens")]
#[command(long_about = "Import, edit and convert design tokens\n\n\
    Reads W3C design token trees, array-format token files and DTM export\n\
    bundles (a manifest.json plus token files, or a ZIP of them).\n\n\
    JSON output is pretty-printed by default with indentation.\n\n\
    Examples:\n  \
    tokenshift validate tokens.json\n  \
    tokenshift flatten tokens.json --grouped --search primary\n  \
    tokenshift convert tokens.json --to figma-hybrid [-o figma.json]\n  \
    tokenshift import export.zip [-o tokens.json]")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: ./tokenshift.toml, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Verbose output for debugging (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Compact JSON output (default is pretty-printed with indentation)
    #[arg(long, global = true)]
    compact: bool,

    /// Output file path (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Check a token document for structural errors
    Validate {
        /// Token document (.json)
        input: PathBuf,
    },

    /// List the tokens of a document as canonical flattened tokens
    Flatten {
        /// Token document (.json)
        input: PathBuf,

        /// Group tokens by type in display order
        #[arg(long)]
        grouped: bool,

        /// Keep tokens whose path or value contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Keep only these token types (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
    },

    /// Convert a token document to another format
    Convert {
        /// Token document (.json)
        input: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        to: OutputFormat,
    },

    /// Import a DTM bundle (files or a ZIP) or a single token file as array format
    Import {
        /// manifest.json and token files, or a .zip export
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Add a token to an array-format document
    Create {
        /// Array-format token document (.json)
        input: PathBuf,

        /// Token type or document key (color, colors, spacing, ...)
        #[arg(long = "type")]
        token_type: String,

        /// Token name (slash-separated path)
        #[arg(long)]
        name: String,

        /// Token value; parsed as JSON when possible, otherwise taken as text
        #[arg(long)]
        value: String,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Change fields of a token in an array-format document
    Update {
        /// Array-format token document (.json)
        input: PathBuf,

        /// Token type (color, typography, spacing, ...)
        #[arg(long = "type")]
        token_type: String,

        /// Token name (slash-separated path)
        #[arg(long)]
        name: String,

        /// New value; parsed as JSON when possible, otherwise taken as text
        #[arg(long)]
        value: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a token from an array-format document
    Delete {
        /// Array-format token document (.json)
        input: PathBuf,

        /// Token type (color, typography, spacing, ...)
        #[arg(long = "type")]
        token_type: String,

        /// Token name (slash-separated path)
        #[arg(long)]
        name: String,
    },

    /// Manage the local token cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Store a token document in the cache
    Save {
        /// Token document (.json)
        input: PathBuf,
    },
    /// Print the cached token document
    Show,
    /// Remove the cached token document
    Clear,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Nested W3C design tokens
    W3c,
    /// Flat array-format records
    Array,
    FigmaVariables,
    FigmaStyles,
    FigmaHybrid,
    /// Figma plugin source code
    Plugin,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
            eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
            LevelFilter::Warn
        })
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    let config = load_config(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!("Using configuration: {:?}", config);

    match &cli.command {
        Command::Validate { input } => {
            let data = read_document(input)?;
            let count = flatten_tokens(&data).len();
            println!("{}: valid ({} tokens)", input.display(), count);
        }
        Command::Flatten {
            input,
            grouped,
            search,
            types,
        } => {
            let data = read_document(input)?;
            let filter = TokenFilter::new(search.clone().unwrap_or_default())
                .with_types(types.iter().map(|t| TokenType::parse(t)));
            let groups = filter.apply(&group_tokens_by_type(&flatten_tokens(&data)));

            let json = if *grouped {
                serde_json::to_value(&groups)?
            } else {
                let tokens: Vec<_> = groups.into_values().flatten().collect();
                serde_json::to_value(&tokens)?
            };
            write_json(&cli, &json)?;
        }
        Command::Convert { input, to } => {
            let data = read_document(input)?;
            convert(&cli, &config, &data, *to)?;
        }
        Command::Import { inputs } => {
            info!(files = inputs.len(); "Importing token files");
            let data = tokenshift::import_paths(inputs).context("Failed to import token files")?;
            write_json(&cli, data.as_map())?;
        }
        Command::Create {
            input,
            token_type,
            name,
            value,
            role,
            description,
        } => {
            let data = read_document(input)?;
            let token = NewToken {
                name: name.clone(),
                value: parse_value(value),
                role: role.clone(),
                description: description.clone(),
            };
            let updated = create_token(&data, token_type, token)?;
            write_json(&cli, updated.as_map())?;
        }
        Command::Update {
            input,
            token_type,
            name,
            value,
            role,
            description,
        } => {
            let data = read_document(input)?;
            let update = TokenUpdate {
                value: value.as_deref().map(parse_value),
                role: role.clone(),
                description: description.clone(),
            };
            let updated = update_token(&data, &TokenType::parse(token_type), name, update)?;
            write_json(&cli, updated.as_map())?;
        }
        Command::Delete {
            input,
            token_type,
            name,
        } => {
            let data = read_document(input)?;
            let updated = delete_token(&data, &TokenType::parse(token_type), name)?;
            write_json(&cli, updated.as_map())?;
        }
        Command::Cache { action } => {
            let directory = config.storage.resolve_directory();
            debug!("Cache directory: {}", directory.display());
            let mut store = TokenStore::new(FileStorage::new(directory), config.storage.quota_bytes);

            match action {
                CacheAction::Save { input } => {
                    let data = read_document(input)?;
                    store.save(&data).context("Failed to save tokens to the cache")?;
                    info!("Saved {} to the cache", input.display());
                }
                CacheAction::Show => match store.load() {
                    Some(data) => write_json(&cli, data.as_map())?,
                    None => bail!("No cached token data"),
                },
                CacheAction::Clear => {
                    store.clear().context("Failed to clear the cache")?;
                    info!("Cache cleared");
                }
            }
        }
    }

    Ok(())
}

fn convert(cli: &Cli, config: &AppConfig, data: &TokenData, to: OutputFormat) -> Result<()> {
    let options = &config.convert;
    let is_array = is_array_document(data.as_map());
    debug!("Converting {} document to {:?}", if is_array { "array" } else { "W3C" }, to);

    let as_array = || {
        if is_array {
            data.clone()
        } else {
            convert_to_array_format_with(data.as_map(), options)
        }
    };

    let json = match to {
        OutputFormat::W3c if is_array => JsonValue::Object(convert_to_standard_format(data)),
        OutputFormat::W3c => data.to_value(),
        OutputFormat::Array => as_array().into_value(),
        OutputFormat::FigmaVariables => generate_figma_json(&as_array(), FigmaExportFormat::Variables, options),
        OutputFormat::FigmaStyles => generate_figma_json(&as_array(), FigmaExportFormat::Styles, options),
        OutputFormat::FigmaHybrid => generate_figma_json(&as_array(), FigmaExportFormat::Hybrid, options),
        OutputFormat::Plugin => {
            let code = generate_figma_plugin_code(&as_array(), options);
            return write_output(cli, &code);
        }
    };

    write_json(cli, &json)
}

/// Read and validate a token document
fn read_document(path: &Path) -> Result<TokenData> {
    info!(path = path.display().to_string(); "Reading token document");
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    tokenshift::parse_document(&text)
        .with_context(|| format!("Invalid token document: {}", path.display()))
}

/// JSON when the text parses as JSON, a string otherwise
fn parse_value(text: &str) -> JsonValue {
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
}

fn write_json<T: serde::Serialize + ?Sized>(cli: &Cli, value: &T) -> Result<()> {
    // Format output (pretty by default, compact if flag is set)
    let output = if cli.compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    write_output(cli, &output)
}

fn write_output(cli: &Cli, output: &str) -> Result<()> {
    match cli.output.as_ref() {
        Some(path) => {
            info!(path = path.display().to_string(); "Writing output");
            fs::write(path, output)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        }
        None => {
            println!("{}", output);
        }
    }
    Ok(())
}
