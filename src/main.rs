use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sooplink::clipboard::try_copy_link;
use sooplink::config::{Config, LoggingConfig};
use sooplink::highlight::HighlightResolver;
use sooplink::i18n;
use sooplink::utils::{normalize_whitespace, truncate_text};

#[derive(Parser)]
#[command(
    name = "sooplink",
    version,
    about = "Find a user's comment on a SOOP station post and link to it",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json), overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the highlight comment of a post
    Find {
        /// Post URL
        url: String,

        /// Nickname to look for (defaults to the configured nickname)
        #[arg(short, long)]
        nick: Option<String>,

        /// Forwarding proxy base URL
        #[arg(short, long)]
        proxy: Option<String>,

        /// Maximum number of comment pages to fetch
        #[arg(long)]
        max_pages: Option<u32>,

        /// Copy the resulting link to the clipboard
        #[arg(long, default_value = "false")]
        copy: bool,

        /// Print the result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List every comment and reply of a post
    Comments {
        /// Post URL
        url: String,

        /// Forwarding proxy base URL
        #[arg(short, long)]
        proxy: Option<String>,

        /// Maximum number of comment pages to fetch
        #[arg(long)]
        max_pages: Option<u32>,

        /// Print the comments as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config first: it carries the logging defaults the subscriber is built from
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let logging = config
        .logging
        .clone()
        .with_cli(cli.log_format.as_deref(), cli.verbose);
    setup_tracing(&logging);
    i18n::init_from_env();

    let outcome = match cli.command {
        Commands::Find {
            url,
            nick,
            proxy,
            max_pages,
            copy,
            json,
        } => {
            tracing::info!(url = %url, nick = ?nick, copy, "Starting find command");
            let config = with_overrides(config, proxy, max_pages);
            find(&config, &url, nick.as_deref(), copy, json).await
        }

        Commands::Comments {
            url,
            proxy,
            max_pages,
            json,
        } => {
            tracing::info!(url = %url, "Starting comments command");
            let config = with_overrides(config, proxy, max_pages);
            comments(&config, &url, json).await
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e.status_message());
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::new(logging.filter_directive());

    // Logs go to stderr so stdout carries only the result
    if logging.is_json() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

/// File (when given) overlaid with `SOOPLINK_*` environment variables
fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn with_overrides(mut config: Config, proxy: Option<String>, max_pages: Option<u32>) -> Config {
    if let Some(proxy) = proxy {
        config.crawler.proxy_url = Some(proxy);
    }
    if let Some(max_pages) = max_pages {
        config.crawler.max_pages = max_pages;
    }
    config
}

async fn find(
    config: &Config,
    url: &str,
    nick: Option<&str>,
    copy: bool,
    json: bool,
) -> sooplink::error::Result<ExitCode> {
    if url.trim().is_empty() {
        eprintln!("{}", i18n::empty_url_status());
        return Ok(ExitCode::from(2));
    }

    let resolver = HighlightResolver::from_config(config)?;
    eprintln!("{}", i18n::proxy_status(config.proxy_url()));
    eprintln!("{}", i18n::parsing_status());
    let post = resolver.resolve_post(url)?;
    tracing::debug!(station_id = ?post.station_id, title_no = %post.title_no, "Resolved post");
    eprintln!("{}", i18n::searching_status());

    let result = resolver.pick_highlight(url, nick).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.link);
    }
    eprintln!("{}", i18n::search_status(result.found));

    if copy {
        match try_copy_link(&result.link) {
            None => eprintln!("{}", i18n::copied_status(result.found)),
            Some(reason) => eprintln!("{}", i18n::copy_failed_status(&reason)),
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn comments(config: &Config, url: &str, json: bool) -> sooplink::error::Result<ExitCode> {
    if url.trim().is_empty() {
        eprintln!("{}", i18n::empty_url_status());
        return Ok(ExitCode::from(2));
    }

    let resolver = HighlightResolver::from_config(config)?;
    eprintln!("{}", i18n::proxy_status(config.proxy_url()));

    let (post, comments) = resolver.fetch_post_comments(url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} / {}: {} comments",
        post.station_id_str(),
        post.title_no,
        comments.len()
    );
    for comment in &comments {
        let indent = if comment.is_reply() { "    " } else { "" };
        println!(
            "{indent}[{}] {}: {}",
            comment.comment_no.as_deref().unwrap_or("-"),
            comment.user_nick,
            truncate_text(&normalize_whitespace(&comment.comment), 80)
        );
    }

    Ok(ExitCode::SUCCESS)
}
