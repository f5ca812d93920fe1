use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use folio_server::{DocServer, ServerConfig, SiteSources};

use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    Command::new("serve")
        .about("Serve the documentation site, rebuilding on changes")
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing markdown files")
                .default_value("./docs"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory")
                .default_value("./theme"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./folio.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on")
                .default_value("3000"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to")
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load cascading configuration
    let folio_config = FolioConfig::load(args)?;
    let build_config = folio_config.build_config();

    let sources = SiteSources {
        source_dir: PathBuf::from(&build_config.source),
        theme_dir: PathBuf::from(&build_config.theme),
        config_path: PathBuf::from(&build_config.config),
    };

    let site = sources.build_site()?;

    let server_config = ServerConfig {
        host: build_config.host.clone(),
        port: build_config.port,
        open: build_config.open,
    };

    DocServer::new(server_config, sources, site).run().await
}
