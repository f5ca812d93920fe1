use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::Path;

use folio_core::SiteBuilder;

use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    Command::new("build")
        .about("Build a static site from markdown docs")
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing markdown files")
                .default_value("./docs"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for the generated site")
                .default_value("./out"),
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
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let folio_config = FolioConfig::load(args)?;
    let build_config = folio_config.build_config();

    let source_dir = Path::new(&build_config.source);
    let output_dir = Path::new(&build_config.output);
    let theme_dir = Path::new(&build_config.theme);

    let site = SiteBuilder::new(source_dir)
        .theme_dir(theme_dir)
        .site_config(folio_config.site_config().site.clone())
        .build()?;

    site.render_all(output_dir)?;

    println!(
        "Built {} pages into {}",
        site.page_map().pages().len(),
        output_dir.display()
    );

    Ok(())
}
