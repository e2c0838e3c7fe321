use clap::{Parser, Subcommand};
use statapp::bundle::{self, Finalizer};
use statapp::compress::Compressors;
use statapp::{config, output, scaffold};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "statapp")]
#[command(about = "Bundle a static web application from pages, partials, styles and scripts")]
#[command(long_about = "\
Bundle a static web application from pages, partials, styles and scripts

Pages reference shared resources with inline directives:

  <- partial(head.html) ->     inline partials/head.html
  <- style(common.css) ->      link common.css from dist/css/
  <- script(app.js, 10) ->     link app.js from dist/js/, bundle order 10

Project structure:

  project/
  ├── statapp.toml             # Config (optional, see 'statapp gen-config')
  ├── html/                    # Pages, one output page each
  ├── partials/                # Reusable HTML fragments
  ├── dist/css/                # Stylesheets
  ├── dist/js/                 # Scripts
  └── assets/                  # images/, fonts/, licences/, locales/

Stylesheets and scripts used by every page are concatenated into
app/css/globalstyle.css and app/js/globalscript.js; the rest are linked
from the pages that use them.")]
#[command(version)]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the project layout and a stock statapp.toml
    Init,
    /// Run the full pipeline: partials → styles → scripts → assets
    Build,
    /// Validate pages and resources without writing anything
    Check,
    /// Delete the output directory
    Clean,
    /// Print a stock statapp.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            std::fs::create_dir_all(&cli.project)?;
            let config = config::load_config(&cli.project)?;
            println!("==> Initializing {}", cli.project.display());
            let report = scaffold::init(&cli.project, &config)?;
            output::print_scaffold_report(&report);
        }
        Command::Build => {
            let root = project_root(&cli.project)?;
            let config = config::load_config(&root)?;
            let compressors = Compressors::for_config(config.compress);
            let finalizer = Finalizer::new(&root, &config, &compressors)?;
            let paths = finalizer.paths();

            println!("==> Stage 1: Inlining partials from {}", paths.pages.display());
            let partials = finalizer.inline_partials()?;
            output::print_partial_report(&partials);

            println!("==> Stage 2: Consolidating styles from {}", paths.styles.display());
            let styles = finalizer.consolidate_styles()?;
            output::print_style_report(&styles, &paths.output);

            println!("==> Stage 3: Consolidating scripts from {}", paths.scripts.display());
            let scripts = finalizer.consolidate_scripts()?;
            output::print_script_report(&scripts, &paths.output);

            println!("==> Copying assets");
            let assets = finalizer.finish()?;
            output::print_asset_report(&assets);

            println!("==> Build complete: {}", paths.output.display());
        }
        Command::Check => {
            let root = project_root(&cli.project)?;
            let config = config::load_config(&root)?;
            println!("==> Checking {}", root.display());
            let report = bundle::check(&root, &config)?;
            output::print_check_output(&report);
            println!("==> Project is valid");
        }
        Command::Clean => {
            let root = project_root(&cli.project)?;
            let config = config::load_config(&root)?;
            let output_dir = root.join(&config.output.dir);
            if bundle::clean(&root, &config)? {
                println!("Removed {}", output_dir.display());
            } else {
                println!("Nothing to clean: {} does not exist", output_dir.display());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// The project root, which must be an existing directory.
fn project_root(path: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if !path.is_dir() {
        return Err(format!("project directory {} does not exist", path.display()).into());
    }
    Ok(path.to_path_buf())
}
