use crate::prelude::*;
use clap::Parser;

mod inspect;
mod prelude;
mod sort;
#[cfg(test)]
mod testutil;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Sort multi-invoice shipping-label PDFs courier-wise and style-wise, with pages ordered by size"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// TOML pattern registry overriding the built-in courier/size/style tables.
    #[clap(long, env = "LABELSORT_REGISTRY", global = true)]
    registry: Option<std::path::PathBuf>,

    /// Comma-separated style names replacing the style-group table
    /// (each name doubles as its own keyword, kept in the given order).
    #[clap(long, global = true)]
    styles: Option<String>,
}

impl Global {
    /// Resolve the effective pattern registry for this invocation.
    pub fn build_registry(&self) -> Result<labelsort_core::Registry> {
        let mut spec = match &self.registry {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .wrap_err_with(|| f!("cannot read registry file {}", path.display()))?;
                labelsort_core::RegistrySpec::from_toml_str(&text).map_err(|e| eyre!(e))?
            }
            None => labelsort_core::RegistrySpec::default(),
        };

        if let Some(styles) = &self.styles {
            let names: Vec<&str> = styles
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if !names.is_empty() {
                spec.override_styles(names);
            }
        }

        labelsort_core::Registry::compile(spec).map_err(|e| eyre!(e))
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Classify pages and write one sorted PDF per courier and style
    Sort(crate::sort::App),

    /// Preview the classification without writing any files
    Inspect(crate::inspect::App),
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Sort(sub_app) => crate::sort::run(sub_app, app.global),
        SubCommands::Inspect(sub_app) => crate::inspect::run(sub_app, app.global),
    }
}
