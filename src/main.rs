// csyn: parse C translation units and dump or route their syntax

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use csyn::emit::EmitConfig;
use csyn::syntax::{DeclId, Syntax};
use csyn::Program;

/// Parse C source files and print their syntax dump, or the routed output
/// units when an emit config is given.
#[derive(Parser, Debug)]
#[command(name = "csyn")]
#[command(version)]
pub struct Cli {
    /// C source files (preprocessed)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Emit config (TOML) with groups, replacements and deletions
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write output units under this directory instead of stdout
    #[arg(long, requires = "config")]
    pub out: Option<PathBuf>,
}

fn render(program: &Program, decl: DeclId) -> String {
    csyn::dump::dump_from(program, Syntax::Decl(decl))
        .trim_end()
        .to_string()
}

fn run(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let config = cli.config.as_deref().map(EmitConfig::load).transpose()?;
    let mut ok = true;

    for path in &cli.files {
        let source = fs::read_to_string(path)?;
        let file = path.display().to_string();

        // Keep going on parse errors so one run reports every bad file
        let program = match csyn::read(&file, &source) {
            Ok(program) => program,
            Err(e) => {
                error!("{}", e);
                ok = false;
                continue;
            }
        };
        info!("{}: {} declarations", file, program.decls.len());

        let Some(config) = &config else {
            print!("{}", csyn::dump::dump(&program));
            continue;
        };

        config.route(&program)?;
        let units = config.emit(&program, &render);
        for (key, text) in &units {
            match &cli.out {
                Some(dir) => write_unit(dir, key, text)?,
                None => print!("== {} ==\n{}", key, text),
            }
        }
    }

    Ok(ok)
}

fn write_unit(dir: &Path, key: &str, text: &str) -> Result<(), Box<dyn Error>> {
    let path = dir.join(format!("{}.txt", key));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, text)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if run(&cli)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
