//! dbc-gen command-line application
//!
//! Reads one or more DBC files and writes the generated Toit decoder
//! classes, or the resolved multiplex trees as JSON with `--tree`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use dbc_gen::{Generator, MultiplexNode};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod config;

use config::AppConfig;

/// Generate Toit decoder classes from DBC files
#[derive(Parser, Debug)]
#[command(name = "dbc-gen")]
#[command(about = "Generate Toit CAN decoders from DBC files", long_about = None)]
#[command(version)]
struct Args {
    /// DBC file(s) to process, in order
    #[arg(value_name = "FILES")]
    inputs: Vec<PathBuf>,

    /// Output file (`-` for stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the resolved multiplex trees as JSON instead of code
    #[arg(long)]
    tree: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// One entry of the `--tree` dump
#[derive(Serialize)]
struct TreeDump<'a> {
    message: &'a str,
    id: u32,
    tree: &'a MultiplexNode,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("dbc-gen v{} (library v{})", env!("CARGO_PKG_VERSION"), dbc_gen::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let inputs = input_files(&args, &app_config)?;
    let output = output_path(&args, &app_config);

    let mut generator = Generator::with_config(app_config.generator);
    log::debug!(
        "Runtime module '{}', unmatched switch policy {:?}",
        generator.config().runtime_module,
        generator.config().unmatched_switch
    );
    for path in &inputs {
        generator
            .add_dbc(path)
            .with_context(|| format!("Failed to load DBC file {:?}", path))?;
    }

    let stats = generator.database_stats();
    log::info!(
        "Signal database: {} messages, {} signals, {} multiplex values, {} value descriptions",
        stats.num_messages,
        stats.num_signals,
        stats.num_multiplex_values,
        stats.num_value_descriptions
    );

    let rendered = if args.tree {
        render_trees(&generator)?
    } else {
        generator.render().context("Code generation failed")?
    };

    write_output(output.as_deref(), &rendered)
}

/// Command-line files replace the configured list
fn input_files(args: &Args, config: &AppConfig) -> Result<Vec<PathBuf>> {
    let inputs = if args.inputs.is_empty() {
        config.input.dbc_files.clone()
    } else {
        args.inputs.clone()
    };
    if inputs.is_empty() {
        bail!("No DBC files given (pass FILES or set [input] dbc_files in the config)");
    }
    Ok(inputs)
}

/// `None` means stdout
fn output_path(args: &Args, config: &AppConfig) -> Option<PathBuf> {
    args.output
        .clone()
        .or_else(|| config.output.path.clone())
        .filter(|p| p.as_os_str() != "-")
}

fn render_trees(generator: &Generator) -> Result<String> {
    let resolved = generator.resolve_all();
    let dump: Vec<TreeDump<'_>> = resolved
        .iter()
        .map(|(message, tree)| TreeDump {
            message: &message.name,
            id: message.can_id(),
            tree,
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&dump).context("Failed to serialize multiplex trees")?;
    json.push('\n');
    Ok(json)
}

/// Write the whole result at once, after generation succeeded
fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write output file {:?}", path))?;
            log::info!("Wrote {} bytes to {:?}", content.len(), path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DBC: &str = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1 ECU2

BO_ 100 Gearbox: 8 ECU1
 SG_ S M : 0|8@1+ (1,0) [0|128] "" ECU2
 SG_ A m0 : 8|8@1+ (1,0) [0|128] "" ECU2
"#;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("dbc-gen").chain(argv.iter().copied()))
    }

    #[test]
    fn test_argument_parsing() {
        let a = args(&["-vv", "--tree", "-o", "out.toit", "a.dbc", "b.dbc"]);
        assert_eq!(a.inputs, [PathBuf::from("a.dbc"), PathBuf::from("b.dbc")]);
        assert_eq!(a.output, Some(PathBuf::from("out.toit")));
        assert_eq!(a.verbose, 2);
        assert!(a.tree);
        assert!(!a.quiet);
    }

    #[test]
    fn test_command_line_overrides_config() {
        let mut config = AppConfig::default();
        config.input.dbc_files = vec![PathBuf::from("from_config.dbc")];
        config.output.path = Some(PathBuf::from("config.toit"));

        let a = args(&["cli.dbc"]);
        assert_eq!(input_files(&a, &config).unwrap(), [PathBuf::from("cli.dbc")]);
        assert_eq!(output_path(&a, &config), Some(PathBuf::from("config.toit")));

        let a = args(&["-o", "-"]);
        assert_eq!(input_files(&a, &config).unwrap(), [PathBuf::from("from_config.dbc")]);
        assert_eq!(output_path(&a, &config), None);
    }

    #[test]
    fn test_no_inputs_is_an_error() {
        assert!(input_files(&args(&[]), &AppConfig::default()).is_err());
    }

    #[test]
    fn test_render_trees() {
        let mut generator = Generator::new();
        generator.add_dbc_str("gearbox.dbc", DBC).unwrap();
        let json: serde_json::Value = serde_json::from_str(&render_trees(&generator).unwrap()).unwrap();

        assert_eq!(json[0]["message"], "Gearbox");
        assert_eq!(json[0]["id"], 100);
        assert_eq!(json[0]["tree"]["children"][0]["class_name"], "Gearbox_A");
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.toit");
        write_output(Some(&path), "import dbc\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "import dbc\n");
    }
}
