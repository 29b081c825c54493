//! MiniJava Compiler Driver
//!
//! Reads a typed AST as JSON, lowers it to MIPS-style assembly and either
//! writes the text or runs the unit in the simulator.

use clap::{Parser, Subcommand};
use log::info;
use mjc_backend::{lower_program, samples, LoweringOptions};
use mjc_codegen::{emit_unit, encode_unit, CompiledUnit, EmitOptions};
use mjc_common::Program;
use mjc_vm::{run_unit, VmConfig};
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mjc")]
#[command(about = "MiniJava Compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON AST to assembly
    Compile {
        /// Input AST file (JSON)
        input: PathBuf,

        /// Output assembly file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the compiled unit as JSON instead of assembly text
        #[arg(long)]
        emit_json: bool,

        /// Write machine code (big-endian text words, then data)
        #[arg(long, conflicts_with = "emit_json")]
        binary: bool,

        /// Leave `#` comments out of the generated code
        #[arg(long)]
        no_comments: bool,

        /// Log every spill and reload at debug level
        #[arg(long)]
        trace_spills: bool,
    },

    /// Compile a JSON AST and run it in the simulator
    Run {
        /// Input AST file (JSON)
        input: PathBuf,

        /// Abort after this many instructions
        #[arg(long)]
        step_limit: Option<u64>,

        /// Simulator memory size in bytes
        #[arg(long)]
        memory_size: Option<usize>,
    },

    /// Compile the built-in factorial program
    Demo {
        /// Argument passed to ComputeFac
        #[arg(short, long, default_value_t = 10)]
        arg: i32,

        /// Run the program instead of printing its assembly
        #[arg(long)]
        run: bool,

        /// Output assembly file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Assembly,
    Json,
    Binary,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile { input, output, emit_json, binary, no_comments, trace_spills } => {
            let options = LoweringOptions {
                trace_spills,
                emit_comments: !no_comments,
                ..LoweringOptions::default()
            };
            let format = if binary {
                OutputFormat::Binary
            } else if emit_json {
                OutputFormat::Json
            } else {
                OutputFormat::Assembly
            };
            compile_file(&input, output.as_deref(), format, &options)
        }
        Commands::Run { input, step_limit, memory_size } => {
            let defaults = VmConfig::default();
            let config = VmConfig {
                step_limit: step_limit.unwrap_or(defaults.step_limit),
                memory_size: memory_size.unwrap_or(defaults.memory_size),
            };
            run_file(&input, config)
        }
        Commands::Demo { arg, run, output } => demo(arg, run, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn read_program(path: &Path) -> Result<Program, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let program = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid AST in {}: {}", path.display(), e))?;
    Ok(program)
}

fn render(unit: &CompiledUnit, format: OutputFormat, options: &LoweringOptions) -> Result<Vec<u8>, Box<dyn Error>> {
    match format {
        OutputFormat::Assembly => {
            Ok(emit_unit(unit, EmitOptions { comments: options.emit_comments }).into_bytes())
        }
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(unit)?),
        OutputFormat::Binary => {
            let code = encode_unit(unit)?;
            info!("Encoded {} instruction words, {} data bytes", code.text.len(), code.data.len());
            Ok(code.to_bytes())
        }
    }
}

fn write_output(bytes: &[u8], output_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match output_path {
        Some(path) => {
            fs::write(path, bytes)?;
            info!("Output written to {}", path.display());
        }
        None => io::stdout().write_all(bytes)?,
    }
    Ok(())
}

fn compile_file(
    input_path: &Path,
    output_path: Option<&Path>,
    format: OutputFormat,
    options: &LoweringOptions,
) -> Result<(), Box<dyn Error>> {
    let program = read_program(input_path)?;
    let unit = lower_program(&program, options)?;
    write_output(&render(&unit, format, options)?, output_path)
}

/// Compile and execute, returning the program's printed output
fn execute(program: &Program, config: VmConfig) -> Result<String, Box<dyn Error>> {
    let unit = lower_program(program, &LoweringOptions::default())?;
    let outcome = run_unit(&unit, config)?;
    info!(
        "Program exited with code {} after {} steps (sp {:#x} -> {:#x})",
        outcome.exit_code, outcome.steps, outcome.initial_sp, outcome.final_sp
    );
    Ok(outcome.output)
}

fn run_file(input_path: &Path, config: VmConfig) -> Result<(), Box<dyn Error>> {
    let program = read_program(input_path)?;
    print!("{}", execute(&program, config)?);
    Ok(())
}

fn demo(arg: i32, run: bool, output_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let program = samples::factorial(arg);
    if run {
        print!("{}", execute(&program, VmConfig::default())?);
        return Ok(());
    }
    let options = LoweringOptions::default();
    let unit = lower_program(&program, &options)?;
    write_output(&render(&unit, OutputFormat::Assembly, &options)?, output_path)
}
