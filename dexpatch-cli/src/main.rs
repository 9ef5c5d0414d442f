mod yaml;

use clap::{Parser, Subcommand};
use dexpatch_ir::{MethodDef, Program};
use dexpatch_patch::{
    MissingMethod, PatchConfig, Patcher, ProgramDecoder, Target, diagnose, needs_extra_register,
};
use memmap2::Mmap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use yaml::YamlCodec;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "dexpatch", about = "Inject a native library load into Dalvik methods")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepend a library-loading preamble to a method of a program dump
    Patch {
        /// Path to the YAML program dump
        input: PathBuf,
        /// YAML patch configuration; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Target class descriptor, e.g. Lcom/example/MainActivity; (repeatable)
        #[arg(long = "class")]
        classes: Vec<String>,
        /// Target method name (every overload is patched); constructors when omitted
        #[arg(long)]
        method: Option<String>,
        /// Native library name passed to the loader
        #[arg(long)]
        library: Option<String>,
        /// Fail when no method matches instead of leaving the program unchanged
        #[arg(long)]
        strict: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a smali-style listing of every method body
    Show {
        /// Path to the YAML program dump
        input: PathBuf,
        /// Only list this class
        #[arg(long)]
        class: Option<String>,
    },
    /// Verify that every method body can be renumbered
    Check {
        /// Path to the YAML program dump
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Patch {
            input,
            config,
            classes,
            method,
            library,
            strict,
            output,
        } => {
            let config = or_exit(build_config(
                config.as_deref(),
                classes,
                method,
                library,
                strict,
            ));
            cmd_patch(&input, config, output.as_deref());
        }
        Commands::Show { input, class } => cmd_show(&input, class.as_deref()),
        Commands::Check { input } => cmd_check(&input),
    }
}

fn or_exit<T, E: fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn map_input(path: &Path) -> std::io::Result<Mmap> {
    let file = fs::File::open(path)?;
    // SAFETY: the mapping is read-only and dropped before this process
    // writes any output.
    unsafe { Mmap::map(&file) }
}

fn load_program(path: &Path) -> Program {
    let data = or_exit(map_input(path));
    or_exit(YamlCodec.decode(&data))
}

fn build_config(
    path: Option<&Path>,
    classes: Vec<String>,
    method: Option<String>,
    library: Option<String>,
    strict: bool,
) -> dexpatch_patch::Result<PatchConfig> {
    let mut config = match path {
        Some(p) => PatchConfig::load(p)?,
        None => PatchConfig::with_targets(Vec::new()),
    };
    if !classes.is_empty() {
        config.targets = classes
            .into_iter()
            .map(|class| Target {
                class,
                method: method.clone(),
            })
            .collect();
    } else if let Some(method) = method {
        for target in &mut config.targets {
            target.method = Some(method.clone());
        }
    }
    if let Some(library) = library {
        config.library = library;
    }
    if strict {
        config.on_missing = MissingMethod::Error;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_patch(input: &Path, config: PatchConfig, output: Option<&Path>) {
    let patcher = or_exit(Patcher::new(config));
    let (image, patched) = {
        let data = or_exit(map_input(input));
        or_exit(patcher.patch_image(&YamlCodec, &YamlCodec, &data))
    };

    if patched.is_empty() {
        let targets: Vec<String> = patcher
            .config()
            .targets
            .iter()
            .map(ToString::to_string)
            .collect();
        eprintln!(
            "No method with code matches {}; program unchanged",
            targets.join(", ")
        );
    }
    for m in &patched {
        eprintln!(
            "Patched {}->{}({}){}: registers {} -> {}, {} instructions shifted, {} -> {} code units",
            m.class,
            m.name,
            m.prototype.parameters.concat(),
            m.prototype.return_type,
            m.registers_before,
            m.registers_after,
            m.shifted,
            m.code_units_before,
            m.code_units_after,
        );
    }

    match output {
        Some(path) => or_exit(fs::write(path, &image)),
        None => or_exit(std::io::stdout().lock().write_all(&image)),
    }
}

fn cmd_show(input: &Path, only: Option<&str>) {
    let program = load_program(input);

    for class in program
        .classes
        .iter()
        .filter(|c| only.is_none_or(|d| d == c.descriptor))
    {
        println!("# ============================================");
        println!("# Class: {}", class.descriptor);
        println!();
        for method in &class.methods {
            print_method(method);
        }
    }
}

fn print_method(method: &MethodDef) {
    let proto = &method.prototype;
    println!(
        ".method {} {}({}){}",
        method.access_flags,
        method.name,
        proto.parameters.concat(),
        proto.return_type
    );

    let Some(body) = &method.implementation else {
        println!("    # (no code - native or abstract)");
        println!(".end method");
        println!();
        return;
    };

    println!(
        "    .registers {}  # {} locals, {} parameter registers",
        body.registers,
        body.local_registers(),
        body.parameter_registers
    );
    let mut address = 0usize;
    for insn in &body.instructions {
        println!("    {address:#06x}  {insn}");
        address += insn.size_in_code_units();
    }
    for t in &body.tries {
        println!(
            "    # try {:#x}..{:#x}",
            t.start_address,
            t.start_address + t.code_units
        );
        for h in &t.handlers {
            match &h.exception_type {
                Some(ty) => println!("    #   catch {ty} -> {:#x}", h.handler_address),
                None => println!("    #   catch_all -> {:#x}", h.handler_address),
            }
        }
    }
    println!(".end method");
    println!();
}

fn cmd_check(input: &Path) {
    let program = load_program(input);
    let mut failures = 0usize;
    let mut checked = 0usize;

    for (class, method) in program.methods() {
        let Some(body) = &method.implementation else {
            continue;
        };
        checked += 1;
        let name = format!("{}->{}", class.descriptor, method.name);
        if body.parameter_registers > body.registers {
            failures += 1;
            eprintln!(
                "{name}: {} parameter registers exceed {} registers",
                body.parameter_registers, body.registers
            );
            continue;
        }
        for (index, e) in diagnose(body) {
            failures += 1;
            eprintln!("{name}: instruction #{index}: {e}");
        }
        if needs_extra_register(body.registers, body.parameter_registers) {
            log::debug!("{name}: no free local, would be renumbered");
        }
    }

    println!("Checked {checked} method bodies, {failures} problems");
    if failures > 0 {
        std::process::exit(1);
    }
}
