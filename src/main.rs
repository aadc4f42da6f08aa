use clap::{Parser as ClapParser, Subcommand};
use env_logger::Env;
use hotkey_lang::{
    EngineConfig, ExecutionMode,
    cli::{self, CheckOptions, CliError, CompileOptions, RunOptions},
};
use std::{
    io::{self, Read},
    path::PathBuf,
};

#[derive(ClapParser)]
#[command(name = "hotkey")]
#[command(about = "Hotkey - bind key combinations to scripted clipboard, text and window actions")]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log more (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and list the hotkeys it binds
    Check {
        /// Script file (reads from stdin if not provided)
        script: Option<PathBuf>,

        /// Print the syntax tree
        #[arg(long)]
        ast: bool,

        /// Pretty-print the syntax tree
        #[arg(short, long)]
        pretty: bool,
    },

    /// Load a script or bundle and simulate key presses
    Run {
        /// Script or bundle file
        script: PathBuf,

        /// Execution strategy
        #[arg(short, long, value_enum)]
        mode: Option<ExecutionMode>,

        /// Hotkey to press after loading (repeatable)
        #[arg(short, long = "trigger")]
        triggers: Vec<String>,

        /// Print injected keystrokes as they are sent
        #[arg(long)]
        echo: bool,
    },

    /// Evaluate a snippet and print its value
    Eval {
        /// Script source
        code: String,

        /// Execution strategy
        #[arg(short, long, value_enum)]
        mode: Option<ExecutionMode>,
    },

    /// Verify a script natively and write a bundle
    Compile {
        /// Script file
        input: PathBuf,

        /// Bundle to write
        output: PathBuf,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'hotkey docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config, cli.verbose);

    let result = match cli.command {
        Commands::Check { script, ast, pretty } => run_check(script, ast, pretty),
        Commands::Run {
            script,
            mode,
            triggers,
            echo,
        } => {
            let mut config = config;
            config.host.echo |= echo;
            run_script(RunOptions {
                path: Some(script),
                mode,
                triggers,
                config,
                ..Default::default()
            })
        }
        Commands::Eval { code, mode } => run_script(RunOptions {
            source: Some(code),
            mode,
            config,
            ..Default::default()
        }),
        Commands::Compile { input, output } => run_compile(CompileOptions {
            input,
            output,
            config,
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn init_logging(config: &EngineConfig, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn run_check(script: Option<PathBuf>, ast: bool, pretty: bool) -> Result<(), CliError> {
    let source = match script {
        Some(path) => std::fs::read_to_string(path)?,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => return Err(CliError::NoInput),
    };

    let result = cli::execute_check(&CheckOptions {
        source,
        dump_ast: ast,
        pretty,
    })?;

    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "Syntax is valid: {} statement(s), {} binding(s)",
        result.statements,
        result.bindings.len()
    );
    for hotkey in &result.bindings {
        println!("  {}", hotkey);
    }
    if let Some(tree) = result.ast {
        println!("{}", tree);
    }
    Ok(())
}

fn run_script(options: RunOptions) -> Result<(), CliError> {
    let result = cli::execute_run(&options)?;

    println!("{}", serde_json::to_string(&result.value)?);
    if !result.bound.is_empty() {
        println!("bound: {}", result.bound.join(", "));
    }
    for outcome in &result.triggered {
        match &outcome.result {
            Some(value) => println!("{} => {}", outcome.hotkey, serde_json::to_string(value)?),
            None => println!("{} => (not bound)", outcome.hotkey),
        }
    }
    Ok(())
}

fn run_compile(options: CompileOptions) -> Result<(), CliError> {
    let bundle = cli::execute_compile(&options)?;
    println!(
        "wrote {} with {} binding(s)",
        options.output.display(),
        bundle.bindings.len()
    );
    Ok(())
}
