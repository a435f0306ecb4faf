use anyhow::Result;
use clap::Parser;
use grove::commands;
use grove::config::Config;
use grove::runtime::RealRuntime;
use std::path::PathBuf;

/// grove - build and install command-line tools from git repositories
///
/// Packages are cloned, built with cargo and kept under the grove root, one
/// directory per built version. `--link` exposes a package's command in the
/// link directory.
///
/// Examples:
///   grove install owner/tool            # Build the latest tagged version
///   grove install owner/tool@1.2.0 -g   # Build 1.2.0 and link it globally
///   grove run owner/tool -- --help      # Install if needed, then run
#[derive(Parser, Debug)]
#[command(author, version = env!("GROVE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Grove root directory (default: ~/.grove)
    #[arg(
        long = "root",
        short = 'r',
        env = "GROVE_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// Directory receiving global command links
    /// (default: /usr/local/bin when privileged, else <root>/bin)
    #[arg(long = "link-dir", env = "GROVE_LINK_DIR", value_name = "PATH", global = true)]
    pub link_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build and install a package
    Install(InstallArgs),

    /// Install a package if needed and run its command
    Run(RunArgs),

    /// Print the path of an installed command
    Which(WhichArgs),

    /// List installed packages and their built versions
    List,

    /// Remove installed packages
    Uninstall(UninstallArgs),

    /// Install every package listed in ./Grovefile
    Bootstrap(BootstrapArgs),
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Repository to install: "owner/repo", a git URL, optionally "@version"
    #[arg(value_name = "SPEC")]
    pub spec: String,

    /// Rebuild even if this version is already installed
    #[arg(long, short = 'u')]
    pub update: bool,

    /// Link the command into the link directory
    #[arg(long, short = 'g', visible_alias = "global")]
    pub link: bool,

    /// Name of the built executable (default: repository name)
    #[arg(long = "command", short = 'c', value_name = "NAME")]
    pub command: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[arg(value_name = "SPEC")]
    pub spec: String,

    /// Name of the built executable (default: repository name)
    #[arg(long = "command", short = 'c', value_name = "NAME")]
    pub command: Option<String>,

    /// Arguments passed to the command
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct WhichArgs {
    #[arg(value_name = "SPEC")]
    pub spec: String,

    #[arg(long = "command", short = 'c', value_name = "NAME")]
    pub command: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UninstallArgs {
    /// Repository locator or any part of it (case-insensitive)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Remove every package matching NAME
    #[arg(long)]
    pub all: bool,

    /// Don't ask before removing several packages
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct BootstrapArgs {
    /// Link every command into the link directory
    #[arg(long, short = 'g', visible_alias = "global")]
    pub link: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;
    let config = Config::new(&runtime, cli.root, cli.link_dir)?;

    match cli.command {
        Commands::Install(args) => {
            commands::install(
                runtime,
                &args.spec,
                args.command.as_deref(),
                args.update,
                args.link,
                config,
            )?;
        }
        Commands::Run(args) => {
            let code = commands::run(
                runtime,
                &args.spec,
                args.command.as_deref(),
                &args.args,
                config,
            )?;
            std::process::exit(code);
        }
        Commands::Which(args) => {
            let path = commands::which(runtime, &args.spec, args.command.as_deref(), config)?;
            println!("{}", path.display());
        }
        Commands::List => commands::list(runtime, config)?,
        Commands::Uninstall(args) => {
            commands::uninstall(runtime, &args.name, args.all, args.yes, config)?
        }
        Commands::Bootstrap(args) => commands::bootstrap(runtime, args.link, config)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["grove", "install", "owner/tool@1.0.0", "-g"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.spec, "owner/tool@1.0.0");
                assert!(args.link);
                assert!(!args.update);
                assert_eq!(args.command, None);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_command_name() {
        let cli = Cli::try_parse_from([
            "grove", "install", "owner/tool-rs", "--command", "tool", "--update",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.command.as_deref(), Some("tool"));
                assert!(args.update);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_run_passes_trailing_args() {
        let cli =
            Cli::try_parse_from(["grove", "run", "owner/tool", "--", "--help", "-v"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.spec, "owner/tool");
                assert_eq!(args.args, vec!["--help", "-v"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_uninstall_flags() {
        let cli = Cli::try_parse_from(["grove", "uninstall", "tool", "--all", "-y"]).unwrap();
        match cli.command {
            Commands::Uninstall(args) => {
                assert_eq!(args.name, "tool");
                assert!(args.all);
                assert!(args.yes);
            }
            _ => panic!("Expected Uninstall command"),
        }
    }

    #[test]
    fn test_cli_global_root_parsing() {
        let cli = Cli::try_parse_from([
            "grove", "--root", "/tmp/grove", "list", "--link-dir", "/tmp/bin",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/grove")));
        assert_eq!(cli.link_dir, Some(PathBuf::from("/tmp/bin")));
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["grove", "owner/tool"]).is_err());
    }
}
