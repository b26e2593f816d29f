//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use pkengine_ops::Operation;
use pkengine_types::{FilterSet, OutputFormat, ProvidesKind, SigType};
use std::path::PathBuf;

/// pkengine - package transaction engine
#[derive(Parser)]
#[command(name = "pkengine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run package transactions against a catalogue")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Output format for the event stream
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Shorthand for `--output json`
    #[arg(long, global = true, conflicts_with = "output")]
    pub json: bool,

    /// Write structured debug logs to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Load the package catalogue from a TOML file instead of the bundled one
    #[arg(long, global = true, value_name = "PATH", env = "PKENGINE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Behave as if the network were unavailable
    #[arg(long, global = true)]
    pub offline: bool,

    /// Locale used to render package summaries
    #[arg(long, global = true, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Request cancellation after this many milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub cancel_after: Option<u64>,
}

impl GlobalArgs {
    /// Output format from flags, if any flag chose one
    pub fn output_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else {
            self.output
        }
    }
}

/// Filter argument shared by the query commands
#[derive(Args)]
pub struct FilterArg {
    /// Semicolon separated filter facets (installed;~devel;gui)
    #[arg(long, short, default_value = "none")]
    pub filter: String,
}

impl FilterArg {
    fn parse(&self) -> FilterSet {
        FilterSet::parse(&self.filter)
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve package names to package ids
    Resolve {
        #[command(flatten)]
        filter: FilterArg,
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Search packages by name, details, group or file
    #[command(alias = "find")]
    Search {
        #[command(flatten)]
        filter: FilterArg,
        /// Field to match against
        #[arg(long, value_enum, default_value = "name")]
        by: SearchBy,
        /// Search text
        text: String,
    },

    /// List the dependencies of packages
    Depends {
        #[command(flatten)]
        filter: FilterArg,
        /// Follow dependencies transitively
        #[arg(long)]
        recursive: bool,
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// List the packages that require the given packages
    Requires {
        #[command(flatten)]
        filter: FilterArg,
        /// Follow reverse dependencies transitively
        #[arg(long)]
        recursive: bool,
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// Show package details
    #[command(alias = "info")]
    Details {
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// List the files of packages
    Files {
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// List pending updates
    Updates {
        #[command(flatten)]
        filter: FilterArg,
    },

    /// Show update details
    UpdateDetail {
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// List every package in the catalogue
    #[command(alias = "ls")]
    Packages {
        #[command(flatten)]
        filter: FilterArg,
    },

    /// List available distribution upgrades
    DistroUpgrades,

    /// Find packages that provide a capability
    WhatProvides {
        #[command(flatten)]
        filter: FilterArg,
        /// Capability namespace
        #[arg(long, value_enum, default_value = "any")]
        kind: ProvidesKind,
        /// Capability text
        text: String,
    },

    /// Install packages
    #[command(alias = "i")]
    Install {
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// Accept a repository signing key for a package
    InstallSignature {
        /// Key identifier as announced by the signature prompt
        key_id: String,
        /// Package the key was requested for
        package_id: String,
    },

    /// Accept a license agreement
    AcceptEula {
        eula_id: String,
    },

    /// Install local package files
    InstallFiles {
        /// Only accept files from trusted sources
        #[arg(long)]
        trusted: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove packages
    #[command(alias = "rm")]
    Remove {
        /// Also remove packages that depend on the targets
        #[arg(long)]
        allow_deps: bool,
        /// Remove dependencies nothing else needs
        #[arg(long)]
        autoremove: bool,
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// Update packages
    #[command(alias = "up")]
    Update {
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// Apply every pending update
    UpdateSystem,

    /// Refresh repository metadata
    Refresh {
        /// Discard cached metadata first
        #[arg(long)]
        force: bool,
    },

    /// Download package artifacts into a directory
    Download {
        /// Destination directory
        #[arg(long, short, value_name = "DIR")]
        directory: PathBuf,
        #[arg(required = true)]
        package_ids: Vec<String>,
    },

    /// Roll back to an earlier transaction
    Rollback {
        transaction_id: String,
    },

    /// Repository management
    #[command(subcommand)]
    Repo(RepoCommands),
}

/// Search field
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum SearchBy {
    Name,
    Details,
    Group,
    File,
}

/// Repository management commands
#[derive(Subcommand)]
pub enum RepoCommands {
    /// List repositories
    List {
        #[command(flatten)]
        filter: FilterArg,
    },

    /// Enable a repository
    Enable {
        repo_id: String,
    },

    /// Disable a repository
    Disable {
        repo_id: String,
    },

    /// Set a repository parameter
    Set {
        repo_id: String,
        parameter: String,
        value: String,
    },

    /// Announce removable media as a repository
    AddMedia {
        /// Mount point of the media
        location: String,
        /// Enable the repository immediately
        #[arg(long)]
        enabled: bool,
    },
}

impl Commands {
    /// Translate the command into the operation it requests
    pub fn into_operation(self) -> Operation {
        match self {
            Self::Resolve { filter, names } => Operation::Resolve {
                filters: filter.parse(),
                names,
            },
            Self::Search { filter, by, text } => {
                let filters = filter.parse();
                match by {
                    SearchBy::Name => Operation::SearchName { filters, text },
                    SearchBy::Details => Operation::SearchDetails { filters, text },
                    SearchBy::Group => Operation::SearchGroup { filters, text },
                    SearchBy::File => Operation::SearchFile { filters, text },
                }
            }
            Self::Depends {
                filter,
                recursive,
                package_ids,
            } => Operation::GetDepends {
                filters: filter.parse(),
                package_ids,
                recursive,
            },
            Self::Requires {
                filter,
                recursive,
                package_ids,
            } => Operation::GetRequires {
                filters: filter.parse(),
                package_ids,
                recursive,
            },
            Self::Details { package_ids } => Operation::GetDetails { package_ids },
            Self::Files { package_ids } => Operation::GetFiles { package_ids },
            Self::Updates { filter } => Operation::GetUpdates {
                filters: filter.parse(),
            },
            Self::UpdateDetail { package_ids } => Operation::GetUpdateDetail { package_ids },
            Self::Packages { filter } => Operation::GetPackages {
                filters: filter.parse(),
            },
            Self::DistroUpgrades => Operation::GetDistroUpgrades,
            Self::WhatProvides { filter, kind, text } => Operation::WhatProvides {
                filters: filter.parse(),
                kind,
                text,
            },
            Self::Install { package_ids } => Operation::InstallPackages { package_ids },
            Self::InstallSignature { key_id, package_id } => Operation::InstallSignature {
                sig_type: SigType::Gpg,
                key_id,
                package_id,
            },
            Self::AcceptEula { eula_id } => Operation::AcceptEula { eula_id },
            Self::InstallFiles { trusted, paths } => Operation::InstallFiles { trusted, paths },
            Self::Remove {
                allow_deps,
                autoremove,
                package_ids,
            } => Operation::RemovePackages {
                package_ids,
                allow_deps,
                autoremove,
            },
            Self::Update { package_ids } => Operation::UpdatePackages { package_ids },
            Self::UpdateSystem => Operation::UpdateSystem,
            Self::Refresh { force } => Operation::RefreshCache { force },
            Self::Download {
                directory,
                package_ids,
            } => Operation::DownloadPackages {
                package_ids,
                directory,
            },
            Self::Rollback { transaction_id } => Operation::Rollback { transaction_id },
            Self::Repo(repo) => repo.into_operation(),
        }
    }
}

impl RepoCommands {
    fn into_operation(self) -> Operation {
        match self {
            Self::List { filter } => Operation::GetRepoList {
                filters: filter.parse(),
            },
            Self::Enable { repo_id } => Operation::RepoEnable {
                repo_id,
                enabled: true,
            },
            Self::Disable { repo_id } => Operation::RepoEnable {
                repo_id,
                enabled: false,
            },
            Self::Set {
                repo_id,
                parameter,
                value,
            } => Operation::RepoSetData {
                repo_id,
                parameter,
                value,
            },
            Self::AddMedia { location, enabled } => {
                Operation::AddMediaRepository { location, enabled }
            }
        }
    }
}
