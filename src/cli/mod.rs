// CLI module for administrative operations requiring server access

pub mod seed;

use clap::{Parser, Subcommand};

/// Rewire CLI for administrative operations
#[derive(Parser)]
#[command(name = "rewire")]
#[command(about = "Rewire user management backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run database migrations and exit
    Migrate,

    /// Seed the role catalog (and optionally demo accounts) and exit
    Seed {
        /// Also create a demo super-admin, admin and user account
        #[arg(long)]
        demo: bool,
    },

    /// Run migrations, seed roles and start the HTTP server (default)
    Serve,
}
