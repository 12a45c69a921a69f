//! Command-line arguments

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use gridkit_table::{SortDirection, SortState};

#[derive(Parser, Debug)]
#[command(name = "gridkit")]
#[command(about = "Headless data grid engine and column-definition client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to the user config dir)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Column service API root, overriding settings
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], global = true)]
    pub log_level: Option<String>,

    /// Verbose development logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one page of rows through filter, search, sort and pagination
    View(ViewArgs),

    /// Manage stored column configuration and the live table schema
    Columns {
        /// Page whose configuration is stored
        #[arg(long)]
        page_name: String,

        /// Live database table behind the page
        #[arg(long)]
        table: String,

        #[command(subcommand)]
        command: ColumnsCommand,
    },
}

#[derive(clap::Args, Debug)]
pub struct ViewArgs {
    /// JSON array of row objects, each with an `id`
    #[arg(long)]
    pub rows: PathBuf,

    /// JSON array of column declarations
    #[arg(long)]
    pub columns: PathBuf,

    /// Exact-match filter, `field=value`; repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Case-insensitive search over searchable columns
    #[arg(long)]
    pub search: Option<String>,

    /// Sort key, `field` or `field:desc`
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortState>,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long)]
    pub page_size: Option<usize>,

    /// Rows already are the current page of this many in total
    #[arg(long)]
    pub total: Option<usize>,

    /// Print JSON instead of a text table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ColumnsCommand {
    /// Print the stored configuration merged over local defaults
    Load {
        /// Default column declarations
        #[arg(long)]
        columns: Option<PathBuf>,

        #[arg(long, default_value = "")]
        title: String,
    },

    /// Store a column configuration
    Save {
        #[arg(long)]
        columns: PathBuf,

        #[arg(long, default_value = "")]
        title: String,

        /// Form field list; derived from the columns when omitted
        #[arg(long)]
        form_columns: Option<PathBuf>,

        #[arg(long)]
        form_width: Option<u32>,
    },

    /// Report which fields exist in the live table
    Check {
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Create columns in the live table, `field:type`
    Add {
        #[arg(required = true, value_parser = parse_column_spec)]
        specs: Vec<(String, String)>,
    },

    /// Drop a column from the live table
    Delete {
        field: String,

        /// Confirm the irreversible drop
        #[arg(long)]
        yes: bool,
    },

    /// List live columns missing from a column declaration file
    Sync {
        #[arg(long)]
        columns: Option<PathBuf>,
    },
}

/// `field=value`; the value may be empty or contain `=`
pub fn parse_filter(s: &str) -> Result<(String, String)> {
    let (field, value) = s
        .split_once('=')
        .with_context(|| format!("expected field=value, got '{}'", s))?;
    if field.is_empty() {
        bail!("filter field is empty in '{}'", s);
    }
    Ok((field.to_string(), value.to_string()))
}

/// `field`, `field:asc` or `field:desc`
pub fn parse_sort(s: &str) -> Result<SortState> {
    let (field, direction) = match s.rsplit_once(':') {
        Some((field, "asc")) => (field, SortDirection::Ascending),
        Some((field, "desc")) => (field, SortDirection::Descending),
        Some((_, other)) => bail!("unknown sort direction '{}', expected asc or desc", other),
        None => (s, SortDirection::Ascending),
    };
    if field.is_empty() {
        bail!("sort field is empty in '{}'", s);
    }
    Ok(SortState::by(field, direction))
}

/// `field:type`; the type defaults to `string`
pub fn parse_column_spec(s: &str) -> Result<(String, String)> {
    let (field, column_type) = s.split_once(':').unwrap_or((s, "string"));
    if field.is_empty() {
        bail!("column field is empty in '{}'", s);
    }
    Ok((field.to_string(), column_type.to_string()))
}
