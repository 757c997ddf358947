//! CLI definition using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use parqueo_types::{OutputFormat, PhotoAngle, VehicleType};

#[derive(Parser)]
#[command(name = "parqueo")]
#[command(version)]
#[command(about = "Parking lot management with camera plate recognition")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Data directory override
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest one camera photo
    Ingest {
        /// Path to image file
        image: PathBuf,

        /// Camera angle of the shot
        #[arg(long, short = 'a', value_enum, default_value_t = PhotoAngle::EntryRight)]
        angle: PhotoAngle,

        /// Vehicle type for a newly opened session
        #[arg(long, value_enum, default_value_t = VehicleType::Car)]
        vehicle_type: VehicleType,

        /// Entry time (HH:MM); defaults to now
        #[arg(long, short = 't')]
        time: Option<String>,
    },

    /// Ingest every image in a folder; angle is inferred from filename
    /// suffixes (_left, _rear)
    IngestDir {
        /// Path to folder containing images
        folder: PathBuf,

        /// Vehicle type for newly opened sessions
        #[arg(long, value_enum, default_value_t = VehicleType::Car)]
        vehicle_type: VehicleType,
    },

    /// Open a session by hand, bypassing recognition
    Enter {
        /// License plate (e.g. ABC123 or ABC-123)
        plate: String,

        /// Vehicle type
        #[arg(long, value_enum, default_value_t = VehicleType::Car)]
        vehicle_type: VehicleType,

        /// Entry time (HH:MM); defaults to now
        #[arg(long, short = 't')]
        time: Option<String>,
    },

    /// Close a session and bill it
    Exit {
        /// Session id
        session_id: String,

        /// Exit time (HH:MM); defaults to now
        #[arg(long, short = 't')]
        time: Option<String>,
    },

    /// Find the active session for a plate
    Find {
        /// License plate
        plate: String,
    },

    /// List sessions
    Sessions {
        /// Only active (or only closed with --active=false) sessions
        #[arg(long)]
        active: Option<bool>,

        /// Substring match on the plate
        #[arg(long, short = 'p')]
        plate: Option<String>,

        /// Maximum number of sessions to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// List the entry photos of a session
    Photos {
        /// Session id
        session_id: String,
    },

    /// Correct the detected plate on a photo
    Correct {
        /// Photo id
        photo_id: String,

        /// Corrected license plate
        plate: String,
    },

    /// Delete a photo record and its stored image
    DeletePhoto {
        /// Photo id
        photo_id: String,
    },

    /// Manage the tariff
    Tariff {
        #[command(subcommand)]
        command: TariffCommands,
    },
}

#[derive(Subcommand)]
pub enum TariffCommands {
    /// Create or replace the tariff record
    Init {
        /// Hourly rate
        #[arg(long)]
        hourly: f64,

        /// Generic monthly price
        #[arg(long)]
        monthly: f64,

        /// Monthly price for motorcycles
        #[arg(long)]
        monthly_moto: f64,

        /// Monthly price for cars
        #[arg(long)]
        monthly_car: f64,
    },

    /// Show the current tariff
    Get,

    /// Update the hourly rate
    SetHourly { value: f64 },

    /// Update the generic monthly price
    SetMonthly { value: f64 },

    /// Update the monthly price for motorcycles
    SetMonthlyMoto { value: f64 },

    /// Update the monthly price for cars
    SetMonthlyCar { value: f64 },
}
