//! Command handlers

use std::error::Error;

use chrono::{Local, NaiveTime};
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use parqueo_app::app::{IngestionService, SessionService, TariffService};
use parqueo_app::auth::AllowAll;
use parqueo_app::config::Config;
use parqueo_app::repository::{
    open_asset_store, open_burst_store, open_photo_repo, open_session_repo, open_tariff_repo,
};
use parqueo_app::scanner::{angle_from_filename, scan_directory};
use parqueo_domain::repository::SessionFilter;
use parqueo_types::Plate;
use parqueo_vision::TesseractCli;

use crate::cli::{Cli, Commands, TariffCommands};
use crate::output;

type CliResult = Result<(), Box<dyn Error>>;

/// Execute CLI command
pub fn execute(cli: Cli) -> CliResult {
    let mut config = Config::load()?;

    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    let format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Ingest {
            image,
            angle,
            vehicle_type,
            time,
        } => {
            let stores = Stores::open(&config)?;
            let engine = TesseractCli::new(config.ocr_command.clone());
            let service = stores.ingestion(&config, &engine);

            let outcome = match parse_time_opt(time.as_deref())? {
                Some(t) => service.ingest_photo_at(&image, angle, vehicle_type, t)?,
                None => service.ingest_photo(&image, angle, vehicle_type)?,
            };
            output::output_ingest(format, &outcome)?;
        }

        Commands::IngestDir {
            folder,
            vehicle_type,
        } => {
            let stores = Stores::open(&config)?;
            let engine = TesseractCli::new(config.ocr_command.clone());
            let service = stores.ingestion(&config, &engine);

            let images = scan_directory(&folder)?;
            if images.is_empty() {
                println!("No images found in {}", folder.display());
                return Ok(());
            }

            let pb = ProgressBar::new(images.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );

            let mut opened = 0usize;
            let mut attached = 0usize;
            let mut unresolved = 0usize;
            let mut failed = 0usize;

            for image in &images {
                let name = image
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string();
                pb.set_message(name);

                let angle = angle_from_filename(image);
                match service.ingest_photo(image, angle, vehicle_type) {
                    Ok(outcome) if outcome.session_created => opened += 1,
                    Ok(outcome) if outcome.session_id.is_some() => attached += 1,
                    Ok(_) => unresolved += 1,
                    Err(err) => {
                        log::warn!("ingest failed for {}: {}", image.display(), err);
                        failed += 1;
                    }
                }
                pb.inc(1);
            }
            pb.finish_with_message("Complete");

            println!("\nIngested {} images", images.len());
            println!("  Sessions opened:   {}", opened);
            println!("  Reused/attached:   {}", attached);
            println!("  Needs correction:  {}", unresolved);
            if failed > 0 {
                println!("  Failed:            {}", failed);
            }
        }

        Commands::Enter {
            plate,
            vehicle_type,
            time,
        } => {
            let stores = Stores::open(&config)?;
            let service = stores.session_service();
            let plate = Plate::parse(&plate)?;
            let entry_time =
                parse_time_opt(time.as_deref())?.unwrap_or_else(|| Local::now().time());
            let session = service.manual_entry(plate, vehicle_type, entry_time)?;
            output::output_session(format, &session)?;
        }

        Commands::Exit { session_id, time } => {
            let stores = Stores::open(&config)?;
            let service = stores.session_service();
            let id = parse_uuid(&session_id)?;
            let exit_time =
                parse_time_opt(time.as_deref())?.unwrap_or_else(|| Local::now().time());
            let receipt = service.register_exit(id, exit_time)?;
            output::output_receipt(format, &receipt)?;
        }

        Commands::Find { plate } => {
            let stores = Stores::open(&config)?;
            let service = stores.session_service();
            let plate = Plate::parse(&plate)?;
            match service.find_active_by_plate(&plate)? {
                Some(session) => output::output_session(format, &session)?,
                None => println!("No active session for plate {}", plate),
            }
        }

        Commands::Sessions {
            active,
            plate,
            limit,
        } => {
            let stores = Stores::open(&config)?;
            let service = stores.session_service();
            let sessions = service.list_sessions(&SessionFilter {
                active,
                plate_contains: plate,
                limit,
            })?;
            output::output_sessions(format, &sessions)?;
        }

        Commands::Photos { session_id } => {
            let stores = Stores::open(&config)?;
            let service = stores.session_service();
            let photos = service.entry_photos(parse_uuid(&session_id)?)?;
            output::output_photos(format, &photos)?;
        }

        Commands::Correct { photo_id, plate } => {
            let stores = Stores::open(&config)?;
            let service = stores.session_service();
            let plate = Plate::parse(&plate)?;
            let photo = service.correct_plate(parse_uuid(&photo_id)?, &plate)?;
            output::output_photos(format, std::slice::from_ref(&photo))?;
        }

        Commands::DeletePhoto { photo_id } => {
            let stores = Stores::open(&config)?;
            let service = stores.session_service();
            let photo = service.delete_photo(parse_uuid(&photo_id)?)?;
            println!("Deleted photo {}", photo.id);
        }

        Commands::Tariff { command } => {
            let stores = Stores::open(&config)?;
            let service = TariffService::new(&stores.tariffs, &AllowAll);
            let tariff = match command {
                TariffCommands::Init {
                    hourly,
                    monthly,
                    monthly_moto,
                    monthly_car,
                } => service.init(hourly, monthly, monthly_moto, monthly_car)?,
                TariffCommands::Get => service.current()?,
                TariffCommands::SetHourly { value } => service.set_hourly_rate(value)?,
                TariffCommands::SetMonthly { value } => service.set_monthly_price(value)?,
                TariffCommands::SetMonthlyMoto { value } => {
                    service.set_monthly_price_moto(value)?
                }
                TariffCommands::SetMonthlyCar { value } => service.set_monthly_price_car(value)?,
            };
            output::output_tariff(format, &tariff)?;
        }
    }

    Ok(())
}

/// Opened file-backed stores for one command invocation.
struct Stores {
    sessions: parqueo_infra::persistence::FileSessionRepository,
    photos: parqueo_infra::persistence::FilePhotoRepository,
    tariffs: parqueo_infra::persistence::FileTariffRepository,
    assets: parqueo_infra::PhotoAssetStore,
    bursts: parqueo_infra::persistence::BurstStore,
}

impl Stores {
    fn open(config: &Config) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            sessions: open_session_repo(config)?,
            photos: open_photo_repo(config)?,
            tariffs: open_tariff_repo(config)?,
            assets: open_asset_store(config)?,
            bursts: open_burst_store(config)?,
        })
    }

    fn ingestion<'a>(
        &'a self,
        config: &Config,
        engine: &'a TesseractCli,
    ) -> IngestionService<'a> {
        IngestionService::new(
            &self.sessions,
            &self.photos,
            &self.assets,
            &self.bursts,
            engine,
            std::time::Duration::from_millis(config.recognition_timeout_ms),
            config.burst_window_secs,
        )
    }

    fn session_service(&self) -> SessionService<'_> {
        SessionService::new(&self.sessions, &self.photos, &self.tariffs, &self.assets)
    }
}

fn parse_time_opt(time: Option<&str>) -> Result<Option<NaiveTime>, Box<dyn Error>> {
    let Some(raw) = time else {
        return Ok(None);
    };
    let parsed = NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("invalid time (expected HH:MM): {}", raw))?;
    Ok(Some(parsed))
}

fn parse_uuid(raw: &str) -> Result<Uuid, Box<dyn Error>> {
    Uuid::parse_str(raw).map_err(|_| format!("invalid id: {}", raw).into())
}
