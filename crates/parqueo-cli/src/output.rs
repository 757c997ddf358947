//! Output formatting module

use serde_json::json;

use parqueo_app::app::{ExitReceipt, IngestPhotoOutcome};
use parqueo_domain::model::{ParkingSession, Photo, TariffConfig};
use parqueo_types::{OutputFormat, Result};

pub fn output_ingest(format: OutputFormat, outcome: &IngestPhotoOutcome) -> Result<()> {
    if format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(&json!({
            "recognition": &outcome.recognition,
            "session_id": outcome.session_id,
            "session_created": outcome.session_created,
            "photo": &outcome.photo,
        }))?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nIngest Result");
    println!("=============");
    println!(
        "Plate detected:  {}",
        if outcome.recognition.success { "Yes" } else { "No" }
    );
    if let Some(plate) = &outcome.recognition.plate {
        println!("Plate:           {}", plate);
        println!(
            "Confidence:      {:.0}%",
            outcome.recognition.confidence * 100.0
        );
    } else if !outcome.recognition.raw_text.is_empty() {
        println!("Text found:      {}", outcome.recognition.raw_text);
    }
    match outcome.session_id {
        Some(id) => {
            println!("Session:         {}", id);
            println!(
                "Session status:  {}",
                if outcome.session_created { "opened" } else { "existing" }
            );
        }
        None => {
            println!("Session:         none (photo not stored)");
            println!("\n{}", outcome.recognition.message);
        }
    }
    Ok(())
}

pub fn output_session(format: OutputFormat, session: &ParkingSession) -> Result<()> {
    output_sessions(format, std::slice::from_ref(session))
}

pub fn output_sessions(format: OutputFormat, sessions: &[ParkingSession]) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No sessions found");
        return Ok(());
    }

    println!(
        "{:<36}  {:<8}  {:<5}  {:<6}  {:<6}  {:<7}  {}",
        "ID", "Plate", "Type", "Entry", "Exit", "Photos", "Cost"
    );
    for s in sessions {
        println!(
            "{:<36}  {:<8}  {:<5}  {:<6}  {:<6}  {:<7}  {}",
            s.id,
            s.plate,
            s.vehicle_type,
            s.entry_time.format("%H:%M"),
            s.exit_time()
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            s.photo_count,
            s.cost()
                .map(|c| format!("{:.0}", c))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

pub fn output_photos(format: OutputFormat, photos: &[Photo]) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(photos)?);
        return Ok(());
    }

    if photos.is_empty() {
        println!("No photos found");
        return Ok(());
    }

    println!(
        "{:<36}  {:<12}  {:<8}  {:<10}  {}",
        "ID", "Angle", "Plate", "Confidence", "Asset"
    );
    for p in photos {
        println!(
            "{:<36}  {:<12}  {:<8}  {:<10}  {}",
            p.id,
            p.angle,
            p.detected_plate
                .as_ref()
                .map(|plate| plate.to_string())
                .unwrap_or_else(|| "-".to_string()),
            p.confidence
                .map(|c| format!("{:.0}%", c * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            p.asset_path,
        );
    }
    Ok(())
}

pub fn output_receipt(format: OutputFormat, receipt: &ExitReceipt) -> Result<()> {
    if format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(&json!({
            "session": &receipt.session,
            "quote": &receipt.quote,
        }))?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nExit Receipt");
    println!("============");
    println!("Plate:        {}", receipt.session.plate);
    println!("Entry:        {}", receipt.session.entry_time.format("%H:%M"));
    if let Some(exit) = receipt.session.exit_time() {
        println!("Exit:         {}", exit.format("%H:%M"));
    }
    println!("Duration:     {} min", receipt.quote.elapsed_minutes);
    println!("Billed hours: {}", receipt.quote.billed_hours);
    println!("Hourly rate:  {:.0}", receipt.quote.hourly_rate);
    println!("Total:        {:.0}", receipt.quote.cost);
    Ok(())
}

pub fn output_tariff(format: OutputFormat, tariff: &TariffConfig) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(tariff)?);
        return Ok(());
    }

    println!("\nTariff");
    println!("======");
    println!("Hourly rate:        {:.0}", tariff.hourly_rate);
    println!("Monthly:            {:.0}", tariff.monthly_price);
    println!("Monthly (moto):     {:.0}", tariff.monthly_price_moto);
    println!("Monthly (car):      {:.0}", tariff.monthly_price_car);
    println!("Updated:            {}", tariff.updated_at.format("%Y-%m-%d %H:%M"));
    Ok(())
}
