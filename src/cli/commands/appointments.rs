use chrono::{NaiveDate, NaiveTime};
use clap::Subcommand;

use crate::cli::app::App;
use crate::cli::utils::{output_collection, output_success};
use crate::cli::OutputFormat;
use crate::fetch::AppointmentsHook;
use crate::models::{Appointment, BookingRequest};

#[derive(Subcommand)]
pub enum AppointmentCommands {
    #[command(about = "List your test drive appointments")]
    List,

    #[command(about = "Book a test drive for a vehicle")]
    Book {
        #[arg(help = "Vehicle id")]
        vehicle_id: String,

        #[arg(long, help = "Date, YYYY-MM-DD")]
        date: String,

        #[arg(long, help = "Time, HH:MM")]
        time: String,

        #[arg(long, default_value = "", help = "Notes for the dealership")]
        notes: String,
    },
}

pub async fn handle(cmd: AppointmentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let app = App::init().await?;

    match cmd {
        AppointmentCommands::List => {
            if app.auth.identity().is_none() {
                anyhow::bail!("sign in to see your appointments: motors auth login <email>");
            }

            let hook = AppointmentsHook::mount(app.gateway.clone(), app.auth.subscribe()).await;
            let mut rx = hook.subscribe();
            let state = crate::fetch::settled(&mut rx).await;
            if let Some(err) = state.error {
                anyhow::bail!(err);
            }

            let lines = state.data.iter().map(summary_line).collect();
            output_collection(
                &output_format,
                "appointments",
                serde_json::to_value(&state.data)?,
                lines,
                "No appointments booked yet.",
            )
        }

        AppointmentCommands::Book {
            vehicle_id,
            date,
            time,
            notes,
        } => {
            if app.auth.identity().is_none() {
                anyhow::bail!("sign in to book a test drive: motors auth login <email>");
            }

            let request = BookingRequest {
                vehicle_id,
                date: parse_date(&date)?,
                time: parse_time(&time)?,
                notes,
            };

            let hook = AppointmentsHook::mount(app.gateway.clone(), app.auth.subscribe()).await;
            if !hook.book(request).await {
                anyhow::bail!("failed to book the test drive");
            }

            output_success(&output_format, "Test drive booked", None)
        }
    }
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid date '{}', expected YYYY-MM-DD", value))
}

fn parse_time(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| anyhow::anyhow!("invalid time '{}', expected HH:MM", value))
}

pub fn summary_line(appointment: &Appointment) -> String {
    format!(
        "{}  {} {}  vehicle {}  [{}]",
        appointment.id,
        appointment.date,
        appointment.time,
        appointment.vehicle_id,
        appointment.status,
    )
}
