use clap::Subcommand;

use crate::cli::app::App;
use crate::cli::utils::{output_collection, output_record};
use crate::cli::OutputFormat;
use crate::fetch::{FetchFailure, VehicleDetailHook, VehicleListHook};
use crate::gateway::CatalogScope;
use crate::models::Vehicle;

#[derive(Subcommand)]
pub enum InventoryCommands {
    #[command(about = "List vehicles available for sale")]
    List,

    #[command(about = "Show one vehicle in detail")]
    Show {
        #[arg(help = "Vehicle id")]
        id: String,
    },
}

pub async fn handle(cmd: InventoryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let app = App::init().await?;

    match cmd {
        InventoryCommands::List => {
            let hook = VehicleListHook::mount(app.gateway.clone(), CatalogScope::Public).await;
            let state = hook.state();
            if let Some(err) = state.error {
                anyhow::bail!(err);
            }

            let lines = state.data.iter().map(summary_line).collect();
            output_collection(
                &output_format,
                "vehicles",
                serde_json::to_value(&state.data)?,
                lines,
                "No cars available right now.",
            )
        }

        InventoryCommands::Show { id } => {
            let hook = VehicleDetailHook::mount(app.gateway.clone(), id.as_str()).await;
            let state = hook.state();
            match (state.data, state.error) {
                (Some(vehicle), _) => output_record(
                    &output_format,
                    serde_json::to_value(&vehicle)?,
                    detail_text(&vehicle),
                ),
                (None, Some(FetchFailure::NotFound)) => {
                    anyhow::bail!("vehicle {} not found", id)
                }
                (None, Some(err)) => anyhow::bail!(err),
                (None, None) => anyhow::bail!("vehicle {} not found", id),
            }
        }
    }
}

pub fn summary_line(vehicle: &Vehicle) -> String {
    format!(
        "{}  {} {} {}  ${}  {} mi{}",
        vehicle.id,
        vehicle.year,
        vehicle.make,
        vehicle.model,
        vehicle.price,
        vehicle.mileage,
        if vehicle.available { "" } else { "  [sold]" }
    )
}

fn detail_text(vehicle: &Vehicle) -> String {
    let mut text = format!(
        "{} {} {} ({})\n  price: ${}\n  mileage: {} mi\n  fuel: {}\n  transmission: {}\n  color: {}\n  {}",
        vehicle.year,
        vehicle.make,
        vehicle.model,
        vehicle.id,
        vehicle.price,
        vehicle.mileage,
        vehicle.fuel_type,
        vehicle.transmission,
        vehicle.color,
        vehicle.description,
    );
    if !vehicle.features.is_empty() {
        text.push_str("\n  features: ");
        text.push_str(&vehicle.features.join(", "));
    }
    if !vehicle.available {
        text.push_str("\n  (no longer available)");
    }
    text
}
