use clap::Subcommand;
use rust_decimal::Decimal;

use crate::cli::app::App;
use crate::cli::commands::{appointments, inventory};
use crate::cli::utils::{output_collection, output_record, output_success};
use crate::cli::OutputFormat;
use crate::gateway::CatalogScope;
use crate::models::{AppointmentStatus, FuelType, Transmission, Vehicle, VehicleDraft};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(subcommand, about = "Manage the vehicle inventory")]
    Vehicles(VehicleCommands),

    #[command(subcommand, about = "Manage user accounts")]
    Users(UserCommands),

    #[command(subcommand, about = "Manage test drive appointments")]
    Appointments(AdminAppointmentCommands),
}

#[derive(Subcommand)]
pub enum VehicleCommands {
    #[command(about = "List every vehicle, sold ones included")]
    List,

    #[command(about = "Add a vehicle to the inventory")]
    Add {
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value = "")]
        image: String,
        #[arg(long, default_value_t = 0)]
        mileage: u32,
        #[arg(long, default_value = "gasoline")]
        fuel: FuelType,
        #[arg(long, default_value = "automatic")]
        transmission: Transmission,
        #[arg(long, default_value = "")]
        color: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_delimiter = ',', help = "Comma-separated feature list")]
        features: Vec<String>,
        #[arg(long, help = "Mark the vehicle as already sold")]
        sold: bool,
    },

    #[command(about = "Update fields on an existing vehicle")]
    Update {
        id: String,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        mileage: Option<u32>,
        #[arg(long)]
        fuel: Option<FuelType>,
        #[arg(long)]
        transmission: Option<Transmission>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_delimiter = ',')]
        features: Option<Vec<String>>,
        #[arg(long, help = "Mark the vehicle as sold")]
        sold: bool,
        #[arg(long, conflicts_with = "sold", help = "Put the vehicle back on sale")]
        relist: bool,
    },

    #[command(about = "Delete a vehicle with no appointments against it")]
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List every account, newest first")]
    List,

    #[command(about = "Grant administrator access")]
    Promote { id: String },

    #[command(about = "Revoke administrator access")]
    Demote { id: String },
}

#[derive(Subcommand)]
pub enum AdminAppointmentCommands {
    #[command(about = "List every appointment in the system")]
    List,

    #[command(about = "Move an appointment to a new status")]
    SetStatus {
        id: String,
        #[arg(help = "pending, confirmed, completed or cancelled")]
        status: AppointmentStatus,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let app = App::init().await?;
    app.require_admin()?;

    match cmd {
        AdminCommands::Vehicles(cmd) => handle_vehicles(&app, cmd, output_format).await,
        AdminCommands::Users(cmd) => handle_users(&app, cmd, output_format).await,
        AdminCommands::Appointments(cmd) => handle_appointments(&app, cmd, output_format).await,
    }
}

async fn handle_vehicles(
    app: &App,
    cmd: VehicleCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        VehicleCommands::List => {
            let vehicles = app.gateway.list_vehicles(CatalogScope::Admin).await?;
            let lines = vehicles.iter().map(inventory::summary_line).collect();
            output_collection(
                &output_format,
                "vehicles",
                serde_json::to_value(&vehicles)?,
                lines,
                "Inventory is empty.",
            )
        }

        VehicleCommands::Add {
            make,
            model,
            year,
            price,
            image,
            mileage,
            fuel,
            transmission,
            color,
            description,
            features,
            sold,
        } => {
            let draft = VehicleDraft {
                make,
                model,
                year,
                price,
                image,
                mileage,
                fuel_type: fuel,
                transmission,
                color,
                description,
                features,
                available: !sold,
            };
            draft.validate().map_err(|err| anyhow::anyhow!(err))?;

            let vehicle = app.gateway.create_vehicle(&draft).await?;
            output_success(
                &output_format,
                &format!("Added {} {} {}", vehicle.year, vehicle.make, vehicle.model),
                Some(serde_json::json!({ "vehicle": vehicle })),
            )
        }

        VehicleCommands::Update {
            id,
            make,
            model,
            year,
            price,
            image,
            mileage,
            fuel,
            transmission,
            color,
            description,
            features,
            sold,
            relist,
        } => {
            let current = app.gateway.fetch_vehicle(&id).await?;
            let draft = merge_draft(
                current,
                UpdateFields {
                    make,
                    model,
                    year,
                    price,
                    image,
                    mileage,
                    fuel,
                    transmission,
                    color,
                    description,
                    features,
                    available: if sold {
                        Some(false)
                    } else if relist {
                        Some(true)
                    } else {
                        None
                    },
                },
            );
            draft.validate().map_err(|err| anyhow::anyhow!(err))?;

            let vehicle = app.gateway.update_vehicle(&id, &draft).await?;
            output_success(
                &output_format,
                &format!("Updated {}", vehicle.id),
                Some(serde_json::json!({ "vehicle": vehicle })),
            )
        }

        VehicleCommands::Remove { id } => {
            app.gateway.delete_vehicle(&id).await?;
            output_success(&output_format, &format!("Removed {}", id), None)
        }
    }
}

async fn handle_users(
    app: &App,
    cmd: UserCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List => {
            let profiles = app.gateway.list_profiles().await?;
            let lines = profiles
                .iter()
                .map(|p| {
                    format!(
                        "{}  {}  <{}>{}",
                        p.id,
                        p.name,
                        p.email,
                        if p.is_administrator { "  [admin]" } else { "" }
                    )
                })
                .collect();
            output_collection(
                &output_format,
                "users",
                serde_json::to_value(&profiles)?,
                lines,
                "No accounts registered.",
            )
        }

        UserCommands::Promote { id } => {
            let profile = app.gateway.set_administrator(&id, true).await?;
            output_success(
                &output_format,
                &format!("{} is now an administrator", profile.name),
                Some(serde_json::json!({ "user": profile })),
            )
        }

        UserCommands::Demote { id } => {
            let profile = app.gateway.set_administrator(&id, false).await?;
            output_success(
                &output_format,
                &format!("{} is no longer an administrator", profile.name),
                Some(serde_json::json!({ "user": profile })),
            )
        }
    }
}

async fn handle_appointments(
    app: &App,
    cmd: AdminAppointmentCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AdminAppointmentCommands::List => {
            let all = app.gateway.list_all_appointments().await?;
            let lines = all.iter().map(appointments::summary_line).collect();
            output_collection(
                &output_format,
                "appointments",
                serde_json::to_value(&all)?,
                lines,
                "No appointments in the system.",
            )
        }

        AdminAppointmentCommands::SetStatus { id, status } => {
            let appointment = app.gateway.set_appointment_status(&id, status).await?;
            output_record(
                &output_format,
                serde_json::to_value(&appointment)?,
                format!("{} -> {}", appointment.id, appointment.status),
            )
        }
    }
}

struct UpdateFields {
    make: Option<String>,
    model: Option<String>,
    year: Option<i32>,
    price: Option<Decimal>,
    image: Option<String>,
    mileage: Option<u32>,
    fuel: Option<FuelType>,
    transmission: Option<Transmission>,
    color: Option<String>,
    description: Option<String>,
    features: Option<Vec<String>>,
    available: Option<bool>,
}

fn merge_draft(current: Vehicle, fields: UpdateFields) -> VehicleDraft {
    VehicleDraft {
        make: fields.make.unwrap_or(current.make),
        model: fields.model.unwrap_or(current.model),
        year: fields.year.unwrap_or(current.year),
        price: fields.price.unwrap_or(current.price),
        image: fields.image.unwrap_or(current.image),
        mileage: fields.mileage.unwrap_or(current.mileage),
        fuel_type: fields.fuel.unwrap_or(current.fuel_type),
        transmission: fields.transmission.unwrap_or(current.transmission),
        color: fields.color.unwrap_or(current.color),
        description: fields.description.unwrap_or(current.description),
        features: fields.features.unwrap_or(current.features),
        available: fields.available.unwrap_or(current.available),
    }
}
