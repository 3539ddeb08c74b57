use anyhow::Context;
use clap::{Parser, Subcommand};
use std::time::Duration;

use forecast_core::{
    ConfigStore, EntryConfig, EntryRegistry, Location, ProviderId, Sensor, validate_entry,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Daily forecast watcher")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate and store a new location.
    Add {
        #[command(subcommand)]
        provider: AddProvider,
    },

    /// Remove a stored location by its unique id.
    Remove {
        /// Location key, or the "lat,lon" composite shown by `list`.
        unique_id: String,
    },

    /// List stored locations and the sensors each exposes.
    List,

    /// Poll all stored locations and print sensor values as they update.
    Watch {
        /// Minutes between polls (at least 1).
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval_mins: u64,

        /// Do one refresh, print every sensor, and exit.
        #[arg(long)]
        once: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddProvider {
    /// AccuWeather: 5-day forecast for a pre-looked-up location key.
    Accuweather {
        #[arg(long)]
        location_key: String,

        /// Prompted for interactively when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Pirate Weather: 8-day forecast for a coordinate pair.
    Pirateweather {
        #[arg(long)]
        latitude: f64,

        #[arg(long)]
        longitude: f64,

        /// Prompted for interactively when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Add { provider } => add(provider).await,
            Command::Remove { unique_id } => remove(&unique_id),
            Command::List => list(),
            Command::Watch { interval_mins, once } => watch(interval_mins, once).await,
        }
    }
}

async fn add(provider: AddProvider) -> anyhow::Result<()> {
    let (provider_id, location, api_key) = match provider {
        AddProvider::Accuweather { location_key, api_key } => {
            (ProviderId::AccuWeather, Location::Key(location_key), api_key)
        }
        AddProvider::Pirateweather { latitude, longitude, api_key } => (
            ProviderId::PirateWeather,
            Location::Coordinates { latitude, longitude },
            api_key,
        ),
    };

    let api_key = match api_key {
        Some(key) => key,
        None => inquire::Password::new("API key:")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    let entry = EntryConfig::new(provider_id, api_key, location);

    let mut store = ConfigStore::load()?;
    if store.get(&entry.unique_id()).is_some() {
        anyhow::bail!("Location '{}' is already configured.", entry.unique_id());
    }

    // One probe request; classified errors surface here as the validation
    // message, and nothing is persisted on failure.
    let unique_id = validate_entry(&entry).await?;
    let title = entry.title();

    store.add_entry(entry)?;
    store.save()?;

    println!("Added {title} ({unique_id}).");
    Ok(())
}

fn remove(unique_id: &str) -> anyhow::Result<()> {
    let mut store = ConfigStore::load()?;
    if !store.remove_entry(unique_id) {
        anyhow::bail!("No location with id '{unique_id}'.");
    }
    store.save()?;
    println!("Removed {unique_id}.");
    Ok(())
}

fn list() -> anyhow::Result<()> {
    let store = ConfigStore::load()?;
    if store.entries.is_empty() {
        println!("No locations configured. Add one with `forecast add`.");
        return Ok(());
    }

    for entry in &store.entries {
        println!("{} ({})", entry.title(), entry.unique_id());
        let days = entry.provider.forecast_days();
        for field in entry.provider.sensor_fields() {
            println!("  {} for days 0..{}", field.label(), days - 1);
        }
    }
    Ok(())
}

async fn watch(interval_mins: u64, once: bool) -> anyhow::Result<()> {
    let store = ConfigStore::load()?;
    if store.entries.is_empty() {
        println!("No locations configured. Add one with `forecast add`.");
        return Ok(());
    }

    let interval = Duration::from_secs(interval_mins.saturating_mul(60));
    let mut registry = EntryRegistry::with_update_interval(interval);

    for entry in store.entries {
        let title = entry.title();
        if let Err(err) = registry.setup_entry(entry).await {
            eprintln!("Skipping {title}: {err}");
        }
    }

    if once {
        for handle in registry.handles() {
            println!("{}", handle.coordinator().entry().title());
            print_sensors(handle.sensors());
        }
        unload_all(&mut registry);
        return Ok(());
    }

    // One printer task per location: prints the current values immediately,
    // then again every time the snapshot is replaced.
    let mut printers = Vec::new();
    for handle in registry.handles() {
        let title = handle.coordinator().entry().title();
        let sensors = handle.sensors().to_vec();
        let mut rx = handle.coordinator().subscribe();

        printers.push(tokio::spawn(async move {
            loop {
                println!("[{}] {title}", chrono::Local::now().format("%H:%M:%S"));
                print_sensors(&sensors);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }));
    }

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    for printer in &printers {
        printer.abort();
    }
    unload_all(&mut registry);
    Ok(())
}

fn unload_all(registry: &mut EntryRegistry) {
    let ids: Vec<String> = registry.handles().map(|h| h.unique_id().to_string()).collect();
    for id in ids {
        registry.unload_entry(&id);
    }
}

fn print_sensors(sensors: &[Sensor]) {
    for sensor in sensors {
        let value = sensor
            .value()
            .map_or_else(|| "unknown".to_string(), |v| v.to_string());
        let unit = sensor.unit().unwrap_or("");
        println!("  {:<42} {value}{unit}", sensor.name());
    }
}
