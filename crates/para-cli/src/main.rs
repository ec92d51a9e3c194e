//! Para CLI - Command-line interface
//!
//! Usage:
//!   para parse <file|->
//!   para nearby --lat <lat> --lon <lon> [--radius <km>] <file|->
//!   para generate <file|->
//!
//! Author: hephaex@gmail.com

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use para_core::{find_nearby, AppConfig, GeoPoint, Located};
use para_extractor::{parse_extraction, Analyzer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

#[derive(Parser)]
#[command(name = "para")]
#[command(about = "ParaInvestigate report tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse model output in the report marker format
    Parse {
        /// File to read, or `-` for stdin
        input: String,
    },
    /// Filter a JSON array of located records by distance from a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Inclusive radius in kilometres
        #[arg(long, default_value_t = 50.0)]
        radius: f64,
        /// File to read, or `-` for stdin
        input: String,
    },
    /// Generate a structured report from raw witness text with the
    /// configured model
    Generate {
        /// File to read, or `-` for stdin
        input: String,
    },
}

/// Any JSON record carrying a `location`
#[derive(Debug, Deserialize, Serialize)]
struct Record {
    location: GeoPoint,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

impl Located for Record {
    fn location(&self) -> &GeoPoint {
        &self.location
    }
}

#[derive(Debug, Serialize)]
struct NearbyRecord {
    #[serde(flatten)]
    record: Record,
    distance_km: f64,
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

fn nearby(text: &str, origin: &GeoPoint, radius_km: f64) -> anyhow::Result<Vec<NearbyRecord>> {
    if !origin.is_valid() {
        bail!("Invalid coordinates: {}, {}", origin.latitude, origin.longitude);
    }
    if !radius_km.is_finite() || radius_km < 0.0 {
        bail!("Invalid radius: {radius_km}");
    }
    let records: Vec<Record> =
        serde_json::from_str(text).context("Expected a JSON array of records with a location")?;

    Ok(find_nearby(records, origin, radius_km)
        .into_iter()
        .map(|n| NearbyRecord {
            record: n.item,
            distance_km: (n.distance_km * 100.0).round() / 100.0,
        })
        .collect())
}

async fn generate(raw_text: &str) -> anyhow::Result<Value> {
    if raw_text.trim().is_empty() {
        bail!("Raw text is required");
    }
    let config = AppConfig::from_env()?;
    if !config.llm.is_configured() {
        bail!("No language model configured; set OPENAI_API_KEY or LLM_PROVIDER=ollama");
    }
    let analyzer = Analyzer::new(para_llm::create_llm_client(&config.llm)?);
    let report = analyzer.try_generate_report(raw_text).await?;
    Ok(serde_json::to_value(report)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Parse { input } => {
            let text = read_input(&input)?;
            serde_json::to_value(parse_extraction(&text))?
        }
        Commands::Nearby {
            lat,
            lon,
            radius,
            input,
        } => {
            let text = read_input(&input)?;
            let found = nearby(&text, &GeoPoint::new(lat, lon), radius)?;
            tracing::info!(matched = found.len(), radius, "Nearby search");
            serde_json::to_value(found)?
        }
        Commands::Generate { input } => generate(&read_input(&input)?).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_negative_longitude() {
        let cli = Cli::try_parse_from([
            "para", "nearby", "--lat", "51.5", "--lon", "-0.12", "places.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Nearby { lon, radius, .. } => {
                assert_eq!(lon, -0.12);
                assert_eq!(radius, 50.0);
            }
            _ => panic!("expected nearby"),
        }
    }

    #[test]
    fn test_nearby_keeps_extra_fields() {
        let text = r#"[
            {"title": "far", "location": {"latitude": 53.4808, "longitude": -2.2426}},
            {"title": "near", "location": {"latitude": 51.4995, "longitude": -0.1248}}
        ]"#;
        let found = nearby(text, &GeoPoint::new(51.5074, -0.1278), 50.0).unwrap();
        assert_eq!(found.len(), 1);

        let json = serde_json::to_value(&found[0]).unwrap();
        assert_eq!(json["title"], "near");
        assert!(json["distance_km"].as_f64().unwrap() < 1.0);
    }

    #[test]
    fn test_nearby_rejects_bad_input() {
        assert!(nearby("[]", &GeoPoint::new(95.0, 0.0), 10.0).is_err());
        assert!(nearby("{}", &GeoPoint::new(51.0, 0.0), 10.0).is_err());
        assert!(nearby("[]", &GeoPoint::new(51.0, 0.0), -1.0).is_err());
    }

    #[tokio::test]
    async fn test_generate_requires_text() {
        assert!(generate("   ").await.is_err());
    }
}
