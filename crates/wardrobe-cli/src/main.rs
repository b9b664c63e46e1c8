use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "wardrobe", about = "Wardrobe manager and outfit recommender")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an image's color locally, without the daemon
    Classify {
        image: PathBuf,
    },
    #[command(flatten)]
    Daemon(DaemonCommand),
}

/// Commands served by `wardrobed`.
#[derive(Subcommand)]
enum DaemonCommand {
    /// Add a garment from a photo
    Add {
        /// Image file (png, jpg, jpeg, gif or bmp)
        image: PathBuf,
        /// Garment type (e.g., "Kurta", "Jeans", "Dress")
        #[arg(short = 't', long = "type")]
        garment_type: String,
        #[arg(short, long, default_value = "")]
        occasion: String,
        #[arg(short, long, default_value = "")]
        weather: String,
        /// Defaults to "Neutral"
        #[arg(short, long, default_value = "")]
        undertone: String,
    },
    /// Upload a photo just to detect its color
    Upload {
        image: PathBuf,
    },
    /// Delete a garment and its photo
    Delete {
        id: i64,
    },
    /// Record that a garment was worn
    Wear {
        id: i64,
    },
    /// List stored garments
    List,
    /// Recommend an outfit
    Recommend {
        #[arg(short, long)]
        occasion: String,
        #[arg(short, long)]
        weather: String,
        #[arg(short, long)]
        undertone: String,
        /// Ignore the weather bonus
        #[arg(long)]
        no_weather: bool,
        /// Ignore the undertone bonus
        #[arg(long)]
        no_undertone: bool,
    },
    /// Record one undertone quiz answer (e.g., "bluevein", "goldjewellery")
    Quiz {
        answer: String,
    },
    /// Show the undertone inferred from quiz answers so far
    Undertone,
    /// Clear quiz answers and start over
    ResetQuiz,
    /// Show daemon status
    Status,
}

// Generates `WardrobeProxy` for the daemon's interface.
#[zbus::proxy(
    interface = "org.freedesktop.Wardrobe1",
    default_service = "org.freedesktop.Wardrobe1",
    default_path = "/org/freedesktop/Wardrobe1"
)]
trait Wardrobe {
    async fn add_garment(
        &self,
        image_path: &str,
        garment_type: &str,
        undertone: &str,
        weather: &str,
        occasion: &str,
    ) -> zbus::Result<String>;
    async fn upload_and_detect(&self, image_path: &str) -> zbus::Result<String>;
    async fn delete_garment(&self, id: i64) -> zbus::Result<bool>;
    async fn record_wear(&self, id: i64) -> zbus::Result<bool>;
    async fn list_garments(&self) -> zbus::Result<String>;
    async fn recommend(
        &self,
        occasion: &str,
        weather: &str,
        undertone: &str,
        use_weather: bool,
        use_undertone: bool,
    ) -> zbus::Result<String>;
    async fn record_undertone_answer(&self, answer: &str) -> zbus::Result<bool>;
    async fn final_undertone(&self) -> zbus::Result<String>;
    async fn reset_quiz(&self) -> zbus::Result<()>;
    async fn status(&self) -> zbus::Result<String>;
}

/// Connect to the bus selected by `WARDROBE_BUS` (session unless "system").
async fn connect() -> Result<zbus::Connection> {
    let system = std::env::var("WARDROBE_BUS")
        .map(|v| v.eq_ignore_ascii_case("system"))
        .unwrap_or(false);
    let timeout = std::env::var("WARDROBE_METHOD_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    tracing::debug!(system, timeout, "connecting to wardrobed");
    let builder = if system {
        zbus::connection::Builder::system()?
    } else {
        zbus::connection::Builder::session()?
    };
    builder
        .method_timeout(Duration::from_secs(timeout))
        .build()
        .await
        .context("failed to connect to D-Bus; is wardrobed running?")
}

/// The daemon opens the file itself, so hand it an absolute path.
fn absolute(path: &Path) -> Result<String> {
    let abs = std::fs::canonicalize(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(abs.to_string_lossy().into_owned())
}

fn print_outfits(json: &str) -> Result<()> {
    let outfits: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let Some(outfit) = outfits.first() else {
        println!("No garments to recommend from");
        return Ok(());
    };
    println!("Top:    {} (#{})", outfit["top_type"].as_str().unwrap_or("?"), outfit["top_id"]);
    println!(
        "Bottom: {} ({})",
        outfit["bottom_type"].as_str().unwrap_or("None"),
        outfit["bottom_color"].as_str().unwrap_or("None")
    );
    println!("Image:  {}", outfit["top_image"].as_str().unwrap_or(""));
    println!("Score:  {}% match", outfit["match_percent"]);
    Ok(())
}

fn print_garments(json: &str) -> Result<()> {
    let garments: Vec<serde_json::Value> = serde_json::from_str(json)?;
    if garments.is_empty() {
        println!("No garments stored");
        return Ok(());
    }
    for g in &garments {
        println!(
            "#{:<4} {:<16} {:<8} {:<10} {:<8} worn {}",
            g["id"],
            g["garment_type"].as_str().unwrap_or(""),
            g["color"].as_str().unwrap_or(""),
            g["occasion"].as_str().unwrap_or(""),
            g["weather"].as_str().unwrap_or(""),
            g["wear_count"]
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Commands::Classify { image } => {
            println!("{}", wardrobe_core::classify_path(&image));
            Ok(())
        }
        Commands::Daemon(command) => run(command).await,
    }
}

async fn run(command: DaemonCommand) -> Result<()> {
    let conn = connect().await?;
    let proxy = WardrobeProxy::new(&conn).await?;

    match command {
        DaemonCommand::Add {
            image,
            garment_type,
            occasion,
            weather,
            undertone,
        } => {
            let json = proxy
                .add_garment(&absolute(&image)?, &garment_type, &undertone, &weather, &occasion)
                .await?;
            let garment: serde_json::Value = serde_json::from_str(&json)?;
            println!(
                "Added #{}: {} ({})",
                garment["id"],
                garment["garment_type"].as_str().unwrap_or(""),
                garment["color"].as_str().unwrap_or("")
            );
        }
        DaemonCommand::Upload { image } => {
            let json = proxy.upload_and_detect(&absolute(&image)?).await?;
            let uploaded: serde_json::Value = serde_json::from_str(&json)?;
            println!(
                "Uploaded {}, detected color: {}",
                uploaded["filename"].as_str().unwrap_or(""),
                uploaded["detected_color"].as_str().unwrap_or("")
            );
        }
        DaemonCommand::Delete { id } => {
            if proxy.delete_garment(id).await? {
                println!("Deleted garment #{id}");
            } else {
                println!("Garment #{id} not found");
            }
        }
        DaemonCommand::Wear { id } => {
            if proxy.record_wear(id).await? {
                println!("Recorded wear for #{id}");
            } else {
                println!("Garment #{id} not found");
            }
        }
        DaemonCommand::List => {
            print_garments(&proxy.list_garments().await?)?;
        }
        DaemonCommand::Recommend {
            occasion,
            weather,
            undertone,
            no_weather,
            no_undertone,
        } => {
            let json = proxy
                .recommend(&occasion, &weather, &undertone, !no_weather, !no_undertone)
                .await?;
            print_outfits(&json)?;
        }
        DaemonCommand::Quiz { answer } => {
            if proxy.record_undertone_answer(&answer).await? {
                println!("Recorded");
            } else {
                println!("Answer \"{answer}\" not recognized; ignored");
            }
        }
        DaemonCommand::Undertone => {
            println!("{}", proxy.final_undertone().await?);
        }
        DaemonCommand::ResetQuiz => {
            proxy.reset_quiz().await?;
            println!("Quiz reset");
        }
        DaemonCommand::Status => {
            println!("{}", proxy.status().await?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_recommend_flags_parse() {
        let cli = Cli::try_parse_from([
            "wardrobe", "recommend", "-o", "Festive", "-w", "Monsoon", "-u", "Warm", "--no-weather",
        ])
        .unwrap();
        match cli.command {
            Commands::Daemon(DaemonCommand::Recommend {
                occasion,
                no_weather,
                no_undertone,
                ..
            }) => {
                assert_eq!(occasion, "Festive");
                assert!(no_weather);
                assert!(!no_undertone);
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_classify_is_a_local_command() {
        let cli = Cli::try_parse_from(["wardrobe", "classify", "shirt.png"]).unwrap();
        assert!(matches!(cli.command, Commands::Classify { .. }));
        let cli = Cli::try_parse_from(["wardrobe", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Daemon(DaemonCommand::Status)));
    }

    #[test]
    fn test_print_outfits_handles_empty_list() {
        print_outfits("[]").unwrap();
        assert!(print_outfits("not json").is_err());
    }
}
