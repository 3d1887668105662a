//! Seed script - populates the database with realistic demo data
//!
//! Run with: cargo run --bin seed-campaigns -- --migrate
//!
//! This creates:
//! - 4 clients (labels and artist management)
//! - 5 vendors (playlist curators and channel networks)
//! - 2 campaign groups
//! - 12 campaigns across every platform and lifecycle state,
//!   with vendor allocations, playlist placements, and delivery history
//! - invoices in pending, paid, and overdue states

use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::{ArgAction, Parser};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use influence_api::config::AppConfig;
use influence_api::db;
use influence_api::events::EventSender;
use influence_api::models::{CampaignStatus, InvoiceStatus, Platform};
use influence_api::services::campaign_groups::CreateCampaignGroupRequest;
use influence_api::services::campaigns::{CreateCampaignRequest, UpdateCampaignStatusRequest};
use influence_api::services::clients::CreateClientRequest;
use influence_api::services::delivery::{
    CreateAllocationRequest, CreatePlacementRequest, RecordDeliveryRequest,
};
use influence_api::services::factory::{ServiceContainer, ServiceFactory};
use influence_api::services::invoices::{CreateInvoiceRequest, UpdateInvoiceStatusRequest};
use influence_api::services::vendors::CreateVendorRequest;

#[derive(Debug, Parser)]
#[command(
    name = "seed-campaigns",
    about = "Populate the database with demo clients, vendors, campaigns, and invoices"
)]
struct Cli {
    /// Database URL; falls back to DATABASE_URL, then an on-disk SQLite file
    #[arg(long)]
    database_url: Option<String>,

    /// Run pending migrations before seeding
    #[arg(long, action = ArgAction::SetTrue)]
    migrate: bool,

    /// Extra randomized active campaigns on top of the fixed scenarios
    #[arg(long, default_value_t = 0)]
    extra_campaigns: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let database_url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://influence.db?mode=rwc".to_string());

    info!("Connecting to database: {}", database_url);
    let pool = db::establish_connection(&database_url).await?;
    if cli.migrate {
        info!("Running pending migrations");
        db::run_migrations(&pool).await?;
    }

    let cfg = AppConfig::new(database_url, "127.0.0.1", 8080, "development");
    // Drain domain events so writers never block on a full channel.
    let (event_tx, mut event_rx) = mpsc::channel(256);
    tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
    let factory = ServiceFactory::new(Arc::new(pool), EventSender::new(event_tx), &cfg);
    let services = ServiceContainer::new(&factory);

    info!("=== Artist Influence Seed Data ===");

    let clients = create_clients(&services).await?;
    info!("  Created {} clients", clients.len());

    let vendors = create_vendors(&services).await?;
    info!("  Created {} vendors", vendors.len());

    let groups = create_groups(&services, &clients).await?;
    info!("  Created {} campaign groups", groups.len());

    let campaign_count = create_campaigns(&services, &clients, &groups, &vendors).await?;
    info!("  Created {} campaigns with delivery history", campaign_count);

    if cli.extra_campaigns > 0 {
        let extra = create_random_campaigns(&services, &clients, &vendors, cli.extra_campaigns).await?;
        info!("  Created {} randomized campaigns", extra);
    }

    let invoice_count = create_invoices(&services, &clients).await?;
    info!("  Created {} invoices", invoice_count);

    info!("=== Seed Data Complete ===");
    info!("Try these API calls:");
    info!("  curl http://localhost:8080/api/v1/dashboard/ops-status");
    info!("  curl http://localhost:8080/api/v1/dashboard/alerts");
    info!("  curl http://localhost:8080/api/v1/campaigns");
    info!("  curl http://localhost:8080/api/v1/invoices?overdue_only=true");
    info!("Or explore interactively at: http://localhost:8080/docs");

    Ok(())
}

async fn create_clients(services: &ServiceContainer) -> anyhow::Result<Vec<Uuid>> {
    let clients_data = vec![
        (
            "Luminous Records",
            Some("ops@luminousrecords.com"),
            Some("Luminous Records LLC"),
        ),
        (
            "Midnight Canvas Management",
            Some("hello@midnightcanvas.co"),
            None,
        ),
        ("Aria Collective", Some("team@ariacollective.io"), None),
        ("Harbor & Hart", None, Some("Harbor & Hart Agency")),
    ];

    let mut ids = Vec::new();
    for (name, email, company) in clients_data {
        let client = services
            .clients
            .create_client(CreateClientRequest {
                name: name.to_string(),
                email: email.map(str::to_string),
                company: company.map(str::to_string),
                notes: None,
            })
            .await?;
        ids.push(client.id);
    }
    Ok(ids)
}

async fn create_vendors(services: &ServiceContainer) -> anyhow::Result<Vec<Uuid>> {
    let vendors_data = vec![
        // (name, contact, cost per unit, daily capacity)
        ("PlaylistPush Partners", Some("curators@playlistpush.example"), dec!(0.0040), Some(25_000)),
        ("StreamLift Media", Some("booking@streamlift.example"), dec!(0.0035), Some(40_000)),
        ("ViralVision Network", Some("ads@viralvision.example"), dec!(0.0090), Some(60_000)),
        ("SoundSurge Promotions", None, dec!(0.0025), Some(15_000)),
        ("EchoChamber Curation", Some("echo@chamber.example"), dec!(0.0050), None),
    ];

    let mut ids = Vec::new();
    for (name, contact_email, cost_rate, daily_capacity) in vendors_data {
        let vendor = services
            .vendors
            .create_vendor(CreateVendorRequest {
                name: name.to_string(),
                contact_email: contact_email.map(str::to_string),
                cost_rate,
                daily_capacity,
            })
            .await?;
        ids.push(vendor.id);
    }
    Ok(ids)
}

async fn create_groups(
    services: &ServiceContainer,
    clients: &[Uuid],
) -> anyhow::Result<Vec<Uuid>> {
    let groups_data = vec![
        (clients[0], "Neon Skyline Album Rollout"),
        (clients[1], "Q3 Single Push"),
    ];

    let mut ids = Vec::new();
    for (client_id, name) in groups_data {
        let group = services
            .campaign_groups
            .create_group(CreateCampaignGroupRequest {
                client_id,
                name: name.to_string(),
                notes: None,
            })
            .await?;
        ids.push(group.id);
    }
    Ok(ids)
}

struct CampaignScenario {
    name: &'static str,
    artist: &'static str,
    platform: Platform,
    client_idx: usize,
    group_idx: Option<usize>,
    goal: Option<i64>,
    start_days_ago: Option<i64>,
    duration_days: Option<i32>,
    budget: Option<Decimal>,
    status: CampaignStatus,
    // cumulative delivery as a percentage of each allocation
    delivered_pct: i64,
}

async fn create_campaigns(
    services: &ServiceContainer,
    clients: &[Uuid],
    groups: &[Uuid],
    vendors: &[Uuid],
) -> anyhow::Result<usize> {
    use CampaignStatus::*;
    use Platform::*;

    let scenarios = vec![
        // On pace: ~44% through a 45-day flight with 55% delivered.
        CampaignScenario {
            name: "Neon Skyline - Spotify Push",
            artist: "Ava Reyes",
            platform: Spotify,
            client_idx: 0,
            group_idx: Some(0),
            goal: Some(250_000),
            start_days_ago: Some(20),
            duration_days: Some(45),
            budget: Some(dec!(4500)),
            status: Active,
            delivered_pct: 55,
        },
        // Behind pace: should surface as a warning or critical alert.
        CampaignScenario {
            name: "Neon Skyline - YouTube Premiere",
            artist: "Ava Reyes",
            platform: Youtube,
            client_idx: 0,
            group_idx: Some(0),
            goal: Some(100_000),
            start_days_ago: Some(20),
            duration_days: Some(45),
            budget: Some(dec!(3000)),
            status: Active,
            delivered_pct: 12,
        },
        // Flight window elapsed but still short of goal.
        CampaignScenario {
            name: "Glass Horizon",
            artist: "The Marlowes",
            platform: Spotify,
            client_idx: 1,
            group_idx: Some(1),
            goal: Some(80_000),
            start_days_ago: Some(40),
            duration_days: Some(30),
            budget: Some(dec!(1200)),
            status: Active,
            delivered_pct: 85,
        },
        CampaignScenario {
            name: "Static Bloom",
            artist: "Korvett",
            platform: Soundcloud,
            client_idx: 1,
            group_idx: Some(1),
            goal: Some(40_000),
            start_days_ago: Some(10),
            duration_days: Some(60),
            budget: Some(dec!(600)),
            status: Active,
            delivered_pct: 20,
        },
        CampaignScenario {
            name: "Violet Hour Reels",
            artist: "Lena Mae",
            platform: Instagram,
            client_idx: 2,
            group_idx: None,
            goal: Some(500_000),
            start_days_ago: Some(5),
            duration_days: Some(30),
            budget: Some(dec!(2500)),
            status: Active,
            delivered_pct: 15,
        },
        // Stalled candidate: three weeks in, nothing delivered.
        CampaignScenario {
            name: "Undertow",
            artist: "Delta Mirage",
            platform: Spotify,
            client_idx: 2,
            group_idx: None,
            goal: Some(60_000),
            start_days_ago: Some(21),
            duration_days: Some(45),
            budget: Some(dec!(900)),
            status: Active,
            delivered_pct: 0,
        },
        // Data gaps: active without a goal, active without a start date.
        CampaignScenario {
            name: "Afterglow",
            artist: "Ava Reyes",
            platform: Youtube,
            client_idx: 0,
            group_idx: Some(0),
            goal: None,
            start_days_ago: Some(7),
            duration_days: Some(30),
            budget: None,
            status: Active,
            delivered_pct: 0,
        },
        CampaignScenario {
            name: "Coastline (Pre-release)",
            artist: "The Marlowes",
            platform: Spotify,
            client_idx: 1,
            group_idx: None,
            goal: Some(30_000),
            start_days_ago: None,
            duration_days: Some(30),
            budget: Some(dec!(450)),
            status: Active,
            delivered_pct: 0,
        },
        CampaignScenario {
            name: "Night Drive (Draft)",
            artist: "Korvett",
            platform: Soundcloud,
            client_idx: 1,
            group_idx: None,
            goal: Some(25_000),
            start_days_ago: None,
            duration_days: None,
            budget: None,
            status: Draft,
            delivered_pct: 0,
        },
        CampaignScenario {
            name: "Paper Lanterns",
            artist: "Lena Mae",
            platform: Instagram,
            client_idx: 2,
            group_idx: None,
            goal: Some(200_000),
            start_days_ago: Some(15),
            duration_days: Some(30),
            budget: Some(dec!(1800)),
            status: Paused,
            delivered_pct: 30,
        },
        CampaignScenario {
            name: "First Light",
            artist: "Delta Mirage",
            platform: Spotify,
            client_idx: 3,
            group_idx: None,
            goal: Some(50_000),
            start_days_ago: Some(70),
            duration_days: Some(60),
            budget: Some(dec!(750)),
            status: Complete,
            delivered_pct: 100,
        },
        CampaignScenario {
            name: "Fault Lines",
            artist: "Harbor & Hart Roster",
            platform: Youtube,
            client_idx: 3,
            group_idx: None,
            goal: Some(90_000),
            start_days_ago: Some(12),
            duration_days: Some(30),
            budget: Some(dec!(2000)),
            status: Cancelled,
            delivered_pct: 10,
        },
    ];

    let today = Utc::now().date_naive();
    let mut count = 0;

    for (i, scenario) in scenarios.into_iter().enumerate() {
        let campaign = services
            .campaigns
            .create_campaign(CreateCampaignRequest {
                client_id: clients[scenario.client_idx],
                campaign_group_id: scenario.group_idx.map(|g| groups[g]),
                name: scenario.name.to_string(),
                artist_name: scenario.artist.to_string(),
                platform: scenario.platform,
                track_url: Some(format!(
                    "https://open.example.com/track/{}",
                    scenario.name.to_lowercase().replace(' ', "-")
                )),
                goal: scenario.goal,
                start_date: scenario.start_days_ago.map(|d| today - Duration::days(d)),
                duration_days: scenario.duration_days,
                budget: scenario.budget,
            })
            .await?;

        // Drafts stay untouched; everything else gets activated so vendor
        // bookings and delivery history look like a real running campaign.
        if scenario.status != CampaignStatus::Draft {
            services
                .campaigns
                .update_campaign_status(
                    campaign.id,
                    UpdateCampaignStatusRequest {
                        status: CampaignStatus::Active,
                    },
                )
                .await?;
        }

        if let Some(goal) = scenario.goal {
            if scenario.status != CampaignStatus::Draft {
                let vendor_a = vendors[i % vendors.len()];
                let vendor_b = vendors[(i + 2) % vendors.len()];
                seed_allocation(services, campaign.id, vendor_a, goal * 6 / 10, scenario.delivered_pct)
                    .await?;
                seed_allocation(services, campaign.id, vendor_b, goal * 4 / 10, scenario.delivered_pct)
                    .await?;

                if scenario.platform == Platform::Spotify {
                    let placement = services
                        .delivery
                        .create_placement(
                            campaign.id,
                            CreatePlacementRequest {
                                vendor_id: vendor_a,
                                playlist_name: format!("Fresh Finds Vol. {}", i + 1),
                                playlist_url: Some(format!(
                                    "https://open.example.com/playlist/fresh-finds-{}",
                                    i + 1
                                )),
                                position: Some(((i % 20) + 1) as i32),
                                placed_at: scenario
                                    .start_days_ago
                                    .map(|d| today - Duration::days(d - 1)),
                            },
                        )
                        .await?;
                    if scenario.delivered_pct > 0 {
                        services
                            .delivery
                            .record_placement_delivery(
                                placement.id,
                                RecordDeliveryRequest {
                                    delivered_units: goal / 20 * scenario.delivered_pct / 100,
                                },
                            )
                            .await?;
                    }
                }
            }
        }

        // Walk the campaign into its final state.
        match scenario.status {
            CampaignStatus::Paused | CampaignStatus::Complete => {
                services
                    .campaigns
                    .update_campaign_status(
                        campaign.id,
                        UpdateCampaignStatusRequest {
                            status: scenario.status,
                        },
                    )
                    .await?;
            }
            CampaignStatus::Cancelled => {
                services.campaigns.cancel_campaign(campaign.id).await?;
            }
            _ => {}
        }

        count += 1;
    }

    Ok(count)
}

async fn seed_allocation(
    services: &ServiceContainer,
    campaign_id: Uuid,
    vendor_id: Uuid,
    allocated_units: i64,
    delivered_pct: i64,
) -> anyhow::Result<()> {
    let allocation = services
        .delivery
        .create_allocation(
            campaign_id,
            CreateAllocationRequest {
                vendor_id,
                allocated_units,
                cost: None,
            },
        )
        .await?;

    if delivered_pct > 0 {
        services
            .delivery
            .record_allocation_delivery(
                allocation.id,
                RecordDeliveryRequest {
                    delivered_units: allocated_units * delivered_pct / 100,
                },
            )
            .await?;
    }
    Ok(())
}

async fn create_random_campaigns(
    services: &ServiceContainer,
    clients: &[Uuid],
    vendors: &[Uuid],
    count: u32,
) -> anyhow::Result<usize> {
    let platforms = [
        Platform::Spotify,
        Platform::Youtube,
        Platform::Instagram,
        Platform::Soundcloud,
    ];
    let artists = ["Nova Tide", "Cobalt Era", "June Atlas", "Vera Lane", "Wilder Sons"];
    let mut rng = rand::thread_rng();
    let today = Utc::now().date_naive();
    let mut created = 0;

    for i in 0..count {
        let goal = rng.gen_range(20..500) * 1_000;
        let start_days_ago = rng.gen_range(1..40);
        let duration = rng.gen_range(14..90);
        let delivered_pct = rng.gen_range(0..120).min(100);

        let campaign = services
            .campaigns
            .create_campaign(CreateCampaignRequest {
                client_id: clients[rng.gen_range(0..clients.len())],
                campaign_group_id: None,
                name: format!("Discovery Batch {}", i + 1),
                artist_name: artists[rng.gen_range(0..artists.len())].to_string(),
                platform: platforms[rng.gen_range(0..platforms.len())],
                track_url: None,
                goal: Some(goal),
                start_date: Some(today - Duration::days(start_days_ago)),
                duration_days: Some(duration),
                budget: None,
            })
            .await?;
        services
            .campaigns
            .update_campaign_status(
                campaign.id,
                UpdateCampaignStatusRequest {
                    status: CampaignStatus::Active,
                },
            )
            .await?;

        let vendor_id = vendors[rng.gen_range(0..vendors.len())];
        seed_allocation(services, campaign.id, vendor_id, goal, delivered_pct).await?;
        created += 1;
    }

    Ok(created)
}

async fn create_invoices(services: &ServiceContainer, clients: &[Uuid]) -> anyhow::Result<usize> {
    let today = Utc::now().date_naive();
    let invoices_data = vec![
        // (client_idx, amount, due in days from today, final status)
        (0, dec!(4500.00), 21, InvoiceStatus::Pending),
        (0, dec!(3000.00), -12, InvoiceStatus::Pending), // overdue
        (1, dec!(1200.00), -45, InvoiceStatus::Pending), // long overdue
        (1, dec!(600.00), 14, InvoiceStatus::Paid),
        (2, dec!(2500.00), 30, InvoiceStatus::Pending),
        (3, dec!(750.00), 7, InvoiceStatus::Paid),
        (3, dec!(2000.00), 10, InvoiceStatus::Void),
    ];

    let mut count = 0;
    for (client_idx, amount, due_in_days, status) in invoices_data {
        // Issue a month before due so the dates always read sensibly.
        let due_date = today + Duration::days(due_in_days);
        let invoice = services
            .invoices
            .create_invoice(CreateInvoiceRequest {
                client_id: clients[client_idx],
                campaign_id: None,
                invoice_number: None,
                amount,
                currency: None,
                issue_date: Some(due_date - Duration::days(30)),
                due_date,
                notes: None,
            })
            .await?;

        if status != InvoiceStatus::Pending {
            services
                .invoices
                .update_invoice_status(invoice.id, UpdateInvoiceStatusRequest { status })
                .await?;
        }
        count += 1;
    }

    Ok(count)
}
